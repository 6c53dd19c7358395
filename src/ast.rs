/// A parsed CLL program fragment.
///
/// The tree the lowerer consumes: a node is either a bare textual atom
/// (identifier, integer literal, or dotted pseudo-name such as `tx.sender`)
/// or a head tag with an ordered list of children. The surface parser (ours
/// or an external collaborator's) hands the compiler exactly this shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Atom(String),
    Compound { head: String, args: Vec<Node> },
}

impl Node {
    pub fn atom(text: impl Into<String>) -> Self {
        Node::Atom(text.into())
    }

    pub fn compound(head: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Compound {
            head: head.into(),
            args,
        }
    }

    /// The atom's text, or `None` for compounds.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Node::Atom(text) => Some(text),
            Node::Compound { .. } => None,
        }
    }

    /// The compound's head tag, or `None` for atoms.
    pub fn head(&self) -> Option<&str> {
        match self {
            Node::Atom(_) => None,
            Node::Compound { head, .. } => Some(head),
        }
    }

    /// Integer value of a numeric literal atom.
    pub fn as_int(&self) -> Option<i64> {
        self.as_atom().and_then(|text| text.parse::<i64>().ok())
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Atom(text) => write!(f, "{}", text),
            Node::Compound { head, args } => {
                write!(f, "{}(", head)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_int() {
        assert_eq!(Node::atom("42").as_int(), Some(42));
        assert_eq!(Node::atom("-5").as_int(), Some(-5));
        assert_eq!(Node::atom("x").as_int(), None);
        assert_eq!(Node::atom("tx.sender").as_int(), None);
        assert_eq!(Node::compound("set", vec![]).as_int(), None);
    }

    #[test]
    fn test_display_round_shape() {
        let node = Node::compound(
            "set",
            vec![
                Node::atom("x"),
                Node::compound("-", vec![Node::atom("10"), Node::atom("3")]),
            ],
        );
        assert_eq!(node.to_string(), "set(x, -(10, 3))");
    }

    #[test]
    fn test_head_and_atom_accessors() {
        let node = Node::compound("seq", vec![Node::atom("stop")]);
        assert_eq!(node.head(), Some("seq"));
        assert_eq!(node.as_atom(), None);
        assert_eq!(Node::atom("stop").as_atom(), Some("stop"));
    }
}
