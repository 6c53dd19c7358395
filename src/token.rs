use serde::Serialize;

/// One element of the lowering output stream.
///
/// `Label` and `Ref` are symbolic jump plumbing: the assembler pass records
/// each label's byte offset and rewrites every reference into a
/// `PUSH <offset>` pair, so neither survives into the final stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Token {
    /// An opcode mnemonic, e.g. `ADD`, `MLOAD`, `JMPI`.
    Op(String),
    /// An immediate integer; appears only directly after a `PUSH`.
    Imm(i64),
    /// Label marker `LABEL_n`; contributes no bytes.
    Label(u32),
    /// Reference `REF_n`; sized as two bytes (`PUSH` + offset).
    Ref(u32),
}

impl Token {
    pub fn op(mnemonic: impl Into<String>) -> Self {
        Token::Op(mnemonic.into())
    }

    /// Parse a `REF_n` atom, as threaded through internal call sequences.
    pub fn ref_from_atom(text: &str) -> Option<Token> {
        text.strip_prefix("REF_")
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(Token::Ref)
    }

    /// Bytes this token occupies in the assembler's size model.
    pub fn width(&self) -> usize {
        match self {
            Token::Label(_) => 0,
            Token::Ref(_) => 2,
            Token::Op(_) | Token::Imm(_) => 1,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Op(mnemonic) => write!(f, "{}", mnemonic),
            Token::Imm(value) => write!(f, "{}", value),
            Token::Label(n) => write!(f, "LABEL_{}", n),
            Token::Ref(n) => write!(f, "REF_{}", n),
        }
    }
}

/// Render a token stream the way the CLI prints it: space-separated.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Token::op("ADD").to_string(), "ADD");
        assert_eq!(Token::Imm(42).to_string(), "42");
        assert_eq!(Token::Imm(-1).to_string(), "-1");
        assert_eq!(Token::Label(3).to_string(), "LABEL_3");
        assert_eq!(Token::Ref(3).to_string(), "REF_3");
    }

    #[test]
    fn test_ref_from_atom() {
        assert_eq!(Token::ref_from_atom("REF_7"), Some(Token::Ref(7)));
        assert_eq!(Token::ref_from_atom("REF_"), None);
        assert_eq!(Token::ref_from_atom("LABEL_7"), None);
        assert_eq!(Token::ref_from_atom("ref_7"), None);
    }

    #[test]
    fn test_width_model() {
        assert_eq!(Token::op("JMP").width(), 1);
        assert_eq!(Token::Imm(0).width(), 1);
        assert_eq!(Token::Label(0).width(), 0);
        assert_eq!(Token::Ref(0).width(), 2);
    }

    #[test]
    fn test_render() {
        let tokens = vec![Token::op("PUSH"), Token::Imm(7), Token::op("MSTORE")];
        assert_eq!(render(&tokens), "PUSH 7 MSTORE");
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&Token::op("ADD")).unwrap();
        assert_eq!(json, r#"{"kind":"op","value":"ADD"}"#);
        let json = serde_json::to_string(&Token::Imm(5)).unwrap();
        assert_eq!(json, r#"{"kind":"imm","value":5}"#);
    }
}
