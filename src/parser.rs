use crate::ast::Node;
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;

/// Recursive-descent parser for the textual AST notation.
///
/// Two spellings of a compound are accepted and mean the same tree:
///   `set(x, 7)`       head before the parenthesis
///   `(-, 10, 3)`      head as the first element, operator style
pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a single node spanning the whole input.
    pub fn parse_node(mut self) -> Result<Node, Vec<Diagnostic>> {
        let node = self.node();
        if !self.at(&Lexeme::Eof) {
            self.error("expected end of input after the top-level node");
        }
        match node {
            Some(node) if self.diagnostics.is_empty() => Ok(node),
            _ => Err(self.diagnostics),
        }
    }

    fn node(&mut self) -> Option<Node> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.node_inner();
        self.depth -= 1;
        result
    }

    fn node_inner(&mut self) -> Option<Node> {
        match self.current().clone() {
            // Operator style: '(' head ',' args ')'
            Lexeme::LParen => {
                self.advance();
                let head = self.expect_atom()?;
                let args = if self.eat(&Lexeme::Comma) {
                    self.arg_list()?
                } else {
                    Vec::new()
                };
                self.expect(&Lexeme::RParen)?;
                Some(Node::compound(head, args))
            }
            Lexeme::Atom(text) => {
                self.advance();
                if self.eat(&Lexeme::LParen) {
                    let args = if self.at(&Lexeme::RParen) {
                        Vec::new()
                    } else {
                        self.arg_list()?
                    };
                    self.expect(&Lexeme::RParen)?;
                    Some(Node::compound(text, args))
                } else {
                    Some(Node::Atom(text))
                }
            }
            other => {
                self.error(&format!("expected a node, found '{}'", other));
                None
            }
        }
    }

    fn arg_list(&mut self) -> Option<Vec<Node>> {
        let mut args = vec![self.node()?];
        while self.eat(&Lexeme::Comma) {
            args.push(self.node()?);
        }
        Some(args)
    }

    // ── Token plumbing ────────────────────────────────────────────

    fn current(&self) -> &Lexeme {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at(&self, lexeme: &Lexeme) -> bool {
        self.current() == lexeme
    }

    fn eat(&mut self, lexeme: &Lexeme) -> bool {
        if self.at(lexeme) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lexeme: &Lexeme) -> Option<()> {
        if self.eat(lexeme) {
            Some(())
        } else {
            self.error(&format!(
                "expected '{}', found '{}'",
                lexeme,
                self.current()
            ));
            None
        }
    }

    fn expect_atom(&mut self) -> Option<String> {
        match self.current().clone() {
            Lexeme::Atom(text) => {
                self.advance();
                Some(text)
            }
            other => {
                self.error(&format!("expected a head atom, found '{}'", other));
                None
            }
        }
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error("nesting depth exceeded (maximum 256 levels)");
            return false;
        }
        true
    }

    fn error(&mut self, message: &str) {
        self.diagnostics
            .push(Diagnostic::error(message.to_string(), self.current_span()));
    }
}
