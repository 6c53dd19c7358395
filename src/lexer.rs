use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Two-character operator symbols, matched before the single-character set.
const WIDE_OPS: &[&str] = &["#/", "#%", "==", "<=", ">=", "&&", "||"];

const NARROW_OPS: &[u8] = b"+-*/^%<>!";

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            match ch {
                b'(' => {
                    self.pos += 1;
                    return self.make_token(Lexeme::LParen, start, self.pos);
                }
                b')' => {
                    self.pos += 1;
                    return self.make_token(Lexeme::RParen, start, self.pos);
                }
                b',' => {
                    self.pos += 1;
                    return self.make_token(Lexeme::Comma, start, self.pos);
                }
                _ => {}
            }

            if is_ident_start(ch) {
                return self.scan_ident();
            }

            // A '-' directly followed by a digit is a signed literal; bare
            // '-' is the subtraction operator head.
            if ch.is_ascii_digit() || (ch == b'-' && self.peek_digit()) {
                return self.scan_number();
            }

            if let Some(tok) = self.scan_operator(start) {
                return tok;
            }

            self.diagnostics.push(Diagnostic::error(
                format!("unexpected character '{}'", ch as char),
                Span::new(start as u32, (start + 1) as u32),
            ));
            self.pos += 1;
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    fn scan_ident(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or_default()
            .to_string();
        self.make_token(Lexeme::Atom(text), start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        if self.source[self.pos] == b'-' {
            self.pos += 1;
        }
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or_default()
            .to_string();
        self.make_token(Lexeme::Atom(text), start, self.pos)
    }

    fn scan_operator(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        if self.pos + 1 < self.source.len() {
            let pair = &self.source[self.pos..self.pos + 2];
            for op in WIDE_OPS {
                if pair == op.as_bytes() {
                    self.pos += 2;
                    return Some(self.make_token(Lexeme::Atom((*op).to_string()), start, self.pos));
                }
            }
        }

        let ch = self.source[self.pos];
        if NARROW_OPS.contains(&ch) {
            self.pos += 1;
            return Some(self.make_token(
                Lexeme::Atom((ch as char).to_string()),
                start,
                self.pos,
            ));
        }

        None
    }

    fn peek_digit(&self) -> bool {
        self.pos + 1 < self.source.len() && self.source[self.pos + 1].is_ascii_digit()
    }

    fn make_token(&self, lexeme: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(lexeme, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(source: &str) -> Vec<Lexeme> {
        let (tokens, errors) = Lexer::new(source).tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens.into_iter().map(|t| t.node).collect()
    }

    #[test]
    fn test_compound_form() {
        let toks = atoms("set(x, 7)");
        assert_eq!(
            toks,
            vec![
                Lexeme::Atom("set".into()),
                Lexeme::LParen,
                Lexeme::Atom("x".into()),
                Lexeme::Comma,
                Lexeme::Atom("7".into()),
                Lexeme::RParen,
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn test_operator_head() {
        let toks = atoms("(-, 10, 3)");
        assert_eq!(
            toks,
            vec![
                Lexeme::LParen,
                Lexeme::Atom("-".into()),
                Lexeme::Comma,
                Lexeme::Atom("10".into()),
                Lexeme::Comma,
                Lexeme::Atom("3".into()),
                Lexeme::RParen,
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn test_negative_literal_vs_minus() {
        let toks = atoms("(-, x, -5)");
        assert!(toks.contains(&Lexeme::Atom("-".into())));
        assert!(toks.contains(&Lexeme::Atom("-5".into())));
    }

    #[test]
    fn test_wide_operators() {
        let toks = atoms("== <= >= #/ #% && ||");
        assert_eq!(
            toks,
            vec![
                Lexeme::Atom("==".into()),
                Lexeme::Atom("<=".into()),
                Lexeme::Atom(">=".into()),
                Lexeme::Atom("#/".into()),
                Lexeme::Atom("#%".into()),
                Lexeme::Atom("&&".into()),
                Lexeme::Atom("||".into()),
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn test_dotted_identifiers() {
        let toks = atoms("contract.storage tx.data block.contract_storage");
        assert_eq!(
            toks,
            vec![
                Lexeme::Atom("contract.storage".into()),
                Lexeme::Atom("tx.data".into()),
                Lexeme::Atom("block.contract_storage".into()),
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let toks = atoms("set(x, 1) // trailing note\n");
        assert_eq!(toks.len(), 7);
    }

    #[test]
    fn test_unexpected_character_is_reported() {
        let (tokens, errors) = Lexer::new("set(x, @)").tokenize();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains('@'));
        // The offending byte is skipped; the rest still lexes.
        assert!(tokens.iter().any(|t| t.node == Lexeme::RParen));
    }
}
