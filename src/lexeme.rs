/// Tokens of the textual AST notation.
///
/// Identifiers (dotted names included), integers, and operator symbols all
/// lex to `Atom`; the tree shape, not the token kind, decides what they
/// mean downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lexeme {
    LParen,
    RParen,
    Comma,
    Atom(String),
    Eof,
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lexeme::LParen => write!(f, "("),
            Lexeme::RParen => write!(f, ")"),
            Lexeme::Comma => write!(f, ","),
            Lexeme::Atom(text) => write!(f, "{}", text),
            Lexeme::Eof => write!(f, "<eof>"),
        }
    }
}
