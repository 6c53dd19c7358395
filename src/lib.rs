//! CLL: a small contract language compiled to stack-machine opcodes.
//!
//! The pipeline is four stages over a single translation unit: parse the
//! textual AST notation into a [`ast::Node`] tree, lower it into a flat
//! token stream (opcodes, immediates, and symbolic `LABEL_n`/`REF_n`
//! markers), then resolve the labels into `PUSH <offset>` pairs. The
//! lowering is driven by four extensible [`tables::Tables`]; the opcode
//! stream is ready for hex/byte encoding by a downstream assembler.

pub mod asm;
pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod lexeme;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod span;
pub mod tables;
pub mod token;

pub use ast::Node;
pub use error::{CompileError, Error, ErrorKind};
pub use lower::Lowerer;
pub use tables::{Builtin, Tables};
pub use token::Token;

use diagnostic::Diagnostic;
use lexer::Lexer;
use parser::Parser;

/// Parse the textual AST notation into a node tree.
pub fn parse_source(source: &str) -> Result<Node, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_node()
}

/// Lower an AST into the unassembled token stream (labels still present).
pub fn lower(node: &Node, tables: &Tables) -> Result<Vec<Token>, CompileError> {
    Lowerer::new(tables).lower(node)
}

/// Lower an AST and resolve labels: the full back half of the pipeline.
pub fn compile_ast(node: &Node, tables: &Tables) -> Result<Vec<Token>, CompileError> {
    asm::assemble(lower(node, tables)?)
}

/// Compile source text with the default builtin tables.
pub fn compile(source: &str) -> Result<Vec<Token>, Error> {
    let node = parse_source(source)?;
    Ok(compile_ast(&node, &Tables::default())?)
}
