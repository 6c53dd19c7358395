//! The assembler pass: resolves symbolic labels to byte offsets.
//!
//! Two linear scans. The first records each `LABEL_n`'s position under the
//! size model of `Token::width` (labels are free, references will expand to
//! a `PUSH` + offset pair, everything else is one byte) and drops the label
//! markers. The second rewrites every `REF_n` into `PUSH <offset>`. The
//! relative order of all non-label tokens is preserved.

use std::collections::HashMap;

use crate::error::{CompileError, ErrorKind};
use crate::token::Token;

pub fn assemble(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut labels: HashMap<u32, i64> = HashMap::new();
    let mut pos: i64 = 0;
    let mut stripped = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token {
            Token::Label(n) => {
                labels.insert(n, pos);
            }
            other => {
                pos += other.width() as i64;
                stripped.push(other);
            }
        }
    }

    let mut out = Vec::with_capacity(stripped.len());
    for token in stripped {
        match token {
            Token::Ref(n) => {
                let offset = labels.get(&n).ok_or_else(|| {
                    CompileError::new(ErrorKind::UnresolvedLabel, Token::Ref(n))
                })?;
                out.push(Token::op("PUSH"));
                out.push(Token::Imm(*offset));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::render;

    #[test]
    fn test_plain_tokens_pass_through() {
        let tokens = vec![Token::op("PUSH"), Token::Imm(7), Token::op("MSTORE")];
        let out = assemble(tokens.clone()).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_label_occupies_no_bytes() {
        let out = assemble(vec![
            Token::op("STOP"),
            Token::Label(0),
            Token::Ref(0),
            Token::op("JMP"),
        ])
        .unwrap();
        // The label sits at offset 1, right after STOP.
        assert_eq!(render(&out), "STOP PUSH 1 JMP");
    }

    #[test]
    fn test_ref_expands_to_two_bytes() {
        // REF_0 at the front occupies offsets 0..2, so the label lands at 3.
        let out = assemble(vec![
            Token::Ref(0),
            Token::op("JMP"),
            Token::Label(0),
            Token::op("STOP"),
        ])
        .unwrap();
        assert_eq!(render(&out), "PUSH 3 JMP STOP");
    }

    #[test]
    fn test_forward_and_backward_references() {
        let out = assemble(vec![
            Token::Label(1),
            Token::op("NOT"),
            Token::Ref(0),
            Token::op("JMP"),
            Token::Label(0),
            Token::Ref(1),
            Token::op("JMP"),
        ])
        .unwrap();
        assert_eq!(render(&out), "NOT PUSH 4 JMP PUSH 0 JMP");
    }

    #[test]
    fn test_unresolved_label() {
        let err = assemble(vec![Token::Ref(9), Token::op("JMP")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedLabel);
        assert_eq!(err.node, "REF_9");
    }

    #[test]
    fn test_non_label_order_preserved() {
        let tokens = vec![
            Token::op("PUSH"),
            Token::Imm(1),
            Token::Label(0),
            Token::op("PUSH"),
            Token::Imm(2),
            Token::Ref(0),
            Token::op("JMPI"),
        ];
        let out = assemble(tokens).unwrap();
        let ops: Vec<String> = out.iter().map(|t| t.to_string()).collect();
        assert_eq!(ops, vec!["PUSH", "1", "PUSH", "2", "PUSH", "2", "JMPI"]);
    }
}
