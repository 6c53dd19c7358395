//! Statement lowering: assignments, control flow, procedures, builtins.

use crate::ast::Node;
use crate::error::{CompileError, ErrorKind};
use crate::token::Token;

use super::expr::PlaceKind;
use super::{FnInfo, Lowerer};

impl Lowerer<'_> {
    pub(crate) fn stmt(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Atom(text) if text == "stop" => {
                self.emit_op("STOP");
                Ok(())
            }
            // Bare pseudovars (`tx.datan`) are legal statements.
            Node::Atom(_) => self.expr(node),
            Node::Compound { head, args } => match head.as_str() {
                "seq" => {
                    for stmt in args {
                        self.stmt(stmt)?;
                    }
                    Ok(())
                }
                "set" => {
                    let (target, value) = match args.as_slice() {
                        [target, value] => (target, value),
                        _ => return Err(CompileError::new(ErrorKind::ArityMismatch, node)),
                    };
                    self.set(target, value)
                }
                "mset" => self.mset(node, args),
                "if" | "elif" => self.if_chain(node, args),
                // A stray else is just its body.
                "else" => match args.as_slice() {
                    [body] => self.stmt(body),
                    _ => Err(CompileError::new(ErrorKind::ArityMismatch, node)),
                },
                "while" => self.while_loop(node, args),
                "def" => self.def(node, args),
                "return" => match args.as_slice() {
                    [value] => self.expr(value),
                    _ => Err(CompileError::new(ErrorKind::ArityMismatch, node)),
                },
                "fun" => self.fun_stmt(node, args),
                _ => Err(CompileError::new(ErrorKind::InvalidOp, head)),
            },
        }
    }

    // ── Assignment ────────────────────────────────────────────────

    /// The target is visited before the value, so its slots are allocated
    /// in source order; its address tokens land after the value's so the
    /// store opcode pops the address first.
    fn set(&mut self, target: &Node, value: &Node) -> Result<(), CompileError> {
        let mut place = PlaceKind::Variable;
        let target_tokens = self.collect(|lowerer| {
            place = lowerer.left_expr(target)?;
            Ok(())
        })?;
        self.expr(value)?;
        self.out.extend(target_tokens);
        self.emit_op(if place == PlaceKind::Storage {
            "SSTORE"
        } else {
            "MSTORE"
        });
        Ok(())
    }

    /// `mset(multi(t1, …, tk), rhs)` stores one value per target, in order.
    /// The right side is re-lowered for every target; a side-effecting
    /// right side therefore runs once per target.
    fn mset(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let (targets, value) = match args {
            [targets, value] => (targets, value),
            _ => return Err(CompileError::new(ErrorKind::ArityMismatch, node)),
        };
        match targets {
            Node::Compound { head, args } if head == "multi" => {
                for target in args {
                    self.set(target, value)?;
                }
                Ok(())
            }
            single => self.set(single, value),
        }
    }

    // ── Conditionals ──────────────────────────────────────────────

    /// Lower a whole if/elif/else chain. The chain owns a fresh endif
    /// state; the enclosing chain's is saved and restored so nested
    /// conditionals inside a branch cannot steal the outer join label.
    fn if_chain(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        if args.len() < 2 || args.len() > 3 {
            return Err(CompileError::new(ErrorKind::ArityMismatch, node));
        }
        let saved_marker = self.endif_marker;
        let saved_known = self.endif_known;
        self.endif_known = false;

        let result = self.branch(&args[0], &args[1], args.get(2));

        if result.is_ok() && self.endif_known {
            let marker = self.endif_marker;
            self.emit(Token::Label(marker));
        }
        self.endif_marker = saved_marker;
        self.endif_known = saved_known;
        result
    }

    /// One conditional branch:
    ///   cond NOT REF_n SWAP JMPI <body> [REF_endif JMP] LABEL_n <rest>
    /// The jump to endif is emitted only when further branches follow.
    fn branch(&mut self, cond: &Node, body: &Node, rest: Option<&Node>) -> Result<(), CompileError> {
        self.expr(cond)?;
        let label = self.fresh_label();
        self.emit_op("NOT");
        self.emit(Token::Ref(label));
        self.emit_op("SWAP");
        self.emit_op("JMPI");
        self.stmt(body)?;
        match rest {
            Some(rest) => {
                let endif = self.ensure_endif();
                self.emit(Token::Ref(endif));
                self.emit_op("JMP");
                self.emit(Token::Label(label));
                self.chain_rest(rest)
            }
            None => {
                self.emit(Token::Label(label));
                Ok(())
            }
        }
    }

    fn chain_rest(&mut self, rest: &Node) -> Result<(), CompileError> {
        match rest {
            Node::Compound { head, args } if head == "elif" => {
                if args.len() < 2 || args.len() > 3 {
                    return Err(CompileError::new(ErrorKind::ArityMismatch, rest));
                }
                self.branch(&args[0], &args[1], args.get(2))
            }
            Node::Compound { head, args } if head == "else" => {
                if args.len() != 1 {
                    return Err(CompileError::new(ErrorKind::ArityMismatch, rest));
                }
                self.ensure_endif();
                self.stmt(&args[0])
            }
            // Any other statement is an implicit else body.
            other => {
                self.ensure_endif();
                self.stmt(other)
            }
        }
    }

    // ── Loops ─────────────────────────────────────────────────────

    /// `LABEL_beg cond NOT REF_end SWAP JMPI <body> REF_beg JMP LABEL_end`.
    /// The condition and body are lowered before the two loop labels are
    /// drawn, so labels inside them are numbered first.
    fn while_loop(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let (cond, body) = match args {
            [cond, body] => (cond, body),
            _ => return Err(CompileError::new(ErrorKind::ArityMismatch, node)),
        };
        let cond_tokens = self.collect(|lowerer| lowerer.expr(cond))?;
        let body_tokens = self.collect(|lowerer| lowerer.stmt(body))?;
        let beg = self.fresh_label();
        let end = self.fresh_label();

        self.emit(Token::Label(beg));
        self.out.extend(cond_tokens);
        self.emit_op("NOT");
        self.emit(Token::Ref(end));
        self.emit_op("SWAP");
        self.emit_op("JMPI");
        self.out.extend(body_tokens);
        self.emit(Token::Ref(beg));
        self.emit_op("JMP");
        self.emit(Token::Label(end));
        Ok(())
    }

    // ── Procedures ────────────────────────────────────────────────

    /// `def(fun(name, p1, …, pk), body)`:
    ///   REF_skip JMP LABEL_entry <body> PUSH rp MLOAD JMP LABEL_skip
    /// The function is registered before its body is lowered so the body
    /// may call itself.
    fn def(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let (signature, body) = match args {
            [signature, body] => (signature, body),
            _ => return Err(CompileError::new(ErrorKind::ArityMismatch, node)),
        };
        let sig_args = match signature {
            Node::Compound { head, args } if head == "fun" && !args.is_empty() => args,
            _ => return Err(CompileError::new(ErrorKind::InvalidOp, signature)),
        };
        let name = sig_args[0]
            .as_atom()
            .ok_or_else(|| CompileError::new(ErrorKind::InvalidOp, signature))?;
        let mut params = Vec::new();
        for param in &sig_args[1..] {
            match param.as_atom() {
                Some(param) => params.push(param.to_string()),
                None => return Err(CompileError::new(ErrorKind::InvalidOp, signature)),
            }
        }

        let skip = self.fresh_label();
        let entry = self.fresh_label();
        let returnpoint = format!("{}_returnpoint", name);
        let rp_slot = self.slot(&returnpoint);
        for param in &params {
            self.slot(param);
        }
        self.funcs.insert(
            name.to_string(),
            FnInfo {
                params,
                entry,
                returnpoint,
            },
        );

        self.emit(Token::Ref(skip));
        self.emit_op("JMP");
        self.emit(Token::Label(entry));
        self.stmt(body)?;
        // Epilogue: fetch the stored return address and jump back to the
        // call site, leaving any return value on top of the stack.
        self.emit_push(rp_slot);
        self.emit_op("MLOAD");
        self.emit_op("JMP");
        self.emit(Token::Label(skip));
        Ok(())
    }

    // ── Builtin calls in statement position ───────────────────────

    fn fun_stmt(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let name = match args.first().and_then(Node::as_atom) {
            Some(name) => name.to_string(),
            None => return Err(CompileError::new(ErrorKind::InvalidOp, node)),
        };
        let call_args = &args[1..];

        if name == "mktx" {
            if call_args.len() != 4 {
                return Err(CompileError::new(ErrorKind::ArityMismatch, node));
            }
            // mktx(to, value, datan, datastart) lowers its arguments in
            // reverse so the VM pops them in declaration order.
            for arg in call_args.iter().rev() {
                self.expr(arg)?;
            }
            self.emit_op("MKTX");
            Ok(())
        } else if let Some(builtin) = self.tables.builtins.get(&name).cloned() {
            if call_args.len() != builtin.arity {
                return Err(CompileError::new(ErrorKind::ArityMismatch, node));
            }
            for arg in call_args {
                self.expr(arg)?;
            }
            self.emit_op(&builtin.opcode);
            if builtin.pushes_value {
                // Discard the unused result; statements are stack-neutral.
                self.emit_op("POP");
            }
            Ok(())
        } else if self.funcs.contains_key(&name) {
            self.user_call(&name, call_args, node)
        } else {
            Err(CompileError::new(ErrorKind::UndefinedFunction, name))
        }
    }
}
