//! Left- and right-expression lowering.

use crate::ast::Node;
use crate::error::{CompileError, ErrorKind};
use crate::token::Token;

use super::Lowerer;

/// Classification of an assignable location, as seen by `set`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceKind {
    /// Plain identifier: the address is a memory slot index.
    Variable,
    /// `contract.storage[k]`: the address is a storage key.
    Storage,
    /// Any other indexed access.
    Access,
}

/// Classify a left-expression without emitting anything.
pub(crate) fn classify(node: &Node) -> PlaceKind {
    match node {
        Node::Atom(_) => PlaceKind::Variable,
        Node::Compound { head, args } if head == "access" => {
            if args.first().and_then(Node::as_atom) == Some("contract.storage") {
                PlaceKind::Storage
            } else {
                PlaceKind::Access
            }
        }
        Node::Compound { .. } => PlaceKind::Access,
    }
}

impl Lowerer<'_> {
    // ─── Left-expressions ─────────────────────────────────────────

    /// Emit tokens that push the destination address of `node`, and report
    /// how the destination is addressed so `set` can pick the store opcode.
    pub(crate) fn left_expr(&mut self, node: &Node) -> Result<PlaceKind, CompileError> {
        match node {
            Node::Atom(name) => {
                if node.as_int().is_some() {
                    return Err(CompileError::new(ErrorKind::AssignToLiteral, name));
                }
                let slot = self.slot(name);
                self.emit_push(slot);
                Ok(PlaceKind::Variable)
            }
            Node::Compound { head, args } if head == "access" => {
                let (base, index) = match args.as_slice() {
                    [base, index] => (base, index),
                    _ => return Err(CompileError::new(ErrorKind::MalformedAccess, node)),
                };
                if base.as_atom() == Some("contract.storage") {
                    // The index expression itself is the storage key.
                    self.expr(index)?;
                    Ok(PlaceKind::Storage)
                } else if classify(base) == PlaceKind::Storage {
                    // The base cell holds a pointer: fetch it, then the index.
                    self.left_expr(base)?;
                    self.emit_op("SLOAD");
                    self.expr(index)?;
                    Ok(PlaceKind::Access)
                } else {
                    self.left_expr(base)?;
                    self.expr(index)?;
                    self.emit_op("ADD");
                    Ok(PlaceKind::Access)
                }
            }
            Node::Compound { head, .. } => Err(CompileError::new(ErrorKind::InvalidOp, head)),
        }
    }

    // ─── Right-expressions ────────────────────────────────────────

    /// Emit tokens that leave exactly one value on the VM stack.
    pub(crate) fn expr(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Atom(text) => self.atom_expr(text),
            Node::Compound { head, args } => {
                if let Some(opcode) = self.tables.ops.get(head).cloned() {
                    return self.binary_op(&opcode, args, node);
                }
                match head.as_str() {
                    // Logical connectives rewrite through NOT/ADD/MUL so
                    // that any nonzero operand counts as true.
                    "&&" => self.logical("ADD", args, node),
                    "||" => self.logical("MUL", args, node),
                    "!" => {
                        if args.len() != 1 {
                            return Err(CompileError::new(ErrorKind::ArityMismatch, node));
                        }
                        self.expr(&args[0])?;
                        self.emit_op("NOT");
                        Ok(())
                    }
                    "fun" => self.fun_expr(node, args),
                    "access" => self.access_expr(node, args),
                    "multi" => {
                        for arg in args {
                            self.expr(arg)?;
                        }
                        Ok(())
                    }
                    _ => Err(CompileError::new(ErrorKind::InvalidOp, head)),
                }
            }
        }
    }

    fn atom_expr(&mut self, text: &str) -> Result<(), CompileError> {
        if let Ok(value) = text.parse::<i64>() {
            self.emit_push(value);
        } else if let Some(reference) = Token::ref_from_atom(text) {
            // Internal call sequences thread REF_n atoms through `set`.
            self.emit(reference);
        } else if let Some(slot) = self.vars.get(text).copied() {
            self.emit_push(slot);
            self.emit_op("MLOAD");
        } else if let Some(opcode) = self.tables.pseudovars.get(text).cloned() {
            self.emit_op(&opcode);
        } else {
            let slot = self.slot(text);
            self.emit_push(slot);
            self.emit_op("MLOAD");
        }
        Ok(())
    }

    /// `a OP b` computes in source order. The operands are visited left to
    /// right, so first mentions allocate slots in textual order, but the
    /// right operand's tokens come first so the VM pops the left operand
    /// from the top of the stack.
    fn binary_op(&mut self, opcode: &str, args: &[Node], node: &Node) -> Result<(), CompileError> {
        if args.len() != 2 {
            return Err(CompileError::new(ErrorKind::ArityMismatch, node));
        }
        let left = self.collect(|lowerer| lowerer.expr(&args[0]))?;
        self.expr(&args[1])?;
        self.out.extend(left);
        self.emit_op(opcode);
        Ok(())
    }

    /// `a && b` -> `!(!a + !b)`; `a || b` -> `!(!a * !b)`. Same visit order
    /// and reversed emission as any other binary operator.
    fn logical(&mut self, combine: &str, args: &[Node], node: &Node) -> Result<(), CompileError> {
        if args.len() != 2 {
            return Err(CompileError::new(ErrorKind::ArityMismatch, node));
        }
        let left = self.collect(|lowerer| lowerer.expr(&args[0]))?;
        self.expr(&args[1])?;
        self.emit_op("NOT");
        self.out.extend(left);
        self.emit_op("NOT");
        self.emit_op(combine);
        self.emit_op("NOT");
        Ok(())
    }

    fn fun_expr(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let name = match args.first().and_then(Node::as_atom) {
            Some(name) => name.to_string(),
            None => return Err(CompileError::new(ErrorKind::InvalidOp, node)),
        };
        let call_args = &args[1..];

        if let Some(builtin) = self.tables.builtins.get(&name).cloned() {
            if call_args.len() != builtin.arity {
                return Err(CompileError::new(ErrorKind::ArityMismatch, node));
            }
            for arg in call_args {
                self.expr(arg)?;
            }
            self.emit_op(&builtin.opcode);
            Ok(())
        } else if name == "array" || name == "bytes" {
            if call_args.len() != 1 {
                return Err(CompileError::new(ErrorKind::ArityMismatch, node));
            }
            // Bump-allocate at the memory frontier: extend memory by the
            // requested length and leave the base address on the stack.
            // Word and byte buffers coincide under unit-slot addressing.
            self.expr(&call_args[0])?;
            self.emit_op("MSIZE");
            self.emit_op("SWAP");
            self.emit_op("MSIZE");
            self.emit_op("ADD");
            self.emit_push(1);
            self.emit_op("SUB");
            self.emit_push(0);
            self.emit_op("MSTORE8");
            Ok(())
        } else if self.funcs.contains_key(&name) {
            self.user_call(&name, call_args, node)
        } else {
            Err(CompileError::new(ErrorKind::UndefinedFunction, name))
        }
    }

    fn access_expr(&mut self, node: &Node, args: &[Node]) -> Result<(), CompileError> {
        let (base, index) = match args {
            [base, index] => (base, index),
            _ => return Err(CompileError::new(ErrorKind::MalformedAccess, node)),
        };

        if base.head() == Some("block.contract_storage") {
            // Cross-contract storage read: key, then address, then EXTRO.
            let address = match base {
                Node::Compound { args, .. } if args.len() == 1 => &args[0],
                _ => return Err(CompileError::new(ErrorKind::MalformedAccess, node)),
            };
            self.expr(index)?;
            self.expr(address)?;
            self.emit_op("EXTRO");
            Ok(())
        } else if let Some(opcode) = base
            .as_atom()
            .and_then(|name| self.tables.pseudoarrays.get(name))
            .cloned()
        {
            self.expr(index)?;
            self.emit_op(&opcode);
            Ok(())
        } else {
            self.left_expr(base)?;
            self.expr(index)?;
            self.emit_op("ADD");
            self.emit_op("MLOAD");
            Ok(())
        }
    }
}
