//! User-procedure call sequences.

use crate::ast::Node;
use crate::error::{CompileError, ErrorKind};
use crate::token::Token;

use super::Lowerer;

impl Lowerer<'_> {
    /// Lower a call to a `def`-registered procedure.
    ///
    /// The sequence stores the return label into the callee's return-point
    /// slot, binds each argument to its parameter slot, jumps to the entry,
    /// and places the return label:
    ///
    ///   set(<name>_returnpoint, REF_ret)
    ///   set(param_i, arg_i)            for each argument, in order
    ///   REF_entry JMP LABEL_ret
    ///
    /// The callee's epilogue consumes the stored return address, so after
    /// the jump back only the callee's result (if any) is on the stack.
    pub(crate) fn user_call(
        &mut self,
        name: &str,
        args: &[Node],
        node: &Node,
    ) -> Result<(), CompileError> {
        let info = match self.funcs.get(name) {
            Some(info) => info.clone(),
            None => return Err(CompileError::new(ErrorKind::UndefinedFunction, name)),
        };
        if args.len() != info.params.len() {
            return Err(CompileError::new(ErrorKind::ArityMismatch, node));
        }

        let ret = self.fresh_label();
        let store_return = Node::compound(
            "set",
            vec![
                Node::atom(info.returnpoint.clone()),
                Node::atom(format!("REF_{}", ret)),
            ],
        );
        self.stmt(&store_return)?;

        for (param, arg) in info.params.iter().zip(args) {
            let bind = Node::compound("set", vec![Node::atom(param.clone()), arg.clone()]);
            self.stmt(&bind)?;
        }

        self.emit(Token::Ref(info.entry));
        self.emit_op("JMP");
        self.emit(Token::Label(ret));
        Ok(())
    }
}
