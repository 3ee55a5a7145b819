//! Statement and control-flow lowering.
//!
//! Every `let` gets a stack slot hoisted into the entry block; reads load
//! from it and assignments store to it. Structured control flow becomes
//! explicit blocks:
//!
//! ```text
//! if c { A } else { B }        while c { A }
//!
//!   entry: br c, then, else      entry: jump head
//!   then:  A; jump join          head:  br c, body, done
//!   else:  B; jump join          body:  A; jump head
//!   join:  ...                   done:  ...
//! ```
//!
//! Once a return terminates the current block, the rest of that statement
//! list is not lowered.

use vela_ir::{Block, ExprId, StmtId, StmtKind};
use vela_types::Idx;

use crate::ir::{BlockId, Instr, Terminator, Value};
use crate::LowerError;

use super::{inconsistent, FunctionLowerer};

impl FunctionLowerer<'_, '_> {
    pub(super) fn lower_block(&mut self, block: &Block) -> Result<(), LowerError> {
        for &stmt in &block.stmts {
            if self.builder.is_terminated() {
                tracing::trace!(?stmt, "skipping statements after terminator");
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, id: StmtId) -> Result<(), LowerError> {
        let arena = self.module.arena;
        match &arena.stmt(id).kind {
            StmtKind::Let { init, .. } => self.lower_let(id, *init),
            StmtKind::Expr(expr) => self.lower_expr(*expr).map(|_| ()),
            StmtKind::Assign { target, value } => {
                let address = self.lower_place(*target)?;
                let value = self.lower_expr(*value)?;
                self.builder.emit(Instr::Store { address, value });
                Ok(())
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => Some(self.lower_expr(*expr)?),
                    None => None,
                };
                self.builder.terminate(Terminator::Return(value));
                Ok(())
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => self.lower_if(*cond, then_block, else_block.as_ref()),
            StmtKind::While { cond, body } => self.lower_while(*cond, body),
            StmtKind::Block(block) => self.lower_block(block),
        }
    }

    fn lower_let(&mut self, id: StmtId, init: Option<ExprId>) -> Result<(), LowerError> {
        let ty = self
            .module
            .typed
            .local_type(id)
            .ok_or_else(|| inconsistent(format!("no type recorded for local {id:?}")))?;
        let ty = self.concrete(ty)?;
        let slot = self.stack_slot(ty);
        if let Some(init) = init {
            let value = self.lower_expr(init)?;
            self.builder.emit(Instr::Store {
                address: slot,
                value,
            });
        }
        self.locals.insert(id, slot);
        Ok(())
    }

    /// A fresh stack slot for a value of `ty`, allocated in the entry block.
    pub(super) fn stack_slot(&mut self, ty: Idx) -> Value {
        let ptr = self.pointer_to(ty);
        let dst = self.builder.fresh_temp(ptr);
        self.builder.emit_in_entry(Instr::Allocate { dst, ty });
        Value::Temp { id: dst, ty: ptr }
    }

    fn lower_if(
        &mut self,
        cond: ExprId,
        then_block: &Block,
        else_block: Option<&Block>,
    ) -> Result<(), LowerError> {
        let cond = self.lower_expr(cond)?;
        let then_bb = self.builder.new_block();
        let else_bb = else_block.map(|_| self.builder.new_block());
        let join_bb = self.builder.new_block();
        self.builder.terminate(Terminator::Branch {
            cond,
            then_block: then_bb,
            else_block: else_bb.unwrap_or(join_bb),
        });

        let mut join_reached = else_bb.is_none();
        self.builder.position_at(then_bb);
        self.lower_block(then_block)?;
        join_reached |= self.jump_if_open(join_bb);

        if let (Some(else_bb), Some(else_block)) = (else_bb, else_block) {
            self.builder.position_at(else_bb);
            self.lower_block(else_block)?;
            join_reached |= self.jump_if_open(join_bb);
        }

        self.builder.position_at(join_bb);
        if !join_reached {
            self.builder.terminate(Terminator::Unreachable);
        }
        Ok(())
    }

    fn lower_while(&mut self, cond: ExprId, body: &Block) -> Result<(), LowerError> {
        let head = self.builder.new_block();
        let body_bb = self.builder.new_block();
        let done = self.builder.new_block();
        self.builder.terminate(Terminator::Jump(head));

        self.builder.position_at(head);
        let cond = self.lower_expr(cond)?;
        self.builder.terminate(Terminator::Branch {
            cond,
            then_block: body_bb,
            else_block: done,
        });

        self.builder.position_at(body_bb);
        self.lower_block(body)?;
        self.jump_if_open(head);

        self.builder.position_at(done);
        Ok(())
    }

    /// Close the current block with a jump to `target` if nothing closed it
    /// yet. Returns whether the jump was added.
    fn jump_if_open(&mut self, target: BlockId) -> bool {
        if self.builder.is_terminated() {
            return false;
        }
        self.builder.terminate(Terminator::Jump(target));
        true
    }
}
