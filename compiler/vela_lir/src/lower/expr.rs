//! Expression and place lowering.
//!
//! `lower_expr` produces a [`Value`]; `lower_place` produces the address of
//! an assignable location. Locals, by-address `self`, fields of places,
//! fields reached through a pointer and dereferences are places. A field
//! of anything else is extracted from the aggregate value.

use vela_ir::{
    ensure_sufficient_stack, BinaryOp, ExprId, ExprKind, FieldInit, Literal, StmtId, UnaryOp,
};
use vela_types::{Binding, FuncId, Idx, MemberResolution};

use crate::ir::{Instr, Terminator, Value};
use crate::{LowerError, TypeLayout};

use super::{inconsistent, FunctionLowerer};

impl FunctionLowerer<'_, '_> {
    /// Concrete type the checker recorded for `id`.
    pub(super) fn expr_ty(&mut self, id: ExprId) -> Result<Idx, LowerError> {
        let ty = self.module.typed.expr_type(id);
        self.concrete(ty)
    }

    pub(super) fn lower_expr(&mut self, id: ExprId) -> Result<Value, LowerError> {
        ensure_sufficient_stack(|| self.lower_expr_inner(id))
    }

    fn lower_expr_inner(&mut self, id: ExprId) -> Result<Value, LowerError> {
        let arena = self.module.arena;
        match &arena.expr(id).kind {
            ExprKind::Literal(value) => Ok(Value::Constant {
                value: *value,
                ty: self.expr_ty(id)?,
            }),
            ExprKind::Ident(_) => self.lower_ident(id),
            ExprKind::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                lhs,
                rhs,
            } => self.lower_logical(*op, *lhs, *rhs),
            ExprKind::Binary { op, lhs, rhs } => {
                let operand_ty = self.expr_ty(*lhs)?;
                let ty = self.expr_ty(id)?;
                let lhs = self.lower_expr(*lhs)?;
                let rhs = self.lower_expr(*rhs)?;
                let dst = self.builder.fresh_temp(ty);
                self.builder.emit(Instr::Binary {
                    dst,
                    ty,
                    op: *op,
                    operand_ty,
                    lhs,
                    rhs,
                });
                Ok(Value::Temp { id: dst, ty })
            }
            ExprKind::Unary { op, operand } => self.lower_unary(id, *op, *operand),
            ExprKind::Call { callee, args, .. } => self.lower_call(id, *callee, args),
            ExprKind::Member { base, .. } => match self.module.typed.member(id) {
                Some(MemberResolution::Field { index, .. }) => {
                    let ty = self.expr_ty(id)?;
                    if self.is_place(id) {
                        let address = self.lower_place(id)?;
                        return self.load(address, ty);
                    }
                    let aggregate = self.lower_expr(*base)?;
                    let dst = self.builder.fresh_temp(ty);
                    self.builder.emit(Instr::Extract {
                        dst,
                        ty,
                        aggregate,
                        member: index,
                    });
                    Ok(Value::Temp { id: dst, ty })
                }
                Some(MemberResolution::Variant { enum_ty, index }) => {
                    let enum_ty = self.concrete(enum_ty)?;
                    self.construct_variant(enum_ty, index, Vec::new())
                }
                Some(MemberResolution::Method) | None => Err(inconsistent(format!(
                    "member {id:?} is not a value"
                ))),
            },
            ExprKind::TypeMember { .. } => match self.module.typed.member(id) {
                Some(MemberResolution::Variant { enum_ty, index }) => {
                    let enum_ty = self.concrete(enum_ty)?;
                    self.construct_variant(enum_ty, index, Vec::new())
                }
                _ => Err(inconsistent(format!("type member {id:?} is not a value"))),
            },
            ExprKind::StructLit { fields, .. } => self.lower_struct_lit(id, fields),
        }
    }

    fn lower_ident(&mut self, id: ExprId) -> Result<Value, LowerError> {
        let binding = self
            .module
            .typed
            .binding(id)
            .ok_or_else(|| inconsistent(format!("identifier {id:?} has no binding")))?;
        match binding {
            Binding::Local(stmt) => {
                let slot = self.local_slot(stmt)?;
                let ty = self.expr_ty(id)?;
                self.load(slot, ty)
            }
            Binding::Param(index) => Ok(Value::Param {
                index: index + self.self_offset,
                ty: self.expr_ty(id)?,
            }),
            Binding::SelfParam => {
                let self_param = self.self_param()?;
                match self.self_ty {
                    Some(ty) if self.self_by_address => self.load(self_param, ty),
                    _ => Ok(self_param),
                }
            }
            Binding::Function(func) => self.function_value(id, func),
            Binding::Const { value, ty } => Ok(Value::Constant {
                value,
                ty: self.concrete(ty)?,
            }),
        }
    }

    /// A non-generic function used as a value.
    fn function_value(&mut self, id: ExprId, func: FuncId) -> Result<Value, LowerError> {
        if self.module.typed.function(func).is_generic() {
            return Err(inconsistent(format!(
                "generic function {func:?} used as a value"
            )));
        }
        let ty = self.expr_ty(id)?;
        let name = self.request(func, Vec::new())?;
        Ok(Value::Function { name, ty })
    }

    /// `a && b`, `a || b`: the right operand runs only when the left one
    /// does not decide the result.
    fn lower_logical(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Result<Value, LowerError> {
        let slot = self.stack_slot(Idx::BOOL);
        let lhs = self.lower_expr(lhs)?;
        self.builder.emit(Instr::Store {
            address: slot,
            value: lhs,
        });
        let rhs_bb = self.builder.new_block();
        let join = self.builder.new_block();
        let (then_block, else_block) = if op == BinaryOp::And {
            (rhs_bb, join)
        } else {
            (join, rhs_bb)
        };
        self.builder.terminate(Terminator::Branch {
            cond: lhs,
            then_block,
            else_block,
        });

        self.builder.position_at(rhs_bb);
        let rhs = self.lower_expr(rhs)?;
        self.builder.emit(Instr::Store {
            address: slot,
            value: rhs,
        });
        self.builder.terminate(Terminator::Jump(join));

        self.builder.position_at(join);
        self.load(slot, Idx::BOOL)
    }

    fn lower_unary(&mut self, id: ExprId, op: UnaryOp, operand: ExprId) -> Result<Value, LowerError> {
        match op {
            UnaryOp::AddressOf => self.lower_place(operand),
            UnaryOp::Deref => {
                let ty = self.expr_ty(id)?;
                let address = self.lower_expr(operand)?;
                self.load(address, ty)
            }
            UnaryOp::Neg | UnaryOp::Not => {
                let ty = self.expr_ty(id)?;
                let operand = self.lower_expr(operand)?;
                let dst = self.builder.fresh_temp(ty);
                self.builder.emit(Instr::Unary {
                    dst,
                    ty,
                    op,
                    operand,
                });
                Ok(Value::Temp { id: dst, ty })
            }
        }
    }

    fn lower_struct_lit(&mut self, id: ExprId, fields: &[FieldInit]) -> Result<Value, LowerError> {
        let ty = self.expr_ty(id)?;
        let slot = self.stack_slot(ty);
        for init in fields {
            let resolved = self.module.engine().resolve_field(ty, init.name)?;
            let Some((index, field_ty)) = resolved else {
                return Err(LowerError::MissingLayout { ty });
            };
            let field_ty = self.concrete(field_ty)?;
            let value = self.lower_expr(init.value)?;
            let address = self.field_address(slot, ty, None, index, field_ty);
            self.builder.emit(Instr::Store { address, value });
        }
        self.load(slot, ty)
    }

    /// Build enum value `enum_ty.variants[index]` in a fresh slot: store
    /// the tag, then each payload field through the variant's view.
    pub(super) fn construct_variant(
        &mut self,
        enum_ty: Idx,
        index: u32,
        payload: Vec<Value>,
    ) -> Result<Value, LowerError> {
        let discriminant = self
            .module
            .engine()
            .enum_variants(enum_ty)?
            .and_then(|variants| variants.into_iter().nth(index as usize))
            .map(|variant| variant.discriminant)
            .ok_or(LowerError::MissingLayout { ty: enum_ty })?;
        let first_field = match self.module.layouts.get(enum_ty) {
            Some(TypeLayout::Enum { .. }) if payload.is_empty() => 0,
            Some(layout @ TypeLayout::Enum { .. }) => layout
                .variant(index)
                .map(|view| view.first_field)
                .ok_or(LowerError::MissingLayout { ty: enum_ty })?,
            _ => return Err(LowerError::MissingLayout { ty: enum_ty }),
        };

        let slot = self.stack_slot(enum_ty);
        let tag = self.field_address(slot, enum_ty, None, 0, Idx::BYTE);
        self.builder.emit(Instr::Store {
            address: tag,
            value: Value::Constant {
                value: Literal::Int(discriminant),
                ty: Idx::BYTE,
            },
        });
        for (k, value) in (0u32..).zip(payload) {
            let address =
                self.field_address(slot, enum_ty, Some(index), first_field + k, value.ty());
            self.builder.emit(Instr::Store { address, value });
        }
        self.load(slot, enum_ty)
    }

    // ── Places ──────────────────────────────────────────────────────

    /// Whether `id` denotes a location `lower_place` can address.
    pub(super) fn is_place(&self, id: ExprId) -> bool {
        match &self.module.arena.expr(id).kind {
            ExprKind::Ident(_) => match self.module.typed.binding(id) {
                Some(Binding::Local(_)) => true,
                Some(Binding::SelfParam) => self.self_by_address,
                _ => false,
            },
            ExprKind::Member { base, .. } => match self.module.typed.member(id) {
                Some(MemberResolution::Field {
                    through_pointer, ..
                }) => through_pointer || self.is_place(*base),
                _ => false,
            },
            ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            } => true,
            _ => false,
        }
    }

    pub(super) fn lower_place(&mut self, id: ExprId) -> Result<Value, LowerError> {
        let arena = self.module.arena;
        match &arena.expr(id).kind {
            ExprKind::Ident(_) => match self.module.typed.binding(id) {
                Some(Binding::Local(stmt)) => self.local_slot(stmt),
                Some(Binding::SelfParam) if self.self_by_address => self.self_param(),
                _ => Err(inconsistent(format!("identifier {id:?} is not a place"))),
            },
            ExprKind::Member { base, .. } => {
                let Some(MemberResolution::Field {
                    index,
                    owner,
                    through_pointer,
                }) = self.module.typed.member(id)
                else {
                    return Err(inconsistent(format!("member {id:?} is not a field")));
                };
                let owner = self.concrete(owner)?;
                let field_ty = self.expr_ty(id)?;
                let base = if through_pointer {
                    self.lower_expr(*base)?
                } else {
                    self.lower_place(*base)?
                };
                Ok(self.field_address(base, owner, None, index, field_ty))
            }
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => self.lower_expr(*operand),
            _ => Err(inconsistent(format!("expression {id:?} is not a place"))),
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn local_slot(&self, stmt: StmtId) -> Result<Value, LowerError> {
        self.locals
            .get(&stmt)
            .copied()
            .ok_or_else(|| inconsistent(format!("local {stmt:?} used before its slot exists")))
    }

    /// Parameter 0 of a method.
    fn self_param(&mut self) -> Result<Value, LowerError> {
        let Some(self_ty) = self.self_ty else {
            return Err(inconsistent("`self` outside a method".to_string()));
        };
        let ty = if self.self_by_address {
            self.pointer_to(self_ty)
        } else {
            self_ty
        };
        Ok(Value::Param { index: 0, ty })
    }

    pub(super) fn load(&mut self, address: Value, ty: Idx) -> Result<Value, LowerError> {
        let dst = self.builder.fresh_temp(ty);
        self.builder.emit(Instr::Load { dst, ty, address });
        Ok(Value::Temp { id: dst, ty })
    }

    fn field_address(
        &mut self,
        base: Value,
        aggregate: Idx,
        variant: Option<u32>,
        member: u32,
        field_ty: Idx,
    ) -> Value {
        let ty = self.pointer_to(field_ty);
        let dst = self.builder.fresh_temp(ty);
        self.builder.emit(Instr::FieldAddress {
            dst,
            ty,
            base,
            aggregate,
            variant,
            member,
        });
        Value::Temp { id: dst, ty }
    }
}
