//! Call lowering.
//!
//! Direct calls name their callee by mangled name and add a call-graph
//! edge; calls to generic functions request the specialization for the
//! concrete type arguments. Calls through a constraint (`x.area()` with
//! `x: T`, `T: Shape`) are resolved against the concrete receiver here.

use vela_ir::{CallArg, ExprId, ExprKind, Name};
use vela_types::{CallKind, FuncId, FunctionSymbol, Idx};

use crate::ir::{Instr, Value};
use crate::LowerError;

use super::{inconsistent, FunctionLowerer};

impl FunctionLowerer<'_, '_> {
    pub(super) fn lower_call(
        &mut self,
        id: ExprId,
        callee: ExprId,
        args: &[CallArg],
    ) -> Result<Value, LowerError> {
        let resolution = self
            .module
            .typed
            .call(id)
            .cloned()
            .ok_or_else(|| inconsistent(format!("call {id:?} was not resolved")))?;
        let result = self.expr_ty(id)?;

        match resolution.kind {
            CallKind::Function(func) => {
                let type_args = self.concrete_all(&resolution.type_args)?;
                let name = self.request(func, type_args)?;
                let args = self.lower_args(args)?;
                Ok(self.emit_call(name, result, args))
            }
            CallKind::Method(func) => {
                let type_args = self.concrete_all(&resolution.type_args)?;
                self.lower_method_call(func, type_args, callee, args, result)
            }
            CallKind::ConstrainedMethod { name } => {
                let (func, type_args) = self.resolve_constrained(callee, name, args)?;
                self.lower_method_call(func, type_args, callee, args, result)
            }
            CallKind::VariantConstruct { enum_ty, variant } => {
                let enum_ty = self.concrete(enum_ty)?;
                let payload = self.lower_args(args)?;
                self.construct_variant(enum_ty, variant, payload)
            }
            CallKind::Indirect => {
                let callee = self.lower_expr(callee)?;
                let args = self.lower_args(args)?;
                let dst = (result != Idx::VOID).then(|| self.builder.fresh_temp(result));
                self.builder.emit(Instr::CallIndirect {
                    dst,
                    ty: result,
                    callee,
                    args,
                });
                Ok(dst.map_or_else(Value::void, |id| Value::Temp { id, ty: result }))
            }
        }
    }

    /// Mangled name of `func` at `type_args`, with a call-graph edge from
    /// the function being lowered.
    pub(super) fn request(&mut self, func: FuncId, type_args: Vec<Idx>) -> Result<Name, LowerError> {
        let depth = if type_args.is_empty() { 0 } else { self.depth + 1 };
        let name = self.module.ensure_function(func, type_args, depth)?;
        self.module.call_graph.add_edge(self.name, name);
        Ok(name)
    }

    fn lower_method_call(
        &mut self,
        func: FuncId,
        type_args: Vec<Idx>,
        callee: ExprId,
        args: &[CallArg],
        result: Idx,
    ) -> Result<Value, LowerError> {
        let ExprKind::Member { base, .. } = self.module.arena.expr(callee).kind else {
            return Err(inconsistent(format!("method callee {callee:?} has no receiver")));
        };
        let info = self.module.typed.function(func).clone();
        let by_address = self.module.self_by_address(&info);
        let name = self.request(func, type_args)?;

        let receiver = self.lower_receiver(base, by_address)?;
        let mut values = Vec::with_capacity(args.len() + 1);
        values.push(receiver);
        values.extend(self.lower_args(args)?);
        Ok(self.emit_call(name, result, values))
    }

    /// The receiver as the callee takes it: an address or a value. A value
    /// that has no address is spilled to a fresh slot.
    fn lower_receiver(&mut self, base: ExprId, by_address: bool) -> Result<Value, LowerError> {
        let base_ty = self.expr_ty(base)?;
        if let Some(pointee) = self.module.pool.pointee(base_ty) {
            let pointer = self.lower_expr(base)?;
            return if by_address {
                Ok(pointer)
            } else {
                self.load(pointer, pointee)
            };
        }
        if !by_address {
            return self.lower_expr(base);
        }
        if self.is_place(base) {
            return self.lower_place(base);
        }
        let value = self.lower_expr(base)?;
        let slot = self.stack_slot(base_ty);
        self.builder.emit(Instr::Store {
            address: slot,
            value,
        });
        Ok(slot)
    }

    /// Pick the concrete method a constrained call lands on: same name,
    /// same arity and labels, and parameter types matching the arguments'.
    fn resolve_constrained(
        &mut self,
        callee: ExprId,
        name: Name,
        args: &[CallArg],
    ) -> Result<(FuncId, Vec<Idx>), LowerError> {
        let ExprKind::Member { base, .. } = self.module.arena.expr(callee).kind else {
            return Err(inconsistent(format!("method callee {callee:?} has no receiver")));
        };
        let base_ty = self.expr_ty(base)?;
        let receiver = self.module.pool.pointee(base_ty).unwrap_or(base_ty);
        let arg_types = args
            .iter()
            .map(|arg| self.expr_ty(arg.value))
            .collect::<Result<Vec<_>, _>>()?;

        let lookup = self
            .module
            .engine()
            .lookup_methods(receiver, name)?
            .ok_or_else(|| inconsistent(format!("no method {name:?} on {receiver:?}")))?;

        let mut shaped: Vec<(&FunctionSymbol, Vec<Idx>)> = Vec::new();
        for candidate in &lookup.candidates {
            if !self.module.typed.function(candidate.id).is_method() {
                continue;
            }
            let sig = self.module.engine().method_signature(&lookup, candidate)?;
            let Some(sig) = self.module.pool.function_sig(sig).cloned() else {
                continue;
            };
            let labels_match = sig.params.len() == args.len()
                && sig.params.iter().zip(args).all(|(p, a)| p.label == a.label);
            if !labels_match || !sig.type_params.is_empty() {
                continue;
            }
            let params = sig
                .params
                .iter()
                .map(|p| self.concrete(p.ty))
                .collect::<Result<Vec<_>, _>>()?;
            shaped.push((candidate, params));
        }
        if shaped.len() > 1 {
            shaped.retain(|(_, params)| *params == arg_types);
        }
        let [(chosen, _)] = shaped.as_slice() else {
            return Err(inconsistent(format!(
                "{} implementations of {name:?} match on {receiver:?}",
                shaped.len()
            )));
        };

        let info = self.module.typed.function(chosen.id);
        let bound = lookup
            .bindings
            .args_for(&info.generic_params)
            .ok_or_else(|| inconsistent(format!("cannot bind {:?} on {receiver:?}", chosen.id)))?;
        let func = chosen.id;
        let type_args = self.concrete_all(&bound)?;
        tracing::trace!(?func, ?receiver, "constrained call resolved");
        Ok((func, type_args))
    }

    fn lower_args(&mut self, args: &[CallArg]) -> Result<Vec<Value>, LowerError> {
        args.iter().map(|arg| self.lower_expr(arg.value)).collect()
    }

    fn concrete_all(&mut self, types: &[Idx]) -> Result<Vec<Idx>, LowerError> {
        types.iter().map(|&ty| self.concrete(ty)).collect()
    }

    fn emit_call(&mut self, callee: Name, ty: Idx, args: Vec<Value>) -> Value {
        if ty == Idx::VOID {
            self.builder.emit(Instr::Call {
                dst: None,
                ty,
                callee,
                args,
            });
            return Value::void();
        }
        let dst = self.builder.fresh_temp(ty);
        self.builder.emit(Instr::Call {
            dst: Some(dst),
            ty,
            callee,
            args,
        });
        Value::Temp { id: dst, ty }
    }
}
