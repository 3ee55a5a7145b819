//! Type formatting for error messages, composite names and logs.

use std::fmt::Write;

use vela_ir::StringInterner;

use crate::{Idx, Pool, TypeData};

impl Pool {
    /// Format a type the way it would be written in source.
    pub fn format_type(&self, idx: Idx, interner: &StringInterner) -> String {
        let mut buf = String::new();
        self.format_type_into(idx, interner, &mut buf);
        buf
    }

    /// Format a type into an existing buffer.
    pub fn format_type_into(&self, idx: Idx, interner: &StringInterner, buf: &mut String) {
        match self.get(idx) {
            TypeData::Basic(kind) => buf.push_str(kind.name()),
            TypeData::Pointer(inner) => {
                buf.push('*');
                self.format_type_into(*inner, interner, buf);
            }
            TypeData::Array(elem) => {
                buf.push('[');
                self.format_type_into(*elem, interner, buf);
                buf.push(']');
            }
            TypeData::Map(key, value) => {
                buf.push('[');
                self.format_type_into(*key, interner, buf);
                buf.push_str(": ");
                self.format_type_into(*value, interner, buf);
                buf.push(']');
            }
            TypeData::Struct(fields) => {
                buf.push_str("struct { ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    let _ = write!(buf, "{}: ", interner.lookup(field.name));
                    self.format_type_into(field.ty, interner, buf);
                }
                buf.push_str(" }");
            }
            TypeData::Enum(variants) => {
                buf.push_str("enum { ");
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(interner.lookup(variant.name));
                    if variant.has_payload() {
                        buf.push('(');
                        self.format_list(variant.fields.iter().map(|f| f.ty), interner, buf);
                        buf.push(')');
                    }
                }
                buf.push_str(" }");
            }
            TypeData::Defined(d) => buf.push_str(interner.lookup(d.name)),
            TypeData::Alias(a) => buf.push_str(interner.lookup(a.name)),
            TypeData::TypeParam(p) => buf.push_str(interner.lookup(p.name)),
            TypeData::Standard(s) => buf.push_str(interner.lookup(s.name)),
            TypeData::Function(sig) => {
                buf.push_str("fn");
                if !sig.type_params.is_empty() {
                    buf.push('<');
                    self.format_list(sig.type_params.iter().copied(), interner, buf);
                    buf.push('>');
                }
                buf.push('(');
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    if let Some(label) = param.label {
                        let _ = write!(buf, "{}: ", interner.lookup(label));
                    }
                    self.format_type_into(param.ty, interner, buf);
                }
                buf.push_str(") -> ");
                self.format_type_into(sig.result, interner, buf);
            }
            TypeData::Specialized { instance_of, args } => {
                self.format_type_into(*instance_of, interner, buf);
                buf.push('<');
                self.format_list(args.iter().copied(), interner, buf);
                buf.push('>');
            }
            TypeData::SpecializedFunction { signature, args } => {
                self.format_type_into(*signature, interner, buf);
                buf.push_str(" with <");
                self.format_list(args.iter().copied(), interner, buf);
                buf.push('>');
            }
        }
    }

    fn format_list(
        &self,
        items: impl Iterator<Item = Idx>,
        interner: &StringInterner,
        buf: &mut String,
    ) {
        for (i, idx) in items.enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            self.format_type_into(idx, interner, buf);
        }
    }
}
