//! Programmatic AST construction.
//!
//! Every node built here gets a distinct synthetic span so diagnostics can
//! still be told apart when no source text exists.

use crate::{
    AliasDecl, BinaryOp, Block, CallArg, ConformDecl, ConstDecl, EnumDecl, Expr, ExprArena,
    ExprId, ExprKind, FieldDecl, FieldInit, FunctionDecl, GenericParam, Item, Literal, Module,
    Name, Param, ParsedType, Receiver, Span, StandardDecl, Stmt, StmtId, StmtKind, StringInterner,
    StructDecl, UnaryOp, VariantDecl,
};

/// Builds a [`Module`] and the [`ExprArena`] backing it.
pub struct AstBuilder<'i> {
    interner: &'i StringInterner,
    arena: ExprArena,
    items: Vec<Item>,
    cursor: u32,
}

impl<'i> AstBuilder<'i> {
    pub fn new(interner: &'i StringInterner) -> Self {
        AstBuilder {
            interner,
            arena: ExprArena::new(),
            items: Vec::new(),
            cursor: 0,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// A fresh span, distinct from every span handed out before.
    pub fn span(&mut self) -> Span {
        let start = self.cursor;
        self.cursor += 2;
        Span::new(start, start + 1)
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn finish(self) -> (Module, ExprArena) {
        (Module { items: self.items }, self.arena)
    }

    // Types

    pub fn ty(&mut self, name: &str) -> ParsedType {
        let span = self.span();
        ParsedType::named(self.name(name), span)
    }

    pub fn generic_ty(&mut self, name: &str, args: Vec<ParsedType>) -> ParsedType {
        let span = self.span();
        ParsedType::generic(self.name(name), args, span)
    }

    pub fn ptr_ty(&mut self, pointee: ParsedType) -> ParsedType {
        let span = self.span();
        ParsedType::pointer(pointee, span)
    }

    pub fn array_ty(&mut self, elem: ParsedType) -> ParsedType {
        let span = self.span();
        ParsedType::array(elem, span)
    }

    pub fn map_ty(&mut self, key: ParsedType, value: ParsedType) -> ParsedType {
        let span = self.span();
        ParsedType::map(key, value, span)
    }

    // Expressions

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.span();
        self.arena.alloc_expr(Expr { kind, span })
    }

    pub fn lit(&mut self, lit: Literal) -> ExprId {
        self.expr(ExprKind::Literal(lit))
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.lit(Literal::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.lit(Literal::float(value))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.lit(Literal::Bool(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        let name = self.name(value);
        self.lit(Literal::Str(name))
    }

    pub fn char(&mut self, value: char) -> ExprId {
        self.lit(Literal::Char(value))
    }

    pub fn nil(&mut self) -> ExprId {
        self.lit(Literal::Nil)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    fn call_args(&mut self, args: Vec<(Option<&str>, ExprId)>) -> Vec<CallArg> {
        args.into_iter()
            .map(|(label, value)| CallArg {
                label: label.map(|l| self.name(l)),
                value,
                span: self.span(),
            })
            .collect()
    }

    /// `callee(args)` where `callee` is a plain name.
    pub fn call(&mut self, callee: &str, args: Vec<(Option<&str>, ExprId)>) -> ExprId {
        self.call_generic(callee, Vec::new(), args)
    }

    /// `callee<type_args>(args)`.
    pub fn call_generic(
        &mut self,
        callee: &str,
        type_args: Vec<ParsedType>,
        args: Vec<(Option<&str>, ExprId)>,
    ) -> ExprId {
        let callee = self.ident(callee);
        self.call_expr(callee, type_args, args)
    }

    pub fn call_expr(
        &mut self,
        callee: ExprId,
        type_args: Vec<ParsedType>,
        args: Vec<(Option<&str>, ExprId)>,
    ) -> ExprId {
        let args = self.call_args(args);
        self.expr(ExprKind::Call {
            callee,
            type_args,
            args,
        })
    }

    pub fn member(&mut self, base: ExprId, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Member { base, name })
    }

    /// `base.method(args)`.
    pub fn method_call(
        &mut self,
        base: ExprId,
        method: &str,
        args: Vec<(Option<&str>, ExprId)>,
    ) -> ExprId {
        let callee = self.member(base, method);
        self.call_expr(callee, Vec::new(), args)
    }

    pub fn type_member(&mut self, ty: ParsedType, member: &str) -> ExprId {
        let member = self.name(member);
        self.expr(ExprKind::TypeMember { ty, member })
    }

    pub fn struct_lit(&mut self, ty: ParsedType, fields: Vec<(&str, ExprId)>) -> ExprId {
        let fields = fields
            .into_iter()
            .map(|(name, value)| FieldInit {
                name: self.name(name),
                value,
                span: self.span(),
            })
            .collect();
        self.expr(ExprKind::StructLit { ty, fields })
    }

    // Statements

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.span();
        self.arena.alloc_stmt(Stmt { kind, span })
    }

    pub fn let_(&mut self, name: &str, ty: Option<ParsedType>, init: Option<ExprId>) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Let {
            name,
            mutable: false,
            ty,
            init,
        })
    }

    pub fn let_mut(&mut self, name: &str, ty: Option<ParsedType>, init: Option<ExprId>) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Let {
            name,
            mutable: true,
            ty,
            init,
        })
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Assign { target, value })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn if_(
        &mut self,
        cond: ExprId,
        then_stmts: Vec<StmtId>,
        else_stmts: Option<Vec<StmtId>>,
    ) -> StmtId {
        let then_block = self.block(then_stmts);
        let else_block = else_stmts.map(|stmts| self.block(stmts));
        self.stmt(StmtKind::If {
            cond,
            then_block,
            else_block,
        })
    }

    pub fn while_(&mut self, cond: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.block(body);
        self.stmt(StmtKind::While { cond, body })
    }

    pub fn block_stmt(&mut self, stmts: Vec<StmtId>) -> StmtId {
        let block = self.block(stmts);
        self.stmt(StmtKind::Block(block))
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> Block {
        Block {
            stmts,
            span: self.span(),
        }
    }

    // Declarations

    /// A parameter whose call-site label is its own name.
    pub fn param(&mut self, name: &str, ty: ParsedType) -> Param {
        let name = self.name(name);
        Param {
            name,
            label: Some(name),
            ty: Some(ty),
            span: self.span(),
        }
    }

    /// A positional parameter (no call-site label).
    pub fn unlabeled_param(&mut self, name: &str, ty: ParsedType) -> Param {
        Param {
            name: self.name(name),
            label: None,
            ty: Some(ty),
            span: self.span(),
        }
    }

    pub fn generic_param(&mut self, name: &str, constraints: Vec<ParsedType>) -> GenericParam {
        GenericParam {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            constraints,
            span: self.span(),
        }
    }

    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Param>,
        result: Option<ParsedType>,
        body: Vec<StmtId>,
    ) -> FunctionDecl {
        let body = self.block(body);
        FunctionDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            generics: Vec::new(),
            receiver: None,
            params,
            result,
            body: Some(body),
            span: self.span(),
        }
    }

    pub fn method(
        &mut self,
        name: &str,
        receiver: Receiver,
        params: Vec<Param>,
        result: Option<ParsedType>,
        body: Vec<StmtId>,
    ) -> FunctionDecl {
        let mut decl = self.function(name, params, result, body);
        decl.receiver = Some(receiver);
        decl
    }

    /// A bodiless method requirement, as declared inside a standard.
    pub fn signature(
        &mut self,
        name: &str,
        params: Vec<Param>,
        result: Option<ParsedType>,
    ) -> FunctionDecl {
        FunctionDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            generics: Vec::new(),
            receiver: Some(Receiver::Value),
            params,
            result,
            body: None,
            span: self.span(),
        }
    }

    pub fn field(&mut self, name: &str, ty: ParsedType) -> FieldDecl {
        FieldDecl {
            name: self.name(name),
            ty,
            span: self.span(),
        }
    }

    pub fn variant(&mut self, name: &str, fields: Vec<FieldDecl>) -> VariantDecl {
        VariantDecl {
            name: self.name(name),
            discriminant: None,
            fields,
            span: self.span(),
        }
    }

    /// A variant with positional payload fields named `_0`, `_1`, ...
    pub fn tuple_variant(&mut self, name: &str, fields: Vec<ParsedType>) -> VariantDecl {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(i, ty)| self.field(&format!("_{i}"), ty))
            .collect();
        self.variant(name, fields)
    }

    pub fn struct_decl(
        &mut self,
        name: &str,
        generics: Vec<GenericParam>,
        fields: Vec<FieldDecl>,
        methods: Vec<FunctionDecl>,
    ) -> StructDecl {
        StructDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            generics,
            fields,
            methods,
            span: self.span(),
        }
    }

    pub fn enum_decl(
        &mut self,
        name: &str,
        generics: Vec<GenericParam>,
        variants: Vec<VariantDecl>,
        methods: Vec<FunctionDecl>,
    ) -> EnumDecl {
        EnumDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            generics,
            variants,
            methods,
            span: self.span(),
        }
    }

    pub fn alias_decl(
        &mut self,
        name: &str,
        target: ParsedType,
        constraints: Vec<ParsedType>,
    ) -> AliasDecl {
        AliasDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            target,
            constraints,
            span: self.span(),
        }
    }

    pub fn standard_decl(&mut self, name: &str, methods: Vec<FunctionDecl>) -> StandardDecl {
        StandardDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            methods,
            span: self.span(),
        }
    }

    pub fn conform_decl(
        &mut self,
        target: ParsedType,
        standard: Option<ParsedType>,
        methods: Vec<FunctionDecl>,
    ) -> ConformDecl {
        ConformDecl {
            id: self.arena.fresh_decl(),
            target,
            standard,
            methods,
            span: self.span(),
        }
    }

    pub fn const_decl(&mut self, name: &str, ty: Option<ParsedType>, value: ExprId) -> ConstDecl {
        ConstDecl {
            id: self.arena.fresh_decl(),
            name: self.name(name),
            ty,
            value,
            span: self.span(),
        }
    }
}
