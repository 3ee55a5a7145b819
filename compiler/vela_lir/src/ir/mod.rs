//! LIR: the block-structured form the backend consumes.
//!
//! - **[`Function`]**: parameters, blocks, temporary types
//! - **[`Block`]**: straight-line [`Instr`]s closed by one [`Terminator`]
//! - **[`Value`]**: an operand; constants, parameters, temporaries and
//!   function references
//!
//! Every type carried here is concrete: no aliases, no type parameters, no
//! literal markers. Struct and enum types have an entry in the module's
//! [`LayoutTable`](crate::LayoutTable).

use std::collections::BTreeMap;

use smallvec::{smallvec, SmallVec};
use vela_ir::{BinaryOp, DeclId, Literal, Name, UnaryOp};
use vela_types::Idx;

use crate::{CallGraph, LayoutTable};

// ── ID newtypes ─────────────────────────────────────────────────────

/// A temporary within one [`Function`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TempId(u32);

impl TempId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A block within one [`Function`]. Block 0 is the entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    pub const ENTRY: BlockId = BlockId(0);

    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Values ──────────────────────────────────────────────────────────

/// An instruction operand. Every value knows its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// A compile-time constant. `nil` carries its pointer type.
    Constant { value: Literal, ty: Idx },
    /// Parameter by position; an implicit `self` is parameter 0.
    Param { index: u32, ty: Idx },
    Temp { id: TempId, ty: Idx },
    /// A function used as a value.
    Function { name: Name, ty: Idx },
}

impl Value {
    pub fn ty(&self) -> Idx {
        match *self {
            Value::Constant { ty, .. }
            | Value::Param { ty, .. }
            | Value::Temp { ty, .. }
            | Value::Function { ty, .. } => ty,
        }
    }

    /// The result of a call to a `void` function. Never stored or passed.
    pub fn void() -> Self {
        Value::Constant {
            value: Literal::Nil,
            ty: Idx::VOID,
        }
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match *self {
            Value::Temp { id, .. } => Some(id),
            _ => None,
        }
    }
}

// ── Instructions ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// A stack slot for one value of `ty`. `dst` holds its address.
    Allocate { dst: TempId, ty: Idx },
    Load {
        dst: TempId,
        ty: Idx,
        address: Value,
    },
    Store { address: Value, value: Value },
    /// Address of member `member` of the aggregate at `base`, laid out as
    /// `aggregate`'s base composite or, with `variant`, as that variant's
    /// composite. `ty` is the pointer type of the result.
    FieldAddress {
        dst: TempId,
        ty: Idx,
        base: Value,
        aggregate: Idx,
        variant: Option<u32>,
        member: u32,
    },
    /// Member `member` of an aggregate held by value.
    Extract {
        dst: TempId,
        ty: Idx,
        aggregate: Value,
        member: u32,
    },
    /// `operand_ty` is the type both operands were checked at; opcode
    /// selection by signedness or floatness is left to the backend.
    Binary {
        dst: TempId,
        ty: Idx,
        op: BinaryOp,
        operand_ty: Idx,
        lhs: Value,
        rhs: Value,
    },
    /// `-x` and `!x`. Address-of and dereference lower to places and loads.
    Unary {
        dst: TempId,
        ty: Idx,
        op: UnaryOp,
        operand: Value,
    },
    /// Direct call by mangled name. `dst` is `None` for `void` results.
    Call {
        dst: Option<TempId>,
        ty: Idx,
        callee: Name,
        args: Vec<Value>,
    },
    CallIndirect {
        dst: Option<TempId>,
        ty: Idx,
        callee: Value,
        args: Vec<Value>,
    },
}

impl Instr {
    /// The temporary this instruction defines, if any.
    pub fn dst(&self) -> Option<TempId> {
        match self {
            Instr::Allocate { dst, .. }
            | Instr::Load { dst, .. }
            | Instr::FieldAddress { dst, .. }
            | Instr::Extract { dst, .. }
            | Instr::Binary { dst, .. }
            | Instr::Unary { dst, .. } => Some(*dst),
            Instr::Call { dst, .. } | Instr::CallIndirect { dst, .. } => *dst,
            Instr::Store { .. } => None,
        }
    }

    /// Operands read by this instruction, in evaluation order.
    pub fn operands(&self) -> SmallVec<[Value; 4]> {
        match self {
            Instr::Allocate { .. } => SmallVec::new(),
            Instr::Load { address, .. } => smallvec![*address],
            Instr::Store { address, value } => smallvec![*address, *value],
            Instr::FieldAddress { base, .. } => smallvec![*base],
            Instr::Extract { aggregate, .. } => smallvec![*aggregate],
            Instr::Binary { lhs, rhs, .. } => smallvec![*lhs, *rhs],
            Instr::Unary { operand, .. } => smallvec![*operand],
            Instr::Call { args, .. } => args.iter().copied().collect(),
            Instr::CallIndirect { callee, args, .. } => {
                std::iter::once(*callee).chain(args.iter().copied()).collect()
            }
        }
    }
}

// ── Terminators ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    Jump(BlockId),
    Branch {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// `None` for `void` functions.
    Return(Option<Value>),
    /// No predecessor reaches this block.
    Unreachable,
}

impl Terminator {
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Terminator::Jump(target) => smallvec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
            Terminator::Return(_) | Terminator::Unreachable => SmallVec::new(),
        }
    }
}

// ── Blocks and functions ────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    pub instrs: Vec<Instr>,
    pub terminator: Terminator,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Name,
    pub ty: Idx,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    /// Mangled name: `name`, `Owner.method`, `name<args>`.
    pub name: Name,
    pub decl: DeclId,
    /// An implicit `self` comes first for methods.
    pub params: Vec<Param>,
    pub result: Idx,
    pub blocks: Vec<Block>,
    /// Type of each temporary, indexed by [`TempId`].
    pub temp_types: Vec<Idx>,
}

impl Function {
    pub fn entry(&self) -> &Block {
        &self.blocks[BlockId::ENTRY.index()]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn temp_type(&self, id: TempId) -> Idx {
        self.temp_types[id.index()]
    }

    pub fn instr_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instrs.len()).sum()
    }

    /// Names of every function this body calls directly.
    pub fn direct_callees(&self) -> impl Iterator<Item = Name> + '_ {
        self.blocks
            .iter()
            .flat_map(|b| &b.instrs)
            .filter_map(|instr| match instr {
                Instr::Call { callee, .. } => Some(*callee),
                _ => None,
            })
    }
}

/// The specializations of one generic function that were lowered, keyed
/// by bound arguments (owner's, then the function's own).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericFunction {
    pub target: DeclId,
    pub specializations: BTreeMap<Vec<Idx>, Name>,
}

/// Everything lowering produces for one module.
#[derive(Debug)]
pub struct LirModule {
    pub functions: BTreeMap<Name, Function>,
    pub generic_functions: BTreeMap<DeclId, GenericFunction>,
    pub layouts: LayoutTable,
    pub call_graph: CallGraph,
}

impl LirModule {
    pub fn function(&self, name: Name) -> Option<&Function> {
        self.functions.get(&name)
    }

    /// Every function reachable from `name` through calls or function
    /// references.
    pub fn nested_functions(&self, name: Name) -> Vec<Name> {
        self.call_graph.nested_functions(name)
    }
}
