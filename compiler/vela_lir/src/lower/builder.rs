//! In-progress function: blocks, temporaries and the insertion point.

use vela_ir::{DeclId, Name};
use vela_types::Idx;

use crate::ir::{Block, BlockId, Function, Instr, Param, TempId, Terminator};

/// A block being filled. `terminator` is set exactly once.
struct BlockBuilder {
    id: BlockId,
    instrs: Vec<Instr>,
    terminator: Option<Terminator>,
}

impl BlockBuilder {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            instrs: Vec::new(),
            terminator: None,
        }
    }
}

/// Position at a block, emit, terminate.
///
/// Once a block is terminated it accepts nothing more: later instructions
/// and terminators aimed at it are dropped. That is how code following a
/// `return` in the same block disappears.
pub(crate) struct FunctionBuilder {
    blocks: Vec<BlockBuilder>,
    current: BlockId,
    temp_types: Vec<Idx>,
}

impl FunctionBuilder {
    /// A builder positioned at a fresh entry block.
    pub(crate) fn new() -> Self {
        Self {
            blocks: vec![BlockBuilder::new(BlockId::ENTRY)],
            current: BlockId::ENTRY,
            temp_types: Vec::new(),
        }
    }

    // Blocks

    pub(crate) fn new_block(&mut self) -> BlockId {
        let raw = u32::try_from(self.blocks.len()).unwrap_or(u32::MAX);
        let id = BlockId::new(raw);
        self.blocks.push(BlockBuilder::new(id));
        id
    }

    pub(crate) fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "BlockId {} out of bounds (have {} blocks)",
            block.raw(),
            self.blocks.len(),
        );
        self.current = block;
    }

    #[inline]
    pub(crate) fn is_terminated(&self) -> bool {
        self.blocks[self.current.index()].terminator.is_some()
    }

    // Temporaries

    pub(crate) fn fresh_temp(&mut self, ty: Idx) -> TempId {
        let raw = u32::try_from(self.temp_types.len()).unwrap_or(u32::MAX);
        self.temp_types.push(ty);
        TempId::new(raw)
    }

    // Emission

    /// Append to the current block, unless it is already terminated.
    pub(crate) fn emit(&mut self, instr: Instr) {
        let block = &mut self.blocks[self.current.index()];
        if block.terminator.is_some() {
            tracing::trace!(block = block.id.raw(), ?instr, "dropping instruction after terminator");
            return;
        }
        block.instrs.push(instr);
    }

    /// Append to the entry block whatever its state. Stack slots live there
    /// so that a slot created inside a loop body is allocated once.
    pub(crate) fn emit_in_entry(&mut self, instr: Instr) {
        self.blocks[BlockId::ENTRY.index()].instrs.push(instr);
    }

    pub(crate) fn terminate(&mut self, terminator: Terminator) {
        let block = &mut self.blocks[self.current.index()];
        if block.terminator.is_some() {
            tracing::trace!(block = block.id.raw(), ?terminator, "block already terminated");
            return;
        }
        block.terminator = Some(terminator);
    }

    /// Produce the finished function. Blocks nobody terminated get
    /// `Unreachable`.
    pub(crate) fn finish(
        self,
        name: Name,
        decl: DeclId,
        params: Vec<Param>,
        result: Idx,
    ) -> Function {
        let blocks = self
            .blocks
            .into_iter()
            .map(|bb| {
                let terminator = bb.terminator.unwrap_or_else(|| {
                    tracing::warn!(block = bb.id.raw(), "unterminated block, adding Unreachable");
                    Terminator::Unreachable
                });
                Block {
                    id: bb.id,
                    instrs: bb.instrs,
                    terminator,
                }
            })
            .collect();
        Function {
            name,
            decl,
            params,
            result,
            blocks,
            temp_types: self.temp_types,
        }
    }
}
