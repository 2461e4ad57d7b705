//! Block, section, and group model built after matching completes.
//!
//! - `detect`: collect `=` blocks from linked runs, find crossing
//!   sections, and form groups of blocks contiguous in OLD order
//! - `fixed_chain`: pick each section's fixed groups via a longest
//!   increasing subsequence maximized by character length
//! - `unlink`: dissolve weak groups and re-run detection
//! - `position`: place `-` and `+` blocks against fixed references and
//!   insert move marks for the remaining (moved) groups

pub(crate) mod detect;
pub(crate) mod fixed_chain;
pub(crate) mod position;
pub(crate) mod unlink;

use crate::tokens::TokenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    /// Linked run, present in both revisions.
    Same,
    /// Unlinked OLD run.
    Delete,
    /// Unlinked NEW run.
    Insert,
    /// Move mark standing at a moved group's original OLD position.
    Mark,
}

/// Sort ordinal used for blocks with no position on one side.
pub(crate) const NO_OLD_SIDE: i64 = i64::MAX;

/// `new_number` of blocks placed before everything else.
pub(crate) const BEFORE_ALL: i64 = -1;

#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) kind: BlockKind,
    /// First OLD-side token of a `=`/`-` block.
    pub(crate) old_start: Option<TokenId>,
    pub(crate) count: usize,
    pub(crate) words: usize,
    pub(crate) chars: usize,
    /// Ordinal of the first token on the OLD side; for marks, the OLD
    /// position the mark represents. `NO_OLD_SIDE` for inserts.
    pub(crate) old_number: i64,
    /// Ordinal of the first token on the NEW side; `-`/`|` blocks borrow
    /// the value of their fixed reference, `BEFORE_ALL` without one.
    pub(crate) new_number: i64,
    /// Creation ordinal in OLD order (`=` blocks only).
    pub(crate) old_block: Option<usize>,
    /// Ordinal after sorting by `new_number` (`=` blocks only).
    pub(crate) new_block: Option<usize>,
    pub(crate) unique: bool,
    pub(crate) section: Option<usize>,
    pub(crate) group: Option<usize>,
    pub(crate) fixed: bool,
    /// For marks: the moved group this mark stands in for.
    pub(crate) moved: Option<usize>,
    pub(crate) text: String,
}

impl Block {
    pub(crate) fn sort_key(&self) -> (i64, i64) {
        (self.new_number, self.old_number)
    }
}

/// A range of blocks closed under NEW-to-OLD crossings. Blocks outside
/// every section are fixed implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Section {
    pub(crate) block_start: usize,
    pub(crate) block_end: usize,
}

/// A maximal run of `=` blocks contiguous in OLD order.
#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub(crate) block_start: usize,
    pub(crate) block_end: usize,
    pub(crate) words: usize,
    pub(crate) max_words: usize,
    pub(crate) chars: usize,
    pub(crate) unique: bool,
    pub(crate) fixed: bool,
    pub(crate) old_number: i64,
    /// Group where this group's move mark was placed.
    pub(crate) moved_from: Option<usize>,
    /// Move index, assigned in move order.
    pub(crate) color: Option<u32>,
}

/// Sort blocks into render order and recompute group block ranges.
pub(crate) fn sort_and_reseat(blocks: &mut Vec<Block>, groups: &mut [Group]) {
    blocks.sort_by_key(Block::sort_key);
    reseat_groups(blocks, groups);
}

pub(crate) fn reseat_groups(blocks: &[Block], groups: &mut [Group]) {
    for (g, group) in groups.iter_mut().enumerate() {
        let mut start = None;
        let mut end = None;
        for (i, block) in blocks.iter().enumerate() {
            if block.group == Some(g) {
                if start.is_none() {
                    start = Some(i);
                }
                end = Some(i);
            }
        }
        if let (Some(s), Some(e)) = (start, end) {
            group.block_start = s;
            group.block_end = e;
        }
    }
}
