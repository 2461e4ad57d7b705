//! Placement of deletion blocks, insertion blocks, and move marks.
//!
//! `-` and `|` blocks have no NEW-side position of their own; they
//! borrow the `new_number` of a fixed reference block so the final sort
//! by `(new_number, old_number)` renders them next to it. The reference
//! cascade, evaluated on the OLD-order view:
//!
//! 1. previous block, if `=` and fixed
//! 2. next block, if `=` and fixed
//! 3. previous block, if `=` and not at its group's end
//! 4. next block, if `=` and not at its group's start
//! 5. nearest previous fixed `=` block
//! 6. otherwise `BEFORE_ALL`, sorting ahead of block 0
//!
//! Rules 3 and 4 attach content to the interior of a moved group so it
//! travels with the move.

use crate::blocks::{Block, BlockKind, Group, BEFORE_ALL, NO_OLD_SIDE};
use crate::patterns::SplitPatterns;
use crate::tokens::VersionText;

/// Collect `-` blocks from the unlinked runs left in OLD.
pub(crate) fn get_del_blocks(old_text: &VersionText, patterns: &SplitPatterns) -> Vec<Block> {
    collect_unlinked_runs(old_text, patterns, BlockKind::Delete)
}

/// Collect `+` blocks from the unlinked runs left in NEW.
pub(crate) fn get_ins_blocks(new_text: &VersionText, patterns: &SplitPatterns) -> Vec<Block> {
    collect_unlinked_runs(new_text, patterns, BlockKind::Insert)
}

fn collect_unlinked_runs(
    text: &VersionText,
    patterns: &SplitPatterns,
    kind: BlockKind,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = text.first;
    while let Some(id) = cursor {
        if text.tok(id).link.is_some() {
            cursor = text.tok(id).next;
            continue;
        }

        let first_number = text.tok(id).number as i64;
        let mut run_text = String::new();
        let mut count = 0usize;
        let mut run_end = id;
        let mut walk = Some(id);
        while let Some(t) = walk {
            if text.tok(t).link.is_some() {
                break;
            }
            run_text.push_str(&text.tok(t).text);
            count += 1;
            run_end = t;
            walk = text.tok(t).next;
        }

        let words = patterns.word_count(&run_text);
        let chars = run_text.chars().count();
        let (old_number, new_number, old_start) = match kind {
            BlockKind::Delete => (first_number, 0, Some(id)),
            _ => (NO_OLD_SIDE, first_number, None),
        };
        blocks.push(Block {
            kind,
            old_start,
            count,
            words,
            chars,
            old_number,
            new_number,
            old_block: None,
            new_block: None,
            unique: false,
            section: None,
            group: None,
            fixed: false,
            moved: None,
            text: run_text,
        });
        cursor = text.tok(run_end).next;
    }
    blocks
}

/// Array indices of blocks that exist on the OLD side, in OLD order.
fn old_order_view(blocks: &[Block]) -> Vec<usize> {
    let mut view: Vec<usize> = (0..blocks.len())
        .filter(|&i| matches!(blocks[i].kind, BlockKind::Same | BlockKind::Delete))
        .collect();
    view.sort_by_key(|&i| blocks[i].old_number);
    view
}

/// Assign every `-` block its reference position, group, and fixed flag.
pub(crate) fn position_del_blocks(blocks: &mut [Block], groups: &[Group]) {
    let view = old_order_view(blocks);
    for pos in 0..view.len() {
        let i = view[pos];
        if blocks[i].kind != BlockKind::Delete {
            continue;
        }
        let prev = (pos > 0).then(|| view[pos - 1]);
        let next = (pos + 1 < view.len()).then(|| view[pos + 1]);
        match find_reference(blocks, groups, &view, pos, prev, next) {
            Some(r) => {
                blocks[i].new_number = blocks[r].new_number;
                blocks[i].group = blocks[r].group;
                blocks[i].fixed = blocks[r].fixed;
            }
            None => {
                blocks[i].new_number = BEFORE_ALL;
                blocks[i].group = None;
                blocks[i].fixed = true;
            }
        }
    }
}

/// Attach `+` blocks inside an existing group's range to that group;
/// everything else becomes its own fixed singleton group.
pub(crate) fn set_ins_groups(blocks: &mut [Block], groups: &mut Vec<Group>) {
    for i in 0..blocks.len() {
        if blocks[i].kind != BlockKind::Insert || blocks[i].group.is_some() {
            continue;
        }
        let prev_group = blocks[..i].iter().rev().find_map(|b| b.group);
        let next_group = blocks[i + 1..].iter().find_map(|b| b.group);
        match (prev_group, next_group) {
            (Some(a), Some(b)) if a == b => {
                blocks[i].group = Some(a);
                blocks[i].fixed = groups[a].fixed;
            }
            _ => {
                let g = groups.len();
                groups.push(Group {
                    block_start: i,
                    block_end: i,
                    words: blocks[i].words,
                    max_words: blocks[i].words,
                    chars: blocks[i].chars,
                    unique: false,
                    fixed: true,
                    old_number: NO_OLD_SIDE,
                    moved_from: None,
                    color: None,
                });
                blocks[i].group = Some(g);
                blocks[i].fixed = true;
            }
        }
    }
}

/// Create a `|` mark block for every moved group, assign move colors,
/// and record where each group moved from.
pub(crate) fn insert_marks(blocks: &mut Vec<Block>, groups: &mut Vec<Group>) {
    let view = old_order_view(blocks);
    let moved: Vec<usize> = (0..groups.len()).filter(|&g| !groups[g].fixed).collect();
    let mut color_next = 1u32;

    for g in moved {
        let members: Vec<usize> = (0..blocks.len())
            .filter(|&i| {
                blocks[i].group == Some(g)
                    && matches!(blocks[i].kind, BlockKind::Same | BlockKind::Delete)
            })
            .collect();
        let min_old = members
            .iter()
            .map(|&i| blocks[i].old_number)
            .min()
            .expect("moved groups keep their = blocks");
        let max_old = members.iter().map(|&i| blocks[i].old_number).max().unwrap();

        let pos = view
            .iter()
            .position(|&i| blocks[i].old_number >= min_old)
            .unwrap_or(view.len());
        let prev = (pos > 0).then(|| view[pos - 1]);
        let next = view
            .iter()
            .copied()
            .find(|&i| blocks[i].old_number > max_old);

        let reference = find_reference(blocks, groups, &view, pos, prev, next);
        let (new_number, ref_group, ref_fixed) = match reference {
            Some(r) => (blocks[r].new_number, blocks[r].group, blocks[r].fixed),
            None => (BEFORE_ALL, None, true),
        };
        let mark_group = match ref_group {
            Some(rg) => rg,
            None => {
                // Synthetic singleton group placed before everything.
                let ng = groups.len();
                groups.push(Group {
                    block_start: blocks.len(),
                    block_end: blocks.len(),
                    words: 0,
                    max_words: 0,
                    chars: 0,
                    unique: false,
                    fixed: true,
                    old_number: min_old,
                    moved_from: None,
                    color: None,
                });
                ng
            }
        };

        groups[g].moved_from = Some(mark_group);
        groups[g].color = Some(color_next);
        color_next += 1;

        blocks.push(Block {
            kind: BlockKind::Mark,
            old_start: None,
            count: 0,
            words: 0,
            chars: 0,
            old_number: min_old,
            new_number,
            old_block: None,
            new_block: None,
            unique: false,
            section: None,
            group: Some(mark_group),
            fixed: ref_fixed,
            moved: Some(g),
            text: String::new(),
        });
    }
}

fn find_reference(
    blocks: &[Block],
    groups: &[Group],
    view: &[usize],
    pos: usize,
    prev: Option<usize>,
    next: Option<usize>,
) -> Option<usize> {
    if let Some(p) = prev {
        if blocks[p].kind == BlockKind::Same && blocks[p].fixed {
            return Some(p);
        }
    }
    if let Some(x) = next {
        if blocks[x].kind == BlockKind::Same && blocks[x].fixed {
            return Some(x);
        }
    }
    if let Some(p) = prev {
        if blocks[p].kind == BlockKind::Same {
            if let Some(g) = blocks[p].group {
                if groups[g].block_end != p {
                    return Some(p);
                }
            }
        }
    }
    if let Some(x) = next {
        if blocks[x].kind == BlockKind::Same {
            if let Some(g) = blocks[x].group {
                if groups[g].block_start != x {
                    return Some(x);
                }
            }
        }
    }
    for vp in (0..pos.min(view.len())).rev() {
        let c = view[vp];
        if blocks[c].kind == BlockKind::Same && blocks[c].fixed {
            return Some(c);
        }
    }
    None
}
