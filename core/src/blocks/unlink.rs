//! Group unlinking.
//!
//! In heavily rewritten texts the matcher links scattered short runs
//! that fragment the diff into noise. Unlinking dissolves groups whose
//! strongest block stays under `block_min_length` words (unless a member
//! is a unique anchor) and trims weak single-word blocks off group
//! borders. The caller re-slides and re-detects after every pass.

use crate::blocks::{Block, BlockKind, Group};
use crate::tokens::{unlink_pair, VersionText};

/// Returns true when anything was unlinked.
pub(crate) fn unlink_blocks(
    new_text: &mut VersionText,
    old_text: &mut VersionText,
    blocks: &[Block],
    groups: &[Group],
    block_min_length: u32,
) -> bool {
    let mut unlinked = false;
    for group in groups {
        if (group.max_words as u32) < block_min_length && !group.unique {
            for block in &blocks[group.block_start..=group.block_end] {
                unlinked |= unlink_block(new_text, old_text, block);
            }
            continue;
        }

        // Keep the core; strip weak single-word blocks off both ends.
        let mut front = group.block_start;
        while front <= group.block_end {
            let block = &blocks[front];
            if block.words <= 1 && !block.unique {
                unlinked |= unlink_block(new_text, old_text, block);
                front += 1;
            } else {
                break;
            }
        }
        let mut back = group.block_end;
        while back > front {
            let block = &blocks[back];
            if block.words <= 1 && !block.unique {
                unlinked |= unlink_block(new_text, old_text, block);
                back -= 1;
            } else {
                break;
            }
        }
    }
    unlinked
}

fn unlink_block(new_text: &mut VersionText, old_text: &mut VersionText, block: &Block) -> bool {
    if block.kind != BlockKind::Same {
        return false;
    }
    let Some(start) = block.old_start else {
        return false;
    };
    let mut cursor = Some(start);
    for _ in 0..block.count {
        let Some(id) = cursor else { break };
        unlink_pair(new_text, old_text, id);
        cursor = old_text.tok(id).next;
    }
    true
}
