//! Fixed-group selection.
//!
//! Within each section the groups form a sequence in NEW order; any
//! subset whose OLD ordinals increase could be rendered in place. The
//! chain that keeps the most characters fixed produces the calmest diff,
//! so the selection maximizes total character length, not group count.
//! Everything off the chosen chain is rendered as moved.

use crate::blocks::{Block, Group, Section};

pub(crate) fn set_fixed(blocks: &mut [Block], groups: &mut [Group], sections: &[Section]) {
    for section in sections {
        let group_start = blocks[section.block_start]
            .group
            .expect("section blocks are grouped");
        let group_end = blocks[section.block_end]
            .group
            .expect("section blocks are grouped");
        let n = group_end - group_start + 1;

        // Best chain from each group onward, computed back to front.
        let mut best_chars = vec![0u64; n];
        let mut next_hop: Vec<Option<usize>> = vec![None; n];
        for i in (0..n).rev() {
            let gi = group_start + i;
            let own = groups[gi].chars as u64;
            let mut best = own;
            let mut hop = None;
            for j in (i + 1)..n {
                let gj = group_start + j;
                if groups[gj].old_number > groups[gi].old_number {
                    let candidate = own + best_chars[j];
                    if candidate > best {
                        best = candidate;
                        hop = Some(j);
                    }
                }
            }
            best_chars[i] = best;
            next_hop[i] = hop;
        }

        // Best over all starting groups; ties go to the first in block
        // order.
        let mut start = 0usize;
        for i in 1..n {
            if best_chars[i] > best_chars[start] {
                start = i;
            }
        }

        let mut cursor = Some(start);
        while let Some(i) = cursor {
            let gi = group_start + i;
            groups[gi].fixed = true;
            for block in &mut blocks[groups[gi].block_start..=groups[gi].block_end] {
                block.fixed = true;
            }
            cursor = next_hop[i];
        }
    }
}
