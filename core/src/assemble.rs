//! Fragment assembly.
//!
//! Converts the sorted block/group model into the linear fragment
//! stream. Moved groups are wrapped in `(<`/`(>` … `)` envelopes whose
//! opener points toward the group's mark; every `|` block becomes a
//! `<`/`>` mark fragment carrying the moved group's old-side text and
//! move color. With block moves disabled, a moved group is emitted as a
//! deletion at its mark position and an insertion at its rendered
//! position, with no envelopes or colors.

use crate::blocks::{Block, BlockKind, Group};
use crate::fragment::{Fragment, FragmentKind};

pub(crate) fn assemble(blocks: &[Block], groups: &[Group], show_moves: bool) -> Vec<Fragment> {
    let mut mark_of: Vec<Option<usize>> = vec![None; groups.len()];
    for (i, block) in blocks.iter().enumerate() {
        if block.kind == BlockKind::Mark {
            if let Some(g) = block.moved {
                mark_of[g] = Some(i);
            }
        }
    }

    let in_moved_group =
        |block: &Block| -> Option<usize> { block.group.filter(|&g| !groups[g].fixed) };

    let mut units: Vec<Fragment> = Vec::new();
    let mut open_group: Option<usize> = None;
    for (i, block) in blocks.iter().enumerate() {
        if show_moves {
            if let Some(open) = open_group {
                if block.group != Some(open) {
                    units.push(Fragment::new("", FragmentKind::MovedClose, groups[open].color));
                    open_group = None;
                }
            }
            if let Some(g) = in_moved_group(block) {
                if open_group.is_none() {
                    let opener = match mark_of[g] {
                        Some(m) if m < i => FragmentKind::MovedOpenLeft,
                        _ => FragmentKind::MovedOpenRight,
                    };
                    units.push(Fragment::new("", opener, groups[g].color));
                    open_group = Some(g);
                }
            }
        }

        let moved_color = in_moved_group(block).and_then(|g| groups[g].color);
        match block.kind {
            BlockKind::Same => {
                if show_moves {
                    units.push(Fragment::new(
                        block.text.clone(),
                        FragmentKind::Same,
                        moved_color,
                    ));
                } else if in_moved_group(block).is_some() {
                    // Rendered at the new position as plain insertion;
                    // the old position carries the deletion.
                    units.push(Fragment::new(block.text.clone(), FragmentKind::Insert, None));
                } else {
                    units.push(Fragment::new(block.text.clone(), FragmentKind::Same, None));
                }
            }
            BlockKind::Delete => {
                if show_moves {
                    units.push(Fragment::new(
                        block.text.clone(),
                        FragmentKind::Delete,
                        moved_color,
                    ));
                } else if in_moved_group(block).is_none() {
                    units.push(Fragment::new(block.text.clone(), FragmentKind::Delete, None));
                }
                // Moved-group deletions surface through the mark text
                // when moves are disabled.
            }
            BlockKind::Insert => {
                units.push(Fragment::new(
                    block.text.clone(),
                    FragmentKind::Insert,
                    if show_moves { moved_color } else { None },
                ));
            }
            BlockKind::Mark => {
                let Some(moved_group) = block.moved else {
                    continue;
                };
                let text = mark_text(blocks, moved_group);
                if show_moves {
                    let kind = if groups[moved_group].block_start > i {
                        FragmentKind::MarkRight
                    } else {
                        FragmentKind::MarkLeft
                    };
                    units.push(Fragment::new(text, kind, groups[moved_group].color));
                } else {
                    units.push(Fragment::new(text, FragmentKind::Delete, None));
                }
            }
        }
    }
    if let Some(open) = open_group {
        units.push(Fragment::new("", FragmentKind::MovedClose, groups[open].color));
    }

    merge_adjacent(units)
}

/// Old-side text of a moved group: its `=` and `-` blocks concatenated
/// in render order, which inside a group equals OLD order.
fn mark_text(blocks: &[Block], group: usize) -> String {
    blocks
        .iter()
        .filter(|b| {
            b.group == Some(group) && matches!(b.kind, BlockKind::Same | BlockKind::Delete)
        })
        .map(|b| b.text.as_str())
        .collect()
}

/// Merge adjacent non-empty fragments of the same kind and color.
fn merge_adjacent(units: Vec<Fragment>) -> Vec<Fragment> {
    let mut merged: Vec<Fragment> = Vec::with_capacity(units.len());
    for unit in units {
        let mergeable = matches!(
            unit.kind,
            FragmentKind::Same | FragmentKind::Delete | FragmentKind::Insert
        );
        if mergeable && !unit.text.is_empty() {
            if let Some(last) = merged.last_mut() {
                if last.kind == unit.kind && last.color == unit.color && !last.text.is_empty() {
                    last.text.push_str(&unit.text);
                    continue;
                }
            }
        }
        merged.push(unit);
    }
    merged
}
