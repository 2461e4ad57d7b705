//! Same-block, section, and group detection.

use crate::blocks::{Block, BlockKind, Group, Section, NO_OLD_SIDE};
use crate::patterns::SplitPatterns;
use crate::tokens::VersionText;

/// Collect `=` blocks: maximal linked OLD runs whose NEW counterparts
/// are adjacent in NEW order. The result is sorted by NEW position with
/// `old_block`/`new_block` ordinals assigned.
pub(crate) fn get_same_blocks(
    new_text: &VersionText,
    old_text: &VersionText,
    patterns: &SplitPatterns,
) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut cursor = old_text.first;
    while let Some(id) = cursor {
        let Some(first_new) = old_text.tok(id).link else {
            cursor = old_text.tok(id).next;
            continue;
        };

        let old_number = old_text.tok(id).number as i64;
        let new_number = new_text.tok(first_new).number as i64;
        let mut text = String::new();
        let mut count = 0usize;
        let mut unique = false;

        let mut run_old = id;
        let mut run_new = first_new;
        loop {
            let token = old_text.tok(run_old);
            text.push_str(&token.text);
            count += 1;
            unique |= token.unique;

            match (token.next, new_text.tok(run_new).next) {
                (Some(next_old), Some(next_new))
                    if old_text.tok(next_old).link == Some(next_new) =>
                {
                    run_old = next_old;
                    run_new = next_new;
                }
                _ => break,
            }
        }

        let words = patterns.word_count(&text);
        let chars = text.chars().count();
        let old_block = blocks.len();
        blocks.push(Block {
            kind: BlockKind::Same,
            old_start: Some(id),
            count,
            words,
            chars,
            old_number,
            new_number,
            old_block: Some(old_block),
            new_block: None,
            unique,
            section: None,
            group: None,
            fixed: false,
            moved: None,
            text,
        });
        cursor = old_text.tok(run_old).next;
    }

    blocks.sort_by_key(|b| b.new_number);
    for (i, block) in blocks.iter_mut().enumerate() {
        block.new_block = Some(i);
    }
    blocks
}

/// Detect sections: ranges of blocks closed under NEW-to-OLD crossings.
/// Scanning in NEW order, a block whose OLD ordinal falls below the
/// section's running maximum extends the section to cover it.
pub(crate) fn get_sections(blocks: &mut [Block]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut i = 0usize;
    while i < blocks.len() {
        let section_start = i;
        let mut section_end = i;
        let mut old_max = blocks[section_start].old_number;
        let mut section_old_max = blocks[section_start].old_number;

        for j in (section_start + 1)..blocks.len() {
            if blocks[j].old_number > old_max {
                old_max = blocks[j].old_number;
            } else if blocks[j].old_number < section_old_max {
                section_end = j;
                section_old_max = old_max;
            }
        }

        if section_end > section_start {
            let section = sections.len();
            sections.push(Section {
                block_start: section_start,
                block_end: section_end,
            });
            for block in &mut blocks[section_start..=section_end] {
                block.section = Some(section);
            }
            i = section_end + 1;
        } else {
            i += 1;
        }
    }
    sections
}

/// Form groups: maximal runs of blocks with consecutive `old_block`
/// ordinals. Groups outside any section are fixed immediately.
pub(crate) fn get_groups(blocks: &mut [Block]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut i = 0usize;
    while i < blocks.len() {
        let start = i;
        let base = blocks[start]
            .old_block
            .expect("groups are formed over = blocks");
        let mut end = i;
        while end + 1 < blocks.len()
            && blocks[end + 1].old_block == Some(base + (end + 1 - start))
        {
            end += 1;
        }

        let members = &blocks[start..=end];
        let words = members.iter().map(|b| b.words).sum();
        let max_words = members.iter().map(|b| b.words).max().unwrap_or(0);
        let chars = members.iter().map(|b| b.chars).sum();
        let unique = members.iter().any(|b| b.unique);
        let fixed = blocks[start].section.is_none();

        let group = groups.len();
        groups.push(Group {
            block_start: start,
            block_end: end,
            words,
            max_words,
            chars,
            unique,
            fixed,
            old_number: blocks[start].old_number,
            moved_from: None,
            color: None,
        });
        for block in &mut blocks[start..=end] {
            block.group = Some(group);
            block.fixed = fixed;
        }
        i = end + 1;
    }
    groups
}

#[allow(dead_code)]
pub(crate) fn is_insert(block: &Block) -> bool {
    block.kind == BlockKind::Insert && block.old_number == NO_OLD_SIDE
}
