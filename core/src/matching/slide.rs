//! Gap sliding.
//!
//! A gap (maximal unlinked run) bordered by identical tokens can sit at
//! several equivalent positions; matching alone leaves it wherever the
//! extension passes happened to stop. Sliding settles each gap at a
//! natural text boundary so diffs align with line and word structure:
//!
//! 1. Slide down while the linked token just after the gap equals the
//!    gap's front token, absorbing the boundary token entirely.
//! 2. Slide up as far as token equality allows. If the token above the
//!    final position ends in a newline, stay there; otherwise fall back
//!    to the closest position on a blank/word transition, or stay put.
//!
//! The caller runs this twice per refinement, once with each revision as
//! the sliding side, to cover both asymmetries.

use crate::patterns::{is_blank_char, is_newline_char};
use crate::tokens::{TokenId, VersionText};

pub(crate) fn slide_gaps(text: &mut VersionText, other: &mut VersionText) {
    let mut gaps: Vec<(TokenId, TokenId)> = Vec::new();
    let mut gap_start: Option<TokenId> = None;
    let mut gap_last: Option<TokenId> = None;
    let mut cursor = text.first;
    while let Some(id) = cursor {
        if text.tok(id).link.is_none() {
            if gap_start.is_none() {
                gap_start = Some(id);
            }
            gap_last = Some(id);
        } else if let (Some(start), Some(last)) = (gap_start, gap_last) {
            gaps.push((start, last));
            gap_start = None;
        }
        cursor = text.tok(id).next;
    }
    if let (Some(start), Some(last)) = (gap_start, gap_last) {
        gaps.push((start, last));
    }

    for (front, back) in gaps {
        slide_gap(text, other, front, back);
    }
}

fn slide_gap(text: &mut VersionText, other: &mut VersionText, front: TokenId, back: TokenId) {
    let (front, back) = slide_down(text, other, front, back);
    slide_up(text, other, front, back);
}

/// Absorb matching linked boundary tokens below the gap.
fn slide_down(
    text: &mut VersionText,
    other: &mut VersionText,
    mut front: TokenId,
    mut back: TokenId,
) -> (TokenId, TokenId) {
    loop {
        let Some(after) = text.next_of(back) else {
            break;
        };
        let Some(counterpart) = text.tok(after).link else {
            break;
        };
        if text.tok(front).text != text.tok(after).text {
            break;
        }
        text.tok_mut(front).link = Some(counterpart);
        other.tok_mut(counterpart).link = Some(front);
        text.tok_mut(after).link = None;
        front = text
            .next_of(front)
            .expect("gap front always precedes its back boundary");
        back = after;
    }
    (front, back)
}

/// Slide the gap upward, settling on a newline or word border.
fn slide_up(text: &mut VersionText, other: &mut VersionText, front: TokenId, back: TokenId) {
    // Simulate first: up_chain[i] is the linked token absorbed by slide
    // i+1, down_chain[i] the gap token that takes over its link.
    let mut up_chain: Vec<TokenId> = Vec::new();
    let mut down_chain: Vec<TokenId> = Vec::new();
    let mut up = text.prev_of(front);
    let mut down = Some(back);
    while let (Some(u), Some(d)) = (up, down) {
        if text.tok(u).link.is_none() {
            break;
        }
        if text.tok(u).text != text.tok(d).text {
            break;
        }
        up_chain.push(u);
        down_chain.push(d);
        up = text.prev_of(u);
        down = text.prev_of(d);
    }
    let slide_max = up_chain.len();
    if slide_max == 0 {
        return;
    }

    // Token above the gap after sliding k steps, None at text start.
    let above_at = |k: usize| -> Option<TokenId> {
        if k < slide_max {
            Some(up_chain[k])
        } else {
            text.prev_of(up_chain[slide_max - 1])
        }
    };
    // Front token of the gap after sliding k steps.
    let front_at = |k: usize| -> TokenId {
        if k == 0 {
            front
        } else {
            up_chain[k - 1]
        }
    };

    let newline_stop = |k: usize| -> bool {
        match above_at(k) {
            None => true,
            Some(id) => text
                .tok(id)
                .text
                .chars()
                .last()
                .map(is_newline_char)
                .unwrap_or(false),
        }
    };
    let blank_class = |id: TokenId| -> bool {
        text.tok(id)
            .text
            .chars()
            .last()
            .map(is_blank_char)
            .unwrap_or(false)
    };
    let border_transition = |k: usize| -> bool {
        match above_at(k) {
            None => true,
            Some(above) => blank_class(above) != blank_class(front_at(k)),
        }
    };

    let chosen = if newline_stop(slide_max) {
        slide_max
    } else {
        (1..=slide_max)
            .rev()
            .find(|&k| border_transition(k))
            .unwrap_or(0)
    };

    for i in 0..chosen {
        let absorbed = up_chain[i];
        let takes_over = down_chain[i];
        let counterpart = text
            .tok(absorbed)
            .link
            .expect("up-chain tokens are linked by construction");
        text.tok_mut(takes_over).link = Some(counterpart);
        other.tok_mut(counterpart).link = Some(takes_over);
        text.tok_mut(absorbed).link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;
    use crate::matching::matcher::calculate_diff;
    use crate::matching::MatchContext;
    use crate::patterns::{SplitLevel, SplitPatterns};

    fn diff_and_slide(old: &str, new: &str) -> (VersionText, VersionText) {
        let patterns = SplitPatterns::new();
        let config = DiffConfig::default();
        let mut old_text = VersionText::new(old, &patterns, false);
        let mut new_text = VersionText::new(new, &patterns, false);
        old_text.split_initial(SplitLevel::Word, &patterns);
        new_text.split_initial(SplitLevel::Word, &patterns);
        let mut ctx = MatchContext {
            new_text: &mut new_text,
            old_text: &mut old_text,
            config: &config,
            patterns: &patterns,
        };
        calculate_diff(&mut ctx, SplitLevel::Word, true);
        slide_gaps(&mut new_text, &mut old_text);
        slide_gaps(&mut old_text, &mut new_text);
        (new_text, old_text)
    }

    fn unlinked_join(vt: &VersionText) -> String {
        vt.token_ids()
            .iter()
            .filter(|id| vt.tok(**id).link.is_none())
            .map(|id| vt.tok(*id).text.clone())
            .collect()
    }

    #[test]
    fn sliding_preserves_link_symmetry() {
        let (new_text, old_text) = diff_and_slide("b b b", "b b b b b");
        for id in new_text.token_ids() {
            if let Some(other) = new_text.tok(id).link {
                assert_eq!(old_text.tok(other).link, Some(id));
            }
        }
        // The insertion stays two "b" tokens and two blanks wide.
        assert_eq!(unlinked_join(&new_text), "b b ");
    }

    #[test]
    fn gap_settles_at_word_border() {
        // The inserted run could start mid-word; sliding must leave a
        // whole-token insertion at a blank transition.
        let (new_text, _old) = diff_and_slide("one two", "one extra two");
        let inserted = unlinked_join(&new_text);
        assert!(
            inserted == "extra " || inserted == " extra",
            "inserted run should be word-aligned, got {inserted:?}"
        );
    }

    #[test]
    fn repeated_line_insertion_slides_to_newline() {
        let old = "alpha\nbeta\ngamma";
        let new = "alpha\nbeta\nbeta\ngamma";
        let patterns = SplitPatterns::new();
        let config = DiffConfig::default();
        let mut old_text = VersionText::new(old, &patterns, false);
        let mut new_text = VersionText::new(new, &patterns, false);
        old_text.split_initial(SplitLevel::Line, &patterns);
        new_text.split_initial(SplitLevel::Line, &patterns);
        let mut ctx = MatchContext {
            new_text: &mut new_text,
            old_text: &mut old_text,
            config: &config,
            patterns: &patterns,
        };
        calculate_diff(&mut ctx, SplitLevel::Line, true);
        slide_gaps(&mut new_text, &mut old_text);
        slide_gaps(&mut old_text, &mut new_text);

        let inserted = unlinked_join(&new_text);
        assert_eq!(inserted.chars().filter(|c| *c == '\n').count(), 1);
        assert!(inserted.contains("beta"));
    }
}
