//! Character-level gap refinement.
//!
//! Word-level matching leaves short replaced runs unresolved. When the
//! NEW and OLD sides of the same gap have the same shape, the tokens are
//! close enough that a character diff inside them is meaningful; blindly
//! char-splitting every gap would instead produce confetti. Accepted
//! shapes:
//!
//! - equal token counts, where every pair differs only by an internal
//!   insert/delete, a flanking insert/delete, or is at least half
//!   identical at equal length;
//! - one token versus three, where the single token starts with the
//!   first and ends with the last of the triple (a word split or merge
//!   at whitespace or a dash).
//!
//! In the equal-count case, identical pairs (typically the separating
//! spaces) are linked up front so the character matcher stays inside
//! word interiors.

use crate::matching::MatchContext;
use crate::patterns::SplitLevel;
use crate::tokens::{link_pair, TokenId};

/// Re-split qualifying gaps to characters. Returns true when at least
/// one gap was refined and a character-level matching pass is needed.
pub(crate) fn refine_to_chars(ctx: &mut MatchContext<'_>) -> bool {
    let mut refined_any = false;

    // Collect NEW-side gaps with their OLD-side counterparts first; the
    // list walk must not interleave with re-splitting.
    let mut gap_pairs: Vec<(Vec<TokenId>, Vec<TokenId>)> = Vec::new();
    let mut cursor = ctx.new_text.first;
    let mut before_gap: Option<TokenId> = None;
    while let Some(id) = cursor {
        if ctx.new_text.tok(id).link.is_some() {
            before_gap = Some(id);
            cursor = ctx.new_text.tok(id).next;
            continue;
        }

        let mut new_run = Vec::new();
        let mut walk = Some(id);
        while let Some(t) = walk {
            if ctx.new_text.tok(t).link.is_some() {
                break;
            }
            new_run.push(t);
            walk = ctx.new_text.tok(t).next;
        }
        let new_after = walk;

        // The corresponding OLD gap follows the counterpart of the
        // linked token just above this gap.
        let old_start = match before_gap {
            Some(b) => ctx
                .new_text
                .tok(b)
                .link
                .and_then(|c| ctx.old_text.tok(c).next),
            None => ctx.old_text.first,
        };
        let mut old_run = Vec::new();
        let mut walk = old_start;
        while let Some(t) = walk {
            if ctx.old_text.tok(t).link.is_some() {
                break;
            }
            old_run.push(t);
            walk = ctx.old_text.tok(t).next;
        }
        let old_after = walk;

        // The gaps correspond only when they close against the same
        // linked pair (or both run to the end of their lists).
        let bounded = match (new_after, old_after) {
            (Some(na), Some(oa)) => ctx.new_text.tok(na).link == Some(oa),
            (None, None) => true,
            _ => false,
        };
        if bounded && !old_run.is_empty() {
            gap_pairs.push((new_run.clone(), old_run));
        }

        before_gap = None;
        cursor = new_after;
    }

    for (new_run, old_run) in gap_pairs {
        if refine_gap(ctx, &new_run, &old_run) {
            refined_any = true;
        }
    }
    refined_any
}

fn refine_gap(ctx: &mut MatchContext<'_>, new_run: &[TokenId], old_run: &[TokenId]) -> bool {
    if new_run.len() == old_run.len() {
        refine_equal_shape(ctx, new_run, old_run)
    } else if new_run.len() == 1 && old_run.len() == 3 {
        refine_split_word(ctx, new_run[0], old_run, false)
    } else if new_run.len() == 3 && old_run.len() == 1 {
        refine_split_word(ctx, old_run[0], new_run, true)
    } else {
        false
    }
}

fn refine_equal_shape(ctx: &mut MatchContext<'_>, new_run: &[TokenId], old_run: &[TokenId]) -> bool {
    // Every pair must qualify before anything is touched.
    for (&n, &o) in new_run.iter().zip(old_run) {
        let a: Vec<char> = ctx.new_text.tok(n).text.chars().collect();
        let b: Vec<char> = ctx.old_text.tok(o).text.chars().collect();
        if !pair_is_refinable(&a, &b) {
            return false;
        }
    }

    for (&n, &o) in new_run.iter().zip(old_run) {
        if ctx.new_text.tok(n).text == ctx.old_text.tok(o).text {
            // Identical separators pin the character diff word-locally.
            link_pair(ctx.new_text, ctx.old_text, n, o);
        } else {
            ctx.new_text
                .refine_token(SplitLevel::Character, ctx.patterns, n);
            ctx.old_text
                .refine_token(SplitLevel::Character, ctx.patterns, o);
        }
    }
    true
}

/// One token against three: a word was split (or merged) at a separator.
fn refine_split_word(
    ctx: &mut MatchContext<'_>,
    single: TokenId,
    triple: &[TokenId],
    single_is_old: bool,
) -> bool {
    let (single_text, first_text, last_text) = if single_is_old {
        (
            ctx.old_text.tok(single).text.clone(),
            ctx.new_text.tok(triple[0]).text.clone(),
            ctx.new_text.tok(triple[2]).text.clone(),
        )
    } else {
        (
            ctx.new_text.tok(single).text.clone(),
            ctx.old_text.tok(triple[0]).text.clone(),
            ctx.old_text.tok(triple[2]).text.clone(),
        )
    };
    if !single_text.starts_with(&first_text) || !single_text.ends_with(&last_text) {
        return false;
    }

    if single_is_old {
        ctx.old_text
            .refine_token(SplitLevel::Character, ctx.patterns, single);
        for &t in triple {
            ctx.new_text
                .refine_token(SplitLevel::Character, ctx.patterns, t);
        }
    } else {
        ctx.new_text
            .refine_token(SplitLevel::Character, ctx.patterns, single);
        for &t in triple {
            ctx.old_text
                .refine_token(SplitLevel::Character, ctx.patterns, t);
        }
    }
    true
}

/// A token pair qualifies for character refinement when the difference
/// is a single internal insert/delete, a flanking insert/delete, or the
/// texts are at least 50% identical at equal length.
fn pair_is_refinable(a: &[char], b: &[char]) -> bool {
    if a == b {
        return true;
    }
    if a.len() == b.len() {
        let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
        return same * 2 >= a.len();
    }

    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    let prefix = common_prefix_len(a, b);
    let suffix = common_suffix_len(a, b);
    if prefix + suffix >= short.len() {
        return true;
    }
    is_subslice(short, long)
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn is_subslice(needle: &[char], haystack: &[char]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
