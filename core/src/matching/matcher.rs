//! Five-pass symbol-table matcher.
//!
//! One invocation links as many NEW/OLD token pairs as possible inside
//! the current range without touching previously linked pairs:
//!
//! 1. Walk NEW, counting unlinked tokens into the symbol table.
//! 2. Walk OLD the same way.
//! 3. Link every token string that occurs exactly once on both sides
//!    (whitespace-only tokens are never anchors). Each link seeds the
//!    downward and upward border lists.
//! 4. Extend every border downward: while both successors are unlinked
//!    and equal, link them.
//! 5. Extend every border upward, symmetrically.
//!
//! At the root level the text boundaries count as connected, so common
//! prefixes and suffixes are linked without symbol-table entries. After
//! the passes the whole procedure repeats once with a fresh table: a
//! token occurring twice on each side can become unique within the
//! unresolved remainder once its twin has been linked (cross-overs).
//! Finally the matcher recurses into each still-unresolved sub-gap
//! bordering a linked run, bounded by `recursion_max`.

use crate::matching::symbol_table::SymbolTable;
use crate::matching::MatchContext;
use crate::patterns::{is_whitespace_only, SplitLevel};
use crate::tokens::{link_pair, TokenId};

/// Root entry point, called once per refinement level.
pub(crate) fn calculate_diff(ctx: &mut MatchContext<'_>, level: SplitLevel, recurse: bool) {
    calculate_range(ctx, level, recurse, false, None, None, false, 0);
}

#[allow(clippy::too_many_arguments)]
fn calculate_range(
    ctx: &mut MatchContext<'_>,
    level: SplitLevel,
    recurse: bool,
    repeating: bool,
    new_start: Option<TokenId>,
    old_start: Option<TokenId>,
    up: bool,
    recursion_level: u32,
) {
    let root = new_start.is_none();
    let mut symbols = SymbolTable::new();

    // Pass 1: populate the symbol table from NEW. Sub-gap walks stop at
    // the first linked token; the root walk spans every gap at once.
    let mut cursor = match new_start {
        Some(id) => Some(id),
        None => ctx.new_text.first,
    };
    while let Some(id) = cursor {
        if ctx.new_text.tok(id).link.is_none() {
            symbols.register_new(&ctx.new_text.tok(id).text, id);
        } else if !root {
            break;
        }
        cursor = if up {
            ctx.new_text.tok(id).prev
        } else {
            ctx.new_text.tok(id).next
        };
    }

    // Pass 2: populate from OLD.
    let mut cursor = match old_start {
        Some(id) => Some(id),
        None => ctx.old_text.first,
    };
    while let Some(id) = cursor {
        if ctx.old_text.tok(id).link.is_none() {
            symbols.register_old(&ctx.old_text.tok(id).text, id);
        } else if !root {
            break;
        }
        cursor = if up {
            ctx.old_text.tok(id).prev
        } else {
            ctx.old_text.tok(id).next
        };
    }

    // Pass 3: link unique pairs and record region borders.
    let mut linked_any = false;
    let mut borders: Vec<(TokenId, TokenId)> = Vec::new();
    for (new_id, old_id) in symbols.unique_pairs() {
        let text = ctx.new_text.tok(new_id).text.clone();
        if is_whitespace_only(&text) {
            continue;
        }
        link_pair(ctx.new_text, ctx.old_text, new_id, old_id);
        linked_any = true;
        borders.push((new_id, old_id));

        if recursion_level == 0 {
            let unique = match level {
                SplitLevel::Character => true,
                _ => token_is_unique(ctx, &text),
            };
            if unique {
                ctx.new_text.tok_mut(new_id).unique = true;
                ctx.old_text.tok_mut(old_id).unique = true;
            }
        }
    }

    // Passes 4 and 5: extend each border through equal unlinked runs.
    let mut borders_down: Vec<(TokenId, TokenId)> = Vec::new();
    let mut borders_up: Vec<(TokenId, TokenId)> = Vec::new();
    for &(n, o) in &borders {
        borders_down.push(extend_down(ctx, n, o));
        borders_up.push(extend_up(ctx, n, o));
    }

    // Text boundaries count as connected at root level.
    if root {
        if let (Some(nf), Some(of)) = (ctx.new_text.first, ctx.old_text.first) {
            if ctx.new_text.tok(nf).link.is_none()
                && ctx.old_text.tok(of).link.is_none()
                && ctx.new_text.tok(nf).text == ctx.old_text.tok(of).text
            {
                link_pair(ctx.new_text, ctx.old_text, nf, of);
                borders_down.push(extend_down(ctx, nf, of));
            }
        }
        if let (Some(nl), Some(ol)) = (ctx.new_text.last, ctx.old_text.last) {
            if ctx.new_text.tok(nl).link.is_none()
                && ctx.old_text.tok(ol).link.is_none()
                && ctx.new_text.tok(nl).text == ctx.old_text.tok(ol).text
            {
                link_pair(ctx.new_text, ctx.old_text, nl, ol);
                borders_up.push(extend_up(ctx, nl, ol));
            }
        }
    }

    // Repeat once with an empty symbol table over the same range; tokens
    // left over after this pass may now be unique within the remainder.
    if !repeating && ctx.config.refine.repeated_diff && linked_any {
        calculate_range(
            ctx,
            level,
            recurse,
            true,
            new_start,
            old_start,
            up,
            recursion_level,
        );
    }

    // Recurse into the unresolved sub-gap past each extended border.
    if recurse
        && ctx.config.refine.recursive_diff
        && recursion_level < ctx.config.refine.recursion_max
    {
        for &(n, o) in &borders_down {
            let (Some(nn), Some(on)) = (ctx.new_text.tok(n).next, ctx.old_text.tok(o).next) else {
                continue;
            };
            if ctx.new_text.tok(nn).link.is_none() && ctx.old_text.tok(on).link.is_none() {
                calculate_range(
                    ctx,
                    level,
                    recurse,
                    false,
                    Some(nn),
                    Some(on),
                    false,
                    recursion_level + 1,
                );
            }
        }
        for &(n, o) in &borders_up {
            let (Some(np), Some(op)) = (ctx.new_text.tok(n).prev, ctx.old_text.tok(o).prev) else {
                continue;
            };
            if ctx.new_text.tok(np).link.is_none() && ctx.old_text.tok(op).link.is_none() {
                calculate_range(
                    ctx,
                    level,
                    recurse,
                    false,
                    Some(np),
                    Some(op),
                    true,
                    recursion_level + 1,
                );
            }
        }
    }
}

/// Link equal unlinked successors of a linked pair; returns the last
/// matching pair (the downward border of the linked region).
fn extend_down(
    ctx: &mut MatchContext<'_>,
    mut new_id: TokenId,
    mut old_id: TokenId,
) -> (TokenId, TokenId) {
    loop {
        let (Some(nn), Some(on)) = (ctx.new_text.tok(new_id).next, ctx.old_text.tok(old_id).next)
        else {
            break;
        };
        if ctx.new_text.tok(nn).link.is_some() || ctx.old_text.tok(on).link.is_some() {
            break;
        }
        if ctx.new_text.tok(nn).text != ctx.old_text.tok(on).text {
            break;
        }
        link_pair(ctx.new_text, ctx.old_text, nn, on);
        new_id = nn;
        old_id = on;
    }
    (new_id, old_id)
}

/// Symmetric upward extension.
fn extend_up(
    ctx: &mut MatchContext<'_>,
    mut new_id: TokenId,
    mut old_id: TokenId,
) -> (TokenId, TokenId) {
    loop {
        let (Some(np), Some(op)) = (ctx.new_text.tok(new_id).prev, ctx.old_text.tok(old_id).prev)
        else {
            break;
        };
        if ctx.new_text.tok(np).link.is_some() || ctx.old_text.tok(op).link.is_some() {
            break;
        }
        if ctx.new_text.tok(np).text != ctx.old_text.tok(op).text {
            break;
        }
        link_pair(ctx.new_text, ctx.old_text, np, op);
        new_id = np;
        old_id = op;
    }
    (new_id, old_id)
}

/// A matched token is a stable block anchor when it carries enough
/// word-like content, or when one of its words occurs exactly once in
/// both revisions.
fn token_is_unique(ctx: &MatchContext<'_>, text: &str) -> bool {
    let words = ctx.patterns.words_and_chunks(text);
    if words.len() >= ctx.config.blocks.block_min_length as usize {
        return true;
    }
    words.iter().any(|word| {
        ctx.new_text.word_counts.get(*word).copied() == Some(1)
            && ctx.old_text.word_counts.get(*word).copied() == Some(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;
    use crate::patterns::SplitPatterns;
    use crate::tokens::VersionText;

    fn run_match(old: &str, new: &str, level: SplitLevel) -> (VersionText, VersionText) {
        let patterns = SplitPatterns::new();
        let config = DiffConfig::default();
        let mut old_text = VersionText::new(old, &patterns, false);
        let mut new_text = VersionText::new(new, &patterns, false);
        old_text.split_initial(level, &patterns);
        new_text.split_initial(level, &patterns);
        let mut ctx = MatchContext {
            new_text: &mut new_text,
            old_text: &mut old_text,
            config: &config,
            patterns: &patterns,
        };
        calculate_diff(&mut ctx, level, true);
        (new_text, old_text)
    }

    fn linked_texts(vt: &VersionText) -> Vec<String> {
        vt.token_ids()
            .iter()
            .filter(|id| vt.tok(**id).link.is_some())
            .map(|id| vt.tok(*id).text.clone())
            .collect()
    }

    #[test]
    fn identical_token_lists_link_fully() {
        let (new_text, old_text) = run_match("a b c", "a b c", SplitLevel::Word);
        assert_eq!(linked_texts(&new_text).concat(), "a b c");
        assert_eq!(linked_texts(&old_text).concat(), "a b c");
    }

    #[test]
    fn links_are_symmetric() {
        let (new_text, old_text) = run_match("x one y", "x two y", SplitLevel::Word);
        for id in new_text.token_ids() {
            if let Some(other) = new_text.tok(id).link {
                assert_eq!(old_text.tok(other).link, Some(id));
            }
        }
    }

    #[test]
    fn replaced_word_stays_unlinked() {
        let (new_text, old_text) =
            run_match("the quick brown fox", "the quick red fox", SplitLevel::Word);
        let unlinked_new: Vec<String> = new_text
            .token_ids()
            .iter()
            .filter(|id| new_text.tok(**id).link.is_none())
            .map(|id| new_text.tok(*id).text.clone())
            .collect();
        assert_eq!(unlinked_new, vec!["red"]);
        let unlinked_old: Vec<String> = old_text
            .token_ids()
            .iter()
            .filter(|id| old_text.tok(**id).link.is_none())
            .map(|id| old_text.tok(*id).text.clone())
            .collect();
        assert_eq!(unlinked_old, vec!["brown"]);
    }

    #[test]
    fn whitespace_is_never_a_unique_anchor() {
        // The lone blank on each side is unique but must not anchor the
        // otherwise unrelated texts.
        let (new_text, _old) = run_match("aaa bbb", "ccc ddd", SplitLevel::Word);
        assert!(linked_texts(&new_text).is_empty());
    }

    #[test]
    fn common_prefix_links_without_unique_anchor() {
        // "a" occurs twice on each side, so only the boundary rule can
        // link the leading run.
        let (new_text, old_text) = run_match("a a x", "a a y", SplitLevel::Word);
        assert!(linked_texts(&new_text).concat().starts_with("a a"));
        assert!(linked_texts(&old_text).concat().starts_with("a a"));
    }

    #[test]
    fn repeated_pass_resolves_cross_over_duplicates() {
        // "dup" occurs twice on each side, so the first pass can only
        // link "anchor" and extend over one neighboring "dup". The
        // remaining "dup" pair becomes unique in the repeat pass.
        let (new_text, _old) = run_match("dup\nanchor\ndup", "anchor\ndup\ndup", SplitLevel::Line);
        let unlinked: Vec<String> = new_text
            .token_ids()
            .iter()
            .filter(|id| new_text.tok(**id).link.is_none())
            .map(|id| new_text.tok(*id).text.clone())
            .collect();
        assert!(
            !unlinked.contains(&"dup".to_owned()),
            "both dup lines should link, left: {unlinked:?}"
        );
    }

    #[test]
    fn unique_attribute_set_for_long_tokens() {
        let patterns = SplitPatterns::new();
        let config = DiffConfig::default();
        let mut old_text = VersionText::new("alpha beta gamma\nzzz", &patterns, false);
        let mut new_text = VersionText::new("alpha beta gamma\nyyy", &patterns, false);
        old_text.split_initial(SplitLevel::Line, &patterns);
        new_text.split_initial(SplitLevel::Line, &patterns);
        let mut ctx = MatchContext {
            new_text: &mut new_text,
            old_text: &mut old_text,
            config: &config,
            patterns: &patterns,
        };
        calculate_diff(&mut ctx, SplitLevel::Line, false);

        let first = new_text.token_ids()[0];
        assert_eq!(new_text.tok(first).text, "alpha beta gamma");
        assert!(new_text.tok(first).link.is_some());
        assert!(new_text.tok(first).unique, "three words reach block_min_length");
    }
}
