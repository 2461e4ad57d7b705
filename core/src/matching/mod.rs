//! Token matching between the two revisions.
//!
//! The matcher links NEW/OLD token pairs in place. It runs once per
//! refinement level; each run sees only still-unlinked tokens, so links
//! established at a coarser level bound the gaps explored at the next.
//!
//! - `matcher`: five-pass symbol-table matching (unique anchors, then
//!   downward/upward extension), an empty-table repeat pass for
//!   cross-over duplicates, and recursion into unresolved sub-gaps
//! - `slide`: moves ambiguously placed gaps to newline or word borders
//! - `char_refine`: re-splits same-shape gaps down to characters

pub(crate) mod char_refine;
pub(crate) mod matcher;
pub(crate) mod slide;
pub(crate) mod symbol_table;

use crate::config::DiffConfig;
use crate::patterns::SplitPatterns;
use crate::tokens::VersionText;

/// Shared state for one matching phase.
pub(crate) struct MatchContext<'a> {
    pub(crate) new_text: &'a mut VersionText,
    pub(crate) old_text: &'a mut VersionText,
    pub(crate) config: &'a DiffConfig,
    pub(crate) patterns: &'a SplitPatterns,
}
