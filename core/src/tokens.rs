//! Token arena and per-revision text state.
//!
//! Tokens live in a contiguous arena addressed by `TokenId`; the active
//! token list is threaded through `prev`/`next` indices starting at
//! `first`. Refining a token appends its sub-tokens to the arena and
//! rewires the neighbors; the refined token stays in the arena but
//! becomes unreachable from the active list. Its own `prev`/`next` are
//! left untouched so an in-flight walk over stale pointers still finds
//! the rest of the list.

use rustc_hash::FxHashMap;

use crate::fragment::DiffError;
use crate::patterns::{SplitLevel, SplitPatterns};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TokenId(pub(crate) u32);

#[derive(Debug, Clone)]
pub(crate) struct Token {
    /// The substring; never mutated after creation.
    pub(crate) text: String,
    pub(crate) prev: Option<TokenId>,
    pub(crate) next: Option<TokenId>,
    /// Matched counterpart in the other revision's arena.
    pub(crate) link: Option<TokenId>,
    /// Positional ordinal in the final linearized list.
    pub(crate) number: usize,
    /// Stable anchor for block identity.
    pub(crate) unique: bool,
}

/// One revision of the text under diff.
#[derive(Debug)]
pub(crate) struct VersionText {
    pub(crate) text: String,
    tokens: Vec<Token>,
    pub(crate) first: Option<TokenId>,
    pub(crate) last: Option<TokenId>,
    /// Occurrence counts of word-like substrings and wiki atoms, used by
    /// the uniqueness heuristic.
    pub(crate) word_counts: FxHashMap<String, u32>,
}

impl VersionText {
    pub(crate) fn new(raw: &str, patterns: &SplitPatterns, strip_trailing_newline: bool) -> Self {
        let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");
        if strip_trailing_newline && text.ends_with('\n') {
            text.pop();
        }

        let mut word_counts: FxHashMap<String, u32> = FxHashMap::default();
        for word in patterns.words_and_chunks(&text) {
            *word_counts.entry(word.to_owned()).or_insert(0) += 1;
        }

        Self {
            text,
            tokens: Vec::new(),
            first: None,
            last: None,
            word_counts,
        }
    }

    pub(crate) fn tok(&self, id: TokenId) -> &Token {
        &self.tokens[id.0 as usize]
    }

    pub(crate) fn tok_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id.0 as usize]
    }

    pub(crate) fn next_of(&self, id: TokenId) -> Option<TokenId> {
        self.tok(id).next
    }

    pub(crate) fn prev_of(&self, id: TokenId) -> Option<TokenId> {
        self.tok(id).prev
    }

    /// Initial split of the full text into tokens at the given level.
    pub(crate) fn split_initial(&mut self, level: SplitLevel, patterns: &SplitPatterns) {
        self.split_token(level, patterns, None);
    }

    /// Re-split every still-unlinked token at the given (finer) level.
    pub(crate) fn split_refine(&mut self, level: SplitLevel, patterns: &SplitPatterns) {
        let mut cursor = self.first;
        while let Some(id) = cursor {
            // Capture before splitting; the tombstoned token keeps its
            // outgoing pointer, and freshly inserted sub-tokens are
            // already at the target level.
            cursor = self.tok(id).next;
            if self.tok(id).link.is_none() {
                self.split_token(level, patterns, Some(id));
            }
        }
    }

    /// Re-split a single token at the given level (character refinement).
    pub(crate) fn refine_token(&mut self, level: SplitLevel, patterns: &SplitPatterns, id: TokenId) {
        self.split_token(level, patterns, Some(id));
    }

    /// Split one token (or the whole text) into pieces and wire them into
    /// the active list in place of the original.
    fn split_token(&mut self, level: SplitLevel, patterns: &SplitPatterns, target: Option<TokenId>) {
        let (text, prev, next) = match target {
            Some(id) => {
                let t = self.tok(id);
                (t.text.clone(), t.prev, t.next)
            }
            None => (self.text.clone(), None, None),
        };

        let pieces = patterns.split_pieces(level, &text);
        if target.is_some() && pieces.len() <= 1 {
            // Nothing finer to produce; keep the original reachable.
            return;
        }

        let mut first_new: Option<TokenId> = None;
        let mut prev_new: Option<TokenId> = None;
        for piece in pieces {
            let id = TokenId(self.tokens.len() as u32);
            self.tokens.push(Token {
                text: piece,
                prev: prev_new,
                next: None,
                link: None,
                number: 0,
                unique: false,
            });
            if let Some(p) = prev_new {
                self.tok_mut(p).next = Some(id);
            }
            if first_new.is_none() {
                first_new = Some(id);
            }
            prev_new = Some(id);
        }
        let last_new = prev_new;

        if let Some(f) = first_new {
            self.tok_mut(f).prev = prev;
        }
        if let Some(l) = last_new {
            self.tok_mut(l).next = next;
        }
        match prev {
            Some(p) => self.tok_mut(p).next = first_new,
            None => self.first = first_new,
        }
        match next {
            Some(n) => self.tok_mut(n).prev = last_new,
            None => self.last = last_new,
        }
    }

    /// Assign each reachable token its final positional ordinal.
    pub(crate) fn enumerate(&mut self) {
        let mut number = 0usize;
        let mut cursor = self.first;
        while let Some(id) = cursor {
            self.tok_mut(id).number = number;
            number += 1;
            cursor = self.tok(id).next;
        }
    }

    /// Active token ids in list order.
    pub(crate) fn token_ids(&self) -> Vec<TokenId> {
        let mut ids = Vec::new();
        let mut cursor = self.first;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.tok(id).next;
        }
        ids
    }

    /// Verify arena and linked-list invariants. Cheap enough for the
    /// `unit_testing` mode; not run otherwise.
    pub(crate) fn check_consistency(&self) -> Result<(), DiffError> {
        let mut seen = vec![false; self.tokens.len()];
        let mut prev: Option<TokenId> = None;
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let idx = id.0 as usize;
            if idx >= self.tokens.len() {
                return Err(DiffError::Tokenizer(format!(
                    "token id {} out of bounds",
                    id.0
                )));
            }
            if seen[idx] {
                return Err(DiffError::Tokenizer(format!(
                    "token id {} visited twice (cycle)",
                    id.0
                )));
            }
            seen[idx] = true;
            let token = self.tok(id);
            if token.prev != prev {
                return Err(DiffError::Tokenizer(format!(
                    "token id {} has inconsistent prev pointer",
                    id.0
                )));
            }
            if token.text.is_empty() {
                return Err(DiffError::Tokenizer(format!("token id {} is empty", id.0)));
            }
            prev = Some(id);
            cursor = token.next;
        }
        if prev != self.last {
            return Err(DiffError::Tokenizer(
                "last pointer does not terminate the list".to_owned(),
            ));
        }
        Ok(())
    }

    /// Concatenation of the active token list; must equal `self.text`.
    pub(crate) fn joined(&self) -> String {
        let mut out = String::new();
        let mut cursor = self.first;
        while let Some(id) = cursor {
            out.push_str(&self.tok(id).text);
            cursor = self.tok(id).next;
        }
        out
    }

    /// Release the arena once block detection no longer needs it.
    pub(crate) fn release(&mut self) {
        self.tokens = Vec::new();
        self.first = None;
        self.last = None;
        self.word_counts = FxHashMap::default();
    }
}

/// Link a NEW/OLD token pair symmetrically.
pub(crate) fn link_pair(
    new_text: &mut VersionText,
    old_text: &mut VersionText,
    new_id: TokenId,
    old_id: TokenId,
) {
    new_text.tok_mut(new_id).link = Some(old_id);
    old_text.tok_mut(old_id).link = Some(new_id);
}

/// Remove the link of an OLD token and its NEW counterpart.
pub(crate) fn unlink_pair(
    new_text: &mut VersionText,
    old_text: &mut VersionText,
    old_id: TokenId,
) {
    if let Some(new_id) = old_text.tok(old_id).link {
        new_text.tok_mut(new_id).link = None;
    }
    old_text.tok_mut(old_id).link = None;
}
