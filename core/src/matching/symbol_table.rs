//! Symbol table for one matching pass.
//!
//! Maps each distinct token string to its occurrence counts and
//! last-seen arena indices on both sides. Entries keep insertion order
//! so unique-pair linking walks the NEW text front to back.

use rustc_hash::FxHashMap;

use crate::tokens::TokenId;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Symbol {
    pub(crate) new_count: u32,
    pub(crate) old_count: u32,
    pub(crate) new_token: Option<TokenId>,
    pub(crate) old_token: Option<TokenId>,
}

#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    entries: Vec<Symbol>,
    index: FxHashMap<String, usize>,
}

impl SymbolTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register_new(&mut self, text: &str, id: TokenId) {
        let slot = self.slot(text);
        let symbol = &mut self.entries[slot];
        symbol.new_count += 1;
        symbol.new_token = Some(id);
    }

    pub(crate) fn register_old(&mut self, text: &str, id: TokenId) {
        let slot = self.slot(text);
        let symbol = &mut self.entries[slot];
        symbol.old_count += 1;
        symbol.old_token = Some(id);
    }

    fn slot(&mut self, text: &str) -> usize {
        if let Some(&i) = self.index.get(text) {
            return i;
        }
        let i = self.entries.len();
        self.entries.push(Symbol::default());
        self.index.insert(text.to_owned(), i);
        i
    }

    /// Token pairs unique on both sides, in NEW-walk insertion order.
    pub(crate) fn unique_pairs(&self) -> Vec<(TokenId, TokenId)> {
        self.entries
            .iter()
            .filter(|s| s.new_count == 1 && s.old_count == 1)
            .filter_map(|s| Some((s.new_token?, s.old_token?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_pairs_require_both_counts_one() {
        let mut table = SymbolTable::new();
        table.register_new("a", TokenId(0));
        table.register_new("b", TokenId(1));
        table.register_new("b", TokenId(2));
        table.register_old("a", TokenId(10));
        table.register_old("b", TokenId(11));
        table.register_old("c", TokenId(12));

        let pairs = table.unique_pairs();
        assert_eq!(pairs, vec![(TokenId(0), TokenId(10))]);
    }

    #[test]
    fn last_seen_token_wins() {
        let mut table = SymbolTable::new();
        table.register_new("x", TokenId(3));
        table.register_old("x", TokenId(7));
        table.register_old("x", TokenId(9));
        // Two old occurrences: not unique, regardless of pointers.
        assert!(table.unique_pairs().is_empty());
    }
}
