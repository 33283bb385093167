//! Symbol interning.
//!
//! Per the design note in spec §9 ("intern symbols to small integer ids
//! to make per-tick map lookups branch-predictable"), the driver keeps a
//! `SymbolTable` alongside its `String`-keyed portfolio/position maps and
//! uses the interned id for the hot per-tick price-map lookup on the live
//! dispatch path. Everything else (orders, trades, positions) still keys
//! off the plain symbol string, matching the rest of the corpus.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: HashMap<String, SymbolId>,
    by_id: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or assign an id for `symbol`, interning it on first sight.
    pub fn intern(&mut self, symbol: &str) -> SymbolId {
        if let Some(id) = self.by_name.get(symbol) {
            return *id;
        }
        let id = SymbolId(self.by_id.len() as u32);
        self.by_id.push(symbol.to_string());
        self.by_name.insert(symbol.to_string(), id);
        id
    }

    pub fn get(&self, symbol: &str) -> Option<SymbolId> {
        self.by_name.get(symbol).copied()
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.by_id.get(id.0 as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_stably() {
        let mut table = SymbolTable::new();
        let a1 = table.intern("AAPL");
        let a2 = table.intern("AAPL");
        let b = table.intern("MSFT");
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(table.name(a1), Some("AAPL"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn get_without_interning_misses() {
        let table = SymbolTable::new();
        assert_eq!(table.get("AAPL"), None);
    }
}
