//! Sparse cell and formula storage.
//!
//! The sheet keeps two planes over the same address space:
//!
//! - [`CellStore`] holds raw display text. Only non-empty cells occupy
//!   storage; writing trimmed-empty text removes the entry.
//! - [`FormulaStore`] holds the raw formula text (sigil included) for every
//!   address whose latest input began with `=`, and remembers insertion
//!   order, which is the order the recalculation pass sweeps in.
//!
//! Both serialize as string-keyed maps with `"row,col"` composite keys,
//! ordered by address for deterministic output.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::addr::CellAddr;

/// The leading character that marks raw input as a formula.
pub const FORMULA_SIGIL: char = '=';

/// True if raw user input classifies as a formula.
pub fn is_formula_input(raw: &str) -> bool {
    raw.starts_with(FORMULA_SIGIL)
}

/// Sparse map from address to raw cell text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStore {
    cells: HashMap<CellAddr, String>,
}

impl CellStore {
    pub fn new() -> CellStore {
        CellStore::default()
    }

    /// Raw text at an address, or `""` when absent. Never fails.
    pub fn get(&self, addr: &CellAddr) -> &str {
        self.cells.get(addr).map(String::as_str).unwrap_or("")
    }

    /// Insert or overwrite raw text. Trimmed-empty input removes the entry,
    /// which keeps the sparsity invariant: present iff non-empty.
    pub fn set(&mut self, addr: CellAddr, text: &str) {
        if text.trim().is_empty() {
            self.cells.remove(&addr);
        } else {
            self.cells.insert(addr, text.to_string());
        }
    }

    pub fn contains(&self, addr: &CellAddr) -> bool {
        self.cells.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellAddr, &str)> {
        self.cells.iter().map(|(addr, text)| (*addr, text.as_str()))
    }

    /// Maximum occupied (row, col), or None for an empty store.
    /// Used to auto-size exports.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        let mut bounds = None;
        for addr in self.cells.keys() {
            let (max_row, max_col) = bounds.unwrap_or((0, 0));
            bounds = Some((max_row.max(addr.row), max_col.max(addr.col)));
        }
        bounds
    }

    /// Materialize a dense rectangle. Entries outside the bounds are
    /// ignored; missing entries become empty strings.
    pub fn to_dense(&self, row_count: usize, col_count: usize) -> Vec<Vec<String>> {
        let mut dense = vec![vec![String::new(); col_count]; row_count];
        for (addr, text) in &self.cells {
            if addr.row < row_count && addr.col < col_count {
                dense[addr.row][addr.col] = text.clone();
            }
        }
        dense
    }

    /// Rebuild a store from a dense rectangle; empty cells are omitted.
    /// This operates purely on the raw-text plane: any formula
    /// classification held elsewhere for these addresses is not carried.
    pub fn from_dense(rows: &[Vec<String>]) -> CellStore {
        let mut store = CellStore::new();
        for (row, fields) in rows.iter().enumerate() {
            for (col, text) in fields.iter().enumerate() {
                store.set(CellAddr::new(row, col), text);
            }
        }
        store
    }
}

/// Sparse map from address to raw formula text, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FormulaStore {
    formulas: HashMap<CellAddr, String>,
    order: Vec<CellAddr>,
}

impl FormulaStore {
    pub fn new() -> FormulaStore {
        FormulaStore::default()
    }

    /// Insert or overwrite a formula. New addresses append to the sweep
    /// order; overwrites keep their original position.
    pub fn insert(&mut self, addr: CellAddr, raw: &str) {
        if self.formulas.insert(addr, raw.to_string()).is_none() {
            self.order.push(addr);
        }
    }

    pub fn remove(&mut self, addr: &CellAddr) {
        if self.formulas.remove(addr).is_some() {
            self.order.retain(|a| a != addr);
        }
    }

    pub fn get(&self, addr: &CellAddr) -> Option<&str> {
        self.formulas.get(addr).map(String::as_str)
    }

    pub fn contains(&self, addr: &CellAddr) -> bool {
        self.formulas.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Formulas in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (CellAddr, &str)> {
        self.order.iter().filter_map(|addr| {
            self.formulas
                .get(addr)
                .map(|raw| (*addr, raw.as_str()))
        })
    }
}

impl PartialEq for FormulaStore {
    fn eq(&self, other: &Self) -> bool {
        self.formulas == other.formulas
    }
}

fn composite_key(addr: &CellAddr) -> String {
    format!("{},{}", addr.row, addr.col)
}

fn parse_composite_key<E: serde::de::Error>(key: &str) -> Result<CellAddr, E> {
    let parsed = key.split_once(',').and_then(|(row, col)| {
        Some(CellAddr::new(
            row.trim().parse().ok()?,
            col.trim().parse().ok()?,
        ))
    });
    parsed.ok_or_else(|| E::custom(format!("invalid cell key: {:?}", key)))
}

fn serialize_addr_map<S: Serializer>(
    entries: &HashMap<CellAddr, String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by_key(|(addr, _)| **addr);
    let mut map = serializer.serialize_map(Some(sorted.len()))?;
    for (addr, text) in sorted {
        map.serialize_entry(&composite_key(addr), text)?;
    }
    map.end()
}

impl Serialize for CellStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_addr_map(&self.cells, serializer)
    }
}

impl<'de> Deserialize<'de> for CellStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellStoreVisitor;

        impl<'de> Visitor<'de> for CellStoreVisitor {
            type Value = CellStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of \"row,col\" keys to cell text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut store = CellStore::new();
                while let Some((key, text)) = access.next_entry::<String, String>()? {
                    let addr = parse_composite_key(&key)?;
                    store.set(addr, &text);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(CellStoreVisitor)
    }
}

impl Serialize for FormulaStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_addr_map(&self.formulas, serializer)
    }
}

impl<'de> Deserialize<'de> for FormulaStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FormulaStoreVisitor;

        impl<'de> Visitor<'de> for FormulaStoreVisitor {
            type Value = FormulaStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of \"row,col\" keys to formula text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, raw)) = access.next_entry::<String, String>()? {
                    entries.push((parse_composite_key::<A::Error>(&key)?, raw));
                }
                // Sweep order after a load is address order; the fixed
                // point does not depend on it.
                entries.sort_by_key(|(addr, _)| *addr);
                let mut store = FormulaStore::new();
                for (addr, raw) in entries {
                    store.insert(addr, &raw);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(FormulaStoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_empty_removes_entry() {
        let mut store = CellStore::new();
        let addr = CellAddr::new(1, 2);
        store.set(addr, "hello");
        assert_eq!(store.get(&addr), "hello");

        store.set(addr, "   ");
        assert_eq!(store.get(&addr), "");
        assert!(!store.contains(&addr));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_get_absent_is_empty() {
        let store = CellStore::new();
        assert_eq!(store.get(&CellAddr::new(5, 5)), "");
    }

    #[test]
    fn test_dense_round_trip() {
        let mut store = CellStore::new();
        store.set(CellAddr::new(0, 0), "a");
        store.set(CellAddr::new(1, 2), "b");
        store.set(CellAddr::new(9, 9), "out of bounds");

        let dense = store.to_dense(3, 3);
        assert_eq!(dense[0][0], "a");
        assert_eq!(dense[1][2], "b");
        assert_eq!(dense[2][2], "");

        let rebuilt = CellStore::from_dense(&dense);
        assert_eq!(rebuilt.get(&CellAddr::new(0, 0)), "a");
        assert_eq!(rebuilt.get(&CellAddr::new(1, 2)), "b");
        assert_eq!(rebuilt.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let mut store = CellStore::new();
        assert_eq!(store.bounds(), None);
        store.set(CellAddr::new(3, 1), "x");
        store.set(CellAddr::new(0, 7), "y");
        assert_eq!(store.bounds(), Some((3, 7)));
    }

    #[test]
    fn test_formula_store_keeps_insertion_order() {
        let mut store = FormulaStore::new();
        store.insert(CellAddr::new(5, 0), "=A1");
        store.insert(CellAddr::new(0, 0), "=B1");
        store.insert(CellAddr::new(5, 0), "=C1"); // overwrite keeps position

        let order: Vec<CellAddr> = store.iter().map(|(addr, _)| addr).collect();
        assert_eq!(order, vec![CellAddr::new(5, 0), CellAddr::new(0, 0)]);
        assert_eq!(store.get(&CellAddr::new(5, 0)), Some("=C1"));

        store.remove(&CellAddr::new(5, 0));
        let order: Vec<CellAddr> = store.iter().map(|(addr, _)| addr).collect();
        assert_eq!(order, vec![CellAddr::new(0, 0)]);
    }

    #[test]
    fn test_cell_store_serde_composite_keys() {
        let mut store = CellStore::new();
        store.set(CellAddr::new(2, 3), "hi");
        store.set(CellAddr::new(0, 1), "lo");

        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"0,1\":\"lo\""));
        assert!(json.contains("\"2,3\":\"hi\""));

        let back: CellStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_cell_store_serde_rejects_bad_keys() {
        assert!(serde_json::from_str::<CellStore>(r#"{"nope":"x"}"#).is_err());
        assert!(serde_json::from_str::<CellStore>(r#"{"1,two":"x"}"#).is_err());
    }

    #[test]
    fn test_is_formula_input() {
        assert!(is_formula_input("=A1+1"));
        assert!(!is_formula_input("A1+1"));
        assert!(!is_formula_input(" =A1"));
        assert!(!is_formula_input(""));
    }
}
