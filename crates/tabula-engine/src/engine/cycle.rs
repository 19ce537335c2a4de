//! Circular reference detection for formula cells.
//!
//! A formula chain that revisits one of its own addresses can never reach a
//! fixed point, so the recalculation pass poisons every address on a cycle
//! with the error marker instead of evaluating it. Detection is a
//! depth-first search over the reference graph; edges only lead to other
//! formula addresses, since a literal cell terminates any chain.

use std::collections::{HashMap, HashSet};

use super::addr::CellAddr;
use super::refs::formula_reads;
use super::store::{FORMULA_SIGIL, FormulaStore};

/// Collect every formula address that sits on a reference cycle.
pub fn find_cycles(formulas: &FormulaStore) -> HashSet<CellAddr> {
    let graph: HashMap<CellAddr, Vec<CellAddr>> = formulas
        .iter()
        .map(|(addr, raw)| {
            let body = raw.strip_prefix(FORMULA_SIGIL).unwrap_or(raw);
            let reads = formula_reads(body)
                .into_iter()
                .filter(|read| formulas.contains(read))
                .collect();
            (addr, reads)
        })
        .collect();

    let mut on_cycle = HashSet::new();
    let mut settled = HashSet::new();
    let mut path = Vec::new();
    let mut visiting = HashSet::new();

    for (start, _) in formulas.iter() {
        visit(
            start,
            &graph,
            &mut path,
            &mut visiting,
            &mut settled,
            &mut on_cycle,
        );
    }

    on_cycle
}

fn visit(
    current: CellAddr,
    graph: &HashMap<CellAddr, Vec<CellAddr>>,
    path: &mut Vec<CellAddr>,
    visiting: &mut HashSet<CellAddr>,
    settled: &mut HashSet<CellAddr>,
    on_cycle: &mut HashSet<CellAddr>,
) {
    if settled.contains(&current) {
        return;
    }
    if visiting.contains(&current) {
        // Back edge: everything from the first occurrence of `current` on
        // the path is part of the cycle.
        if let Some(pos) = path.iter().position(|addr| *addr == current) {
            on_cycle.extend(path[pos..].iter().copied());
        }
        return;
    }

    visiting.insert(current);
    path.push(current);

    if let Some(reads) = graph.get(&current) {
        for read in reads {
            visit(*read, graph, path, visiting, settled, on_cycle);
        }
    }

    path.pop();
    visiting.remove(&current);
    settled.insert(current);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(&str, &str)]) -> FormulaStore {
        let mut formulas = FormulaStore::new();
        for (name, raw) in entries {
            formulas.insert(CellAddr::parse(name).unwrap(), raw);
        }
        formulas
    }

    #[test]
    fn test_no_cycle() {
        let formulas = store(&[("C1", "=A1 + B1")]);
        assert!(find_cycles(&formulas).is_empty());
    }

    #[test]
    fn test_direct_cycle() {
        let formulas = store(&[("A1", "=B1"), ("B1", "=A1")]);
        let cycles = find_cycles(&formulas);
        assert!(cycles.contains(&CellAddr::parse("A1").unwrap()));
        assert!(cycles.contains(&CellAddr::parse("B1").unwrap()));
    }

    #[test]
    fn test_indirect_cycle() {
        let formulas = store(&[("A1", "=B1"), ("B1", "=C1"), ("C1", "=A1")]);
        assert_eq!(find_cycles(&formulas).len(), 3);
    }

    #[test]
    fn test_self_reference() {
        let formulas = store(&[("A1", "=A1 + 1")]);
        assert!(find_cycles(&formulas).contains(&CellAddr::parse("A1").unwrap()));
    }

    #[test]
    fn test_reader_of_cycle_is_not_on_it() {
        let formulas = store(&[("A1", "=B1"), ("B1", "=A1"), ("C1", "=B1 + 1")]);
        let cycles = find_cycles(&formulas);
        assert_eq!(cycles.len(), 2);
        assert!(!cycles.contains(&CellAddr::parse("C1").unwrap()));
    }

    #[test]
    fn test_sum_range_participates_in_cycle() {
        // A1 sums a range containing B2, and B2 reads A1 back.
        let formulas = store(&[("A1", "=SUM(B1:B3)"), ("B2", "=A1 * 2")]);
        let cycles = find_cycles(&formulas);
        assert!(cycles.contains(&CellAddr::parse("A1").unwrap()));
        assert!(cycles.contains(&CellAddr::parse("B2").unwrap()));
    }
}
