//! Formula evaluation and the recalculation pass.
//!
//! A formula body is either the range-sum form `SUM(<start>:<end>)`,
//! computed directly against the cell snapshot, or a general arithmetic
//! expression handed to Rhai with every referenced address bound as a
//! numeric scope variable. Recalculation sweeps the formula store to a
//! fixed point with a bounded pass count; cycles are poisoned up front so
//! the sweep always terminates.

use rhai::{Dynamic, Engine, Scope};
use std::collections::HashSet;

use super::addr::CellAddr;
use super::cycle::find_cycles;
use super::format::{format_dynamic, format_number};
use super::refs::{canonicalize_refs, extract_refs, parse_sum, range_cells};
use super::store::{CellStore, FORMULA_SIGIL, FormulaStore};

/// Marker stored in place of a value when evaluation fails.
pub const ERROR_MARKER: &str = "#ERROR";

/// Create the expression engine shared by a document.
pub fn create_engine() -> Engine {
    Engine::new()
}

/// Read a cell as a number; absent or non-numeric text reads as zero.
fn numeric_value(cells: &CellStore, addr: &CellAddr) -> f64 {
    cells.get(addr).trim().parse::<f64>().unwrap_or(0.0)
}

/// Whether a float can be bound and printed as an integer without loss.
fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

/// Evaluate one formula body against the current cell snapshot.
/// Any failure resolves to [`ERROR_MARKER`]; this never returns an error.
pub fn eval_formula(engine: &Engine, cells: &CellStore, body: &str) -> String {
    if let Some((start, end)) = parse_sum(body) {
        let sum: f64 = range_cells(start, end)
            .iter()
            .map(|addr| numeric_value(cells, addr))
            .sum();
        return format_number(sum).unwrap_or_else(|| ERROR_MARKER.to_string());
    }

    let expr = canonicalize_refs(body);
    let mut scope = Scope::new();
    let mut bound: HashSet<CellAddr> = HashSet::new();
    for addr in extract_refs(&expr) {
        if !bound.insert(addr) {
            continue;
        }
        let n = numeric_value(cells, &addr);
        // Integral operands bind as integers so that division by zero
        // raises instead of producing an infinity.
        if is_integral(n) {
            scope.push(addr.to_string(), n as i64);
        } else {
            scope.push(addr.to_string(), n);
        }
    }

    match engine.eval_expression_with_scope::<Dynamic>(&mut scope, &expr) {
        Ok(value) => format_dynamic(&value).unwrap_or_else(|| ERROR_MARKER.to_string()),
        Err(_) => ERROR_MARKER.to_string(),
    }
}

/// Run a full recalculation: poison cycles, then sweep the formulas in
/// insertion order until a pass changes nothing. Returns true if any cell
/// changed.
pub fn recalculate(engine: &Engine, cells: &mut CellStore, formulas: &FormulaStore) -> bool {
    let cyclic = find_cycles(formulas);
    let mut changed_any = false;
    for addr in &cyclic {
        if cells.get(addr) != ERROR_MARKER {
            cells.set(*addr, ERROR_MARKER);
            changed_any = true;
        }
    }

    // A dependency chain is at most `len` formulas deep, so the sweep
    // reaches its fixed point within len + 1 passes even when sweep order
    // and dependency order disagree.
    for _pass in 0..formulas.len() + 1 {
        let mut changed = false;
        for (addr, raw) in formulas.iter() {
            if cyclic.contains(&addr) {
                continue;
            }
            let body = raw.strip_prefix(FORMULA_SIGIL).unwrap_or(raw);
            let value = eval_formula(engine, cells, body);
            if cells.get(&addr) != value {
                cells.set(addr, &value);
                changed = true;
            }
        }
        if !changed {
            break;
        }
        changed_any = true;
    }

    changed_any
}
