//! Reference extraction from formula text.
//!
//! Parses formula bodies to find the cell addresses they read: bare
//! reference tokens (`A1`, `b2`) and the whole-body range-sum form
//! `SUM(A1:B5)`. The extracted set drives scope binding, cycle detection,
//! and the recalculation sweep.

use regex::Regex;
use std::sync::OnceLock;

use super::addr::CellAddr;

/// Ranges wider than this are ignored rather than expanded.
const MAX_RANGE_CELLS: usize = 1_000_000;

fn ref_re() -> &'static Regex {
    static REF_RE: OnceLock<Regex> = OnceLock::new();
    REF_RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+)([0-9]+)\b").expect("cell reference regex must compile")
    })
}

fn sum_re() -> &'static Regex {
    static SUM_RE: OnceLock<Regex> = OnceLock::new();
    SUM_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*SUM\(\s*([A-Za-z]+[0-9]+)\s*:\s*([A-Za-z]+[0-9]+)\s*\)\s*$")
            .expect("range sum regex must compile")
    })
}

/// Extract every reference token from an expression body, in order of
/// appearance. Tokens that do not resolve to an address are skipped.
pub fn extract_refs(body: &str) -> Vec<CellAddr> {
    ref_re()
        .captures_iter(body)
        .filter_map(|caps| CellAddr::parse(&format!("{}{}", &caps[1], &caps[2])))
        .collect()
}

/// Rewrite reference tokens to canonical upper-case form so they line up
/// with the scope variables the evaluator binds.
pub fn canonicalize_refs(body: &str) -> String {
    ref_re()
        .replace_all(body, |caps: &regex::Captures| {
            format!("{}{}", caps[1].to_ascii_uppercase(), &caps[2])
        })
        .into_owned()
}

/// Parse the whole-body range-sum pattern `SUM(<start>:<end>)`.
/// Anything beyond the single range call disqualifies the body.
pub fn parse_sum(body: &str) -> Option<(CellAddr, CellAddr)> {
    let caps = sum_re().captures(body)?;
    Some((CellAddr::parse(&caps[1])?, CellAddr::parse(&caps[2])?))
}

/// Every address in the normalized inclusive rectangle between two corners.
pub fn range_cells(start: CellAddr, end: CellAddr) -> Vec<CellAddr> {
    let (row0, row1) = (start.row.min(end.row), start.row.max(end.row));
    let (col0, col1) = (start.col.min(end.col), start.col.max(end.col));

    let Some(count) = (row1 - row0 + 1).checked_mul(col1 - col0 + 1) else {
        return Vec::new();
    };
    if count > MAX_RANGE_CELLS {
        return Vec::new();
    }

    let mut cells = Vec::with_capacity(count);
    for row in row0..=row1 {
        for col in col0..=col1 {
            cells.push(CellAddr::new(row, col));
        }
    }
    cells
}

/// All addresses a formula body reads: a range-sum body expands to the full
/// rectangle, anything else contributes its reference tokens.
pub fn formula_reads(body: &str) -> Vec<CellAddr> {
    match parse_sum(body) {
        Some((start, end)) => range_cells(start, end),
        None => extract_refs(body),
    }
}
