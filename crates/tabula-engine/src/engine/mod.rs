//! Spreadsheet engine API.
//!
//! This module provides the computation core for the spreadsheet:
//!
//! - [`CellAddr`] - Cell addressing (A1 notation ↔ row/col indices)
//! - [`CellStore`], [`FormulaStore`] - Sparse raw-text and formula planes
//! - [`extract_refs`], [`parse_sum`] - Formula reference parsing
//! - [`find_cycles`] - Circular reference detection
//! - [`recalculate`] - Bounded fixed-point formula evaluation
//! - [`format_dynamic`] - Format evaluation results for display

mod addr;
mod cycle;
mod eval;
mod format;
mod refs;
mod store;

pub use addr::CellAddr;
pub use cycle::find_cycles;
pub use eval::{ERROR_MARKER, create_engine, eval_formula, recalculate};
pub use format::{format_dynamic, format_number};
pub use refs::{canonicalize_refs, extract_refs, formula_reads, parse_sum};
pub use store::{CellStore, FORMULA_SIGIL, FormulaStore, is_formula_input};

pub use rhai::{Dynamic, Engine};
