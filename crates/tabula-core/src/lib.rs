//! tabula-core - UI-agnostic document model and persistence.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{CellView, Document, RowItem, Sheet, SortOrder};
pub use error::{Result, TabulaError};

pub use tabula_engine::engine::{CellAddr, CellStore, ERROR_MARKER, FormulaStore};
