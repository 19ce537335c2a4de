//! Sheet and document state.

use rhai::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use tabula_engine::engine::{CellAddr, CellStore, FormulaStore, create_engine};

/// Initial sheet bounds.
pub(crate) const DEFAULT_ROWS: usize = 22;
pub(crate) const DEFAULT_COLS: usize = 14;

/// Default row height (layout units).
pub const DEFAULT_ROW_HEIGHT: f32 = 34.0;
/// Default column width (layout units).
pub const DEFAULT_COL_WIDTH: f32 = 126.0;

/// Bounds grow by this many rows/columns at a time.
pub(crate) const GROW_STEP: usize = 10;
/// An edit within this many rows/columns of the boundary triggers growth.
pub(crate) const GROW_MARGIN: usize = 2;

/// Sort direction for a column-header sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One spreadsheet tab: the cell/formula planes, layout arrays, and the
/// interaction and view state that drives the derived row sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub cells: CellStore,
    pub formulas: FormulaStore,
    pub row_count: usize,
    pub col_count: usize,
    /// One height per row.
    #[serde(default)]
    pub row_heights: Vec<f32>,
    /// One width per display column; slot 0 is the row-number gutter.
    #[serde(default)]
    pub col_widths: Vec<f32>,
    /// Logical column indices in display order. Reordering columns
    /// permutes this array and never moves cell data.
    #[serde(default)]
    pub column_order: Vec<usize>,
    #[serde(default)]
    pub focused: Option<CellAddr>,
    #[serde(default)]
    pub selection_start: Option<CellAddr>,
    #[serde(default)]
    pub selection_end: Option<CellAddr>,
    #[serde(default)]
    pub is_selecting: bool,
    #[serde(default)]
    pub sort_column: Option<usize>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    /// Per-column case-insensitive substring filters.
    #[serde(default)]
    pub filters: BTreeMap<usize, String>,
    #[serde(default)]
    pub grouping_column: Option<usize>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Sheet {
        Sheet {
            name: name.into(),
            cells: CellStore::new(),
            formulas: FormulaStore::new(),
            row_count: DEFAULT_ROWS,
            col_count: DEFAULT_COLS,
            row_heights: vec![DEFAULT_ROW_HEIGHT; DEFAULT_ROWS],
            col_widths: vec![DEFAULT_COL_WIDTH; DEFAULT_COLS + 1],
            column_order: (0..DEFAULT_COLS).collect(),
            focused: None,
            selection_start: None,
            selection_end: None,
            is_selecting: false,
            sort_column: None,
            sort_order: None,
            filters: BTreeMap::new(),
            grouping_column: None,
        }
    }

    /// Grow the bounds when an edit lands within the margin of the
    /// boundary. Bounds only ever grow.
    pub(crate) fn ensure_capacity(&mut self, addr: CellAddr) {
        while addr.row + GROW_MARGIN >= self.row_count {
            self.row_count += GROW_STEP;
        }
        while addr.col + GROW_MARGIN >= self.col_count {
            self.col_count += GROW_STEP;
        }
        self.repair_layout();
    }

    /// Pad layout arrays that are missing entries or shorter than the
    /// declared bounds, and restore `column_order` to a permutation of the
    /// logical columns (invalid or duplicate entries are dropped, missing
    /// indices are appended in order).
    pub(crate) fn repair_layout(&mut self) {
        if self.row_heights.len() < self.row_count {
            self.row_heights.resize(self.row_count, DEFAULT_ROW_HEIGHT);
        }
        if self.col_widths.len() < self.col_count + 1 {
            self.col_widths.resize(self.col_count + 1, DEFAULT_COL_WIDTH);
        }

        let mut seen = vec![false; self.col_count];
        self.column_order
            .retain(|&col| col < seen.len() && !std::mem::replace(&mut seen[col], true));
        for (col, was_seen) in seen.iter().enumerate() {
            if !was_seen {
                self.column_order.push(col);
            }
        }
    }
}

fn default_engine() -> Engine {
    create_engine()
}

/// The whole workbook: an ordered list of sheets and the active index.
/// Owns the expression engine shared by every sheet's recalculation.
///
/// Exactly `sheets` and `active_sheet_index` persist; everything else is
/// runtime state.
#[derive(Serialize, Deserialize)]
pub struct Document {
    pub sheets: Vec<Sheet>,
    pub active_sheet_index: usize,
    #[serde(skip, default = "default_engine")]
    pub(crate) engine: Engine,
    #[serde(skip)]
    pub modified: bool,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl Document {
    /// Create a document with a single default sheet.
    pub fn new() -> Document {
        Document {
            sheets: vec![Sheet::new("Sheet1")],
            active_sheet_index: 0,
            engine: create_engine(),
            modified: false,
            file_path: None,
        }
    }

    /// The active sheet.
    pub fn sheet(&self) -> &Sheet {
        &self.sheets[self.active_sheet_index]
    }

    /// The active sheet, mutably.
    pub fn sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[self.active_sheet_index]
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
