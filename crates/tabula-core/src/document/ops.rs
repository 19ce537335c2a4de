//! Mutation entry points on the document.
//!
//! Everything that changes sheet state funnels through these methods; each
//! one runs to completion (including recalculation where cell text can
//! change) before returning. Invalid requests (sub-floor resizes, deleting
//! the last sheet, out-of-range indices) are silent no-ops.

use std::cmp::Ordering;

use tabula_engine::engine::{CellAddr, CellStore, is_formula_input, recalculate};

use super::layout::{MIN_COL_WIDTH, MIN_ROW_HEIGHT};
use super::state::{Document, Sheet, SortOrder};

impl Document {
    /// Apply one raw edit to the active sheet. This is the single entry
    /// point through which cell and formula entries change.
    ///
    /// Input starting with `=` classifies the address as a formula; the raw
    /// text lands in the cell plane either way, and recalculation then
    /// overwrites formula cells with their computed values.
    pub fn edit_cell(&mut self, addr: CellAddr, raw: &str) {
        let sheet = self.sheet_mut();
        sheet.ensure_capacity(addr);
        if is_formula_input(raw) {
            sheet.formulas.insert(addr, raw);
        } else {
            sheet.formulas.remove(&addr);
        }
        sheet.cells.set(addr, raw);
        self.modified = true;
        self.recalculate_active();
    }

    /// Re-evaluate the active sheet's formulas against its cells.
    pub fn recalculate_active(&mut self) {
        let sheet = &mut self.sheets[self.active_sheet_index];
        recalculate(&self.engine, &mut sheet.cells, &sheet.formulas);
    }

    /// Column-header sort interaction: none -> ascending -> descending ->
    /// none. Ascending/descending physically reorder the sheet's literal
    /// text; returning to none only clears the indicator.
    pub fn toggle_sort(&mut self, col: usize) {
        let sheet = self.sheet_mut();
        let next = if sheet.sort_column == Some(col) {
            match sheet.sort_order {
                Some(SortOrder::Ascending) => Some(SortOrder::Descending),
                Some(SortOrder::Descending) => None,
                None => Some(SortOrder::Ascending),
            }
        } else {
            Some(SortOrder::Ascending)
        };

        match next {
            Some(order) => {
                sheet.sort_column = Some(col);
                sheet.sort_order = Some(order);
                sort_rows(sheet, col, order);
                self.modified = true;
                self.recalculate_active();
            }
            None => {
                sheet.sort_column = None;
                sheet.sort_order = None;
                self.modified = true;
            }
        }
    }

    /// Set the substring filter for a column. The empty substring matches
    /// every row, so it still counts as an active filter.
    pub fn set_filter(&mut self, col: usize, substring: impl Into<String>) {
        self.sheet_mut().filters.insert(col, substring.into());
        self.modified = true;
    }

    pub fn clear_filter(&mut self, col: usize) {
        self.sheet_mut().filters.remove(&col);
        self.modified = true;
    }

    pub fn clear_filters(&mut self) {
        self.sheet_mut().filters.clear();
        self.modified = true;
    }

    pub fn set_grouping(&mut self, col: Option<usize>) {
        self.sheet_mut().grouping_column = col;
        self.modified = true;
    }

    /// Set one row's height. Heights below the floor are ignored.
    pub fn resize_row(&mut self, row: usize, height: f32) {
        if height < MIN_ROW_HEIGHT {
            return;
        }
        let sheet = self.sheet_mut();
        let Some(slot) = sheet.row_heights.get_mut(row) else {
            return;
        };
        *slot = height;
        self.modified = true;
    }

    /// Set one display column's width. Widths below the floor are ignored.
    pub fn resize_column(&mut self, display_col: usize, width: f32) {
        if width < MIN_COL_WIDTH {
            return;
        }
        let sheet = self.sheet_mut();
        let Some(slot) = sheet.col_widths.get_mut(display_col) else {
            return;
        };
        *slot = width;
        self.modified = true;
    }

    /// Move a display column to a new display position. Only the
    /// column-order permutation changes; cell data never moves.
    pub fn move_column(&mut self, from: usize, to: usize) {
        let sheet = self.sheet_mut();
        if from >= sheet.column_order.len() || to >= sheet.column_order.len() {
            return;
        }
        let col = sheet.column_order.remove(from);
        sheet.column_order.insert(to, col);
        self.modified = true;
    }

    pub fn set_focus(&mut self, addr: Option<CellAddr>) {
        self.sheet_mut().focused = addr;
    }

    pub fn begin_selection(&mut self, addr: CellAddr) {
        let sheet = self.sheet_mut();
        sheet.selection_start = Some(addr);
        sheet.selection_end = Some(addr);
        sheet.is_selecting = true;
    }

    /// Extend the selection while a drag is in progress.
    pub fn update_selection(&mut self, addr: CellAddr) {
        let sheet = self.sheet_mut();
        if sheet.is_selecting {
            sheet.selection_end = Some(addr);
        }
    }

    pub fn end_selection(&mut self) {
        self.sheet_mut().is_selecting = false;
    }

    /// Append a new default sheet and make it active. Returns its index.
    pub fn add_sheet(&mut self) -> usize {
        let mut n = self.sheets.len() + 1;
        let mut name = format!("Sheet{n}");
        while self.sheets.iter().any(|sheet| sheet.name == name) {
            n += 1;
            name = format!("Sheet{n}");
        }
        self.sheets.push(Sheet::new(name));
        self.active_sheet_index = self.sheets.len() - 1;
        self.modified = true;
        self.active_sheet_index
    }

    /// Remove a sheet. Deleting the last remaining sheet is a no-op; the
    /// active index re-targets the same or nearest-lower surviving sheet.
    pub fn delete_sheet(&mut self, index: usize) {
        if self.sheets.len() <= 1 || index >= self.sheets.len() {
            return;
        }
        self.sheets.remove(index);
        if self.active_sheet_index >= self.sheets.len() {
            self.active_sheet_index = self.sheets.len() - 1;
        } else if self.active_sheet_index > index {
            self.active_sheet_index -= 1;
        }
        self.modified = true;
    }

    /// Switch the active sheet. Out-of-range indices are ignored.
    pub fn set_active_sheet(&mut self, index: usize) {
        if index < self.sheets.len() {
            self.active_sheet_index = index;
        }
    }
}

/// Stable in-place sort of the sheet's literal text by one column.
///
/// The whole sheet is materialized densely, row-sorted, and written back,
/// replacing the cell plane. Formula entries, filters, and row heights stay
/// keyed by their pre-sort rows.
fn sort_rows(sheet: &mut Sheet, col: usize, order: SortOrder) {
    let mut rows = sheet.cells.to_dense(sheet.row_count, sheet.col_count);
    rows.sort_by(|a, b| {
        let left = a.get(col).map(String::as_str).unwrap_or("");
        let right = b.get(col).map(String::as_str).unwrap_or("");
        let ordering = compare_cell_text(left, right);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    sheet.cells = CellStore::from_dense(&rows);
}

/// Numbers order by value and sort ahead of text; text compares
/// lexicographically.
fn compare_cell_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>().ok(), b.parse::<f64>().ok()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
