//! Document persistence and the dense-array import/export boundary.
//!
//! A document persists as one JSON record holding exactly the sheets array
//! and the active index. Loading is transactional: the whole record parses
//! before any document exists, and sheets with missing or short layout
//! arrays are repaired with defaults before use.

use std::path::Path;

use tabula_engine::engine::CellStore;

use crate::error::{Result, TabulaError};
use crate::storage::csv::{parse_csv_content, write_csv_content};

use super::state::{Document, Sheet};

impl Document {
    /// Serialize to the persisted JSON layout.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a persisted document and repair its layout arrays.
    pub fn from_json(json: &str) -> Result<Document> {
        let mut doc: Document = serde_json::from_str(json)?;
        doc.repair();
        Ok(doc)
    }

    /// Restore invariants a hand-edited or older persisted record may have
    /// lost: at least one sheet, a valid active index, and layout arrays
    /// padded to the declared bounds.
    fn repair(&mut self) {
        if self.sheets.is_empty() {
            self.sheets.push(Sheet::new("Sheet1"));
        }
        if self.active_sheet_index >= self.sheets.len() {
            self.active_sheet_index = self.sheets.len() - 1;
        }
        for sheet in &mut self.sheets {
            sheet.repair_layout();
        }
    }

    /// Save to a path and clear the modified flag.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        self.modified = false;
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Load from a path. Parse failures construct no document at all.
    pub fn load_from(path: &Path) -> Result<Document> {
        let json = std::fs::read_to_string(path)?;
        let mut doc = Document::from_json(&json)?;
        doc.file_path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Replace the active sheet's cell plane from a dense array, growing
    /// bounds to fit. This is the bulk-replace half of the serialization
    /// boundary: it moves raw text only and leaves the formula plane as it
    /// was, exactly like sort.
    pub fn import_dense(&mut self, rows: &[Vec<String>]) {
        let row_count = rows.len();
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);

        let sheet = self.sheet_mut();
        sheet.cells = CellStore::from_dense(rows);
        sheet.row_count = sheet.row_count.max(row_count);
        sheet.col_count = sheet.col_count.max(col_count);
        sheet.repair_layout();

        self.modified = true;
        self.recalculate_active();
    }

    /// Dense snapshot of the active sheet over its full bounds.
    pub fn export_dense(&self) -> Vec<Vec<String>> {
        let sheet = self.sheet();
        sheet.cells.to_dense(sheet.row_count, sheet.col_count)
    }

    /// Import CSV text into the active sheet. Malformed input fails before
    /// any sheet state changes; a vacuous import (no non-empty field) is
    /// rejected too. Returns the number of imported cells.
    pub fn import_csv(&mut self, content: &str) -> Result<usize> {
        let rows = parse_csv_content(content)?;
        let count = rows
            .iter()
            .flatten()
            .filter(|field| !field.trim().is_empty())
            .count();
        if count == 0 {
            return Err(TabulaError::EmptyCsv);
        }
        self.import_dense(&rows);
        Ok(count)
    }

    /// The active sheet as CSV text, trimmed to its occupied bounds.
    pub fn export_csv(&self) -> String {
        let sheet = self.sheet();
        let Some((max_row, max_col)) = sheet.cells.bounds() else {
            return String::new();
        };
        write_csv_content(&sheet.cells.to_dense(max_row + 1, max_col + 1))
    }

    /// Read a CSV file into the active sheet.
    pub fn import_csv_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.import_csv(&content)
    }

    /// Write the active sheet to a CSV file.
    pub fn export_csv_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.export_csv())?;
        Ok(())
    }
}
