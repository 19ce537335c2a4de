//! The derived row view: filter -> group, plus window resolution.
//!
//! These are pure functions over sheet state; they never mutate it. Sort is
//! not part of this pipeline — it physically reorders cell text and lives
//! with the other mutations in `ops`.

use std::ops::Range;

use tabula_engine::engine::CellAddr;

use super::state::Sheet;

/// One item in the derived row sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowItem {
    /// A data row, by sheet row index.
    Row(usize),
    /// A synthetic header introducing a group bucket, carrying the
    /// bucket's cell text (empty text is its own bucket).
    GroupHeader(String),
}

/// One resolved cell for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct CellView {
    pub addr: CellAddr,
    pub display: String,
    pub is_selected: bool,
    pub is_focused: bool,
}

/// Row indices that pass every column filter, ascending.
///
/// A row passes a (column, substring) filter iff the cell text at that
/// column contains the substring case-insensitively; the empty substring
/// matches everything, including empty cells.
pub fn filtered_row_indices(sheet: &Sheet) -> Vec<usize> {
    let needles: Vec<(usize, String)> = sheet
        .filters
        .iter()
        .map(|(&col, needle)| (col, needle.to_lowercase()))
        .collect();

    (0..sheet.row_count)
        .filter(|&row| {
            needles.iter().all(|(col, needle)| {
                sheet
                    .cells
                    .get(&CellAddr::new(row, *col))
                    .to_lowercase()
                    .contains(needle.as_str())
            })
        })
        .collect()
}

/// The derived row sequence: filtered rows, bucketed under group headers
/// when a grouping column is set. Buckets appear in first-seen order; each
/// bucket's rows keep their ascending order.
pub fn grouped_items(sheet: &Sheet) -> Vec<RowItem> {
    let filtered = filtered_row_indices(sheet);
    let Some(group_col) = sheet.grouping_column else {
        return filtered.into_iter().map(RowItem::Row).collect();
    };

    let mut buckets: Vec<(String, Vec<usize>)> = Vec::new();
    for row in filtered {
        let value = sheet.cells.get(&CellAddr::new(row, group_col)).to_string();
        match buckets.iter_mut().find(|(label, _)| *label == value) {
            Some((_, rows)) => rows.push(row),
            None => buckets.push((value, vec![row])),
        }
    }

    let mut items = Vec::new();
    for (label, rows) in buckets {
        items.push(RowItem::GroupHeader(label));
        items.extend(rows.into_iter().map(RowItem::Row));
    }
    items
}

/// Resolve a window of sheet rows x display columns into presentation
/// tuples. Display columns map through the column-order permutation; a
/// focused formula cell shows its raw formula text so it can be edited.
pub fn resolve_window(
    sheet: &Sheet,
    rows: Range<usize>,
    display_cols: Range<usize>,
) -> Vec<CellView> {
    let selection = selection_rect(sheet);
    let mut views = Vec::new();

    for row in rows {
        if row >= sheet.row_count {
            break;
        }
        for display_col in display_cols.clone() {
            let Some(&col) = sheet.column_order.get(display_col) else {
                continue;
            };
            let addr = CellAddr::new(row, col);
            let is_focused = sheet.focused == Some(addr);
            let display = if is_focused && let Some(raw) = sheet.formulas.get(&addr) {
                raw.to_string()
            } else {
                sheet.cells.get(&addr).to_string()
            };
            let is_selected = selection.is_some_and(|(row0, col0, row1, col1)| {
                row >= row0 && row <= row1 && col >= col0 && col <= col1
            });
            views.push(CellView {
                addr,
                display,
                is_selected,
                is_focused,
            });
        }
    }
    views
}

/// Normalized (row0, col0, row1, col1) of the current selection rectangle.
fn selection_rect(sheet: &Sheet) -> Option<(usize, usize, usize, usize)> {
    let start = sheet.selection_start?;
    let end = sheet.selection_end?;
    Some((
        start.row.min(end.row),
        start.col.min(end.col),
        start.row.max(end.row),
        start.col.max(end.col),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn addr(name: &str) -> CellAddr {
        CellAddr::parse(name).unwrap()
    }

    #[test]
    fn test_filter_substring_case_insensitive() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "xABz");
        doc.edit_cell(addr("A2"), "xyz");
        doc.set_filter(0, "ab");

        assert_eq!(filtered_row_indices(doc.sheet()), vec![0]);
    }

    #[test]
    fn test_empty_substring_matches_everything() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "anything");
        doc.set_filter(0, "");

        let rows = filtered_row_indices(doc.sheet());
        assert_eq!(rows.len(), doc.sheet().row_count);
    }

    #[test]
    fn test_all_filters_must_pass() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "apple");
        doc.edit_cell(addr("B1"), "red");
        doc.edit_cell(addr("A2"), "apple");
        doc.edit_cell(addr("B2"), "green");
        doc.set_filter(0, "apple");
        doc.set_filter(1, "red");

        assert_eq!(filtered_row_indices(doc.sheet()), vec![0]);
    }

    #[test]
    fn test_group_buckets_in_first_seen_order() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "b");
        doc.edit_cell(addr("A2"), "a");
        doc.edit_cell(addr("A3"), "b");
        doc.set_grouping(Some(0));

        let items = grouped_items(doc.sheet());
        assert_eq!(items[0], RowItem::GroupHeader("b".to_string()));
        assert_eq!(items[1], RowItem::Row(0));
        assert_eq!(items[2], RowItem::Row(2));
        assert_eq!(items[3], RowItem::GroupHeader("a".to_string()));
        assert_eq!(items[4], RowItem::Row(1));
        // Remaining rows are empty text, which is its own bucket.
        assert_eq!(items[5], RowItem::GroupHeader(String::new()));
    }

    #[test]
    fn test_no_grouping_wraps_rows_only() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "x");
        let items = grouped_items(doc.sheet());
        assert_eq!(items.len(), doc.sheet().row_count);
        assert!(items.iter().all(|item| matches!(item, RowItem::Row(_))));
    }

    #[test]
    fn test_resolve_window_maps_display_columns() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "first");
        doc.edit_cell(addr("B1"), "second");
        doc.move_column(0, 1); // display order: B, A, ...

        let views = resolve_window(doc.sheet(), 0..1, 0..2);
        assert_eq!(views[0].display, "second");
        assert_eq!(views[0].addr, addr("B1"));
        assert_eq!(views[1].display, "first");
    }

    #[test]
    fn test_focused_formula_shows_raw_text() {
        let mut doc = Document::new();
        doc.edit_cell(addr("A1"), "5");
        doc.edit_cell(addr("B1"), "=A1*2");

        let views = resolve_window(doc.sheet(), 0..1, 0..2);
        assert_eq!(views[1].display, "10");

        doc.set_focus(Some(addr("B1")));
        let views = resolve_window(doc.sheet(), 0..1, 0..2);
        assert_eq!(views[1].display, "=A1*2");
        assert!(views[1].is_focused);
    }

    #[test]
    fn test_selection_rectangle_is_normalized() {
        let mut doc = Document::new();
        doc.begin_selection(addr("C3"));
        doc.update_selection(addr("A1"));

        let views = resolve_window(doc.sheet(), 0..3, 0..3);
        assert!(views.iter().all(|view| view.is_selected));
        let outside = resolve_window(doc.sheet(), 3..4, 0..1);
        assert!(!outside[0].is_selected);
    }
}
