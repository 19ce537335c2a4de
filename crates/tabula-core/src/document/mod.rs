//! Document state and logic (UI-agnostic).

mod io;
mod layout;
mod ops;
mod state;
mod view;

pub use layout::{
    MIN_COL_WIDTH, MIN_ROW_HEIGHT, OVERSCAN, cumulative_edges, span_of, total_extent,
    visible_range,
};
pub use state::{
    DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT, Document, Sheet, SortOrder,
};
pub use view::{CellView, RowItem, filtered_row_indices, grouped_items, resolve_window};
