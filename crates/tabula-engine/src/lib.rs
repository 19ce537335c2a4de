//! tabula-engine - sparse cell storage + formula recalculation.

pub mod engine;
