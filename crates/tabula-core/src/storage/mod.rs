//! Serialization glue for the dense-array boundary.

pub mod csv;
