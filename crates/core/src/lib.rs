//! Campus feed core: visibility, reference resolution and the join that
//! turns raw campus-event rows into per-viewer view models.
//!
//! This crate has no database dependency. Rows come from a [`store::RowSource`]
//! supplied by the caller; writes go to a [`store::RowWriter`].

pub mod error;
pub mod filter;
pub mod join;
pub mod pipeline;
pub mod references;
pub mod rows;
pub mod store;
pub mod types;
pub mod viewer;
pub mod visibility;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
