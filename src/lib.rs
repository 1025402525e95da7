//! Merge independently sampled two-column spectra into one wide CSV.
//!
//! The engine lives in [`data`]; [`server`] and the `panda-merge` binary are
//! thin hosts around [`merge_sources`].

pub mod config;
pub mod data;
pub mod error;
pub mod server;
pub mod session;

pub use data::merge::{merge_sources, MergeOptions};
pub use data::model::{ColumnName, DataPoint, MergeOutput, MergedRow, MergedTable, Source};
pub use error::{MergeError, Result};
