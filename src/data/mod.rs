//! Data layer: the merge engine.
//!
//! Architecture:
//! ```text
//!  label + raw text (one per source)
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │  loader   │   │  naming   │  labels → unique ColumnNames
//!   └──────────┘   └──────────┘
//!   text → DataPoints    │
//!        │              │
//!        ▼              ▼
//!   ┌────────────────────────┐
//!   │         merge           │  outer join on key, sort desc → CSV
//!   └────────────────────────┘
//! ```
//!
//! `payload` validates request bodies before any of this runs.

pub mod loader;
pub mod merge;
pub mod model;
pub mod naming;
pub mod payload;
