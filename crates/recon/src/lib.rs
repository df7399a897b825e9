//! `declara-recon` — Declaration reconciliation engine.
//!
//! Pure engine crate: receives a pre-built raw extraction, returns a typed
//! declaration record plus a match report. No file or network IO.

pub mod coerce;
pub mod engine;
pub mod fields;
pub mod goods;
pub mod matcher;
pub mod model;
pub mod report;

pub use engine::reconcile;
pub use fields::{DeclField, GoodsField, TypeClass};
pub use model::{CanonicalRecord, FieldValue, GoodsLine, RawExtraction, RawValue, SourceKind};
pub use report::ReconReport;
