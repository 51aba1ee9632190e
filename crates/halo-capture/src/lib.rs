//! Capture loading for Halo.
//!
//! A capture directory holds `metadata.json` plus one record per generation
//! step, in either the legacy combined JSON layout or the split
//! metadata + raw `f32` layout. [`StepLoader`] hides the difference and
//! yields normalized [`GenerationStep`](halo_core::model::GenerationStep)s.

pub mod error;
pub mod format;
pub mod loader;
pub mod metadata;
pub mod writer;

pub use error::CaptureError;
pub use format::{CaptureFormat, RecordRef};
pub use loader::{LoadSummary, StepLoader, Steps};
pub use metadata::{load_token_set, CaptureMetadata, TokenExport, METADATA_FILE};
pub use writer::{convert_capture, CaptureWriter};
