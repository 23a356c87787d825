//! Tally test utilities
//!
//! Fakes for every pipeline seam, so coordinator and gateway tests run
//! without a chat platform, an OCR engine or a spreadsheet:
//!
//! - [`RecordingSurface`]: keeps every review-surface call in order
//! - [`MemoryRegistry`]: map-backed display names
//! - [`ScriptedRecognizer`]: fixed OCR output (or failure)
//! - [`GatedLedger`]: holds ledger reads until the test releases them

pub mod ledger;
pub mod recognizer;
pub mod registry;
pub mod surface;

pub use ledger::GatedLedger;
pub use recognizer::ScriptedRecognizer;
pub use registry::MemoryRegistry;
pub use surface::{RecordingSurface, SurfaceCall};
