//! Presentation-only state that never feeds back into the record.

pub mod progress;

pub use progress::{JitterSource, LoadingOverlay, OverlayState};
