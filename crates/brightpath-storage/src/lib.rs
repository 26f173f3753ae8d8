//! Storage abstraction layer for the Brightpath backend.
//!
//! Backends implement the per-domain traits in [`traits`] and are wired into
//! the server behind `Arc<dyn DataStore>`.

pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::{AssessmentStore, BookingStore, DataStore, ForumStore, OtpStore, UserStore};
