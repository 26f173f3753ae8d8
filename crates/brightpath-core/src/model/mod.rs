//! Domain entities for the four Brightpath modules.
//!
//! Every entity carries a v4 UUID plus `created_at`/`updated_at` timestamps.
//! Cross-entity links are plain UUID foreign keys; cascade semantics live in
//! the storage backend.

pub mod assessment;
pub mod booking;
pub mod forum;
pub mod user;

pub use assessment::{
    Assessment, FileType, Parent, Patient, PatientFile, Question, RecordingStep, ResponseData,
    Scenario,
};
pub use booking::{Appointment, Consultant, Slot};
pub use forum::{Category, Comment, Post, Reply};
pub use user::{OtpCode, User, UserSummary};
