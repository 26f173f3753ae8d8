pub mod assessments;
pub mod auth;
pub mod booking;
pub mod forum;
