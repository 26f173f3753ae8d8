//! Storage traits for the Brightpath persistence layer.
//!
//! Every backend implements these traits. All methods take `&self` and
//! implementations must be thread-safe (`Send + Sync`) because the server
//! shares a single store across handlers.

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use brightpath_core::model::{
    Appointment, Assessment, Category, Comment, Consultant, OtpCode, Parent, Patient, PatientFile,
    Post, Question, RecordingStep, Reply, ResponseData, Scenario, Slot, User,
};

use crate::error::StorageError;

/// Accounts and credentials.
///
/// `create_user` enforces email and username uniqueness; lookups by email
/// or username are case-insensitive, matching how they are compared at
/// registration.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a user with the same email
    /// or username exists.
    async fn create_user(&self, user: &User) -> Result<User, StorageError>;

    /// Reads a user by ID. Returns `None` if absent.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    /// Reads a user by email, case-insensitively. Returns `None` if absent.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Reads a user by username, case-insensitively. Returns `None` if
    /// absent.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Replaces an existing user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn update_user(&self, user: &User) -> Result<User, StorageError>;

    /// Deletes a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn delete_user(&self, id: Uuid) -> Result<(), StorageError>;
}

/// One-time verification codes.
///
/// At most one active code per email: storing a code replaces any earlier
/// code for the same address.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Stores a code, replacing any existing code for the same email.
    async fn put_otp(&self, otp: &OtpCode) -> Result<OtpCode, StorageError>;

    /// Reads the code for an email. Returns `None` if absent.
    async fn get_otp(&self, email: &str) -> Result<Option<OtpCode>, StorageError>;

    /// Marks the code for an email as used.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no code exists for the email.
    async fn mark_otp_used(&self, email: &str) -> Result<(), StorageError>;

    /// Removes the code for an email, if present.
    async fn delete_otp(&self, email: &str) -> Result<(), StorageError>;
}

/// Consultants, their availability slots, and appointments.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_consultant(&self, consultant: &Consultant) -> Result<Consultant, StorageError>;

    async fn get_consultant(&self, id: Uuid) -> Result<Option<Consultant>, StorageError>;

    /// Lists all consultants, ordered by name.
    async fn list_consultants(&self) -> Result<Vec<Consultant>, StorageError>;

    async fn update_consultant(&self, consultant: &Consultant) -> Result<Consultant, StorageError>;

    /// Deletes a consultant along with its slots and their appointments.
    async fn delete_consultant(&self, id: Uuid) -> Result<(), StorageError>;

    /// Creates a slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidReference` if the consultant does not
    /// exist.
    async fn create_slot(&self, slot: &Slot) -> Result<Slot, StorageError>;

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>, StorageError>;

    /// Lists slots for a consultant, optionally restricted to one date,
    /// ordered by date then time.
    async fn list_slots(
        &self,
        consultant_id: Uuid,
        date: Option<Date>,
    ) -> Result<Vec<Slot>, StorageError>;

    async fn update_slot(&self, slot: &Slot) -> Result<Slot, StorageError>;

    async fn delete_slot(&self, id: Uuid) -> Result<(), StorageError>;

    /// Atomically books a slot and records the appointment.
    ///
    /// The check that the slot is free and the flip to booked happen under
    /// one lock, so two concurrent requests for the same slot cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the slot does not exist.
    /// Returns `StorageError::Conflict` if the slot is already booked.
    /// Returns `StorageError::InvalidReference` if the booking user does
    /// not exist.
    async fn book_slot(&self, slot_id: Uuid, patient_id: Uuid)
    -> Result<Appointment, StorageError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StorageError>;

    /// Lists appointments booked by a user, most recent first. The
    /// `patient_id` on an appointment is the booking user's id.
    async fn list_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StorageError>;

    /// Cancels an appointment and frees its slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the appointment does not exist.
    async fn cancel_appointment(&self, id: Uuid) -> Result<(), StorageError>;
}

/// Screening content and collected results.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create_parent(&self, parent: &Parent) -> Result<Parent, StorageError>;
    async fn get_parent(&self, id: Uuid) -> Result<Option<Parent>, StorageError>;
    async fn list_parents(&self) -> Result<Vec<Parent>, StorageError>;
    async fn update_parent(&self, parent: &Parent) -> Result<Parent, StorageError>;
    async fn delete_parent(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, StorageError>;
    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StorageError>;
    async fn list_patients(&self) -> Result<Vec<Patient>, StorageError>;
    async fn update_patient(&self, patient: &Patient) -> Result<Patient, StorageError>;
    async fn delete_patient(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_scenario(&self, scenario: &Scenario) -> Result<Scenario, StorageError>;
    async fn get_scenario(&self, id: Uuid) -> Result<Option<Scenario>, StorageError>;

    /// Lists scenarios ordered by priority, then name.
    async fn list_scenarios(&self) -> Result<Vec<Scenario>, StorageError>;

    async fn update_scenario(&self, scenario: &Scenario) -> Result<Scenario, StorageError>;

    /// Deletes a scenario along with its questions and recording steps.
    async fn delete_scenario(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_question(&self, question: &Question) -> Result<Question, StorageError>;
    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, StorageError>;

    /// Lists questions for a scenario, ordered by their order field.
    async fn list_questions(&self, scenario_id: Uuid) -> Result<Vec<Question>, StorageError>;

    async fn update_question(&self, question: &Question) -> Result<Question, StorageError>;
    async fn delete_question(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_recording_step(
        &self,
        step: &RecordingStep,
    ) -> Result<RecordingStep, StorageError>;
    async fn get_recording_step(&self, id: Uuid) -> Result<Option<RecordingStep>, StorageError>;

    /// Lists recording steps for a scenario, ordered by step number.
    async fn list_recording_steps(
        &self,
        scenario_id: Uuid,
    ) -> Result<Vec<RecordingStep>, StorageError>;

    async fn update_recording_step(
        &self,
        step: &RecordingStep,
    ) -> Result<RecordingStep, StorageError>;
    async fn delete_recording_step(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError>;
    async fn get_assessment(&self, id: Uuid) -> Result<Option<Assessment>, StorageError>;

    /// Lists assessments, most recent assessment date first.
    async fn list_assessments(&self) -> Result<Vec<Assessment>, StorageError>;

    async fn update_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError>;

    /// Deletes an assessment along with its response data and files.
    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_response_data(
        &self,
        response: &ResponseData,
    ) -> Result<ResponseData, StorageError>;

    /// Lists response data for an assessment, oldest first.
    async fn list_response_data(
        &self,
        assessment_id: Uuid,
    ) -> Result<Vec<ResponseData>, StorageError>;

    async fn delete_response_data(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_patient_file(&self, file: &PatientFile) -> Result<PatientFile, StorageError>;

    /// Lists files attached to an assessment, oldest first.
    async fn list_patient_files(
        &self,
        assessment_id: Uuid,
    ) -> Result<Vec<PatientFile>, StorageError>;

    async fn delete_patient_file(&self, id: Uuid) -> Result<(), StorageError>;
}

/// Community discussion content.
#[async_trait]
pub trait ForumStore: Send + Sync {
    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a category with the same
    /// name exists.
    async fn create_category(&self, category: &Category) -> Result<Category, StorageError>;

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, StorageError>;

    /// Lists categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    async fn update_category(&self, category: &Category) -> Result<Category, StorageError>;

    /// Deletes a category along with its posts, comments and replies.
    async fn delete_category(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_post(&self, post: &Post) -> Result<Post, StorageError>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StorageError>;

    /// Lists posts, newest first, optionally restricted to one category.
    async fn list_posts(&self, category_id: Option<Uuid>) -> Result<Vec<Post>, StorageError>;

    async fn update_post(&self, post: &Post) -> Result<Post, StorageError>;

    /// Deletes a post along with its comments and their replies.
    async fn delete_post(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_comment(&self, comment: &Comment) -> Result<Comment, StorageError>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, StorageError>;

    /// Lists comments on a post, oldest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, StorageError>;

    async fn update_comment(&self, comment: &Comment) -> Result<Comment, StorageError>;

    /// Deletes a comment along with its replies.
    async fn delete_comment(&self, id: Uuid) -> Result<(), StorageError>;

    async fn create_reply(&self, reply: &Reply) -> Result<Reply, StorageError>;
    async fn get_reply(&self, id: Uuid) -> Result<Option<Reply>, StorageError>;

    /// Lists replies to a comment, oldest first.
    async fn list_replies(&self, comment_id: Uuid) -> Result<Vec<Reply>, StorageError>;

    async fn update_reply(&self, reply: &Reply) -> Result<Reply, StorageError>;
    async fn delete_reply(&self, id: Uuid) -> Result<(), StorageError>;
}

/// The full persistence surface the server works against.
pub trait DataStore: UserStore + OtpStore + BookingStore + AssessmentStore + ForumStore {}

impl<T> DataStore for T where T: UserStore + OtpStore + BookingStore + AssessmentStore + ForumStore {}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time checks that the traits stay object safe.
    #[allow(dead_code)]
    fn _assert_user_store_object_safe(_: &dyn UserStore) {}

    #[allow(dead_code)]
    fn _assert_otp_store_object_safe(_: &dyn OtpStore) {}

    #[allow(dead_code)]
    fn _assert_booking_store_object_safe(_: &dyn BookingStore) {}

    #[allow(dead_code)]
    fn _assert_assessment_store_object_safe(_: &dyn AssessmentStore) {}

    #[allow(dead_code)]
    fn _assert_forum_store_object_safe(_: &dyn ForumStore) {}

    #[allow(dead_code)]
    fn _assert_data_store_object_safe(_: &dyn DataStore) {}
}
