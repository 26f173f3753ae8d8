use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::id::new_id;
use crate::time::now_utc;

/// Guardian record attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact_info: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Parent {
    pub fn new(user_id: Uuid, contact_info: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            user_id,
            contact_info: contact_info.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// A child being screened. Belongs to the registering user and optionally
/// to a parent record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub date_of_birth: Date,
    pub gender: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Patient {
    pub fn new(
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: impl Into<String>,
        date_of_birth: Date,
        gender: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            user_id,
            parent_id,
            name: name.into(),
            date_of_birth,
            gender: gender.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// A templated screening protocol: an observation task with ordered
/// questions and recording steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub img_path: String,
    /// Difficulty label: "Easy", "Medium", "Hard".
    pub level: String,
    /// Name of the analysis model associated with this scenario.
    pub model_name: String,
    pub priority: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        img_path: impl Into<String>,
        level: impl Into<String>,
        model_name: impl Into<String>,
        priority: u32,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            img_path: img_path.into(),
            level: level.into(),
            model_name: model_name.into(),
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub text: String,
    pub order: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Question {
    pub fn new(scenario_id: Uuid, text: impl Into<String>, order: u32) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            scenario_id,
            text: text.into(),
            order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStep {
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub number: u32,
    pub name: String,
    pub description: String,
    pub img_path: String,
    /// Expected length of the recording, in seconds.
    pub expected_duration_secs: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl RecordingStep {
    pub fn new(
        scenario_id: Uuid,
        number: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        img_path: impl Into<String>,
        expected_duration_secs: u64,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            scenario_id,
            number,
            name: name.into(),
            description: description.into(),
            img_path: img_path.into(),
            expected_duration_secs,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// One run of a scenario for a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub scenario_id: Uuid,
    pub assessment_date: Date,
    /// Analysis text produced by the generative provider; empty until
    /// analysis has been requested.
    pub result_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Assessment {
    pub fn new(scenario_id: Uuid, assessment_date: Date, additional_notes: Option<String>) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            scenario_id,
            assessment_date,
            result_summary: String::new(),
            additional_notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// A recorded answer to one question within an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseData {
    pub id: Uuid,
    pub question_id: Uuid,
    pub assessment_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    pub model_name: String,
    pub model_response: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ResponseData {
    pub fn new(
        question_id: Uuid,
        assessment_id: Uuid,
        response_text: Option<String>,
        model_name: impl Into<String>,
        model_response: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            question_id,
            assessment_id,
            response_text,
            model_name: model_name.into(),
            model_response: model_response.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Document,
}

impl std::str::FromStr for FileType {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            other => Err(crate::CoreError::invalid_field(
                "file_type",
                format!("'{other}' is not one of image, video, document"),
            )),
        }
    }
}

/// An uploaded media file captured during a recording step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientFile {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub step_id: Uuid,
    pub file_path: String,
    pub file_type: FileType,
    pub duration_secs: u64,
    pub model_name: String,
    pub model_response: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PatientFile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        assessment_id: Uuid,
        step_id: Uuid,
        file_path: impl Into<String>,
        file_type: FileType,
        duration_secs: u64,
        model_name: impl Into<String>,
        model_response: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            assessment_id,
            step_id,
            file_path: file_path.into(),
            file_type,
            duration_secs,
            model_name: model_name.into(),
            model_response: model_response.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
