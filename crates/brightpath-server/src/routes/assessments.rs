//! Screening endpoints under `/assessment`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use time::Date;
use tracing::error;
use uuid::Uuid;

use brightpath_api::ApiError;
use brightpath_core::model::{
    Assessment, FileType, Parent, Patient, PatientFile, ResponseData,
};
use brightpath_core::new_id;

use crate::analysis::{ANALYSIS_UNAVAILABLE, render_prompt};
use crate::extract::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scenarios", get(list_scenarios))
        .route("/scenarios/{id}/steps", get(list_steps))
        .route("/questions/{scenario_id}", get(list_questions))
        .route("/assessments", get(list_assessments).post(create_assessment))
        .route("/assessments/{id}", get(get_assessment))
        .route("/assessments/{id}/responses", post(record_response))
        .route("/assessments/{id}/files", post(upload_file))
        .route("/assessments/{id}/analysis", post(run_analysis))
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/parents", get(list_parents).post(create_parent))
        .route(
            "/parents/{id}",
            get(get_parent).put(update_parent).delete(delete_parent),
        )
}

// -------------------------
// Scenario content
// -------------------------

async fn list_scenarios(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_scenarios().await?))
}

async fn list_questions(
    State(state): State<AppState>,
    Path(scenario_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_scenario(scenario_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario not found"))?;
    Ok(Json(state.store.list_questions(scenario_id).await?))
}

async fn list_steps(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_scenario(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario not found"))?;
    Ok(Json(state.store.list_recording_steps(id).await?))
}

// -------------------------
// Assessments
// -------------------------

#[derive(Debug, Deserialize)]
struct CreateAssessmentRequest {
    scenario_id: Uuid,
    assessment_date: Date,
    #[serde(default)]
    additional_notes: Option<String>,
}

async fn list_assessments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_assessments().await?))
}

async fn create_assessment(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CreateAssessmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assessment = Assessment::new(body.scenario_id, body.assessment_date, body.additional_notes);
    let created = state.store.create_assessment(&assessment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_assessment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let assessment = state
        .store
        .get_assessment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    let responses = state.store.list_response_data(id).await?;
    let files = state.store.list_patient_files(id).await?;
    Ok(Json(json!({
        "assessment": assessment,
        "responses": responses,
        "files": files,
    })))
}

#[derive(Debug, Deserialize)]
struct RecordResponseRequest {
    question_id: Uuid,
    #[serde(default)]
    response_text: Option<String>,
}

async fn record_response(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecordResponseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assessment = state
        .store
        .get_assessment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    state
        .store
        .get_question(body.question_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;
    let scenario = state
        .store
        .get_scenario(assessment.scenario_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario not found"))?;

    let response = ResponseData::new(
        body.question_id,
        id,
        body.response_text,
        scenario.model_name,
        String::new(),
    );
    let created = state.store.create_response_data(&response).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn upload_file(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let assessment = state
        .store
        .get_assessment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    let scenario = state
        .store
        .get_scenario(assessment.scenario_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario not found"))?;

    let mut step_id: Option<Uuid> = None;
    let mut file_type: Option<FileType> = None;
    let mut duration_secs: u64 = 0;
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "step_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                step_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::bad_request("step_id must be a uuid"))?,
                );
            }
            "file_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                file_type =
                    Some(text.parse().map_err(|_| {
                        ApiError::bad_request("file_type must be image, video or document")
                    })?);
            }
            "duration_secs" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                duration_secs = text
                    .parse()
                    .map_err(|_| ApiError::bad_request("duration_secs must be a number"))?;
            }
            "file" => {
                file_name = field.file_name().map(str::to_string);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let step_id = step_id.ok_or_else(|| ApiError::bad_request("step_id is required"))?;
    let file_type = file_type.ok_or_else(|| ApiError::bad_request("file_type is required"))?;
    let bytes = bytes.ok_or_else(|| ApiError::bad_request("file is required"))?;
    state
        .store
        .get_recording_step(step_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recording step not found"))?;

    // Stored under a fresh name to avoid collisions between uploads.
    let stored_name = match file_name {
        Some(name) => format!("{}-{name}", new_id()),
        None => new_id().to_string(),
    };
    let dir = std::path::Path::new(&state.media_dir);
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!(error = %e, "failed to create media directory");
        ApiError::internal(e.to_string())
    })?;
    let path = dir.join(&stored_name);
    tokio::fs::write(&path, &bytes).await.map_err(|e| {
        error!(error = %e, "failed to persist upload");
        ApiError::internal(e.to_string())
    })?;

    let file = PatientFile::new(
        id,
        step_id,
        path.to_string_lossy().into_owned(),
        file_type,
        duration_secs,
        scenario.model_name,
        String::new(),
    );
    let created = state.store.create_patient_file(&file).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn run_analysis(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut assessment = state
        .store
        .get_assessment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    let responses = state.store.list_response_data(id).await?;
    if responses.is_empty() {
        return Err(ApiError::bad_request(
            "assessment has no recorded responses",
        ));
    }

    let mut answers = String::new();
    for response in &responses {
        let question = state.store.get_question(response.question_id).await?;
        let question_text = question.map(|q| q.text).unwrap_or_default();
        let answer = response.response_text.as_deref().unwrap_or("(no answer)");
        answers.push_str(&format!("Q: {question_text}\nA: {answer}\n"));
    }

    let prompt = render_prompt(&answers);
    let summary = match state.analysis.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(assessment_id = %id, error = %e, "analysis provider call failed");
            return Err(ApiError::bad_gateway(ANALYSIS_UNAVAILABLE));
        }
    };

    assessment.result_summary = summary.clone();
    assessment.touch();
    state.store.update_assessment(&assessment).await?;
    Ok(Json(json!({ "result_summary": summary })))
}

// -------------------------
// Patients and parents
// -------------------------

#[derive(Debug, Deserialize)]
struct PatientPayload {
    name: String,
    date_of_birth: Date,
    gender: String,
    #[serde(default)]
    parent_id: Option<Uuid>,
}

async fn list_patients(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let patients: Vec<Patient> = state
        .store
        .list_patients()
        .await?
        .into_iter()
        .filter(|p| p.user_id == user.id)
        .collect();
    Ok(Json(patients))
}

async fn create_patient(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<PatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let patient = Patient::new(
        user.id,
        body.parent_id,
        body.name,
        body.date_of_birth,
        body.gender,
    );
    let created = state.store.create_patient(&patient).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn owned_patient(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<Patient, ApiError> {
    let patient = state
        .store
        .get_patient(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient not found"))?;
    if patient.user_id != user_id {
        return Err(ApiError::forbidden("Patient belongs to another account"));
    }
    Ok(patient)
}

async fn get_patient(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(owned_patient(&state, user.id, id).await?))
}

async fn update_patient(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut patient = owned_patient(&state, user.id, id).await?;
    patient.name = body.name;
    patient.date_of_birth = body.date_of_birth;
    patient.gender = body.gender;
    patient.parent_id = body.parent_id;
    patient.touch();
    Ok(Json(state.store.update_patient(&patient).await?))
}

async fn delete_patient(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    owned_patient(&state, user.id, id).await?;
    state.store.delete_patient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ParentPayload {
    contact_info: String,
}

async fn list_parents(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let parents: Vec<Parent> = state
        .store
        .list_parents()
        .await?
        .into_iter()
        .filter(|p| p.user_id == user.id)
        .collect();
    Ok(Json(parents))
}

async fn create_parent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ParentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = Parent::new(user.id, body.contact_info);
    let created = state.store.create_parent(&parent).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_parent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = state
        .store
        .get_parent(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Parent not found"))?;
    if parent.user_id != user.id {
        return Err(ApiError::forbidden("Parent belongs to another account"));
    }
    Ok(Json(parent))
}

async fn update_parent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ParentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut parent = state
        .store
        .get_parent(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Parent not found"))?;
    if parent.user_id != user.id {
        return Err(ApiError::forbidden("Parent belongs to another account"));
    }
    parent.contact_info = body.contact_info;
    parent.touch();
    Ok(Json(state.store.update_parent(&parent).await?))
}

async fn delete_parent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = state
        .store
        .get_parent(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Parent not found"))?;
    if parent.user_id != user.id {
        return Err(ApiError::forbidden("Parent belongs to another account"));
    }
    state.store.delete_parent(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
