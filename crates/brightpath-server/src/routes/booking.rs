//! Consultant, slot and appointment endpoints under `/appointment`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;

use brightpath_api::ApiError;
use brightpath_core::model::{Consultant, Slot, UserSummary};

use crate::extract::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultants", get(list_consultants).post(create_consultant))
        .route(
            "/consultants/{id}",
            get(get_consultant)
                .put(update_consultant)
                .delete(delete_consultant),
        )
        .route("/consultants-with-slots", get(consultants_with_slots))
        .route("/slots", get(list_slots).post(create_slot))
        .route(
            "/slots/{id}",
            get(get_slot).put(update_slot).delete(delete_slot),
        )
        .route("/appointments", get(list_appointments).post(book_appointment))
        .route(
            "/appointments/{id}",
            get(get_appointment).delete(cancel_appointment),
        )
}

// -------------------------
// Consultants
// -------------------------

#[derive(Debug, Deserialize)]
struct ConsultantPayload {
    name: String,
    specialty: String,
    location: String,
    education: String,
    contact_info: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    reviews: Option<String>,
    #[serde(default)]
    experience_years: Option<u32>,
    #[serde(default)]
    about: Option<String>,
    #[serde(default)]
    working_time: Option<String>,
    #[serde(default)]
    area_of_focus: Option<String>,
}

impl ConsultantPayload {
    fn apply(self, consultant: &mut Consultant) {
        consultant.name = self.name;
        consultant.specialty = self.specialty;
        consultant.location = self.location;
        consultant.education = self.education;
        consultant.contact_info = self.contact_info;
        consultant.avatar = self.avatar;
        if let Some(rating) = self.rating {
            consultant.rating = rating;
        }
        consultant.reviews = self.reviews;
        if let Some(years) = self.experience_years {
            consultant.experience_years = years;
        }
        consultant.about = self.about;
        consultant.working_time = self.working_time;
        consultant.area_of_focus = self.area_of_focus;
    }
}

async fn list_consultants(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_consultants().await?))
}

async fn create_consultant(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<ConsultantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let mut consultant = Consultant::new("", "", "", "", "");
    body.apply(&mut consultant);
    let created = state.store.create_consultant(&consultant).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let consultant = state
        .store
        .get_consultant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    Ok(Json(consultant))
}

async fn update_consultant(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ConsultantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut consultant = state
        .store
        .get_consultant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    body.apply(&mut consultant);
    consultant.touch();
    Ok(Json(state.store.update_consultant(&consultant).await?))
}

async fn delete_consultant(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_consultant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct ConsultantWithSlots {
    #[serde(flatten)]
    consultant: Consultant,
    slots: Vec<Slot>,
}

/// Consultants each with their currently free slots.
async fn consultants_with_slots(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let consultants = state.store.list_consultants().await?;
    let mut out = Vec::with_capacity(consultants.len());
    for consultant in consultants {
        let slots = state
            .store
            .list_slots(consultant.id, None)
            .await?
            .into_iter()
            .filter(|s| !s.is_booked)
            .collect();
        out.push(ConsultantWithSlots { consultant, slots });
    }
    Ok(Json(out))
}

// -------------------------
// Slots
// -------------------------

#[derive(Debug, Deserialize)]
struct SlotPayload {
    consultant_id: Uuid,
    date: Date,
    time: Time,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlotQuery {
    consultant: Option<Uuid>,
    date: Option<Date>,
}

async fn list_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let consultant_id = query
        .consultant
        .ok_or_else(|| ApiError::bad_request("consultant query parameter is required"))?;
    Ok(Json(state.store.list_slots(consultant_id, query.date).await?))
}

async fn create_slot(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<SlotPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let slot = Slot::new(body.consultant_id, body.date, body.time, body.location);
    let created = state.store.create_slot(&slot).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let slot = state
        .store
        .get_slot(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Slot not found"))?;
    Ok(Json(slot))
}

async fn update_slot(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SlotPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut slot = state
        .store
        .get_slot(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Slot not found"))?;
    slot.consultant_id = body.consultant_id;
    slot.date = body.date;
    slot.time = body.time;
    slot.location = body.location;
    slot.touch();
    Ok(Json(state.store.update_slot(&slot).await?))
}

async fn delete_slot(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_slot(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------
// Appointments
// -------------------------

/// Appointment with its related rows embedded, matching what booking
/// clients render.
#[derive(Debug, Serialize)]
struct AppointmentView {
    id: Uuid,
    consultant: Consultant,
    patient: UserSummary,
    slot: Slot,
    #[serde(with = "time::serde::rfc3339")]
    created_at: time::OffsetDateTime,
}

impl AppointmentView {
    async fn load(
        state: &AppState,
        appointment: &brightpath_core::model::Appointment,
    ) -> Result<Self, ApiError> {
        let consultant = state
            .store
            .get_consultant(appointment.consultant_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
        let slot = state
            .store
            .get_slot(appointment.slot_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Slot not found"))?;
        let patient = state
            .auth
            .user_summary(appointment.patient_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        Ok(Self {
            id: appointment.id,
            consultant,
            patient,
            slot,
            created_at: appointment.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AppointmentQuery {
    patient: Option<Uuid>,
}

async fn list_appointments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<AppointmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let patient_id = query.patient.unwrap_or(user.id);
    let appointments = state
        .store
        .list_appointments_for_patient(patient_id)
        .await?;
    let mut out = Vec::with_capacity(appointments.len());
    for appointment in &appointments {
        out.push(AppointmentView::load(&state, appointment).await?);
    }
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
struct BookRequest {
    consultant_id: Uuid,
    slot_id: Uuid,
}

async fn book_appointment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<BookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let slot = state
        .store
        .get_slot(body.slot_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Slot not found"))?;
    if slot.consultant_id != body.consultant_id {
        return Err(ApiError::bad_request(
            "Slot does not belong to the given consultant",
        ));
    }
    let appointment = state.store.book_slot(body.slot_id, user.id).await?;
    let view = AppointmentView::load(&state, &appointment).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_appointment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;
    Ok(Json(AppointmentView::load(&state, &appointment).await?))
}

async fn cancel_appointment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;
    if appointment.patient_id != user.id {
        return Err(ApiError::forbidden(
            "Only the booking user may cancel an appointment",
        ));
    }
    state.store.cancel_appointment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
