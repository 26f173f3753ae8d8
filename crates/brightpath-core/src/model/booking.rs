use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::id::new_id;
use crate::time::now_utc;

/// A consultant profile as shown in the booking UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultant {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,
    /// Years of experience.
    pub experience_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_time: Option<String>,
    pub education: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_of_focus: Option<String>,
    pub contact_info: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Consultant {
    /// Creates a consultant with empty optional profile fields and a zero
    /// rating.
    pub fn new(
        name: impl Into<String>,
        specialty: impl Into<String>,
        location: impl Into<String>,
        education: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            name: name.into(),
            specialty: specialty.into(),
            location: location.into(),
            avatar: None,
            rating: 0.0,
            reviews: None,
            experience_years: 0,
            about: None,
            working_time: None,
            education: education.into(),
            area_of_focus: None,
            contact_info: contact_info.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// A bookable time unit belonging to a consultant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub date: Date,
    pub time: Time,
    pub is_booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Slot {
    pub fn new(consultant_id: Uuid, date: Date, time: Time, location: Option<String>) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            consultant_id,
            date,
            time,
            is_booked: false,
            location,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc();
    }
}

/// A confirmed booking linking a patient (user), a consultant and a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub patient_id: Uuid,
    pub slot_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Appointment {
    pub fn new(consultant_id: Uuid, patient_id: Uuid, slot_id: Uuid) -> Self {
        let now = now_utc();
        Self {
            id: new_id(),
            consultant_id,
            patient_id,
            slot_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn new_slots_start_free() {
        let slot = Slot::new(new_id(), date!(2026 - 09 - 01), time!(10:30), None);
        assert!(!slot.is_booked);
    }

    #[test]
    fn slot_serializes_date_and_time_as_strings() {
        let slot = Slot::new(
            new_id(),
            date!(2026 - 09 - 01),
            time!(10:30),
            Some("Clinic A".into()),
        );
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["date"], "2026-09-01");
        assert_eq!(json["location"], "Clinic A");
        assert!(json["time"].as_str().unwrap().starts_with("10:30"));
    }

    #[test]
    fn appointment_links_all_three_parties() {
        let (c, p, s) = (new_id(), new_id(), new_id());
        let appt = Appointment::new(c, p, s);
        assert_eq!((appt.consultant_id, appt.patient_id, appt.slot_id), (c, p, s));
    }
}
