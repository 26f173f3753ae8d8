use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::Date;
use uuid::Uuid;

use brightpath_core::model::{
    Appointment, Assessment, Category, Comment, Consultant, OtpCode, Parent, Patient, PatientFile,
    Post, Question, RecordingStep, Reply, ResponseData, Scenario, Slot, User,
};
use brightpath_core::now_utc;
use brightpath_storage::{
    AssessmentStore, BookingStore, ForumStore, OtpStore, StorageError, UserStore,
};

/// A concurrent in-memory store backed by one map per entity.
///
/// Secondary indexes (`users_by_email`, `users_by_username`,
/// `categories_by_name`) enforce the uniqueness constraints atomically via
/// the map entry API.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    users_by_email: DashMap<String, Uuid>,
    users_by_username: DashMap<String, Uuid>,
    otps: DashMap<String, OtpCode>,

    consultants: DashMap<Uuid, Consultant>,
    slots: DashMap<Uuid, Slot>,
    appointments: DashMap<Uuid, Appointment>,

    parents: DashMap<Uuid, Parent>,
    patients: DashMap<Uuid, Patient>,
    scenarios: DashMap<Uuid, Scenario>,
    questions: DashMap<Uuid, Question>,
    recording_steps: DashMap<Uuid, RecordingStep>,
    assessments: DashMap<Uuid, Assessment>,
    response_data: DashMap<Uuid, ResponseData>,
    patient_files: DashMap<Uuid, PatientFile>,

    categories: DashMap<Uuid, Category>,
    categories_by_name: DashMap<String, Uuid>,
    posts: DashMap<Uuid, Post>,
    comments: DashMap<Uuid, Comment>,
    replies: DashMap<Uuid, Reply>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }

    fn normalize_name(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, StorageError> {
        let username_key = Self::normalize_name(&user.username);
        let email_key = Self::normalize_email(&user.email);
        // The username entry lock is held while the email index is claimed,
        // so the pair is inserted atomically or not at all.
        match self.users_by_username.entry(username_key) {
            Entry::Occupied(_) => Err(StorageError::already_exists(
                "User",
                user.username.clone(),
            )),
            Entry::Vacant(username_entry) => match self.users_by_email.entry(email_key) {
                Entry::Occupied(_) => {
                    Err(StorageError::already_exists("User", user.email.clone()))
                }
                Entry::Vacant(email_entry) => {
                    email_entry.insert(user.id);
                    username_entry.insert(user.id);
                    self.users.insert(user.id, user.clone());
                    Ok(user.clone())
                }
            },
        }
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let key = Self::normalize_email(email);
        let Some(id) = self.users_by_email.get(&key).map(|e| *e) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let key = Self::normalize_name(username);
        let Some(id) = self.users_by_username.get(&key).map(|e| *e) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<User, StorageError> {
        let Some(mut existing) = self.users.get_mut(&user.id) else {
            return Err(StorageError::not_found("User", user.id.to_string()));
        };
        // Keep the secondary indexes in sync when the keys change.
        let old_email = Self::normalize_email(&existing.email);
        let new_email = Self::normalize_email(&user.email);
        if old_email != new_email {
            if self.users_by_email.contains_key(&new_email) {
                return Err(StorageError::already_exists("User", user.email.clone()));
            }
            self.users_by_email.remove(&old_email);
            self.users_by_email.insert(new_email, user.id);
        }
        let old_username = Self::normalize_name(&existing.username);
        let new_username = Self::normalize_name(&user.username);
        if old_username != new_username {
            if self.users_by_username.contains_key(&new_username) {
                return Err(StorageError::already_exists(
                    "User",
                    user.username.clone(),
                ));
            }
            self.users_by_username.remove(&old_username);
            self.users_by_username.insert(new_username, user.id);
        }
        *existing = user.clone();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StorageError> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Err(StorageError::not_found("User", id.to_string()));
        };
        self.users_by_email
            .remove(&Self::normalize_email(&user.email));
        self.users_by_username
            .remove(&Self::normalize_name(&user.username));
        Ok(())
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn put_otp(&self, otp: &OtpCode) -> Result<OtpCode, StorageError> {
        self.otps
            .insert(Self::normalize_email(&otp.email), otp.clone());
        Ok(otp.clone())
    }

    async fn get_otp(&self, email: &str) -> Result<Option<OtpCode>, StorageError> {
        Ok(self
            .otps
            .get(&Self::normalize_email(email))
            .map(|o| o.clone()))
    }

    async fn mark_otp_used(&self, email: &str) -> Result<(), StorageError> {
        let Some(mut otp) = self.otps.get_mut(&Self::normalize_email(email)) else {
            return Err(StorageError::not_found("OtpCode", email));
        };
        otp.used = true;
        Ok(())
    }

    async fn delete_otp(&self, email: &str) -> Result<(), StorageError> {
        self.otps.remove(&Self::normalize_email(email));
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create_consultant(&self, consultant: &Consultant) -> Result<Consultant, StorageError> {
        self.consultants.insert(consultant.id, consultant.clone());
        Ok(consultant.clone())
    }

    async fn get_consultant(&self, id: Uuid) -> Result<Option<Consultant>, StorageError> {
        Ok(self.consultants.get(&id).map(|c| c.clone()))
    }

    async fn list_consultants(&self) -> Result<Vec<Consultant>, StorageError> {
        let mut all: Vec<Consultant> = self.consultants.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_consultant(&self, consultant: &Consultant) -> Result<Consultant, StorageError> {
        let Some(mut existing) = self.consultants.get_mut(&consultant.id) else {
            return Err(StorageError::not_found(
                "Consultant",
                consultant.id.to_string(),
            ));
        };
        *existing = consultant.clone();
        Ok(consultant.clone())
    }

    async fn delete_consultant(&self, id: Uuid) -> Result<(), StorageError> {
        if self.consultants.remove(&id).is_none() {
            return Err(StorageError::not_found("Consultant", id.to_string()));
        }
        let slot_ids: Vec<Uuid> = self
            .slots
            .iter()
            .filter(|s| s.consultant_id == id)
            .map(|s| s.id)
            .collect();
        for slot_id in &slot_ids {
            self.slots.remove(slot_id);
        }
        self.appointments
            .retain(|_, a| !slot_ids.contains(&a.slot_id));
        Ok(())
    }

    async fn create_slot(&self, slot: &Slot) -> Result<Slot, StorageError> {
        if !self.consultants.contains_key(&slot.consultant_id) {
            return Err(StorageError::invalid_reference(format!(
                "consultant {} does not exist",
                slot.consultant_id
            )));
        }
        self.slots.insert(slot.id, slot.clone());
        Ok(slot.clone())
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<Slot>, StorageError> {
        Ok(self.slots.get(&id).map(|s| s.clone()))
    }

    async fn list_slots(
        &self,
        consultant_id: Uuid,
        date: Option<Date>,
    ) -> Result<Vec<Slot>, StorageError> {
        let mut matching: Vec<Slot> = self
            .slots
            .iter()
            .filter(|s| s.consultant_id == consultant_id)
            .filter(|s| date.is_none_or(|d| s.date == d))
            .map(|s| s.clone())
            .collect();
        matching.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(matching)
    }

    async fn update_slot(&self, slot: &Slot) -> Result<Slot, StorageError> {
        let Some(mut existing) = self.slots.get_mut(&slot.id) else {
            return Err(StorageError::not_found("Slot", slot.id.to_string()));
        };
        *existing = slot.clone();
        Ok(slot.clone())
    }

    async fn delete_slot(&self, id: Uuid) -> Result<(), StorageError> {
        if self.slots.remove(&id).is_none() {
            return Err(StorageError::not_found("Slot", id.to_string()));
        }
        self.appointments.retain(|_, a| a.slot_id != id);
        Ok(())
    }

    async fn book_slot(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Appointment, StorageError> {
        // Appointments reference the booking user directly.
        if !self.users.contains_key(&patient_id) {
            return Err(StorageError::invalid_reference(format!(
                "user {patient_id} does not exist"
            )));
        }
        // The write guard on the slot entry makes the free-check and the
        // flip to booked a single atomic step.
        let Some(mut slot) = self.slots.get_mut(&slot_id) else {
            return Err(StorageError::not_found("Slot", slot_id.to_string()));
        };
        if slot.is_booked {
            return Err(StorageError::conflict("slot is already booked"));
        }
        slot.is_booked = true;
        slot.updated_at = now_utc();
        let appointment = Appointment::new(slot.consultant_id, patient_id, slot_id);
        drop(slot);
        self.appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StorageError> {
        Ok(self.appointments.get(&id).map(|a| a.clone()))
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StorageError> {
        let mut matching: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .map(|a| a.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn cancel_appointment(&self, id: Uuid) -> Result<(), StorageError> {
        let Some((_, appointment)) = self.appointments.remove(&id) else {
            return Err(StorageError::not_found("Appointment", id.to_string()));
        };
        if let Some(mut slot) = self.slots.get_mut(&appointment.slot_id) {
            slot.is_booked = false;
            slot.updated_at = now_utc();
        }
        Ok(())
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn create_parent(&self, parent: &Parent) -> Result<Parent, StorageError> {
        self.parents.insert(parent.id, parent.clone());
        Ok(parent.clone())
    }

    async fn get_parent(&self, id: Uuid) -> Result<Option<Parent>, StorageError> {
        Ok(self.parents.get(&id).map(|p| p.clone()))
    }

    async fn list_parents(&self) -> Result<Vec<Parent>, StorageError> {
        let mut all: Vec<Parent> = self.parents.iter().map(|p| p.clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn update_parent(&self, parent: &Parent) -> Result<Parent, StorageError> {
        let Some(mut existing) = self.parents.get_mut(&parent.id) else {
            return Err(StorageError::not_found("Parent", parent.id.to_string()));
        };
        *existing = parent.clone();
        Ok(parent.clone())
    }

    async fn delete_parent(&self, id: Uuid) -> Result<(), StorageError> {
        if self.parents.remove(&id).is_none() {
            return Err(StorageError::not_found("Parent", id.to_string()));
        }
        // Children keep existing but lose the link.
        for mut patient in self.patients.iter_mut() {
            if patient.parent_id == Some(id) {
                patient.parent_id = None;
            }
        }
        Ok(())
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, StorageError> {
        if let Some(parent_id) = patient.parent_id
            && !self.parents.contains_key(&parent_id)
        {
            return Err(StorageError::invalid_reference(format!(
                "parent {parent_id} does not exist"
            )));
        }
        self.patients.insert(patient.id, patient.clone());
        Ok(patient.clone())
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        Ok(self.patients.get(&id).map(|p| p.clone()))
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StorageError> {
        let mut all: Vec<Patient> = self.patients.iter().map(|p| p.clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn update_patient(&self, patient: &Patient) -> Result<Patient, StorageError> {
        let Some(mut existing) = self.patients.get_mut(&patient.id) else {
            return Err(StorageError::not_found("Patient", patient.id.to_string()));
        };
        *existing = patient.clone();
        Ok(patient.clone())
    }

    async fn delete_patient(&self, id: Uuid) -> Result<(), StorageError> {
        if self.patients.remove(&id).is_none() {
            return Err(StorageError::not_found("Patient", id.to_string()));
        }
        Ok(())
    }

    async fn create_scenario(&self, scenario: &Scenario) -> Result<Scenario, StorageError> {
        self.scenarios.insert(scenario.id, scenario.clone());
        Ok(scenario.clone())
    }

    async fn get_scenario(&self, id: Uuid) -> Result<Option<Scenario>, StorageError> {
        Ok(self.scenarios.get(&id).map(|s| s.clone()))
    }

    async fn list_scenarios(&self) -> Result<Vec<Scenario>, StorageError> {
        let mut all: Vec<Scenario> = self.scenarios.iter().map(|s| s.clone()).collect();
        all.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));
        Ok(all)
    }

    async fn update_scenario(&self, scenario: &Scenario) -> Result<Scenario, StorageError> {
        let Some(mut existing) = self.scenarios.get_mut(&scenario.id) else {
            return Err(StorageError::not_found("Scenario", scenario.id.to_string()));
        };
        *existing = scenario.clone();
        Ok(scenario.clone())
    }

    async fn delete_scenario(&self, id: Uuid) -> Result<(), StorageError> {
        if self.scenarios.remove(&id).is_none() {
            return Err(StorageError::not_found("Scenario", id.to_string()));
        }
        self.questions.retain(|_, q| q.scenario_id != id);
        self.recording_steps.retain(|_, s| s.scenario_id != id);
        Ok(())
    }

    async fn create_question(&self, question: &Question) -> Result<Question, StorageError> {
        if !self.scenarios.contains_key(&question.scenario_id) {
            return Err(StorageError::invalid_reference(format!(
                "scenario {} does not exist",
                question.scenario_id
            )));
        }
        self.questions.insert(question.id, question.clone());
        Ok(question.clone())
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, StorageError> {
        Ok(self.questions.get(&id).map(|q| q.clone()))
    }

    async fn list_questions(&self, scenario_id: Uuid) -> Result<Vec<Question>, StorageError> {
        let mut matching: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.scenario_id == scenario_id)
            .map(|q| q.clone())
            .collect();
        matching.sort_by_key(|q| q.order);
        Ok(matching)
    }

    async fn update_question(&self, question: &Question) -> Result<Question, StorageError> {
        let Some(mut existing) = self.questions.get_mut(&question.id) else {
            return Err(StorageError::not_found("Question", question.id.to_string()));
        };
        *existing = question.clone();
        Ok(question.clone())
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), StorageError> {
        if self.questions.remove(&id).is_none() {
            return Err(StorageError::not_found("Question", id.to_string()));
        }
        Ok(())
    }

    async fn create_recording_step(
        &self,
        step: &RecordingStep,
    ) -> Result<RecordingStep, StorageError> {
        if !self.scenarios.contains_key(&step.scenario_id) {
            return Err(StorageError::invalid_reference(format!(
                "scenario {} does not exist",
                step.scenario_id
            )));
        }
        self.recording_steps.insert(step.id, step.clone());
        Ok(step.clone())
    }

    async fn get_recording_step(&self, id: Uuid) -> Result<Option<RecordingStep>, StorageError> {
        Ok(self.recording_steps.get(&id).map(|s| s.clone()))
    }

    async fn list_recording_steps(
        &self,
        scenario_id: Uuid,
    ) -> Result<Vec<RecordingStep>, StorageError> {
        let mut matching: Vec<RecordingStep> = self
            .recording_steps
            .iter()
            .filter(|s| s.scenario_id == scenario_id)
            .map(|s| s.clone())
            .collect();
        matching.sort_by_key(|s| s.number);
        Ok(matching)
    }

    async fn update_recording_step(
        &self,
        step: &RecordingStep,
    ) -> Result<RecordingStep, StorageError> {
        let Some(mut existing) = self.recording_steps.get_mut(&step.id) else {
            return Err(StorageError::not_found(
                "RecordingStep",
                step.id.to_string(),
            ));
        };
        *existing = step.clone();
        Ok(step.clone())
    }

    async fn delete_recording_step(&self, id: Uuid) -> Result<(), StorageError> {
        if self.recording_steps.remove(&id).is_none() {
            return Err(StorageError::not_found("RecordingStep", id.to_string()));
        }
        Ok(())
    }

    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError> {
        if !self.scenarios.contains_key(&assessment.scenario_id) {
            return Err(StorageError::invalid_reference(format!(
                "scenario {} does not exist",
                assessment.scenario_id
            )));
        }
        self.assessments.insert(assessment.id, assessment.clone());
        Ok(assessment.clone())
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Option<Assessment>, StorageError> {
        Ok(self.assessments.get(&id).map(|a| a.clone()))
    }

    async fn list_assessments(&self) -> Result<Vec<Assessment>, StorageError> {
        let mut all: Vec<Assessment> = self.assessments.iter().map(|a| a.clone()).collect();
        all.sort_by(|a, b| b.assessment_date.cmp(&a.assessment_date));
        Ok(all)
    }

    async fn update_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError> {
        let Some(mut existing) = self.assessments.get_mut(&assessment.id) else {
            return Err(StorageError::not_found(
                "Assessment",
                assessment.id.to_string(),
            ));
        };
        *existing = assessment.clone();
        Ok(assessment.clone())
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError> {
        if self.assessments.remove(&id).is_none() {
            return Err(StorageError::not_found("Assessment", id.to_string()));
        }
        self.response_data.retain(|_, r| r.assessment_id != id);
        self.patient_files.retain(|_, f| f.assessment_id != id);
        Ok(())
    }

    async fn create_response_data(
        &self,
        response: &ResponseData,
    ) -> Result<ResponseData, StorageError> {
        if !self.assessments.contains_key(&response.assessment_id) {
            return Err(StorageError::invalid_reference(format!(
                "assessment {} does not exist",
                response.assessment_id
            )));
        }
        self.response_data.insert(response.id, response.clone());
        Ok(response.clone())
    }

    async fn list_response_data(
        &self,
        assessment_id: Uuid,
    ) -> Result<Vec<ResponseData>, StorageError> {
        let mut matching: Vec<ResponseData> = self
            .response_data
            .iter()
            .filter(|r| r.assessment_id == assessment_id)
            .map(|r| r.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    async fn delete_response_data(&self, id: Uuid) -> Result<(), StorageError> {
        if self.response_data.remove(&id).is_none() {
            return Err(StorageError::not_found("ResponseData", id.to_string()));
        }
        Ok(())
    }

    async fn create_patient_file(&self, file: &PatientFile) -> Result<PatientFile, StorageError> {
        if !self.assessments.contains_key(&file.assessment_id) {
            return Err(StorageError::invalid_reference(format!(
                "assessment {} does not exist",
                file.assessment_id
            )));
        }
        self.patient_files.insert(file.id, file.clone());
        Ok(file.clone())
    }

    async fn list_patient_files(
        &self,
        assessment_id: Uuid,
    ) -> Result<Vec<PatientFile>, StorageError> {
        let mut matching: Vec<PatientFile> = self
            .patient_files
            .iter()
            .filter(|f| f.assessment_id == assessment_id)
            .map(|f| f.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    async fn delete_patient_file(&self, id: Uuid) -> Result<(), StorageError> {
        if self.patient_files.remove(&id).is_none() {
            return Err(StorageError::not_found("PatientFile", id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn create_category(&self, category: &Category) -> Result<Category, StorageError> {
        let key = Self::normalize_name(&category.name);
        match self.categories_by_name.entry(key) {
            Entry::Occupied(_) => Err(StorageError::already_exists(
                "Category",
                category.name.clone(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(category.id);
                self.categories.insert(category.id, category.clone());
                Ok(category.clone())
            }
        }
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, StorageError> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut all: Vec<Category> = self.categories.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_category(&self, category: &Category) -> Result<Category, StorageError> {
        let Some(mut existing) = self.categories.get_mut(&category.id) else {
            return Err(StorageError::not_found("Category", category.id.to_string()));
        };
        let old_key = Self::normalize_name(&existing.name);
        let new_key = Self::normalize_name(&category.name);
        if old_key != new_key {
            if self.categories_by_name.contains_key(&new_key) {
                return Err(StorageError::already_exists(
                    "Category",
                    category.name.clone(),
                ));
            }
            self.categories_by_name.remove(&old_key);
            self.categories_by_name.insert(new_key, category.id);
        }
        *existing = category.clone();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StorageError> {
        let Some((_, category)) = self.categories.remove(&id) else {
            return Err(StorageError::not_found("Category", id.to_string()));
        };
        self.categories_by_name
            .remove(&Self::normalize_name(&category.name));
        let post_ids: Vec<Uuid> = self
            .posts
            .iter()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in post_ids {
            let _ = ForumStore::delete_post(self, post_id).await;
        }
        Ok(())
    }

    async fn create_post(&self, post: &Post) -> Result<Post, StorageError> {
        if !self.categories.contains_key(&post.category_id) {
            return Err(StorageError::invalid_reference(format!(
                "category {} does not exist",
                post.category_id
            )));
        }
        self.posts.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, StorageError> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn list_posts(&self, category_id: Option<Uuid>) -> Result<Vec<Post>, StorageError> {
        let mut matching: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| category_id.is_none_or(|c| p.category_id == c))
            .map(|p| p.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn update_post(&self, post: &Post) -> Result<Post, StorageError> {
        let Some(mut existing) = self.posts.get_mut(&post.id) else {
            return Err(StorageError::not_found("Post", post.id.to_string()));
        };
        *existing = post.clone();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StorageError> {
        if self.posts.remove(&id).is_none() {
            return Err(StorageError::not_found("Post", id.to_string()));
        }
        let comment_ids: Vec<Uuid> = self
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in &comment_ids {
            self.comments.remove(comment_id);
        }
        self.replies
            .retain(|_, r| !comment_ids.contains(&r.comment_id));
        Ok(())
    }

    async fn create_comment(&self, comment: &Comment) -> Result<Comment, StorageError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(StorageError::invalid_reference(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        self.comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, StorageError> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, StorageError> {
        let mut matching: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment, StorageError> {
        let Some(mut existing) = self.comments.get_mut(&comment.id) else {
            return Err(StorageError::not_found("Comment", comment.id.to_string()));
        };
        *existing = comment.clone();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), StorageError> {
        if self.comments.remove(&id).is_none() {
            return Err(StorageError::not_found("Comment", id.to_string()));
        }
        self.replies.retain(|_, r| r.comment_id != id);
        Ok(())
    }

    async fn create_reply(&self, reply: &Reply) -> Result<Reply, StorageError> {
        if !self.comments.contains_key(&reply.comment_id) {
            return Err(StorageError::invalid_reference(format!(
                "comment {} does not exist",
                reply.comment_id
            )));
        }
        self.replies.insert(reply.id, reply.clone());
        Ok(reply.clone())
    }

    async fn get_reply(&self, id: Uuid) -> Result<Option<Reply>, StorageError> {
        Ok(self.replies.get(&id).map(|r| r.clone()))
    }

    async fn list_replies(&self, comment_id: Uuid) -> Result<Vec<Reply>, StorageError> {
        let mut matching: Vec<Reply> = self
            .replies
            .iter()
            .filter(|r| r.comment_id == comment_id)
            .map(|r| r.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }

    async fn update_reply(&self, reply: &Reply) -> Result<Reply, StorageError> {
        let Some(mut existing) = self.replies.get_mut(&reply.id) else {
            return Err(StorageError::not_found("Reply", reply.id.to_string()));
        };
        *existing = reply.clone();
        Ok(reply.clone())
    }

    async fn delete_reply(&self, id: Uuid) -> Result<(), StorageError> {
        if self.replies.remove(&id).is_none() {
            return Err(StorageError::not_found("Reply", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn sample_consultant() -> Consultant {
        Consultant::new(
            "Dr. Amina Rahman",
            "Child Psychology",
            "Dhaka",
            "MBBS, FCPS",
            "amina@example.com",
        )
    }

    fn sample_user(email: &str) -> User {
        let mut user = User::new("parent1", email);
        user.password_hash = Some("hash".to_string());
        user
    }

    #[tokio::test]
    async fn user_email_uniqueness_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .create_user(&sample_user("Parent@Example.com"))
            .await
            .unwrap();
        let mut other = sample_user("parent@example.com");
        other.username = "parent2".to_string();
        let err = store.create_user(&other).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));

        let found = store
            .find_user_by_email("PARENT@EXAMPLE.COM")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn user_username_uniqueness_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .create_user(&sample_user("first@example.com"))
            .await
            .unwrap();
        let mut other = sample_user("second@example.com");
        other.username = "PARENT1".to_string();
        let err = store.create_user(&other).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));

        // A failed insert leaves no half-written index entries behind.
        let mut email_clash = sample_user("first@example.com");
        email_clash.username = "parent9".to_string();
        let err = store.create_user(&email_clash).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
        assert!(
            store
                .find_user_by_username("parent9")
                .await
                .unwrap()
                .is_none()
        );

        let found = store.find_user_by_username("Parent1").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn put_otp_replaces_previous_code() {
        let store = MemoryStore::new();
        let first = OtpCode::issue("a@b.com", "111111");
        let second = OtpCode::issue("a@b.com", "222222");
        store.put_otp(&first).await.unwrap();
        store.put_otp(&second).await.unwrap();

        let current = store.get_otp("a@b.com").await.unwrap().unwrap();
        assert_eq!(current.code, "222222");
    }

    #[tokio::test]
    async fn booking_a_slot_twice_conflicts() {
        let store = MemoryStore::new();
        let consultant = sample_consultant();
        store.create_consultant(&consultant).await.unwrap();
        let slot = Slot::new(consultant.id, date!(2026 - 09 - 01), time!(10:00), None);
        store.create_slot(&slot).await.unwrap();

        let user = sample_user("p@example.com");
        store.create_user(&user).await.unwrap();

        let appointment = store.book_slot(slot.id, user.id).await.unwrap();
        assert_eq!(appointment.consultant_id, consultant.id);
        assert!(store.get_slot(slot.id).await.unwrap().unwrap().is_booked);

        let err = store.book_slot(slot.id, user.id).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn cancelling_an_appointment_frees_the_slot() {
        let store = MemoryStore::new();
        let consultant = sample_consultant();
        store.create_consultant(&consultant).await.unwrap();
        let slot = Slot::new(consultant.id, date!(2026 - 09 - 02), time!(11:30), None);
        store.create_slot(&slot).await.unwrap();
        let user = sample_user("q@example.com");
        store.create_user(&user).await.unwrap();

        let appointment = store.book_slot(slot.id, user.id).await.unwrap();
        store.cancel_appointment(appointment.id).await.unwrap();
        assert!(!store.get_slot(slot.id).await.unwrap().unwrap().is_booked);
    }

    #[tokio::test]
    async fn slots_are_listed_in_chronological_order() {
        let store = MemoryStore::new();
        let consultant = sample_consultant();
        store.create_consultant(&consultant).await.unwrap();
        let late = Slot::new(consultant.id, date!(2026 - 09 - 02), time!(15:00), None);
        let early = Slot::new(consultant.id, date!(2026 - 09 - 01), time!(09:00), None);
        store.create_slot(&late).await.unwrap();
        store.create_slot(&early).await.unwrap();

        let listed = store.list_slots(consultant.id, None).await.unwrap();
        assert_eq!(listed[0].id, early.id);
        assert_eq!(listed[1].id, late.id);

        let one_day = store
            .list_slots(consultant.id, Some(date!(2026 - 09 - 02)))
            .await
            .unwrap();
        assert_eq!(one_day.len(), 1);
        assert_eq!(one_day[0].id, late.id);
    }

    #[tokio::test]
    async fn category_name_uniqueness() {
        let store = MemoryStore::new();
        store
            .create_category(&Category::new("General", None))
            .await
            .unwrap();
        let err = store
            .create_category(&Category::new("general", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn deleting_a_post_removes_comments_and_replies() {
        let store = MemoryStore::new();
        let author = sample_user("author@example.com");
        store.create_user(&author).await.unwrap();
        let category = Category::new("Therapies", None);
        store.create_category(&category).await.unwrap();
        let post = Post::new(author.id, category.id, "Early signs", "What to watch for");
        store.create_post(&post).await.unwrap();
        let comment = Comment::new(post.id, author.id, "Great question");
        store.create_comment(&comment).await.unwrap();
        let reply = Reply::new(comment.id, author.id, "Agreed");
        store.create_reply(&reply).await.unwrap();

        ForumStore::delete_post(&store, post.id).await.unwrap();
        assert!(store.get_comment(comment.id).await.unwrap().is_none());
        assert!(store.get_reply(reply.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let store = MemoryStore::new();
        let author = sample_user("a@example.com");
        store.create_user(&author).await.unwrap();
        let category = Category::new("General", None);
        store.create_category(&category).await.unwrap();

        let mut first = Post::new(author.id, category.id, "first", "body");
        first.created_at = now_utc() - time::Duration::hours(2);
        let second = Post::new(author.id, category.id, "second", "body");
        store.create_post(&first).await.unwrap();
        store.create_post(&second).await.unwrap();

        let listed = store.list_posts(Some(category.id)).await.unwrap();
        assert_eq!(listed[0].title, "second");
        assert_eq!(listed[1].title, "first");
    }

    #[tokio::test]
    async fn deleting_a_scenario_removes_children() {
        let store = MemoryStore::new();
        let scenario = Scenario::new("Response to Name", "desc", "img.png", "Easy", "gemini", 1);
        store.create_scenario(&scenario).await.unwrap();
        let question = Question::new(scenario.id, "Does the child respond?", 1);
        store.create_question(&question).await.unwrap();
        let step = RecordingStep::new(scenario.id, 1, "Call name", "desc", "step.png", 30);
        store.create_recording_step(&step).await.unwrap();

        store.delete_scenario(scenario.id).await.unwrap();
        assert!(store.get_question(question.id).await.unwrap().is_none());
        assert!(
            store
                .get_recording_step(step.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn slot_for_unknown_consultant_is_rejected() {
        let store = MemoryStore::new();
        let slot = Slot::new(Uuid::new_v4(), date!(2026 - 09 - 01), time!(10:00), None);
        let err = store.create_slot(&slot).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidReference { .. }));
    }
}
