use uuid::Uuid;

/// Generate a fresh entity ID.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
