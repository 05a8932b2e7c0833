use crate::shared::infrastructure::appointment_service::{MemberRecord, wire_id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    /// Records without an id cannot be booked for, so they are dropped.
    pub fn from_record(record: &MemberRecord) -> Option<Self> {
        let id = wire_id(&record.id)?;
        let name = record
            .name
            .clone()
            .or_else(|| record.username.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Unknown Member".to_string());
        Some(Self { id, name })
    }
}
