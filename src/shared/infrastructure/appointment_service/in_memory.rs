// In memory implementation of the AppointmentService and MemberDirectory ports.
//
// Purpose
// - Support controller tests and local development without the remote API.
//
// Responsibilities
// - Keep appointment records in insertion order, like the server returns them.
// - Reject a booking on a slot that an uncancelled appointment already holds.
// - Let tests go offline, force conflicts and hold a fetch or a write until released.

use crate::modules::schedule::core::appointment::AppointmentStatus;
use crate::shared::infrastructure::appointment_service::{
    AppointmentRecord, AppointmentService, AppointmentServiceError, MemberDirectory, MemberRecord,
    wire_id,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock, oneshot};
use uuid::Uuid;

const STORED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Default)]
pub struct InMemoryAppointmentService {
    records: RwLock<Vec<AppointmentRecord>>,
    members: RwLock<Vec<MemberRecord>>,
    offline: AtomicBool,
    force_conflict: AtomicBool,
    fetch_calls: AtomicUsize,
    write_calls: AtomicUsize,
    held_fetches: Mutex<VecDeque<oneshot::Receiver<()>>>,
    held_writes: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

/// Releases a call held by `hold_next_fetch` or `hold_next_write`. Dropping it releases too.
pub struct FetchGate {
    release: oneshot::Sender<()>,
}

impl FetchGate {
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl InMemoryAppointmentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<AppointmentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    pub async fn seed_members(&self, members: Vec<MemberRecord>) {
        *self.members.write().await = members;
    }

    pub async fn add_records(&self, records: Vec<AppointmentRecord>) {
        self.records.write().await.extend(records);
    }

    pub async fn records(&self) -> Vec<AppointmentRecord> {
        self.records.read().await.clone()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn set_force_conflict(&self, on: bool) {
        self.force_conflict.store(on, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// The next fetch to start waits until the returned gate is released.
    pub async fn hold_next_fetch(&self) -> FetchGate {
        let (release, wait) = oneshot::channel();
        self.held_fetches.lock().await.push_back(wait);
        FetchGate { release }
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// The next book or cancel to start waits until the returned gate is released.
    pub async fn hold_next_write(&self) -> FetchGate {
        let (release, wait) = oneshot::channel();
        self.held_writes.lock().await.push_back(wait);
        FetchGate { release }
    }

    async fn wait_if_held(queue: &Mutex<VecDeque<oneshot::Receiver<()>>>) {
        let held = queue.lock().await.pop_front();
        if let Some(wait) = held {
            let _ = wait.await;
        }
    }

    fn ensure_online(&self) -> Result<(), AppointmentServiceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppointmentServiceError::Backend(
                "appointment service offline".into(),
            ));
        }
        Ok(())
    }
}

fn record_date(record: &AppointmentRecord) -> Option<NaiveDate> {
    let raw = record.appointment_time.as_deref()?;
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn is_active(record: &AppointmentRecord) -> bool {
    !record
        .status
        .as_deref()
        .and_then(AppointmentStatus::parse)
        .is_some_and(|status| !status.occupies_slot())
}

#[async_trait]
impl AppointmentService for InMemoryAppointmentService {
    async fn fetch_appointments(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<AppointmentRecord>, AppointmentServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_if_held(&self.held_fetches).await;
        self.ensure_online()?;

        let records = self.records.read().await;
        // Records without a readable date are passed through for the caller to judge.
        Ok(records
            .iter()
            .filter(|r| record_date(r).is_none_or(|d| window_start <= d && d <= window_end))
            .cloned()
            .collect())
    }

    async fn book_appointment(
        &self,
        appointment_time: DateTime<FixedOffset>,
        member_id: Option<&str>,
    ) -> Result<AppointmentRecord, AppointmentServiceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_if_held(&self.held_writes).await;
        self.ensure_online()?;
        let stored_time = appointment_time
            .naive_local()
            .format(STORED_TIME_FORMAT)
            .to_string();

        let mut records = self.records.write().await;
        let taken = records
            .iter()
            .any(|r| is_active(r) && r.appointment_time.as_deref() == Some(stored_time.as_str()));
        if taken || self.force_conflict.load(Ordering::SeqCst) {
            return Err(AppointmentServiceError::Conflict(format!(
                "{stored_time} is already booked"
            )));
        }

        let member_name = match member_id {
            Some(id) => self
                .members
                .read()
                .await
                .iter()
                .find(|m| wire_id(&m.id).as_deref() == Some(id))
                .and_then(|m| m.name.clone().or_else(|| m.username.clone())),
            None => None,
        };

        let record = AppointmentRecord {
            id: serde_json::Value::String(Uuid::now_v7().to_string()),
            appointment_time: Some(stored_time),
            status: Some("SCHEDULED".into()),
            member_name,
            check_in_time: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn cancel_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<(), AppointmentServiceError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait_if_held(&self.held_writes).await;
        self.ensure_online()?;
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| wire_id(&r.id).as_deref() == Some(appointment_id))
            .ok_or_else(|| AppointmentServiceError::NotFound(appointment_id.to_string()))?;
        record.status = Some("CANCELLED".into());
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for InMemoryAppointmentService {
    async fn list_members(&self) -> Result<Vec<MemberRecord>, AppointmentServiceError> {
        self.ensure_online()?;
        Ok(self.members.read().await.clone())
    }
}
