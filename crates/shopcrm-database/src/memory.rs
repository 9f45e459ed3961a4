//! In-memory appointment and customer store using a Tokio mutex.
//!
//! Suitable for single-node development and tests. The conditional
//! reminder mark is a check-and-insert under one lock guard, so concurrent
//! callers observe exactly one `Marked` per kind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use shopcrm_core::result::AppResult;
use shopcrm_core::types::id::{AppointmentId, CustomerId};
use shopcrm_entity::appointment::{Appointment, AppointmentStatus, ReminderKind};
use shopcrm_entity::customer::{Customer, CustomerContact};

use crate::store::{AppointmentStore, CustomerStore, MarkOutcome};

#[derive(Debug, Default)]
struct InnerState {
    appointments: HashMap<AppointmentId, Appointment>,
    customers: HashMap<CustomerId, Customer>,
}

/// Shared in-memory store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a customer.
    pub async fn insert_customer(&self, customer: Customer) {
        let mut state = self.state.lock().await;
        state.customers.insert(customer.id, customer);
    }

    /// Insert or replace an appointment.
    pub async fn insert_appointment(&self, appointment: Appointment) {
        let mut state = self.state.lock().await;
        state.appointments.insert(appointment.id, appointment);
    }

    /// Change the status of an appointment. Returns `false` if it does not exist.
    pub async fn set_status(&self, id: AppointmentId, status: AppointmentStatus) -> bool {
        let mut state = self.state.lock().await;
        match state.appointments.get_mut(&id) {
            Some(appointment) => {
                appointment.status = status;
                appointment.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Snapshot of an appointment.
    pub async fn appointment(&self, id: AppointmentId) -> Option<Appointment> {
        self.state.lock().await.appointments.get(&id).cloned()
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn find_upcoming(
        &self,
        statuses: &[AppointmentStatus],
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let state = self.state.lock().await;
        let mut found: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| statuses.contains(&a.status))
            .filter(|a| a.scheduled_at > after && a.scheduled_at <= before)
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.scheduled_at, a.id));
        Ok(found)
    }

    async fn find_by_id(&self, id: AppointmentId) -> AppResult<Option<Appointment>> {
        Ok(self.appointment(id).await)
    }

    async fn mark_reminder_sent(
        &self,
        id: AppointmentId,
        kind: ReminderKind,
    ) -> AppResult<MarkOutcome> {
        let mut state = self.state.lock().await;
        let Some(appointment) = state.appointments.get_mut(&id) else {
            return Ok(MarkOutcome::NotFound);
        };

        if !appointment.reminders_sent.insert(kind) {
            debug!(appointment_id = %id, kind = %kind, "Reminder already recorded");
            return Ok(MarkOutcome::AlreadySent);
        }

        appointment.updated_at = Utc::now();
        Ok(MarkOutcome::Marked)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_contact(&self, id: CustomerId) -> AppResult<Option<CustomerContact>> {
        let state = self.state.lock().await;
        Ok(state.customers.get(&id).map(Customer::contact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(),
            name: "Sam Ortiz".to_string(),
            email: Some("sam@example.com".to_string()),
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_upcoming_filters_window_and_status() {
        let store = MemoryStore::new();
        let owner = customer();
        let now = Utc::now();

        let soon = Appointment::new(owner.id, now + Duration::hours(3));
        let later = Appointment::new(owner.id, now + Duration::hours(30));
        let past = Appointment::new(owner.id, now - Duration::hours(1));
        let cancelled = Appointment::new(owner.id, now + Duration::hours(2))
            .with_status(AppointmentStatus::Cancelled);
        let confirmed = Appointment::new(owner.id, now + Duration::hours(1))
            .with_status(AppointmentStatus::Confirmed);

        for a in [&soon, &later, &past, &cancelled, &confirmed] {
            store.insert_appointment(a.clone()).await;
        }

        let found = store
            .find_upcoming(&AppointmentStatus::ACTIVE, now, now + Duration::hours(24))
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![confirmed.id, soon.id]);
    }

    #[tokio::test]
    async fn test_mark_reminder_sent_is_conditional() {
        let store = MemoryStore::new();
        let appointment = Appointment::new(CustomerId::new(), Utc::now() + Duration::hours(5));
        let id = appointment.id;
        store.insert_appointment(appointment).await;

        let first = store
            .mark_reminder_sent(id, ReminderKind::DayBefore)
            .await
            .unwrap();
        let second = store
            .mark_reminder_sent(id, ReminderKind::DayBefore)
            .await
            .unwrap();

        assert_eq!(first, MarkOutcome::Marked);
        assert_eq!(second, MarkOutcome::AlreadySent);
        assert!(
            store
                .appointment(id)
                .await
                .unwrap()
                .has_sent(ReminderKind::DayBefore)
        );
    }

    #[tokio::test]
    async fn test_concurrent_marks_yield_single_winner() {
        let store = MemoryStore::new();
        let appointment = Appointment::new(CustomerId::new(), Utc::now() + Duration::hours(5));
        let id = appointment.id;
        store.insert_appointment(appointment).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.mark_reminder_sent(id, ReminderKind::TwoHours).await
            }));
        }

        let mut marked = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == MarkOutcome::Marked {
                marked += 1;
            }
        }
        assert_eq!(marked, 1);
    }

    #[tokio::test]
    async fn test_mark_unknown_appointment() {
        let store = MemoryStore::new();
        let outcome = store
            .mark_reminder_sent(AppointmentId::new(), ReminderKind::SameDay)
            .await
            .unwrap();
        assert_eq!(outcome, MarkOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_find_contact() {
        let store = MemoryStore::new();
        let owner = customer();
        store.insert_customer(owner.clone()).await;

        let contact = store.find_contact(owner.id).await.unwrap().unwrap();
        assert_eq!(contact.email.as_deref(), Some("sam@example.com"));
        assert!(store.find_contact(CustomerId::new()).await.unwrap().is_none());
    }
}
