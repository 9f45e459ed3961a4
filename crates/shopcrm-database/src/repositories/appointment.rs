//! Appointment repository implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;

use shopcrm_core::error::{AppError, ErrorKind};
use shopcrm_core::result::AppResult;
use shopcrm_core::types::id::{AppointmentId, CustomerId};
use shopcrm_entity::appointment::{
    Appointment, AppointmentStatus, PreferredChannel, ReminderKind, ReminderSettings,
};

use crate::store::{AppointmentStore, MarkOutcome};

/// Flat row shape of the `appointments` table.
#[derive(Debug, FromRow)]
struct AppointmentRow {
    id: AppointmentId,
    customer_id: CustomerId,
    scheduled_at: DateTime<Utc>,
    status: AppointmentStatus,
    send_24h_reminder: bool,
    send_2h_reminder: bool,
    send_same_day_reminder: bool,
    preferred_channel: PreferredChannel,
    reminders_sent: Vec<String>,
    service_description: Option<String>,
    vehicle_label: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        let reminders_sent: BTreeSet<ReminderKind> = row
            .reminders_sent
            .iter()
            .filter_map(|raw| match raw.parse::<ReminderKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!(appointment_id = %row.id, marker = %raw, "Ignoring unknown reminder marker: {e}");
                    None
                }
            })
            .collect();

        Self {
            id: row.id,
            customer_id: row.customer_id,
            scheduled_at: row.scheduled_at,
            status: row.status,
            reminder_settings: ReminderSettings {
                send_24h_reminder: row.send_24h_reminder,
                send_2h_reminder: row.send_2h_reminder,
                send_same_day_reminder: row.send_same_day_reminder,
                preferred_channel: row.preferred_channel,
            },
            reminders_sent,
            service_description: row.service_description,
            vehicle_label: row.vehicle_label,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed appointment store.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    /// Create a new appointment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: AppointmentId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM appointments WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check appointment", e)
            })
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn find_upcoming(
        &self,
        statuses: &[AppointmentStatus],
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let rows = sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments \
             WHERE status::text = ANY($1) AND scheduled_at > $2 AND scheduled_at <= $3 \
             ORDER BY scheduled_at ASC",
        )
        .bind(&statuses)
        .bind(after)
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query upcoming appointments", e)
        })?;

        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn find_by_id(&self, id: AppointmentId) -> AppResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load appointment", e)
            })?;
        Ok(row.map(Appointment::from))
    }

    async fn mark_reminder_sent(
        &self,
        id: AppointmentId,
        kind: ReminderKind,
    ) -> AppResult<MarkOutcome> {
        // Single conditional statement; the row lock taken by UPDATE makes
        // the absent-check and the append one atomic step.
        let result = sqlx::query(
            "UPDATE appointments \
             SET reminders_sent = array_append(reminders_sent, $2), updated_at = NOW() \
             WHERE id = $1 AND NOT ($2 = ANY(reminders_sent))",
        )
        .bind(id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record reminder", e)
        })?;

        if result.rows_affected() > 0 {
            return Ok(MarkOutcome::Marked);
        }

        if self.exists(id).await? {
            Ok(MarkOutcome::AlreadySent)
        } else {
            Ok(MarkOutcome::NotFound)
        }
    }
}
