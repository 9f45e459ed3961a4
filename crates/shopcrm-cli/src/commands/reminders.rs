//! Reminder sweep commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use shopcrm_core::config::AppConfig;
use shopcrm_core::error::AppError;
use shopcrm_core::result::AppResult;
use shopcrm_entity::appointment::ReminderKind;
use shopcrm_service::{AppointmentReport, BatchReport, DueReminder, check_reference_time};

use crate::output::{self, OutputFormat};

/// Arguments for reminder commands
#[derive(Debug, Args)]
pub struct RemindersArgs {
    /// Reminder subcommand
    #[command(subcommand)]
    pub command: RemindersCommand,
}

/// Reminder subcommands
#[derive(Debug, Subcommand)]
pub enum RemindersCommand {
    /// Send every reminder that is due and record it
    Run {
        /// Evaluate at this RFC 3339 instant instead of now (within a year)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// List reminders that are due without sending them
    Preview {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
}

/// One row of a run report
#[derive(Debug, Serialize, Tabled)]
struct ReportRow {
    /// Appointment
    appointment: String,
    /// Attempted
    attempted: String,
    /// Sent
    sent: String,
    /// Failed
    failed: String,
    /// Error
    error: String,
}

impl From<&AppointmentReport> for ReportRow {
    fn from(report: &AppointmentReport) -> Self {
        Self {
            appointment: report.appointment_id.to_string(),
            attempted: join_kinds(&report.attempted),
            sent: join_kinds(&report.sent),
            failed: report
                .failed
                .iter()
                .map(|f| format!("{} ({})", f.kind, f.reason))
                .collect::<Vec<_>>()
                .join("; "),
            error: report.error.clone().unwrap_or_default(),
        }
    }
}

/// One row of a preview
#[derive(Debug, Serialize, Tabled)]
struct DueRow {
    /// Appointment
    appointment: String,
    /// Scheduled (UTC)
    scheduled_at: String,
    /// Kind
    kind: String,
    /// Channel
    channel: String,
}

impl From<&DueReminder> for DueRow {
    fn from(due: &DueReminder) -> Self {
        Self {
            appointment: due.appointment_id.to_string(),
            scheduled_at: due.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
            kind: due.kind.to_string(),
            channel: due.channel.to_string(),
        }
    }
}

fn join_kinds(kinds: &[ReminderKind]) -> String {
    kinds
        .iter()
        .map(ReminderKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Execute reminder commands
pub async fn execute(
    args: &RemindersArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    // Marks from a run are permanent; bound `--now` before touching the store.
    let run_at = match &args.command {
        RemindersCommand::Run { now } => Some(run_reference_time(*now, Utc::now())?),
        RemindersCommand::Preview { .. } => None,
    };

    let (db, scheduler) = super::connect_scheduler(config).await?;

    let result = match &args.command {
        RemindersCommand::Run { .. } => {
            let now = run_at.unwrap_or_else(Utc::now);
            let report = scheduler.generate_due_reminders(now).await;
            report.map(|r| print_report(&r, format))
        }
        RemindersCommand::Preview { now } => {
            let due = scheduler.preview(now.unwrap_or_else(Utc::now)).await;
            due.map(|d| print_preview(&d, format))
        }
    };

    db.close().await;
    result
}

/// Instant a `run` evaluates at: `--now` if given and close enough to
/// `current`, otherwise `current`.
fn run_reference_time(
    now: Option<DateTime<Utc>>,
    current: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    match now {
        Some(now) => {
            check_reference_time(now, current)?;
            Ok(now)
        }
        None => Ok(current),
    }
}

fn print_report(report: &BatchReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            let rows: Vec<ReportRow> = report.appointments.iter().map(ReportRow::from).collect();
            output::print_table(&rows);
            output::print_kv("Evaluated at", &report.now.to_rfc3339());
            output::print_kv("Candidates", &report.candidates.to_string());
            output::print_kv("Dispatched", &report.dispatched.to_string());
            output::print_kv("Failed", &report.failed.to_string());
            if report.failed > 0 || report.errored() > 0 {
                output::print_warning("Failed reminders stay due and are retried on the next run.");
            } else {
                output::print_success("Reminder run complete.");
            }
        }
    }
}

fn print_preview(due: &[DueReminder], format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(due),
        OutputFormat::Table => {
            let rows: Vec<DueRow> = due.iter().map(DueRow::from).collect();
            output::print_table(&rows);
        }
    }
}
