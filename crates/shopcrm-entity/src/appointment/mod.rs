//! Appointment entity and reminder settings.

pub mod model;
pub mod reminder;
pub mod status;

pub use model::Appointment;
pub use reminder::{PreferredChannel, ReminderKind, ReminderSettings};
pub use status::AppointmentStatus;
