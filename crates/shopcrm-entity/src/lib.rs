//! # shopcrm-entity
//!
//! Domain entities for the appointment communication workflow:
//! appointments and their reminder settings, customer contacts, and the
//! notification channel/template/outcome types shared by the scheduler
//! and the notification transports.

pub mod appointment;
pub mod customer;
pub mod notification;
