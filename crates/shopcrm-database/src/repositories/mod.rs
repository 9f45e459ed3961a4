//! Concrete PostgreSQL repositories.

pub mod appointment;
pub mod customer;

pub use appointment::AppointmentRepository;
pub use customer::CustomerRepository;
