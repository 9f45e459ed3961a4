//! Customer entity and contact details.

pub mod model;

pub use model::{Customer, CustomerContact};
