//! Domain services.

pub mod reporting;
