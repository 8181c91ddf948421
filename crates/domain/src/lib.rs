//! Domain layer for the BharatNet CRM analytics backend.
//!
//! This crate contains:
//! - Report response models (wire format for the analytics endpoints)
//! - CRM lifecycle enumerations (customer status, lead status, deal stage)
//! - Pure derived-metric functions shared by the route handlers

pub mod models;
pub mod services;
