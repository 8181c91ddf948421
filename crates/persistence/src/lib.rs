//! Persistence layer for the BharatNet CRM analytics backend.
//!
//! This crate contains:
//! - Database connection management
//! - Aggregate row entities (typed mappings for report queries)
//! - The analytics repository holding all report queries

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
