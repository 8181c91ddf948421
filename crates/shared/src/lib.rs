//! Shared utilities for the BharatNet CRM analytics backend.
//!
//! This crate provides functionality used across the other crates:
//! - JWT bearer-token utilities (HS256)

pub mod jwt;
