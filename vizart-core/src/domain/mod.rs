//! Core domain types
//!
//! This module contains the domain structures shared across the Vizart
//! client crates. These represent the backend's view of a processing job
//! as observed through its public API.

pub mod job;
