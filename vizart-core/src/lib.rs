//! Vizart Core
//!
//! Core types for the Vizart virtual try-on client SDK.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, ProcessingResult, etc.)
//! - DTOs: Request payloads and wire envelopes for the backend API

pub mod domain;
pub mod dto;
