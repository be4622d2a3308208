//! Data Transfer Objects for the backend API
//!
//! This module contains the request payloads callers construct and the
//! wire envelopes the backend wraps its responses in. DTOs stay close to
//! the HTTP surface; the `domain` module holds the client's own view.

pub mod job;
pub mod request;
