//! # Quill Shared
//!
//! Wire types shared between the backend and its clients: request and
//! response DTOs, the pagination envelope, and the RFC 7807 error body.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
