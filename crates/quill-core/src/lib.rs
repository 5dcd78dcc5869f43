//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, pagination and filtering, and the cascade delete coordinator.

pub mod domain;
pub mod error;
pub mod filter;
pub mod media;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
