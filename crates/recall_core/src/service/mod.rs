//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Services receive their repositories explicitly; there is no global
//!   service state.

pub mod event_service;
pub mod goal_service;
pub mod stats_service;
pub mod tag_service;
