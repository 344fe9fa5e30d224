//! Domain model for goals, tags and recalled events.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Own field-level validation rules for every persisted record.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Events reference tags by id; a tag label is display-only.

pub mod error;
pub mod event;
pub mod goal;
pub mod ratings;
pub mod tag;
