//! # campus-core
//!
//! Core types and error types shared by the campus e-learning services.
//!
//! This crate provides the foundational types used across all campus crates:
//! - Identity types issued by the hosted identity service (users, sessions)
//! - Profile records and partial updates
//! - The authentication phase state machine and its observable snapshot
//! - Grading request/response types
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod grading;
pub mod identity;
pub mod profile;
pub mod state;

pub use enums::{AuthPhase, Role};
pub use errors::CoreError;
pub use grading::{GradeResult, Submission};
pub use identity::{Session, User};
pub use profile::{Profile, ProfileUpdate};
pub use state::{AuthState, ProfileLoadFailed};
