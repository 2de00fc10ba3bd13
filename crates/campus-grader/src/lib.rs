//! # campus-grader
//!
//! AI-assisted assignment grading.
//!
//! A [`Grader`] turns a [`Submission`](campus_core::Submission) into a prompt,
//! sends it to a [`LanguageModel`], and returns the completion's JSON object
//! once it reads as a [`GradeResult`](campus_core::GradeResult).
//! [`GradingService`] wraps it in the
//! HTTP request/response contract and [`GradingServer`] serves that over
//! `tiny_http`.
//!
//! Every call is single-attempt: no retries, no caching, no state across
//! requests. Both outbound calls (image fetch and model) are bounded by a
//! timeout and a cancellation token.

pub mod error;
pub mod fetch;
pub mod gemini;
pub mod grader;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod server;
pub mod service;

pub use error::GradeError;
pub use fetch::HttpImageFetcher;
pub use gemini::GeminiClient;
pub use grader::Grader;
pub use model::{ImageFetcher, LanguageModel};
pub use prompt::{FetchedImage, PromptPart};
pub use server::GradingServer;
pub use service::{CORS_HEADERS, GradingService, Reply};
