//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod quiz_session_repo;

pub use quiz_session_repo::QuizSessionRepo;
