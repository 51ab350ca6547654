//! Row structs matching database tables.

pub mod quiz_session;
