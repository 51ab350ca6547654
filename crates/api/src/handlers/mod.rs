pub mod payments;
pub mod questions;
pub mod sessions;
