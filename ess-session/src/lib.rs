//! # ess-session
//!
//! Conversation memory for the assistant. One append-only transcript per
//! caller-supplied session id, created on first reference and kept for the
//! life of the process.

mod store;

pub use store::{SessionHandle, SessionStore};
