//! HTTP route handlers

pub mod session;
pub mod state;
pub mod stats;
pub mod study;
pub mod words;
