//! Backend services: content loading, learner sessions, persistence

pub mod content;
pub mod gateway;
pub mod session;
