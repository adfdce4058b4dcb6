//! Sessionvault - cached resolution of captured platform login sessions.

pub mod config;
pub mod session;
pub mod store;
