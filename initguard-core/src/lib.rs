//! Initguard library exports

pub mod auth;
