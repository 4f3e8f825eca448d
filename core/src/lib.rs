//! Campus Auth Core Library
//!
//! This library exposes the authentication modules for use in tests and other crates.

pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod store;
