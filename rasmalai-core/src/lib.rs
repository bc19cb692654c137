//! Core types and traits for rasmalai
//!
//! This crate provides the conversation data model, history persistence,
//! configuration and logging shared by the other rasmalai crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
