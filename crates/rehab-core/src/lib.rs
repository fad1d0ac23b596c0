//! Core types and trait definitions for the rehab record service.
//!
//! This crate has no HTTP or database dependencies. It holds
//! the resource schemas, the [`store::DocumentStore`] abstraction, and the
//! services that implement the CRUD contracts on top of it.

pub mod error;
pub mod exercise;
pub mod memory;
pub mod service;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
