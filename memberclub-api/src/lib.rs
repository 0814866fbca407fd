//! # Memberclub API Server Library
//!
//! Core functionality for the Memberclub API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, authentication layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response hardening middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
