//! Library crate for jury-options, exposing the event options record and judging clock.

pub mod config;
/// Options record model and its storage backends.
pub mod dao;
/// Request shapes and their validation.
pub mod dto;
/// Service-level error type.
pub mod error;
/// Options, clock and background services.
pub mod services;
/// Shared application state and the judging clock.
pub mod state;
