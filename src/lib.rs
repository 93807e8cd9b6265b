//! # Sora Gateway
//!
//! A stateless HTTP gateway that lets a browser client drive the OpenAI Sora
//! video API without holding the API secret itself.
//!
//! ## Overview
//!
//! Each request carries `Authorization: Bearer <token>`. The gateway:
//! - resolves the token, optionally swapping a configured alias for the real key
//! - issues the equivalent downstream call (create, retrieve, download, delete, remix)
//! - maps the result to JSON or a buffered binary response
//! - collapses every downstream failure into `500 {"detail": ...}`
//!
//! It can also serve a built single-page frontend with client-side routing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sora_gateway::{GatewayConfig, client::OpenAiClient, credential::CredentialResolver};
//! use sora_gateway::handler::AppState;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! config.validate()?;
//!
//! let provider = Arc::new(OpenAiClient::new(&config.upstream)?);
//! let state = Arc::new(AppState::new(
//!     provider,
//!     CredentialResolver::from_config(&config.credentials),
//! ));
//! let app = sora_gateway::router::build_router(state, &config);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`credential`] - Bearer token parsing and alias substitution
//! - [`error`] - Error types and their HTTP mapping
//! - [`models`] - Video job and chat completion data structures
//! - [`provider`] - Downstream API abstraction
//! - [`client`] - reqwest implementation of the downstream API
//! - [`batch`] - Concurrent multi-id lookup
//! - [`prompt`] - Prompt-improvement instruction and request builder
//! - [`handler`] - Route handlers
//! - [`router`] - Route table, CORS and frontend fallback

pub mod batch;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod handler;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod router;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
