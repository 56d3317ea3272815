//! lmchat
//!
//! A terminal front end for a chat service that keeps per-session memory
//! server-side. It sends chat turns, uploads text files for the service to
//! index, and resets the service's memory.
//!
//! # Architecture
//!
//! - **Session**: a client-generated identifier persisted in durable storage
//! - **Conversation**: owned transcript and upload state with explicit transitions
//! - **Dispatch**: background requests with an ordered send queue
//! - **UI**: line-oriented terminal loop
//!
//! # Modules
//!
//! - [`api`]: HTTP client for `/chat/`, `/upload/` and `/reset/`
//! - [`app`]: user actions wired to state and requests
//! - [`config`]: layered configuration
//! - [`conversation`]: transcript and upload status
//! - [`dispatch`]: background request execution
//! - [`session`]: session identifier and storage
//! - [`ui`]: terminal rendering and input loop

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
