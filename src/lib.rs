//! Causerie is a terminal chat client paired with a small relay server.
//!
//! The crate is organized around a few collaborating layers:
//! - [`core`] owns the conversation state, the model catalog, and the
//!   persisted configuration.
//! - [`api`] defines the relay wire contract and the client that speaks it.
//! - [`server`] is the relay itself: one `POST /api/chat` route translating
//!   each request into a provider call.
//! - [`provider`] is the upstream boundary: the provider trait and its
//!   OpenAI-compatible implementation.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`server`] or
//! [`ui::chat_loop`] depending on the subcommand.

pub mod api;
pub mod cli;
pub mod core;
pub mod provider;
pub mod server;
pub mod ui;
pub mod utils;
