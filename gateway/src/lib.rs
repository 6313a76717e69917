//! HTTP completion gateway.
//!
//! Accepts a raw prompt on `POST /api/generate`, forwards it to a
//! [`Completer`](persona::Completer) such as [`OpenAiCompleter`] and answers
//! with the generated text.

pub mod config;
pub mod logging;
pub mod openai;
pub mod web;

pub use config::Config;
pub use logging::init_logging;
pub use openai::{OpenAiCompleter, Sampling};
pub use web::{AppState, app};
