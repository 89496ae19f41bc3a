//! RabbitOp - terminal companion for the RabbitMQ admin console
//!
//! The library holds the client-side resource cache, the controllers that
//! load and refresh gateway data through it, and the CLI built on top.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod refresh;

pub use error::{ApiError, Error, Result};
