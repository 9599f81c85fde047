//! NLP gateway - linguistic annotation over HTTP.
//!
//! A pre-loaded [`pipeline::Pipeline`] is shared read-only by the
//! [`gateway`] operations, which the [`server`] exposes as JSON endpoints
//! and the [`cli`] runs one-shot.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod pipeline;
pub mod server;
