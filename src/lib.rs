//! aromabot - restaurant question answering over a local vector index
//!
//! Two phases share one crate:
//!
//! - **Build**: load the restaurant text, embed it through a hosted
//!   provider, and persist the index to disk ([`indexer`]).
//! - **Query**: load the index, retrieve the nearest passages for a
//!   question, and have a chat model answer from them ([`engine`]).
//!
//! The terminal front end lives in [`repl`] and [`cli`].

pub mod errors;
pub mod config;
pub mod logging;

// Core retrieval pipeline
pub mod document;
pub mod embedding;
pub mod provider;
pub mod index;
pub mod retrieval;
pub mod synthesis;
pub mod engine;
pub mod indexer;

// Interface layer
pub mod telemetry;
pub mod repl;
pub mod doctor;
pub mod cli;

pub use errors::{RagError, Result};
