//! Batch classification internals.
//!
//! - prompt.rs: prompt text and ticker manifest
//! - client.rs: the single model call
//! - rules.rs: ordered verdict and separator rules
//! - parse.rs: line walk producing the total ticker -> result map
//! - run.rs: classify_batch flow

pub(crate) mod client;
pub(crate) mod parse;
pub(crate) mod prompt;
pub(crate) mod rules;
pub(crate) mod run;
