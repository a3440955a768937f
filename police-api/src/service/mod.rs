//! Transport layer for the police data API.
//!
//! Every request is a GET or POST against a method path relative to the
//! configured base URL. GET parameters travel in the query string, POST
//! parameters as a form-encoded body. Non-success statuses surface as
//! `PoliceError::Api` with the attempted method path attached; nothing in
//! this layer retries.

mod client;
mod mock;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use client::{HttpTransport, ServiceConfig};
pub use mock::{MockTransport, RecordedRequest};

/// HTTP verb used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Get => f.write_str("GET"),
            Verb::Post => f.write_str("POST"),
        }
    }
}

/// Issues requests against the API and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `verb` to `method` (a path relative to the base URL).
    async fn request(&self, verb: Verb, method: &str, params: &[(&str, String)]) -> Result<Value>;
}
