//! Client library for the police data REST API.
//!
//! Forces, neighbourhoods, crimes, outcomes and stop-and-search records are
//! exposed as lazily hydrated resources: an entity starts as an identifier
//! and fetches its attributes the first time one of them is read.

pub mod api;
pub mod categories;
pub mod domain;
pub mod error;
pub mod hydrate;
pub mod resource;
pub mod service;

pub use api::PoliceApi;
pub use error::{PoliceError, Result};
pub use service::{HttpTransport, MockTransport, ServiceConfig, Transport, Verb};
