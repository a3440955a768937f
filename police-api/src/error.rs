//! Error types for the police API client.

/// Errors from the transport, hydration and lookup layers.
#[derive(Debug, thiserror::Error)]
pub enum PoliceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status} for {method}: {message}")]
    Api {
        status: u16,
        message: String,
        method: String,
    },

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A raw field could not be coerced into its typed value
    #[error("cannot hydrate field `{field}`: {message}")]
    Hydrate {
        field: &'static str,
        message: String,
    },

    /// Category slug unknown for the requested date
    #[error("category `{slug}` not found for {}", .date.as_deref().unwrap_or("the latest date"))]
    CategoryNotFound { slug: String, date: Option<String> },

    /// "neighbourhoods" collides with the force listing endpoint
    #[error("\"neighbourhoods\" is not a valid neighbourhood id")]
    ReservedNeighbourhoodId,

    /// Date filter is not in YYYY-MM form
    #[error("invalid date `{0}`: expected YYYY-MM")]
    InvalidDate(String),

    /// Client configuration could not be applied
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The mock transport has no response registered for a request
    #[error("no mock response for {verb} {method}")]
    Unmocked { verb: String, method: String },
}

impl PoliceError {
    /// Whether this is an API "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PoliceError::Api { status: 404, .. })
    }
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {body})"),
        None => String::new(),
    }
}

pub type Result<T, E = PoliceError> = std::result::Result<T, E>;
