//! Crimes and their outcomes.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::api::PoliceApi;
use crate::error::Result;
use crate::hydrate::{self, RawRecord};
use crate::resource::memoize;

use super::category::{CrimeCategory, OutcomeCategory};
use super::location::Location;

/// A crime category slug, resolved against the month it was recorded in.
#[derive(Debug, Clone)]
struct CategoryRef {
    slug: String,
    month: Option<String>,
    resolved: Arc<OnceCell<CrimeCategory>>,
}

impl CategoryRef {
    fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            slug: hydrate::required_string(raw, "category")?,
            month: hydrate::string(raw, "month"),
            resolved: Arc::new(OnceCell::new()),
        })
    }

    async fn resolve(&self, api: &PoliceApi) -> Result<&CrimeCategory> {
        memoize(&self.resolved, || {
            api.get_crime_category(&self.slug, self.month.as_deref())
        })
        .await
    }
}

/// One entry in a crime's outcome history.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Persistent id of the crime this outcome belongs to
    pub crime: Option<String>,
    pub category: OutcomeCategory,
    /// Month of the outcome (YYYY-MM)
    pub date: Option<String>,
    /// Links outcomes for the same suspect
    pub person_id: Option<i64>,
}

impl Outcome {
    /// Build an outcome owned by the crime with `crime` as persistent id.
    ///
    /// `category` may be a `{code, name}` object or a bare name.
    pub fn from_raw(crime: Option<&str>, raw: &RawRecord) -> Result<Self> {
        let category = hydrate::present(raw, "category")
            .and_then(OutcomeCategory::from_value)
            .ok_or_else(|| hydrate::missing("category"))?;

        Ok(Self {
            crime: crime.map(str::to_owned),
            category,
            date: hydrate::string(raw, "date"),
            person_id: hydrate::integer(raw, "person_id")?,
        })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.date {
            Some(date) => write!(f, "{} ({date})", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}

/// A street-level crime.
///
/// The category is resolved on first request against the crime categories
/// of the crime's own month. The outcome history is fetched on first
/// request and cached; clones share both caches.
#[derive(Debug, Clone)]
pub struct Crime {
    api: PoliceApi,
    pub id: Option<i64>,
    /// Stable id across data releases; empty for anti-social behaviour
    pub persistent_id: Option<String>,
    /// Reporting month (YYYY-MM)
    pub month: Option<String>,
    category: CategoryRef,
    pub context: Option<String>,
    pub location: Option<Location>,
    /// "Force" or "BTP"
    pub location_type: Option<String>,
    pub location_subtype: Option<String>,
    /// Latest outcome, as embedded in street-level results
    pub outcome_status: Option<Outcome>,
    outcomes: Arc<OnceCell<Vec<Outcome>>>,
}

impl Crime {
    /// Fields of a crime payload.
    pub const FIELDS: &'static [&'static str] = &[
        "month",
        "category",
        "id",
        "persistent_id",
        "location",
        "location_type",
        "location_subtype",
        "context",
        "outcome_status",
    ];

    /// Hydrate a crime from its JSON object.
    pub fn from_raw(api: &PoliceApi, raw: &RawRecord) -> Result<Self> {
        hydrate::trace_absent(raw, Self::FIELDS, "crime");
        let persistent_id = hydrate::string(raw, "persistent_id").filter(|id| !id.is_empty());
        let location_type = hydrate::string(raw, "location_type");
        let location_subtype = hydrate::string(raw, "location_subtype");

        // location_type/subtype travel beside the location, not inside it
        let location = match hydrate::object(raw, "location") {
            Some(location) => {
                let mut merged = location.clone();
                merged.insert("type".into(), optional(&location_type));
                merged.insert("subtype".into(), optional(&location_subtype));
                Some(Location::from_raw(&merged)?)
            }
            None => None,
        };

        let outcome_status = match hydrate::object(raw, "outcome_status") {
            Some(status) => Some(Outcome::from_raw(persistent_id.as_deref(), status)?),
            None => None,
        };

        Ok(Self {
            api: api.clone(),
            id: hydrate::integer(raw, "id")?,
            persistent_id,
            month: hydrate::string(raw, "month"),
            category: CategoryRef::from_raw(raw)?,
            context: hydrate::string(raw, "context").filter(|c| !c.is_empty()),
            location,
            location_type,
            location_subtype,
            outcome_status,
            outcomes: Arc::new(OnceCell::new()),
        })
    }

    /// Attach an outcome history that arrived with the crime.
    pub(crate) fn with_outcomes(self, outcomes: Vec<Outcome>) -> Self {
        let _ = self.outcomes.set(outcomes);
        self
    }

    /// Category slug as sent by the API.
    pub fn category_slug(&self) -> &str {
        &self.category.slug
    }

    /// The crime's category for its reporting month.
    pub async fn category(&self) -> Result<&CrimeCategory> {
        self.category.resolve(&self.api).await
    }

    /// Full outcome history.
    ///
    /// Crimes without a persistent id have no history; the result is empty
    /// and nothing is fetched.
    pub async fn outcomes(&self) -> Result<&[Outcome]> {
        let outcomes = memoize(&self.outcomes, || async {
            match &self.persistent_id {
                Some(persistent_id) => {
                    let method = format!("outcomes-for-crime/{persistent_id}");
                    let response = self.api.get(&method, &[]).await?;
                    let raw = hydrate::into_record(response, &method)?;
                    outcomes_from_raw(Some(persistent_id.as_str()), &raw, &method)
                }
                None => Ok(Vec::new()),
            }
        })
        .await?;
        Ok(outcomes.as_slice())
    }
}

impl fmt::Display for Crime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "crime {id}"),
            None => f.write_str("crime"),
        }
    }
}

/// A crime that could not be mapped to a location.
#[derive(Debug, Clone)]
pub struct NoLocationCrime {
    api: PoliceApi,
    pub id: Option<i64>,
    pub persistent_id: Option<String>,
    pub month: Option<String>,
    category: CategoryRef,
    pub context: Option<String>,
}

impl NoLocationCrime {
    /// Fields of a no-location crime payload.
    pub const FIELDS: &'static [&'static str] =
        &["id", "persistent_id", "context", "month", "category"];

    pub fn from_raw(api: &PoliceApi, raw: &RawRecord) -> Result<Self> {
        hydrate::trace_absent(raw, Self::FIELDS, "no-location crime");
        Ok(Self {
            api: api.clone(),
            id: hydrate::integer(raw, "id")?,
            persistent_id: hydrate::string(raw, "persistent_id").filter(|id| !id.is_empty()),
            month: hydrate::string(raw, "month"),
            category: CategoryRef::from_raw(raw)?,
            context: hydrate::string(raw, "context").filter(|c| !c.is_empty()),
        })
    }

    pub fn category_slug(&self) -> &str {
        &self.category.slug
    }

    /// The crime's category for its reporting month.
    pub async fn category(&self) -> Result<&CrimeCategory> {
        self.category.resolve(&self.api).await
    }
}

/// Parse the `outcomes` list of an `outcomes-for-crime` response.
///
/// A missing or null list is an empty history.
pub(crate) fn outcomes_from_raw(
    crime: Option<&str>,
    raw: &RawRecord,
    method: &str,
) -> Result<Vec<Outcome>> {
    let items = hydrate::present(raw, "outcomes").cloned().unwrap_or(Value::Null);
    hydrate::into_records(items, method)?
        .iter()
        .map(|outcome| Outcome::from_raw(crime, outcome))
        .collect()
}

fn optional(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}
