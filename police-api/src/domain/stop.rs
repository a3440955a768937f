//! Stop and search records.

use std::fmt;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::Result;
use crate::hydrate::{self, RawRecord};

use super::location::Location;

/// A stop and search incident.
#[derive(Debug, Clone)]
pub struct Stop {
    /// "Person search", "Vehicle search" or "Person and Vehicle search"
    pub kind: Option<String>,
    pub involved_person: Option<bool>,
    pub datetime: Option<NaiveDateTime>,
    /// Whether the stop was part of a policing operation
    pub operation: Option<bool>,
    pub operation_name: Option<String>,
    /// Absent for stops that could not be mapped
    pub location: Option<Location>,
    pub gender: Option<String>,
    pub age_range: Option<String>,
    pub self_defined_ethnicity: Option<String>,
    pub officer_defined_ethnicity: Option<String>,
    pub legislation: Option<String>,
    pub object_of_search: Option<String>,
    /// Outcome description; absent when the API reports `false`
    pub outcome: Option<String>,
    pub outcome_linked_to_object_of_search: Option<bool>,
    pub removal_of_more_than_outer_clothing: Option<bool>,
}

impl Stop {
    pub const FIELDS: &'static [&'static str] = &[
        "age_range",
        "outcome",
        "legislation",
        "type",
        "operation",
        "operation_name",
        "self_defined_ethnicity",
        "gender",
        "datetime",
        "outcome_linked_to_object_of_search",
        "location",
        "involved_person",
        "removal_of_more_than_outer_clothing",
        "officer_defined_ethnicity",
        "object_of_search",
    ];

    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        hydrate::trace_absent(raw, Self::FIELDS, "stop");

        let location = match hydrate::object(raw, "location") {
            Some(location) => Some(Location::from_raw(location)?),
            None => None,
        };

        Ok(Self {
            kind: hydrate::string(raw, "type"),
            involved_person: hydrate::boolean(raw, "involved_person"),
            datetime: hydrate::datetime(raw, "datetime")?,
            operation: hydrate::boolean(raw, "operation"),
            operation_name: hydrate::string(raw, "operation_name"),
            location,
            gender: hydrate::string(raw, "gender"),
            age_range: hydrate::string(raw, "age_range"),
            self_defined_ethnicity: hydrate::string(raw, "self_defined_ethnicity"),
            officer_defined_ethnicity: hydrate::string(raw, "officer_defined_ethnicity"),
            legislation: hydrate::string(raw, "legislation"),
            object_of_search: hydrate::string(raw, "object_of_search"),
            outcome: outcome(raw),
            outcome_linked_to_object_of_search: hydrate::boolean(
                raw,
                "outcome_linked_to_object_of_search",
            ),
            removal_of_more_than_outer_clothing: hydrate::boolean(
                raw,
                "removal_of_more_than_outer_clothing",
            ),
        })
    }
}

/// Older releases send `false` for "no outcome"; newer ones an object.
fn outcome(raw: &RawRecord) -> Option<String> {
    match hydrate::present(raw, "outcome")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(object) => hydrate::string(object, "name"),
        _ => None,
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datetime {
            Some(datetime) => write!(f, "stop at {datetime}"),
            None => f.write_str("stop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn stop(value: Value) -> Stop {
        Stop::from_raw(&hydrate::into_record(value, "stops-street").unwrap()).unwrap()
    }

    #[test]
    fn hydrates_a_street_stop() {
        let stop = stop(json!({
            "age_range": "18-24",
            "outcome": "Suspect arrested",
            "involved_person": true,
            "self_defined_ethnicity": "White - English/Welsh/Scottish/Northern Irish/British",
            "gender": "Male",
            "legislation": "Misuse of Drugs Act 1971 (section 23)",
            "outcome_linked_to_object_of_search": null,
            "datetime": "2013-01-01T14:00:00+00:00",
            "removal_of_more_than_outer_clothing": false,
            "outcome_object": {"id": "bu-arrest", "name": "Arrest"},
            "location": {
                "latitude": "52.634407",
                "street": {"id": 883345, "name": "On or near Fair Street"},
                "longitude": "-1.124748"
            },
            "operation": false,
            "officer_defined_ethnicity": "White",
            "type": "Person search",
            "operation_name": null,
            "object_of_search": "Controlled drugs"
        }));

        assert_eq!(stop.kind.as_deref(), Some("Person search"));
        assert_eq!(stop.involved_person, Some(true));
        assert_eq!(
            stop.datetime,
            NaiveDate::from_ymd_opt(2013, 1, 1).unwrap().and_hms_opt(14, 0, 0)
        );
        assert_eq!(stop.location.as_ref().map(Location::id), Some(883345));
        assert_eq!(stop.outcome.as_deref(), Some("Suspect arrested"));
        assert_eq!(stop.outcome_linked_to_object_of_search, None);
        assert_eq!(stop.removal_of_more_than_outer_clothing, Some(false));
        assert_eq!(stop.operation, Some(false));
        assert_eq!(stop.operation_name, None);
    }

    #[test]
    fn false_outcome_is_absent() {
        let stop = stop(json!({"outcome": false, "location": null, "datetime": null}));
        assert_eq!(stop.outcome, None);
        assert!(stop.location.is_none());
        assert!(stop.datetime.is_none());
        assert_eq!(stop.to_string(), "stop");
    }

    #[test]
    fn object_outcome_uses_its_name() {
        let stop = stop(json!({"outcome": {"id": "bu-no-further-action", "name": "A no further action disposal"}}));
        assert_eq!(stop.outcome.as_deref(), Some("A no further action disposal"));
    }
}
