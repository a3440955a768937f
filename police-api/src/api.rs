//! The `PoliceApi` facade.
//!
//! Entry point for every query. Cloning is cheap: clones share the
//! transport and the crime category cache.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::categories::CategoryCache;
use crate::domain::{
    ALL_CRIME, Crime, CrimeCategory, Force, ForceLink, Neighbourhood, NoLocationCrime, Stop,
    encode_polygon, outcomes_from_raw,
};
use crate::error::{PoliceError, Result};
use crate::hydrate::{self, RawRecord};
use crate::service::{HttpTransport, ServiceConfig, Transport, Verb};

/// Handle to the police data API.
#[derive(Clone)]
pub struct PoliceApi {
    inner: Arc<ApiInner>,
}

struct ApiInner {
    transport: Arc<dyn Transport>,
    categories: CategoryCache,
}

impl PoliceApi {
    /// Connect over HTTP with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Connect over HTTP, configured from `POLICE_API_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ServiceConfig::from_env()?)
    }

    /// Use a custom transport, e.g. `MockTransport` in tests.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                transport,
                categories: CategoryCache::new(),
            }),
        }
    }

    pub(crate) async fn get(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        self.inner
            .transport
            .request(Verb::Get, method, params)
            .await
    }

    pub(crate) async fn post(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        self.inner
            .transport
            .request(Verb::Post, method, params)
            .await
    }

    async fn get_records(&self, method: &str, params: &[(&str, String)]) -> Result<Vec<RawRecord>> {
        let response = self.get(method, params).await?;
        hydrate::into_records(response, method)
    }

    // Forces and neighbourhoods

    /// Every force, with names already filled in from the listing.
    pub async fn get_forces(&self) -> Result<Vec<Force>> {
        self.get_records("forces", &[])
            .await?
            .iter()
            .map(|raw| {
                let id = hydrate::required_string(raw, "id")?;
                Ok(Force::with_name(self, id, hydrate::string(raw, "name")))
            })
            .collect()
    }

    /// A force by id. Nothing is fetched until an attribute is read.
    pub fn get_force(&self, id: impl Into<String>) -> Force {
        Force::new(self, id)
    }

    /// Every neighbourhood of `force`, sorted by name.
    ///
    /// Always fetches; use [`Force::neighbourhoods`] for the cached list.
    pub async fn get_neighbourhoods(&self, force: &Force) -> Result<Vec<Neighbourhood>> {
        Neighbourhood::list(ForceLink::owned(force)).await
    }

    /// A neighbourhood by force and id, unfetched.
    pub fn get_neighbourhood(
        &self,
        force: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<Neighbourhood> {
        Neighbourhood::new(&self.get_force(force), id)
    }

    /// The neighbourhood covering a point, if any.
    ///
    /// A 404 from the API means no neighbourhood covers the point; other
    /// errors propagate.
    pub async fn locate_neighbourhood(&self, lat: f64, lng: f64) -> Result<Option<Neighbourhood>> {
        let method = "locate-neighbourhood";
        let response = match self.get(method, &[("q", format!("{lat},{lng}"))]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                debug!(lat, lng, "no neighbourhood at point");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let raw = hydrate::into_record(response, method)?;
        let force = hydrate::required_string(&raw, "force")?;
        let id = hydrate::required_string(&raw, "neighbourhood")?;
        self.get_neighbourhood(force, id).map(Some)
    }

    // Dates and categories

    /// Months with street-level data, newest first.
    pub async fn get_dates(&self) -> Result<Vec<String>> {
        self.get_records("crimes-street-dates", &[])
            .await?
            .iter()
            .map(|raw| hydrate::required_string(raw, "date"))
            .collect()
    }

    /// The newest month with data, or `None` if the API lists none.
    pub async fn get_latest_date(&self) -> Result<Option<String>> {
        Ok(self.get_dates().await?.into_iter().next())
    }

    async fn fetch_crime_categories(&self, date: Option<&str>) -> Result<Vec<CrimeCategory>> {
        let params = date_param(date);
        self.get_records("crime-categories", &params)
            .await?
            .iter()
            .map(CrimeCategory::from_raw)
            .collect()
    }

    /// Crime categories for `date` (latest when `None`), sorted by name.
    ///
    /// `all-crime` is not a real category and is left out.
    pub async fn get_crime_categories(&self, date: Option<&str>) -> Result<Vec<CrimeCategory>> {
        validate_month(date)?;
        let map = self
            .inner
            .categories
            .categories(date, || self.fetch_crime_categories(date))
            .await?;

        let mut categories: Vec<_> = map.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// One crime category by slug, for `date` (latest when `None`).
    pub async fn get_crime_category(&self, slug: &str, date: Option<&str>) -> Result<CrimeCategory> {
        validate_month(date)?;
        self.inner
            .categories
            .category(slug, date, || self.fetch_crime_categories(date))
            .await
    }

    // Crimes

    /// A crime by persistent id, with its full outcome history.
    pub async fn get_crime(&self, persistent_id: &str) -> Result<Crime> {
        let method = format!("outcomes-for-crime/{persistent_id}");
        let response = self.get(&method, &[]).await?;
        let raw = hydrate::into_record(response, &method)?;

        let crime = hydrate::object(&raw, "crime").ok_or_else(|| hydrate::missing("crime"))?;
        let crime = Crime::from_raw(self, crime)?;
        let owner = crime.persistent_id.clone().unwrap_or_else(|| persistent_id.to_string());
        let outcomes = outcomes_from_raw(Some(owner.as_str()), &raw, &method)?;
        Ok(crime.with_outcomes(outcomes))
    }

    /// Street-level crimes within a mile of a point.
    pub async fn get_crimes_point(
        &self,
        lat: f64,
        lng: f64,
        date: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Crime>> {
        validate_month(date)?;
        let method = crimes_street(category);
        let mut params = vec![("lat", lat.to_string()), ("lng", lng.to_string())];
        params.extend(date_param(date));

        let response = self.get(&method, &params).await?;
        self.crimes(response, &method)
    }

    /// Street-level crimes inside a polygon of `(lat, lng)` points.
    pub async fn get_crimes_area(
        &self,
        points: &[(f64, f64)],
        date: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Crime>> {
        validate_month(date)?;
        let method = crimes_street(category);
        let mut params = vec![("poly", encode_polygon(points))];
        params.extend(date_param(date));

        let response = self.post(&method, &params).await?;
        self.crimes(response, &method)
    }

    /// Crimes snapped to one location.
    pub async fn get_crimes_location(
        &self,
        location_id: i64,
        date: Option<&str>,
    ) -> Result<Vec<Crime>> {
        validate_month(date)?;
        let method = "crimes-at-location";
        let mut params = vec![("location_id", location_id.to_string())];
        params.extend(date_param(date));

        let response = self.get(method, &params).await?;
        self.crimes(response, method)
    }

    /// Crimes a force could not map to a location.
    pub async fn get_crimes_no_location(
        &self,
        force: &str,
        date: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<NoLocationCrime>> {
        validate_month(date)?;
        let method = "crimes-no-location";
        let mut params = vec![
            ("force", force.to_string()),
            ("category", category.unwrap_or(ALL_CRIME).to_string()),
        ];
        params.extend(date_param(date));

        self.get_records(method, &params)
            .await?
            .iter()
            .map(|raw| NoLocationCrime::from_raw(self, raw))
            .collect()
    }

    fn crimes(&self, response: Value, method: &str) -> Result<Vec<Crime>> {
        let crimes = hydrate::into_records(response, method)?
            .iter()
            .map(|raw| Crime::from_raw(self, raw))
            .collect::<Result<Vec<_>>>()?;
        debug!(method, count = crimes.len(), "crimes hydrated");
        Ok(crimes)
    }

    // Stop and search

    /// Stops inside a polygon of `(lat, lng)` points.
    pub async fn get_stops_area(&self, points: &[(f64, f64)], date: Option<&str>) -> Result<Vec<Stop>> {
        validate_month(date)?;
        let method = "stops-street";
        let mut params = vec![("poly", encode_polygon(points))];
        params.extend(date_param(date));

        let response = self.post(method, &params).await?;
        stops(response, method)
    }

    /// Stops within a mile of a point.
    pub async fn get_stops_point(&self, lat: f64, lng: f64, date: Option<&str>) -> Result<Vec<Stop>> {
        validate_month(date)?;
        let method = "stops-street";
        let mut params = vec![("lat", lat.to_string()), ("lng", lng.to_string())];
        params.extend(date_param(date));

        let response = self.get(method, &params).await?;
        stops(response, method)
    }

    /// Stops snapped to one location.
    pub async fn get_stops_location(&self, location_id: i64, date: Option<&str>) -> Result<Vec<Stop>> {
        validate_month(date)?;
        let method = "stops-at-location";
        let mut params = vec![("location_id", location_id.to_string())];
        params.extend(date_param(date));

        let response = self.get(method, &params).await?;
        stops(response, method)
    }

    /// Stops a force could not map to a location.
    pub async fn get_stops_no_location(&self, force: &str, date: Option<&str>) -> Result<Vec<Stop>> {
        validate_month(date)?;
        let method = "stops-no-location";
        let mut params = vec![("force", force.to_string())];
        params.extend(date_param(date));

        let response = self.get(method, &params).await?;
        stops(response, method)
    }

    /// Every stop reported by a force, located or not.
    pub async fn get_stops_force(&self, force: &str, date: Option<&str>) -> Result<Vec<Stop>> {
        validate_month(date)?;
        let method = "stops-force";
        let mut params = vec![("force", force.to_string())];
        params.extend(date_param(date));

        let response = self.get(method, &params).await?;
        stops(response, method)
    }
}

impl fmt::Debug for PoliceApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoliceApi")
            .field("cached_category_dates", &self.inner.categories.cached_dates())
            .finish_non_exhaustive()
    }
}

fn stops(response: Value, method: &str) -> Result<Vec<Stop>> {
    hydrate::into_records(response, method)?
        .iter()
        .map(Stop::from_raw)
        .collect()
}

fn crimes_street(category: Option<&str>) -> String {
    format!("crimes-street/{}", category.unwrap_or(ALL_CRIME))
}

fn date_param(date: Option<&str>) -> Vec<(&'static str, String)> {
    date.map(|d| ("date", d.to_string())).into_iter().collect()
}

/// Reject anything but `YYYY-MM`.
fn validate_month(date: Option<&str>) -> Result<()> {
    let Some(date) = date else {
        return Ok(());
    };

    let valid = date.len() == 7 && NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(PoliceError::InvalidDate(date.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_validation() {
        assert!(validate_month(None).is_ok());
        assert!(validate_month(Some("2013-01")).is_ok());
        assert!(validate_month(Some("2013-12")).is_ok());

        for bad in ["2013-13", "2013-1", "13-01", "2013-01-01", "January", ""] {
            assert!(
                matches!(validate_month(Some(bad)), Err(PoliceError::InvalidDate(d)) if d == bad),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn category_defaults_to_all_crime() {
        assert_eq!(crimes_street(None), "crimes-street/all-crime");
        assert_eq!(crimes_street(Some("burglary")), "crimes-street/burglary");
    }

    #[test]
    fn date_param_is_omitted_for_latest() {
        assert!(date_param(None).is_empty());
        assert_eq!(date_param(Some("2013-01")), [("date", "2013-01".to_string())]);
    }
}
