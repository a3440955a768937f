//! Neighbourhood policing teams and their sub-resources.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::api::PoliceApi;
use crate::error::{PoliceError, Result};
use crate::hydrate::{self, ContactDetails, RawRecord};
use crate::resource::{Hydrate, Resource, fill, memoize};

use super::crime::Crime;
use super::force::{Force, ForceLink};

/// Id that cannot name a neighbourhood: `{force}/neighbourhoods` is the
/// listing endpoint.
pub const RESERVED_NEIGHBOURHOOD_ID: &str = "neighbourhoods";

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            latitude: hydrate::required_float(raw, "latitude")?,
            longitude: hydrate::required_float(raw, "longitude")?,
        })
    }
}

/// A link published by a neighbourhood team.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A significant place in a neighbourhood, such as a police station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NeighbourhoodLocation {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

/// A member of a neighbourhood team.
#[derive(Debug, Clone)]
pub struct Officer {
    pub force: String,
    pub neighbourhood: String,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub bio: Option<String>,
    pub contact_details: ContactDetails,
}

impl Officer {
    /// Build a team member from one `{force}/{id}/people` entry.
    pub fn from_raw(force: &str, neighbourhood: &str, raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            force: force.to_string(),
            neighbourhood: neighbourhood.to_string(),
            name: hydrate::string(raw, "name"),
            rank: hydrate::string(raw, "rank"),
            bio: hydrate::string(raw, "bio"),
            contact_details: hydrate::contact_details(raw, "contact_details")?,
        })
    }
}

/// A neighbourhood event, e.g. a beat meeting.
#[derive(Debug, Clone)]
pub struct Event {
    pub force: String,
    pub neighbourhood: String,
    pub title: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_details: ContactDetails,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl Event {
    /// Build an event from one `{force}/{id}/events` entry.
    pub fn from_raw(force: &str, neighbourhood: &str, raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            force: force.to_string(),
            neighbourhood: neighbourhood.to_string(),
            title: hydrate::string(raw, "title"),
            kind: hydrate::string(raw, "type"),
            description: hydrate::string(raw, "description"),
            address: hydrate::string(raw, "address"),
            contact_details: hydrate::contact_details(raw, "contact_details")?,
            start_date: hydrate::datetime(raw, "start_date")?,
            end_date: hydrate::datetime(raw, "end_date")?,
        })
    }
}

/// An issue the team has committed to act on.
#[derive(Debug, Clone)]
pub struct Priority {
    pub force: String,
    pub neighbourhood: String,
    pub issue: Option<String>,
    pub action: Option<String>,
    pub issue_date: Option<NaiveDateTime>,
    pub action_date: Option<NaiveDateTime>,
}

impl Priority {
    /// Build a priority from one `{force}/{id}/priorities` entry.
    pub fn from_raw(force: &str, neighbourhood: &str, raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            force: force.to_string(),
            neighbourhood: neighbourhood.to_string(),
            issue: hydrate::string(raw, "issue"),
            action: hydrate::string(raw, "action"),
            issue_date: hydrate::datetime(raw, "issue-date")?,
            action_date: hydrate::datetime(raw, "action-date")?,
        })
    }
}

/// Newest issue first; stable, so equal dates keep response order.
/// Undated priorities go last.
fn sort_priorities(priorities: &mut [Priority]) {
    priorities.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
}

/// A Neighbourhood Policing Team's area.
///
/// Identity is the (force, id) pair. Attributes are fetched from
/// `{force}/{id}` on first read; officers, events, priorities, boundary
/// and crimes each come from their own endpoint and are cached once
/// fetched. Clones share every cache.
#[derive(Clone)]
pub struct Neighbourhood {
    inner: Arc<NeighbourhoodInner>,
}

pub(crate) struct NeighbourhoodInner {
    force: ForceLink,
    id: String,
    resource: Resource,
    name: OnceCell<Option<String>>,
    description: OnceCell<Option<String>>,
    population: OnceCell<Option<i64>>,
    url_force: OnceCell<Option<String>>,
    contact_details: OnceCell<ContactDetails>,
    links: OnceCell<Vec<Link>>,
    centre: OnceCell<Option<Coordinates>>,
    locations: OnceCell<Vec<NeighbourhoodLocation>>,
    officers: OnceCell<Vec<Officer>>,
    events: OnceCell<Vec<Event>>,
    priorities: OnceCell<Vec<Priority>>,
    boundary: OnceCell<Vec<(f64, f64)>>,
    crimes: OnceCell<Vec<Crime>>,
}

pub(crate) struct NeighbourhoodFields {
    name: Option<String>,
    description: Option<String>,
    population: Option<i64>,
    url_force: Option<String>,
    contact_details: ContactDetails,
    links: Vec<Link>,
    centre: Option<Coordinates>,
    locations: Vec<NeighbourhoodLocation>,
}

impl Hydrate for NeighbourhoodInner {
    type Fields = NeighbourhoodFields;

    const FIELDS: &'static [&'static str] = &[
        "contact_details",
        "name",
        "links",
        "description",
        "url_force",
        "population",
        "centre",
        "locations",
    ];

    fn api_method(&self) -> String {
        format!("{}/{}", self.force.id(), self.id)
    }

    fn hydrate(&self, raw: &RawRecord) -> Result<NeighbourhoodFields> {
        let centre = match hydrate::object(raw, "centre") {
            Some(centre) => Some(Coordinates::from_raw(centre)?),
            None => None,
        };

        Ok(NeighbourhoodFields {
            name: hydrate::string(raw, "name"),
            description: hydrate::string(raw, "description"),
            population: hydrate::integer(raw, "population")?,
            url_force: hydrate::string(raw, "url_force"),
            contact_details: hydrate::contact_details(raw, "contact_details")?,
            links: hydrate::list(raw, "links")?,
            centre,
            locations: hydrate::list(raw, "locations")?,
        })
    }

    fn store(&self, fields: NeighbourhoodFields) {
        fill(&self.name, fields.name);
        fill(&self.description, fields.description);
        fill(&self.population, fields.population);
        fill(&self.url_force, fields.url_force);
        fill(&self.contact_details, fields.contact_details);
        fill(&self.links, fields.links);
        fill(&self.centre, fields.centre);
        fill(&self.locations, fields.locations);
    }
}

impl Neighbourhood {
    /// A neighbourhood of `force`, known only by id.
    ///
    /// Fails with `ReservedNeighbourhoodId` for the id "neighbourhoods".
    pub fn new(force: &Force, id: impl Into<String>) -> Result<Self> {
        Self::linked(ForceLink::owned(force), id.into(), None)
    }

    /// A neighbourhood with every attribute fetched up front.
    pub async fn preloaded(force: &Force, id: impl Into<String>) -> Result<Self> {
        let neighbourhood = Self::new(force, id)?;
        neighbourhood.load().await?;
        Ok(neighbourhood)
    }

    fn linked(force: ForceLink, id: String, name: Option<String>) -> Result<Self> {
        if id == RESERVED_NEIGHBOURHOOD_ID {
            return Err(PoliceError::ReservedNeighbourhoodId);
        }

        let neighbourhood = Self {
            inner: Arc::new(NeighbourhoodInner {
                resource: Resource::new(force.api().clone()),
                force,
                id,
                name: OnceCell::new(),
                description: OnceCell::new(),
                population: OnceCell::new(),
                url_force: OnceCell::new(),
                contact_details: OnceCell::new(),
                links: OnceCell::new(),
                centre: OnceCell::new(),
                locations: OnceCell::new(),
                officers: OnceCell::new(),
                events: OnceCell::new(),
                priorities: OnceCell::new(),
                boundary: OnceCell::new(),
                crimes: OnceCell::new(),
            }),
        };

        if let Some(name) = name {
            fill(&neighbourhood.inner.name, Some(name));
        }
        Ok(neighbourhood)
    }

    /// Every neighbourhood of a force, sorted by name.
    pub(crate) async fn list(force: ForceLink) -> Result<Vec<Neighbourhood>> {
        let method = format!("{}/neighbourhoods", force.id());
        let response = force.api().get(&method, &[]).await?;

        let mut neighbourhoods = hydrate::into_records(response, &method)?
            .iter()
            .map(|raw| {
                let id = hydrate::required_string(raw, "id")?;
                let name = hydrate::string(raw, "name");
                Self::linked(force.clone(), id, name)
            })
            .collect::<Result<Vec<_>>>()?;

        neighbourhoods.sort_by(|a, b| a.listed_name().cmp(b.listed_name()));
        debug!(force = force.id(), count = neighbourhoods.len(), "neighbourhoods listed");
        Ok(neighbourhoods)
    }

    /// Name already known without fetching, for sorting listings.
    fn listed_name(&self) -> &str {
        self.inner
            .name
            .get()
            .and_then(|name| name.as_deref())
            .unwrap_or_default()
    }

    /// Fetch the attributes now rather than on first read.
    pub async fn load(&self) -> Result<()> {
        self.inner.resource.load(self.inner.as_ref()).await
    }

    /// Whether the attributes have been fetched.
    pub fn is_loaded(&self) -> bool {
        self.inner.resource.is_loaded()
    }

    fn api(&self) -> &PoliceApi {
        self.inner.resource.api()
    }

    /// Neighbourhood id, unique within its force.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Id of the owning force.
    pub fn force_id(&self) -> &str {
        self.inner.force.id()
    }

    /// The owning force.
    pub fn force(&self) -> Force {
        self.inner.force.force()
    }

    async fn field<'a, T>(&'a self, slot: &'a OnceCell<T>, name: &'static str) -> Result<&'a T> {
        self.inner
            .resource
            .field(self.inner.as_ref(), slot, name)
            .await
    }

    /// Name of the neighbourhood.
    pub async fn name(&self) -> Result<Option<&str>> {
        Ok(self.field(&self.inner.name, "name").await?.as_deref())
    }

    /// Description, often HTML from the force's site.
    pub async fn description(&self) -> Result<Option<&str>> {
        Ok(self
            .field(&self.inner.description, "description")
            .await?
            .as_deref())
    }

    /// Resident population.
    pub async fn population(&self) -> Result<Option<i64>> {
        Ok(*self.field(&self.inner.population, "population").await?)
    }

    /// Page about the neighbourhood on the force's website.
    pub async fn url_force(&self) -> Result<Option<&str>> {
        Ok(self
            .field(&self.inner.url_force, "url_force")
            .await?
            .as_deref())
    }

    /// Contact methods keyed by kind.
    pub async fn contact_details(&self) -> Result<&ContactDetails> {
        self.field(&self.inner.contact_details, "contact_details")
            .await
    }

    /// Links published by the team.
    pub async fn links(&self) -> Result<&[Link]> {
        Ok(self.field(&self.inner.links, "links").await?.as_slice())
    }

    /// Approximate centre point.
    pub async fn centre(&self) -> Result<Option<Coordinates>> {
        Ok(*self.field(&self.inner.centre, "centre").await?)
    }

    /// Police stations and other notable places.
    pub async fn locations(&self) -> Result<&[NeighbourhoodLocation]> {
        Ok(self
            .field(&self.inner.locations, "locations")
            .await?
            .as_slice())
    }

    async fn fetch_records(&self, resource: &str) -> Result<Vec<RawRecord>> {
        let method = format!("{}/{}/{}", self.force_id(), self.id(), resource);
        let response = self.api().get(&method, &[]).await?;
        hydrate::into_records(response, &method)
    }

    /// Members of the neighbourhood team.
    pub async fn officers(&self) -> Result<&[Officer]> {
        let officers = memoize(&self.inner.officers, || async {
            let records = self.fetch_records("people").await?;
            records
                .iter()
                .map(|raw| Officer::from_raw(self.force_id(), self.id(), raw))
                .collect()
        })
        .await?;
        Ok(officers.as_slice())
    }

    /// Upcoming events.
    pub async fn events(&self) -> Result<&[Event]> {
        let events = memoize(&self.inner.events, || async {
            let records = self.fetch_records("events").await?;
            records
                .iter()
                .map(|raw| Event::from_raw(self.force_id(), self.id(), raw))
                .collect()
        })
        .await?;
        Ok(events.as_slice())
    }

    /// Policing priorities, newest issue first.
    pub async fn priorities(&self) -> Result<&[Priority]> {
        let priorities = memoize(&self.inner.priorities, || async {
            let records = self.fetch_records("priorities").await?;
            let mut priorities = records
                .iter()
                .map(|raw| Priority::from_raw(self.force_id(), self.id(), raw))
                .collect::<Result<Vec<_>>>()?;
            sort_priorities(&mut priorities);
            Ok(priorities)
        })
        .await?;
        Ok(priorities.as_slice())
    }

    /// Perimeter as (latitude, longitude) pairs, in response order.
    pub async fn boundary(&self) -> Result<&[(f64, f64)]> {
        let boundary = memoize(&self.inner.boundary, || async {
            let records = self.fetch_records("boundary").await?;
            records
                .iter()
                .map(|raw| {
                    Ok((
                        hydrate::required_float(raw, "latitude")?,
                        hydrate::required_float(raw, "longitude")?,
                    ))
                })
                .collect()
        })
        .await?;
        Ok(boundary.as_slice())
    }

    /// Street-level crimes inside the boundary, for the latest month.
    pub async fn crimes(&self) -> Result<&[Crime]> {
        let crimes = memoize(&self.inner.crimes, || async {
            let boundary = self.boundary().await?;
            self.api().get_crimes_area(boundary, None, None).await
        })
        .await?;
        Ok(crimes.as_slice())
    }
}

impl PartialEq for Neighbourhood {
    fn eq(&self, other: &Self) -> bool {
        self.force_id() == other.force_id() && self.id() == other.id()
    }
}

impl Eq for Neighbourhood {}

impl Hash for Neighbourhood {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.force_id().hash(state);
        self.id().hash(state);
    }
}

impl fmt::Debug for Neighbourhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighbourhood")
            .field("force", &self.inner.force)
            .field("id", &self.inner.id)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl fmt::Display for Neighbourhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.force_id(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::service::{MockTransport, Verb};

    fn api() -> (Arc<MockTransport>, PoliceApi) {
        let mock = Arc::new(MockTransport::new());
        let api = PoliceApi::with_transport(mock.clone());
        (mock, api)
    }

    fn neighbourhood(api: &PoliceApi) -> Neighbourhood {
        Force::new(api, "test-force")
            .neighbourhood("test-neighbourhood")
            .unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn population_hydrates_to_integer() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood",
            json!({"population": "27000"}),
        );

        let n = neighbourhood(&api);
        assert_eq!(n.population().await.unwrap(), Some(27000));
    }

    #[tokio::test]
    async fn second_field_is_served_from_cache() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood",
            json!({
                "name": "Test Neighbourhood",
                "population": 100,
                "centre": {"latitude": "52.6", "longitude": "-1.1"},
                "contact_details": [],
                "links": [{"url": "http://example.com", "title": "Example", "description": null}],
                "locations": [{"name": "Station", "type": "station", "postcode": "LE1"}]
            }),
        );

        let n = neighbourhood(&api);
        assert_eq!(n.name().await.unwrap(), Some("Test Neighbourhood"));
        assert_eq!(mock.request_count(), 1);

        assert_eq!(
            n.centre().await.unwrap(),
            Some(Coordinates {
                latitude: 52.6,
                longitude: -1.1
            })
        );
        assert!(n.contact_details().await.unwrap().is_empty());
        assert_eq!(n.links().await.unwrap()[0].title.as_deref(), Some("Example"));
        assert_eq!(n.locations().await.unwrap()[0].kind.as_deref(), Some("station"));
        assert_eq!(n.description().await.unwrap(), None);
        assert_eq!(n.url_force().await.unwrap(), None);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn reserved_id_is_rejected_without_requests() {
        let (mock, api) = api();
        let force = Force::new(&api, "test-force");

        assert!(matches!(
            force.neighbourhood("neighbourhoods"),
            Err(PoliceError::ReservedNeighbourhoodId)
        ));
        assert!(matches!(
            Neighbourhood::new(&force, "neighbourhoods"),
            Err(PoliceError::ReservedNeighbourhoodId)
        ));
        assert!(matches!(
            Neighbourhood::preloaded(&force, "neighbourhoods").await,
            Err(PoliceError::ReservedNeighbourhoodId)
        ));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn officers() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/people",
            json!([{"name": "Test Officer", "rank": "PC", "bio": "A test officer"}]),
        );

        let n = neighbourhood(&api);
        let officers = n.officers().await.unwrap();
        assert_eq!(officers.len(), 1);
        assert_eq!(officers[0].name.as_deref(), Some("Test Officer"));
        assert_eq!(officers[0].rank.as_deref(), Some("PC"));
        assert_eq!(officers[0].bio.as_deref(), Some("A test officer"));
        assert_eq!(officers[0].neighbourhood, "test-neighbourhood");
        assert_eq!(officers[0].force, "test-force");

        n.officers().await.unwrap();
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn events() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/events",
            json!([{
                "title": "Test Event",
                "description": "A test event",
                "address": "123 Fake Street, Test Town",
                "start_date": "2010-01-01T09:00:00",
                "type": "meeting"
            }]),
        );

        let n = neighbourhood(&api);
        let events = n.events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title.as_deref(), Some("Test Event"));
        assert_eq!(events[0].address.as_deref(), Some("123 Fake Street, Test Town"));
        let nine = NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(events[0].start_date, Some(nine));
        assert_eq!(events[0].end_date, None);
    }

    #[tokio::test]
    async fn priorities_parse_dates() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/priorities",
            json!([{
                "issue": "Test issue",
                "action": "Test action",
                "issue-date": "2010-01-01T00:00:00",
                "action-date": "2010-01-01T00:00:00"
            }]),
        );

        let n = neighbourhood(&api);
        let priorities = n.priorities().await.unwrap();
        assert_eq!(priorities.len(), 1);
        assert_eq!(priorities[0].issue.as_deref(), Some("Test issue"));
        assert_eq!(priorities[0].action.as_deref(), Some("Test action"));
        assert_eq!(priorities[0].issue_date, Some(date(2010, 1, 1)));
        assert_eq!(priorities[0].action_date, Some(date(2010, 1, 1)));
    }

    #[tokio::test]
    async fn priorities_sort_newest_first() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/priorities",
            json!([
                {"issue": "Test issue 2", "action": null, "issue-date": "2010-02-01T00:00:00", "action-date": null},
                {"issue": "Test issue 3", "action": null, "issue-date": "2010-03-01T00:00:00", "action-date": null},
                {"issue": "Test issue 1", "action": null, "issue-date": "2010-01-01T00:00:00", "action-date": null}
            ]),
        );

        let n = neighbourhood(&api);
        let issues: Vec<_> = n
            .priorities()
            .await
            .unwrap()
            .iter()
            .map(|p| p.issue.as_deref().unwrap())
            .collect();
        assert_eq!(issues, ["Test issue 3", "Test issue 2", "Test issue 1"]);
    }

    #[tokio::test]
    async fn boundary_keeps_order() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/boundary",
            json!([
                {"latitude": "52.6235790036", "longitude": "-1.1433951806"},
                {"latitude": "52.6235719827", "longitude": "-1.142946221"},
                {"latitude": "52.6229371188", "longitude": "-1.1429732023"},
                {"latitude": "52.6220381746", "longitude": "-1.1424250637"}
            ]),
        );

        let n = neighbourhood(&api);
        assert_eq!(
            n.boundary().await.unwrap(),
            [
                (52.6235790036, -1.1433951806),
                (52.6235719827, -1.142946221),
                (52.6229371188, -1.1429732023),
                (52.6220381746, -1.1424250637),
            ]
        );
    }

    #[tokio::test]
    async fn crimes_query_the_boundary_polygon() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/test-neighbourhood/boundary",
            json!([
                {"latitude": "52.1", "longitude": "-1.1"},
                {"latitude": "52.2", "longitude": "-1.2"},
                {"latitude": "52.3", "longitude": "-1.3"}
            ]),
        );
        mock.respond(
            Verb::Post,
            "crimes-street/all-crime",
            json!([{"category": "burglary", "id": 1, "month": "2013-01", "location": null}]),
        );

        let n = neighbourhood(&api);
        let crimes = n.crimes().await.unwrap();
        assert_eq!(crimes.len(), 1);
        n.crimes().await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.verb, Verb::Post);
        assert_eq!(request.param("poly"), Some("52.1,-1.1:52.2,-1.2:52.3,-1.3"));
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn force_lists_neighbourhoods_once() {
        let (mock, api) = api();
        mock.respond(
            Verb::Get,
            "test-force/neighbourhoods",
            json!([
                {"id": "b", "name": "Beta"},
                {"id": "a", "name": "Alpha"}
            ]),
        );
        let force = Force::new(&api, "test-force");

        let neighbourhoods = force.neighbourhoods().await.unwrap();
        assert_eq!(neighbourhoods.len(), 2);
        assert_eq!(neighbourhoods[0].id(), "a");
        assert_eq!(neighbourhoods[0].name().await.unwrap(), Some("Alpha"));
        assert_eq!(neighbourhoods[0].force(), force);

        force.neighbourhoods().await.unwrap();
        assert_eq!(mock.request_count(), 1);
    }

    fn priority(issue_date: Option<NaiveDateTime>, issue: &str) -> Priority {
        Priority {
            force: "f".into(),
            neighbourhood: "n".into(),
            issue: Some(issue.to_string()),
            action: None,
            issue_date,
            action_date: None,
        }
    }

    proptest! {
        #[test]
        fn priority_sort_is_descending_and_stable(days in prop::collection::vec(prop::option::of(0u32..5), 0..20)) {
            let mut priorities: Vec<_> = days
                .iter()
                .enumerate()
                .map(|(i, d)| priority(d.map(|d| date(2010, 1, d + 1)), &i.to_string()))
                .collect();
            sort_priorities(&mut priorities);

            for pair in priorities.windows(2) {
                prop_assert!(pair[0].issue_date >= pair[1].issue_date);
                if pair[0].issue_date == pair[1].issue_date {
                    let first: usize = pair[0].issue.as_deref().unwrap().parse().unwrap();
                    let second: usize = pair[1].issue.as_deref().unwrap().parse().unwrap();
                    prop_assert!(first < second);
                }
            }
        }
    }
}
