//! Police forces.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::api::PoliceApi;
use crate::error::Result;
use crate::hydrate::{self, ContactDetails, RawRecord};
use crate::resource::{Hydrate, Resource, fill, memoize};

use super::neighbourhood::Neighbourhood;

/// A way to contact or follow a force.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngagementMethod {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A senior officer of a force.
#[derive(Debug, Clone)]
pub struct SeniorOfficer {
    /// Id of the force the officer serves in
    pub force: String,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub bio: Option<String>,
    pub contact_details: ContactDetails,
}

impl SeniorOfficer {
    /// Build an officer of `force` from one `forces/{id}/people` entry.
    pub fn from_raw(force: &str, raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            force: force.to_string(),
            name: hydrate::string(raw, "name"),
            rank: hydrate::string(raw, "rank"),
            bio: hydrate::string(raw, "bio"),
            contact_details: hydrate::contact_details(raw, "contact_details")?,
        })
    }
}

/// A territorial police force.
///
/// Created from its id alone; the remaining attributes are fetched from
/// `forces/{id}` the first time one is read. Clones share the fetched
/// attributes and cached collections.
#[derive(Clone)]
pub struct Force {
    inner: Arc<ForceInner>,
}

pub(crate) struct ForceInner {
    id: String,
    resource: Resource,
    name: OnceCell<Option<String>>,
    description: OnceCell<Option<String>>,
    url: OnceCell<Option<String>>,
    telephone: OnceCell<Option<String>>,
    engagement_methods: OnceCell<Vec<EngagementMethod>>,
    neighbourhoods: OnceCell<Vec<Neighbourhood>>,
    senior_officers: OnceCell<Vec<SeniorOfficer>>,
}

pub(crate) struct ForceFields {
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    telephone: Option<String>,
    engagement_methods: Vec<EngagementMethod>,
}

impl Hydrate for ForceInner {
    type Fields = ForceFields;

    const FIELDS: &'static [&'static str] =
        &["description", "telephone", "name", "engagement_methods", "url"];

    fn api_method(&self) -> String {
        format!("forces/{}", self.id)
    }

    fn hydrate(&self, raw: &RawRecord) -> Result<ForceFields> {
        Ok(ForceFields {
            name: hydrate::string(raw, "name"),
            description: hydrate::string(raw, "description"),
            url: hydrate::string(raw, "url"),
            telephone: hydrate::string(raw, "telephone"),
            engagement_methods: hydrate::list(raw, "engagement_methods")?,
        })
    }

    fn store(&self, fields: ForceFields) {
        fill(&self.name, fields.name);
        fill(&self.description, fields.description);
        fill(&self.url, fields.url);
        fill(&self.telephone, fields.telephone);
        fill(&self.engagement_methods, fields.engagement_methods);
    }
}

impl Force {
    /// A force known only by id.
    pub fn new(api: &PoliceApi, id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ForceInner {
                id: id.into(),
                resource: Resource::new(api.clone()),
                name: OnceCell::new(),
                description: OnceCell::new(),
                url: OnceCell::new(),
                telephone: OnceCell::new(),
                engagement_methods: OnceCell::new(),
                neighbourhoods: OnceCell::new(),
                senior_officers: OnceCell::new(),
            }),
        }
    }

    /// A force whose name may already be known, e.g. from the force listing.
    ///
    /// A `None` name stays unset and is fetched on first read.
    pub fn with_name(api: &PoliceApi, id: impl Into<String>, name: Option<String>) -> Self {
        let force = Self::new(api, id);
        if let Some(name) = name {
            fill(&force.inner.name, Some(name));
        }
        force
    }

    /// A force with every attribute fetched up front.
    pub async fn preloaded(api: &PoliceApi, id: impl Into<String>) -> Result<Self> {
        let force = Self::new(api, id);
        force.load().await?;
        Ok(force)
    }

    /// Fetch the force's attributes now rather than on first read.
    pub async fn load(&self) -> Result<()> {
        self.inner.resource.load(self.inner.as_ref()).await
    }

    /// Whether the attributes have been fetched.
    pub fn is_loaded(&self) -> bool {
        self.inner.resource.is_loaded()
    }

    /// The API handle this force fetches through.
    pub fn api(&self) -> &PoliceApi {
        self.inner.resource.api()
    }

    /// The force identifier (a slug of its name).
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Alias of [`Force::id`].
    pub fn slug(&self) -> &str {
        &self.inner.id
    }

    async fn field<'a, T>(&'a self, slot: &'a OnceCell<T>, name: &'static str) -> Result<&'a T> {
        self.inner
            .resource
            .field(self.inner.as_ref(), slot, name)
            .await
    }

    /// Full name of the force.
    pub async fn name(&self) -> Result<Option<&str>> {
        Ok(self.field(&self.inner.name, "name").await?.as_deref())
    }

    /// Short description of the force's role.
    pub async fn description(&self) -> Result<Option<&str>> {
        Ok(self
            .field(&self.inner.description, "description")
            .await?
            .as_deref())
    }

    /// Website address.
    pub async fn url(&self) -> Result<Option<&str>> {
        Ok(self.field(&self.inner.url, "url").await?.as_deref())
    }

    /// Main switchboard number, usually "101".
    pub async fn telephone(&self) -> Result<Option<&str>> {
        Ok(self
            .field(&self.inner.telephone, "telephone")
            .await?
            .as_deref())
    }

    /// Social media and other engagement channels.
    pub async fn engagement_methods(&self) -> Result<&[EngagementMethod]> {
        Ok(self
            .field(&self.inner.engagement_methods, "engagement_methods")
            .await?
            .as_slice())
    }

    /// A neighbourhood of this force, by id.
    pub fn neighbourhood(&self, id: impl Into<String>) -> Result<Neighbourhood> {
        Neighbourhood::new(self, id)
    }

    /// All neighbourhoods of this force, sorted by name.
    pub async fn neighbourhoods(&self) -> Result<&[Neighbourhood]> {
        let neighbourhoods = memoize(&self.inner.neighbourhoods, || {
            Neighbourhood::list(ForceLink::parent(self))
        })
        .await?;
        Ok(neighbourhoods.as_slice())
    }

    /// Senior officers of this force.
    pub async fn senior_officers(&self) -> Result<&[SeniorOfficer]> {
        let officers = memoize(&self.inner.senior_officers, || async {
            let method = format!("forces/{}/people", self.id());
            let response = self.api().get(&method, &[]).await?;
            hydrate::into_records(response, &method)?
                .iter()
                .map(|raw| SeniorOfficer::from_raw(self.id(), raw))
                .collect()
        })
        .await?;
        Ok(officers.as_slice())
    }
}

impl PartialEq for Force {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Force {}

impl Hash for Force {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Force")
            .field("id", &self.inner.id)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl fmt::Display for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.id)
    }
}

/// How a neighbourhood refers to its force.
///
/// Neighbourhoods cached inside their force hold it weakly, otherwise the
/// cache would keep the force alive forever.
#[derive(Clone)]
pub(crate) enum ForceLink {
    Owned(Force),
    Parent {
        id: String,
        api: PoliceApi,
        force: Weak<ForceInner>,
    },
}

impl ForceLink {
    pub(crate) fn owned(force: &Force) -> Self {
        ForceLink::Owned(force.clone())
    }

    pub(crate) fn parent(force: &Force) -> Self {
        ForceLink::Parent {
            id: force.id().to_string(),
            api: force.api().clone(),
            force: Arc::downgrade(&force.inner),
        }
    }

    pub(crate) fn id(&self) -> &str {
        match self {
            ForceLink::Owned(force) => force.id(),
            ForceLink::Parent { id, .. } => id,
        }
    }

    pub(crate) fn api(&self) -> &PoliceApi {
        match self {
            ForceLink::Owned(force) => force.api(),
            ForceLink::Parent { api, .. } => api,
        }
    }

    /// The force, or a fresh unloaded handle if the parent was dropped.
    pub(crate) fn force(&self) -> Force {
        match self {
            ForceLink::Owned(force) => force.clone(),
            ForceLink::Parent { id, api, force } => match force.upgrade() {
                Some(inner) => Force { inner },
                None => Force::new(api, id.clone()),
            },
        }
    }
}

impl fmt::Debug for ForceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
