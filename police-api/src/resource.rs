//! Lazily hydrated resources.
//!
//! A resource is created from its identity, plus any attribute values the
//! caller already knows. The first read of a field that is still unset
//! fetches the resource's detail endpoint once and fills every remaining
//! field from that single response. Values supplied at construction are
//! never overwritten.
//!
//! A failed fetch leaves the resource unloaded, so the next read tries
//! again.

use std::future::Future;

use tokio::sync::OnceCell;
use tracing::trace;

use crate::api::PoliceApi;
use crate::error::{PoliceError, Result};
use crate::hydrate::{self, RawRecord};

/// An entity whose attributes come from one detail endpoint.
pub trait Hydrate: Sync {
    /// Every typed value produced from one payload.
    type Fields: Send;

    /// Field names carried by the detail payload, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Method path of the detail endpoint.
    fn api_method(&self) -> String;

    /// Coerce the raw payload into typed values.
    ///
    /// Runs to completion before anything is stored, so a coercion failure
    /// leaves every slot untouched.
    fn hydrate(&self, raw: &RawRecord) -> Result<Self::Fields>;

    /// Store hydrated values into slots that are still unset.
    fn store(&self, fields: Self::Fields);
}

/// Load state shared by every lazy resource.
#[derive(Debug)]
pub struct Resource {
    api: PoliceApi,
    loaded: OnceCell<()>,
}

impl Resource {
    /// A resource that has not been fetched yet.
    pub fn new(api: PoliceApi) -> Self {
        Self {
            api,
            loaded: OnceCell::new(),
        }
    }

    /// The API handle used for fetches.
    pub fn api(&self) -> &PoliceApi {
        &self.api
    }

    /// Whether the detail endpoint has been fetched successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Fetch and hydrate `entity`, unless that already happened.
    ///
    /// Concurrent callers share one fetch.
    pub async fn load<H: Hydrate>(&self, entity: &H) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                let method = entity.api_method();
                let response = self.api.get(&method, &[]).await?;
                let raw = hydrate::into_record(response, &method)?;
                hydrate::trace_absent(&raw, H::FIELDS, &method);

                let fields = entity.hydrate(&raw)?;
                entity.store(fields);
                trace!(%method, "resource hydrated");
                Ok::<_, PoliceError>(())
            })
            .await
            .map(|_| ())
    }

    /// Read one slot, fetching the resource first if the slot is unset.
    pub async fn field<'a, H, T>(
        &self,
        entity: &H,
        slot: &'a OnceCell<T>,
        name: &'static str,
    ) -> Result<&'a T>
    where
        H: Hydrate,
    {
        if let Some(value) = slot.get() {
            return Ok(value);
        }

        self.load(entity).await?;
        slot.get().ok_or_else(|| hydrate::missing(name))
    }
}

/// Store `value` unless the slot was filled at construction.
pub fn fill<T>(slot: &OnceCell<T>, value: T) {
    let _ = slot.set(value);
}

/// Compute a derived collection at most once.
///
/// Errors are not cached; the next call runs `init` again.
pub async fn memoize<'a, T, F, Fut>(slot: &'a OnceCell<T>, init: F) -> Result<&'a T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    slot.get_or_try_init(init).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::service::{MockTransport, Verb};

    /// Minimal resource with two fields.
    struct Widget {
        resource: Resource,
        colour: OnceCell<Option<String>>,
        size: OnceCell<Option<i64>>,
    }

    impl Hydrate for Widget {
        type Fields = (Option<String>, Option<i64>);

        const FIELDS: &'static [&'static str] = &["colour", "size"];

        fn api_method(&self) -> String {
            "widgets/1".to_string()
        }

        fn hydrate(&self, raw: &RawRecord) -> Result<Self::Fields> {
            Ok((
                hydrate::string(raw, "colour"),
                hydrate::integer(raw, "size")?,
            ))
        }

        fn store(&self, (colour, size): Self::Fields) {
            fill(&self.colour, colour);
            fill(&self.size, size);
        }
    }

    fn widget(mock: &Arc<MockTransport>) -> Widget {
        Widget {
            resource: Resource::new(PoliceApi::with_transport(mock.clone())),
            colour: OnceCell::new(),
            size: OnceCell::new(),
        }
    }

    #[tokio::test]
    async fn one_fetch_hydrates_every_field() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Verb::Get, "widgets/1", json!({"colour": "red", "size": "3"}));
        let w = widget(&mock);

        let colour = w.resource.field(&w, &w.colour, "colour").await.unwrap();
        assert_eq!(colour.as_deref(), Some("red"));
        let size = w.resource.field(&w, &w.size, "size").await.unwrap();
        assert_eq!(*size, Some(3));

        assert_eq!(mock.request_count(), 1);
        assert!(w.resource.is_loaded());
    }

    #[tokio::test]
    async fn preset_field_is_not_overwritten() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Verb::Get, "widgets/1", json!({"colour": "red", "size": 3}));
        let w = widget(&mock);
        fill(&w.colour, Some("blue".to_string()));

        let colour = w.resource.field(&w, &w.colour, "colour").await.unwrap();
        assert_eq!(colour.as_deref(), Some("blue"));
        assert_eq!(mock.request_count(), 0);

        w.resource.field(&w, &w.size, "size").await.unwrap();
        let colour = w.resource.field(&w, &w.colour, "colour").await.unwrap();
        assert_eq!(colour.as_deref(), Some("blue"));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(Verb::Get, "widgets/1", 500)
            .respond(Verb::Get, "widgets/1", json!({"colour": "red"}));
        let w = widget(&mock);

        let err = w.resource.field(&w, &w.colour, "colour").await.unwrap_err();
        match err {
            PoliceError::Api { status, method, .. } => {
                assert_eq!(status, 500);
                assert_eq!(method, "widgets/1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!w.resource.is_loaded());

        let colour = w.resource.field(&w, &w.colour, "colour").await.unwrap();
        assert_eq!(colour.as_deref(), Some("red"));
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn coercion_failure_stores_nothing() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Verb::Get, "widgets/1", json!({"colour": "red", "size": "huge"}));
        let w = widget(&mock);

        let err = w.resource.load(&w).await.unwrap_err();
        assert!(matches!(err, PoliceError::Hydrate { field: "size", .. }));
        assert!(w.colour.get().is_none());
        assert!(!w.resource.is_loaded());
    }

    #[tokio::test]
    async fn memoize_runs_once_on_success() {
        let slot = OnceCell::new();
        let mut calls = 0;

        let first = memoize(&slot, || {
            calls += 1;
            async { Ok(vec![1, 2, 3]) }
        })
        .await
        .unwrap();
        assert_eq!(first, &vec![1, 2, 3]);

        let second = memoize(&slot, || async { Ok(vec![9]) }).await.unwrap();
        assert_eq!(second, &vec![1, 2, 3]);
        assert_eq!(calls, 1);
    }
}
