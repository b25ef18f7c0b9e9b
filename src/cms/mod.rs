//! Headless CMS content for the events, past events and gallery pages.

pub mod mappers;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::CmsConfig;
pub use mappers::{Listing, SkipReason, Skipped};
pub use models::{EntryCollection, Event, GalleryItem, PastEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Event,
    PastEvent,
    Gallery,
}

impl ContentType {
    pub fn id(self) -> &'static str {
        match self {
            ContentType::Event => "event",
            ContentType::PastEvent => "pastEvent",
            ContentType::Gallery => "gallery",
        }
    }

}

/// Every listing is newest first by its `date` field.
const ENTRY_ORDER: &str = "-fields.date";

#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("CMS responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn entries(&self, content_type: ContentType) -> Result<EntryCollection, CmsError>;
}

pub struct ContentfulClient {
    client: reqwest::Client,
    entries_url: String,
    access_token: String,
}

impl ContentfulClient {
    pub fn new(cfg: &CmsConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let entries_url = format!(
            "{}/spaces/{}/environments/{}/entries",
            cfg.api_base.trim_end_matches('/'),
            cfg.space_id,
            cfg.environment
        );
        Ok(Self { client, entries_url, access_token: cfg.access_token.clone() })
    }
}

#[async_trait]
impl ContentSource for ContentfulClient {
    async fn entries(&self, content_type: ContentType) -> Result<EntryCollection, CmsError> {
        let resp = self
            .client
            .get(&self.entries_url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("content_type", content_type.id()),
                ("fields.status", "Published"),
                ("order", ENTRY_ORDER),
                ("include", "2"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CmsError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }
}

/// Result of loading the upcoming events page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventsState {
    Loaded { events: Vec<Event>, skipped: Vec<Skipped> },
    NoEvents { skipped: Vec<Skipped> },
    NetworkError { message: String },
}

#[derive(Clone)]
pub struct CmsService {
    source: Arc<dyn ContentSource>,
}

impl CmsService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn get_events(&self) -> EventsState {
        match self.source.entries(ContentType::Event).await {
            Ok(collection) => {
                let listing = mappers::map_all(&collection, mappers::map_event);
                if listing.items.is_empty() {
                    EventsState::NoEvents { skipped: listing.skipped }
                } else {
                    EventsState::Loaded { events: listing.items, skipped: listing.skipped }
                }
            }
            Err(e) => {
                tracing::error!("Failed to fetch events: {}", e);
                EventsState::NetworkError { message: "Unable to load events right now.".to_string() }
            }
        }
    }

    pub async fn get_past_events(&self) -> Listing<PastEvent> {
        match self.source.entries(ContentType::PastEvent).await {
            Ok(collection) => mappers::map_all(&collection, mappers::map_past_event),
            Err(e) => {
                tracing::error!("Failed to fetch past events: {}", e);
                Listing::default()
            }
        }
    }

    pub async fn get_gallery_items(&self) -> Listing<GalleryItem> {
        match self.source.entries(ContentType::Gallery).await {
            Ok(collection) => mappers::map_all(&collection, mappers::map_gallery_item),
            Err(e) => {
                tracing::error!("Failed to fetch gallery items: {}", e);
                Listing::default()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serves canned collections; content types without one fail like a dead network.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub collections: HashMap<&'static str, Value>,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn entries(&self, content_type: ContentType) -> Result<EntryCollection, CmsError> {
            match self.collections.get(content_type.id()) {
                Some(v) => Ok(serde_json::from_value(v.clone()).unwrap_or_default()),
                None => Err(CmsError::Status(503)),
            }
        }
    }

    fn service(collections: HashMap<&'static str, Value>) -> CmsService {
        CmsService::new(Arc::new(FakeSource { collections }))
    }

    #[tokio::test]
    async fn gallery_fetch_failure_yields_empty_list() {
        let listing = service(HashMap::new()).get_gallery_items().await;
        assert!(listing.items.is_empty());
        assert!(listing.skipped.is_empty());
    }

    #[tokio::test]
    async fn events_state_distinguishes_network_error_from_empty() {
        let failing = service(HashMap::new()).get_events().await;
        assert!(matches!(failing, EventsState::NetworkError { .. }));

        let empty = service(HashMap::from([("event", json!({ "items": [] }))])).get_events().await;
        assert!(matches!(empty, EventsState::NoEvents { .. }));

        let loaded = service(HashMap::from([(
            "event",
            json!({ "items": [{ "sys": { "id": "e1" }, "fields": { "title": "Blood camp" } }] }),
        )]))
        .get_events()
        .await;
        match loaded {
            EventsState::Loaded { events, .. } => assert_eq!(events[0].title, "Blood camp"),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn one_malformed_event_does_not_hide_the_rest() {
        let state = service(HashMap::from([(
            "event",
            json!({ "items": [
                { "sys": { "id": ["x"] }, "fields": {} },
                { "sys": { "id": "e2" }, "fields": { "title": "Tree plantation" } }
            ] }),
        )]))
        .get_events()
        .await;
        match state {
            EventsState::Loaded { events, skipped } => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].title, "Tree plantation");
                assert!(matches!(skipped[0].reason, SkipReason::Malformed { .. }));
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    /// Local stand-in for the delivery API that records each query string.
    async fn stub_contentful() -> (String, Arc<std::sync::Mutex<Vec<String>>>) {
        use axum::extract::{RawQuery, State};
        use axum::routing::get;

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let app = axum::Router::new()
            .route(
                "/spaces/{space}/environments/{env}/entries",
                get(
                    |State(seen): State<Arc<std::sync::Mutex<Vec<String>>>>, RawQuery(q): RawQuery| async move {
                        seen.lock().expect("seen lock").push(q.unwrap_or_default());
                        axum::Json(json!({ "items": [] }))
                    },
                ),
            )
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{}", addr), seen)
    }

    #[tokio::test]
    async fn every_content_type_is_ordered_by_date() {
        let (base, seen) = stub_contentful().await;
        let cfg = CmsConfig {
            space_id: "space1".to_string(),
            access_token: "token".to_string(),
            environment: "master".to_string(),
            api_base: base,
        };
        let client = ContentfulClient::new(&cfg, Duration::from_secs(5)).expect("client");
        for ct in [ContentType::Event, ContentType::PastEvent, ContentType::Gallery] {
            client.entries(ct).await.expect("entries");
        }

        let queries = seen.lock().expect("seen lock").clone();
        assert_eq!(queries.len(), 3);
        for (q, id) in queries.iter().zip(["event", "pastEvent", "gallery"]) {
            assert!(q.contains(&format!("content_type={}", id)), "{}", q);
            assert!(q.contains("order=-fields.date"), "{}", q);
            assert!(q.contains("fields.status=Published"), "{}", q);
        }
    }

    #[test]
    fn events_state_serialises_with_status_tag() {
        let v = serde_json::to_value(EventsState::NetworkError { message: "x".into() }).expect("json");
        assert_eq!(v["status"], "network_error");
        let v = serde_json::to_value(EventsState::NoEvents { skipped: vec![] }).expect("json");
        assert_eq!(v["status"], "no_events");
    }
}
