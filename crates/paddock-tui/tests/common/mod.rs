#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use paddock_proto::api::{CatalogApi, FetchError};
use paddock_proto::config::Config;
use paddock_proto::dto::*;
use paddock_tui::tree::BuildContext;

/// In-memory catalog. Any id can be given a latency or marked as failing.
#[derive(Default)]
pub struct FakeCatalog {
    pub seasons: SeasonList,
    pub events: HashMap<String, Event>,
    pub sessions: HashMap<String, Session>,
    pub streams: HashMap<String, StreamsBundle>,
    pub episodes: HashMap<String, Episode>,
    pub homepage: HomepageContent,
    pub vod_types: VodTypeList,
    pub delays: HashMap<String, Duration>,
    pub failing: HashSet<String>,
    /// Every id list passed to `fetch_episodes`, in call order.
    pub episode_requests: Mutex<Vec<Vec<String>>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeCatalog {
    pub fn event(mut self, id: &str, name: &str, session_ids: &[&str]) -> Self {
        self.events.insert(
            id.to_string(),
            Event {
                name: name.to_string(),
                official_name: name.to_string(),
                self_url: id.to_string(),
                session_ids: strings(session_ids),
            },
        );
        self
    }

    pub fn session(mut self, id: &str, name: &str, status: SessionStatus, bonus: &[&str]) -> Self {
        let slug = format!("{}-slug", id);
        self.sessions.insert(
            id.to_string(),
            Session {
                name: name.to_string(),
                status,
                slug: slug.clone(),
                bonus_content_ids: strings(bonus),
            },
        );
        self.streams.insert(
            slug,
            StreamsBundle {
                groups: vec![StreamGroup {
                    perspectives: vec![
                        perspective("driver", Some(44)),
                        perspective("WIF", None),
                    ],
                }],
            },
        );
        self
    }

    pub fn episode(mut self, id: &str, title: &str, data_source_id: &str) -> Self {
        self.episodes.insert(
            id.to_string(),
            Episode {
                uid: id.to_string(),
                title: title.to_string(),
                items: vec![format!("/api/assets/{}/", id)],
                data_source_id: data_source_id.to_string(),
            },
        );
        self
    }

    pub fn delay(mut self, id: &str, millis: u64) -> Self {
        self.delays.insert(id.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn fail(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn homepage_leading_with(mut self, url: &str) -> Self {
        self.homepage = HomepageContent {
            objects: vec![HomeObject {
                items: vec![HomeItem {
                    content_url: HomeSet {
                        items: vec![HomeSetItem {
                            content_url: ContentRef {
                                self_url: url.to_string(),
                            },
                        }],
                    },
                }],
            }],
        };
        self
    }

    async fn visit(&self, id: &str) -> Result<(), FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(id) {
            return Err(FetchError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, id: &str) -> Result<T, FetchError> {
    map.get(id)
        .cloned()
        .ok_or_else(|| FetchError::NotFound(id.to_string()))
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_seasons(&self) -> Result<SeasonList, FetchError> {
        self.visit("seasons").await?;
        Ok(self.seasons.clone())
    }

    async fn fetch_event(&self, id: &str) -> Result<Event, FetchError> {
        self.visit(id).await?;
        lookup(&self.events, id)
    }

    async fn fetch_session(&self, id: &str) -> Result<Session, FetchError> {
        self.visit(id).await?;
        lookup(&self.sessions, id)
    }

    async fn fetch_streams(&self, slug: &str) -> Result<StreamsBundle, FetchError> {
        self.visit(slug).await?;
        lookup(&self.streams, slug)
    }

    async fn fetch_episodes(&self, ids: &[String]) -> Result<Vec<Episode>, FetchError> {
        if let Ok(mut requests) = self.episode_requests.lock() {
            requests.push(ids.to_vec());
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            self.visit(id).await?;
            out.push(lookup(&self.episodes, id)?);
        }
        Ok(out)
    }

    async fn fetch_homepage(&self) -> Result<HomepageContent, FetchError> {
        self.visit("homepage").await?;
        Ok(self.homepage.clone())
    }

    async fn fetch_vod_types(&self) -> Result<VodTypeList, FetchError> {
        self.visit("vod types").await?;
        Ok(self.vod_types.clone())
    }

    async fn fetch_stream_url(&self, stream_id: &str) -> Result<String, FetchError> {
        self.visit(stream_id).await?;
        Ok(format!("https://cdn.example/{}/master.m3u8", stream_id.trim_matches('/')))
    }
}

pub fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

pub fn perspective(name: &str, number: Option<u32>) -> Perspective {
    Perspective {
        name: name.to_string(),
        self_url: format!("/api/channels/{}/", name),
        drivers: number
            .map(|n| {
                vec![DriverRef {
                    racing_number: n,
                    ..Default::default()
                }]
            })
            .unwrap_or_default(),
    }
}

pub fn context(api: FakeCatalog) -> (Arc<FakeCatalog>, BuildContext) {
    context_with(api, Config::default())
}

pub fn context_with(api: FakeCatalog, config: Config) -> (Arc<FakeCatalog>, BuildContext) {
    let api = Arc::new(api);
    let ctx = BuildContext::new(api.clone(), Arc::new(config), false);
    (api, ctx)
}
