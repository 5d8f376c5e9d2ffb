//! Content-tree assembly.
//!
//! Each builder fetches one level of the catalog, fans the per-child fetches
//! out over tokio tasks and returns the children in source order. Builders
//! are called lazily by the UI as nodes are expanded.

use std::sync::Arc;

use paddock_proto::api::{CatalogApi, FetchError};
use paddock_proto::config::Config;
use thiserror::Error;
use tokio::sync::Semaphore;

mod episodes;
mod events;
mod fanout;
mod live;
mod node;
mod perspectives;
mod playback;
mod sessions;

pub use episodes::{build_episode_nodes, group_episodes};
pub use events::{build_archive_nodes, build_event_nodes, build_season_nodes};
pub use live::detect_live_session;
pub use node::{
    Category, ContentNode, DownloadRequest, NodeId, NodeStyle, Payload, PlaybackContext, StreamId,
};
pub use perspectives::{build_perspective_nodes, perspective_label};
pub use playback::{build_playback_nodes, playback_target};
pub use sessions::build_session_nodes;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{context}: {source}")]
    Fetch {
        context: String,
        #[source]
        source: FetchError,
    },
    #[error("build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Attach the subtree being built to a fetch failure.
pub(crate) trait InSubtree<T> {
    fn in_subtree<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, BuildError>;
}

impl<T> InSubtree<T> for Result<T, FetchError> {
    fn in_subtree<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, BuildError> {
        self.map_err(|source| BuildError::Fetch {
            context: context().into(),
            source,
        })
    }
}

/// Everything a builder needs: the API, the loaded config, the shared fetch
/// limit and the debug flag. Cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct BuildContext {
    pub api: Arc<dyn CatalogApi>,
    pub config: Arc<Config>,
    pub debug: bool,
    permits: Arc<Semaphore>,
}

impl BuildContext {
    pub fn new(api: Arc<dyn CatalogApi>, config: Arc<Config>, debug: bool) -> Self {
        let limit = match config.network.fanout_limit {
            0 => Semaphore::MAX_PERMITS,
            n => n,
        };
        Self {
            api,
            config,
            debug,
            permits: Arc::new(Semaphore::new(limit)),
        }
    }

    pub(crate) fn permits(&self) -> Arc<Semaphore> {
        Arc::clone(&self.permits)
    }
}

/// Whether expanding a node with this payload fetches or builds children.
pub fn is_loadable(payload: &Payload) -> bool {
    match payload {
        Payload::Category(Category::FullRaceWeekends)
        | Payload::Season(_)
        | Payload::Event(_)
        | Payload::Archive(_)
        | Payload::Perspective(_) => true,
        Payload::Episode(ep) => !ep.items.is_empty(),
        _ => false,
    }
}

/// Build the children of a node that was created without them.
pub async fn load_children(
    ctx: &BuildContext,
    label: &str,
    payload: &Payload,
) -> Result<Vec<ContentNode>, BuildError> {
    match payload {
        Payload::Category(Category::FullRaceWeekends) => build_season_nodes(ctx).await,
        Payload::Season(season) => build_event_nodes(ctx, season).await,
        Payload::Event(event) => build_session_nodes(ctx, event).await,
        Payload::Archive(vod) => build_episode_nodes(ctx, &vod.content_ids).await,
        _ => Ok(playback_target(label, payload)
            .map(|(title, id)| build_playback_nodes(ctx, &title, &id))
            .unwrap_or_default()),
    }
}
