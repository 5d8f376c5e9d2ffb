use std::sync::Arc;

use paddock_proto::api::CatalogApi;
use paddock_proto::dto::{Event, Session, StreamsBundle};
use tracing::debug;

use super::fanout::fan_out;
use super::{
    build_episode_nodes, build_perspective_nodes, BuildContext, BuildError, ContentNode, InSubtree,
    NodeStyle, Payload,
};

pub(crate) const LIVE_SUFFIX: &str = " - LIVE";
const BONUS_LABEL: &str = "Bonus Content";

/// What one session contributed: its node, if it has streams, and its bonus
/// content ids either way.
struct SessionSlot {
    node: Option<ContentNode>,
    bonus_ids: Vec<String>,
}

/// Sessions of an event that have streams, in event order, followed by a
/// "Bonus Content" node when any session lists bonus episodes.
pub async fn build_session_nodes(
    ctx: &BuildContext,
    event: &Event,
) -> Result<Vec<ContentNode>, BuildError> {
    let api = Arc::clone(&ctx.api);
    let event_name = event.official_name.clone();
    let slots = fan_out(Some(ctx.permits()), event.session_ids.clone(), move |id| {
        let api = Arc::clone(&api);
        let context = format!("sessions for {}: session {}", event_name, id);
        async move { load_session(api.as_ref(), &id, context).await }
    })
    .await?;

    let mut nodes = Vec::with_capacity(slots.len() + 1);
    let mut bonus_ids = Vec::new();
    for slot in slots {
        bonus_ids.extend(slot.bonus_ids);
        nodes.extend(slot.node);
    }

    if !bonus_ids.is_empty() {
        debug!("{}: {} bonus episodes", event.official_name, bonus_ids.len());
        let episodes = build_episode_nodes(ctx, &bonus_ids).await?;
        nodes.push(
            ContentNode::new(BONUS_LABEL, Payload::Bonus)
                .collapsed()
                .with_children(episodes),
        );
    }
    Ok(nodes)
}

async fn load_session(
    api: &dyn CatalogApi,
    id: &str,
    context: String,
) -> Result<SessionSlot, BuildError> {
    debug!("loading session {}", id);
    let session = api.fetch_session(id).await.in_subtree(|| context.clone())?;
    let bonus_ids = session.bonus_content_ids.clone();
    if !session.has_streams() {
        return Ok(SessionSlot {
            node: None,
            bonus_ids,
        });
    }

    debug!("loading streams for {}", session.slug);
    let streams = api
        .fetch_streams(&session.slug)
        .await
        .in_subtree(|| context)?;
    let node = session_node(&session, streams).await?;
    Ok(SessionSlot {
        node: Some(node),
        bonus_ids,
    })
}

/// Collapsed session node with its perspective leaves. Live sessions are
/// red and marked in the label.
pub(crate) async fn session_node(
    session: &Session,
    streams: StreamsBundle,
) -> Result<ContentNode, BuildError> {
    let children = build_perspective_nodes(streams.perspectives()).await?;
    let node = if session.is_live() {
        ContentNode::new(format!("{}{}", session.name, LIVE_SUFFIX), Payload::SessionStreams(streams))
            .with_style(NodeStyle::Red)
    } else {
        ContentNode::new(session.name.clone(), Payload::SessionStreams(streams))
    };
    Ok(node.collapsed().with_children(children))
}
