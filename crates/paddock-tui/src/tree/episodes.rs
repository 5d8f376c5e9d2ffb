use paddock_proto::dto::Episode;
use paddock_proto::vod::{parse_year_and_race, sort_episodes};
use tracing::debug;

use super::{BuildContext, BuildError, ContentNode, InSubtree, NodeStyle, Payload};

/// Fetch `ids` and group the result by broadcast year.
pub async fn build_episode_nodes(
    ctx: &BuildContext,
    ids: &[String],
) -> Result<Vec<ContentNode>, BuildError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    debug!("loading {} episodes", ids.len());
    let episodes = ctx
        .api
        .fetch_episodes(ids)
        .await
        .in_subtree(|| format!("{} episodes", ids.len()))?;
    Ok(group_episodes(episodes))
}

/// Year nodes in first-seen order, then the episodes whose id carries no
/// year. Episodes without media items are dropped.
pub fn group_episodes(episodes: Vec<Episode>) -> Vec<ContentNode> {
    let mut year_nodes: Vec<ContentNode> = Vec::new();
    let mut skipped = Vec::new();

    for episode in sort_episodes(episodes) {
        if episode.items.is_empty() {
            continue;
        }
        let parsed = parse_year_and_race(&episode.data_source_id);
        let node = ContentNode::new(episode.title.clone(), Payload::Episode(episode))
            .with_style(NodeStyle::Green);

        let year = match parsed {
            Ok((year, _race)) => year,
            Err(e) => {
                debug!("{}, listing episode after year groups", e);
                skipped.push(node);
                continue;
            }
        };

        let existing = year_nodes
            .iter()
            .position(|n| matches!(n.payload(), Payload::YearGroup(y) if *y == year));
        let parent = match existing {
            Some(idx) => &mut year_nodes[idx],
            None => {
                year_nodes.push(ContentNode::new(year.clone(), Payload::YearGroup(year)).collapsed());
                let last = year_nodes.len() - 1;
                &mut year_nodes[last]
            }
        };
        parent.children.push(node);
    }

    year_nodes.extend(skipped);
    year_nodes
}
