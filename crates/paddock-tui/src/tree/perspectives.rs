use paddock_proto::dto::Perspective;

use super::fanout::fan_out;
use super::{BuildError, ContentNode, NodeStyle, Payload};

/// Display label for a feed. Driver feeds get their racing number,
/// parenthesised and right-aligned in a four-wide column; the well-known
/// feed names are spelled out.
pub fn perspective_label(perspective: &Perspective) -> String {
    if let Some(number) = perspective.driver_number() {
        return format!("{:>4} {}", format!("({})", number), perspective.name);
    }
    match perspective.name.as_str() {
        "WIF" => "Main Feed".to_string(),
        "pit lane" => "Pit Lane".to_string(),
        "driver" => "Driver Tracker".to_string(),
        "data" => "Data Channel".to_string(),
        other => other.to_string(),
    }
}

/// One green leaf per feed: general feeds first, then the numbered driver
/// feeds, each group in source order.
pub async fn build_perspective_nodes(
    perspectives: &[Perspective],
) -> Result<Vec<ContentNode>, BuildError> {
    let nodes = fan_out(None, perspectives.to_vec(), |perspective| async move {
        let label = perspective_label(&perspective);
        Ok(ContentNode::new(label, Payload::Perspective(perspective)).with_style(NodeStyle::Green))
    })
    .await?;

    let (mut feeds, numbered): (Vec<_>, Vec<_>) =
        nodes.into_iter().partition(|n| !n.label.contains('('));
    feeds.extend(numbered);
    Ok(feeds)
}
