use super::{BuildContext, ContentNode, DownloadRequest, Payload, PlaybackContext, StreamId};

const PLAY_LABEL: &str = "Play with MPV";
const DOWNLOAD_LABEL: &str = "Download .m3u8";
const STREAM_URL_LABEL: &str = "GET URL";

/// Action leaves for one playable item: configured custom options, play,
/// download, and in debug mode the raw stream URL.
pub fn build_playback_nodes(ctx: &BuildContext, title: &str, stream_id: &str) -> Vec<ContentNode> {
    let mut nodes: Vec<ContentNode> = ctx
        .config
        .runnable_playback_options()
        .map(|option| {
            ContentNode::new(
                option.title.clone(),
                Payload::Playback(PlaybackContext {
                    stream_id: stream_id.to_string(),
                    title: title.to_string(),
                    option: option.clone(),
                }),
            )
        })
        .collect();

    nodes.push(ContentNode::new(PLAY_LABEL, Payload::Play(stream_id.to_string())));
    nodes.push(ContentNode::new(
        DOWNLOAD_LABEL,
        Payload::Download(DownloadRequest {
            stream_id: stream_id.to_string(),
            title: title.to_string(),
        }),
    ));
    if ctx.debug {
        nodes.push(ContentNode::new(
            STREAM_URL_LABEL,
            Payload::StreamUrl(stream_id.to_string()),
        ));
    }
    nodes
}

/// Title and stream id for items that get playback leaves: episodes (their
/// first media item) and perspectives.
pub fn playback_target(label: &str, payload: &Payload) -> Option<(String, StreamId)> {
    match payload {
        Payload::Episode(ep) => ep.items.first().map(|item| (ep.title.clone(), item.clone())),
        Payload::Perspective(p) => Some((label.to_string(), p.self_url.clone())),
        _ => None,
    }
}
