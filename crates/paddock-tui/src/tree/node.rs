//! The display tree every builder produces.

use std::sync::atomic::{AtomicU64, Ordering};

use paddock_proto::config::CustomPlaybackOption;
use paddock_proto::dto::{Episode, Event, Perspective, Season, StreamsBundle, VodType};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity. Lets background tasks address a node
/// without holding a reference into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Asset id handed to the viewing endpoint: a perspective's self URL or an
/// episode's first item.
pub type StreamId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    Default,
    /// Playable leaf.
    Green,
    /// Live.
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Root,
    FullRaceWeekends,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
    pub stream_id: StreamId,
    pub title: String,
    pub option: CustomPlaybackOption,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub stream_id: StreamId,
    pub title: String,
}

/// What a node refers to. Fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Category(Category),
    Season(Season),
    Event(Event),
    SessionStreams(StreamsBundle),
    Perspective(Perspective),
    Episode(Episode),
    YearGroup(String),
    Bonus,
    Archive(VodType),
    Playback(PlaybackContext),
    Play(StreamId),
    StreamUrl(StreamId),
    Download(DownloadRequest),
}

#[derive(Debug)]
pub struct ContentNode {
    id: NodeId,
    pub label: String,
    payload: Payload,
    pub style: NodeStyle,
    pub selectable: bool,
    pub expanded: bool,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(label: impl Into<String>, payload: Payload) -> Self {
        Self {
            id: NodeId::next(),
            label: label.into(),
            payload,
            style: NodeStyle::Default,
            selectable: true,
            expanded: true,
            children: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn collapsed(mut self) -> Self {
        self.expanded = false;
        self
    }

    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn insert_child_at_top(&mut self, child: ContentNode) {
        self.children.insert(0, child);
    }

    /// Depth-first lookup.
    pub fn find(&self, id: NodeId) -> Option<&ContentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut ContentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Labels of the direct children, in display order.
    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }
}
