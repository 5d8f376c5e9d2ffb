//! App — tree browser event loop.
//!
//! Architecture:
//! - `App` owns the tree exclusively; nothing else holds a reference into it.
//! - Background tasks (builders, live watcher, the live indicator, playback
//!   actions) report back through an unbounded `AppMessage` channel and
//!   address nodes by `NodeId`.
//! - The loop draws a frame, waits for the next message, then drains
//!   whatever else is queued before drawing again.
//! - The screen is the tree plus an output panel, side by side with
//!   `horizontal_layout`, stacked otherwise.

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::animator::{LiveIndicator, NodeCanvas};
use crate::player;
use crate::theme::{MessageKind, Theme};
use crate::tree::{self, BuildContext, BuildError, Category, ContentNode, NodeId, Payload};

const FULL_RACE_WEEKENDS: &str = "Full Race Weekends";
const KEY_HINT: &str = " enter: open/play  h: collapse  q: quit ";
const MAX_MESSAGES: usize = 200;
/// How long the input reader blocks before rechecking the shutdown flag.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Everything that flows into the event loop.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    Tint(NodeId, Color),
    Relabel(NodeId, String),
    Redraw,
    Loaded {
        node: NodeId,
        result: Result<Vec<ContentNode>, BuildError>,
    },
    ArchiveLoaded(Vec<ContentNode>),
    LiveFound(ContentNode),
    Status(String),
    Error(String),
}

/// The animator's view of one tree node.
struct TreeCanvas {
    node: NodeId,
    label: String,
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl NodeCanvas for TreeCanvas {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn set_label(&self, label: &str) {
        let _ = self
            .tx
            .send(AppMessage::Relabel(self.node, label.to_string()));
    }

    fn set_color(&self, color: Color) {
        let _ = self.tx.send(AppMessage::Tint(self.node, color));
    }

    fn redraw(&self) {
        let _ = self.tx.send(AppMessage::Redraw);
    }
}

/// Forward terminal events until `stop` is set, the receiver is gone or
/// input fails. `next` waits up to the given timeout and yields `None` when
/// nothing arrived, so `stop` is seen within one poll interval.
fn pump_input<F>(stop: &AtomicBool, tx: &mpsc::UnboundedSender<AppMessage>, mut next: F)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while !stop.load(Ordering::Acquire) {
        match next(INPUT_POLL) {
            Ok(Some(ev)) => {
                if tx.send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("input reader stopped: {}", e);
                break;
            }
        }
    }
}

fn next_terminal_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Bounded log shown in the output panel, oldest first.
#[derive(Debug, Default)]
pub struct MessageLog {
    lines: VecDeque<(String, MessageKind)>,
}

impl MessageLog {
    pub fn push(&mut self, text: impl Into<String>, kind: MessageKind) {
        if self.lines.len() == MAX_MESSAGES {
            self.lines.pop_front();
        }
        self.lines.push_back((text.into(), kind));
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &(String, MessageKind)> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Tree area and output area.
pub fn split_panes(area: Rect, horizontal: bool) -> (Rect, Rect) {
    let chunks = if horizontal {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(8)])
            .split(area)
    };
    (chunks[0], chunks[1])
}

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: NodeId,
    pub depth: usize,
    pub label: String,
    pub color: Color,
    /// `Some(expanded)` for nodes that have or can load children.
    pub fold: Option<bool>,
}

/// Flatten the expanded part of the tree below `root`, in display order.
pub fn visible_rows(root: &ContentNode, tints: &HashMap<NodeId, Color>, theme: &Theme) -> Vec<Row> {
    fn walk(
        node: &ContentNode,
        depth: usize,
        tints: &HashMap<NodeId, Color>,
        theme: &Theme,
        out: &mut Vec<Row>,
    ) {
        for child in &node.children {
            let has_children = !child.children.is_empty();
            let fold = if has_children {
                Some(child.expanded)
            } else if tree::is_loadable(child.payload()) {
                Some(false)
            } else {
                None
            };
            out.push(Row {
                id: child.id(),
                depth,
                label: child.label.clone(),
                color: tints
                    .get(&child.id())
                    .copied()
                    .unwrap_or_else(|| theme.node_color(child)),
                fold,
            });
            if has_children && child.expanded {
                walk(child, depth + 1, tints, theme, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, 0, tints, theme, &mut out);
    out
}

fn parent_of(node: &ContentNode, id: NodeId) -> Option<&ContentNode> {
    if node.children.iter().any(|c| c.id() == id) {
        return Some(node);
    }
    node.children.iter().find_map(|c| parent_of(c, id))
}

pub struct App {
    ctx: BuildContext,
    theme: Theme,
    horizontal: bool,
    root: ContentNode,
    selected: Option<NodeId>,
    tints: HashMap<NodeId, Color>,
    loading: HashSet<NodeId>,
    messages: MessageLog,
    should_quit: bool,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
}

impl App {
    pub fn new(ctx: BuildContext) -> Self {
        let weekends = ContentNode::new(
            FULL_RACE_WEEKENDS,
            Payload::Category(Category::FullRaceWeekends),
        )
        .collapsed();
        let selected = Some(weekends.id());
        let root =
            ContentNode::new("paddock", Payload::Category(Category::Root)).with_children(vec![weekends]);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            theme: Theme::from_config(&ctx.config.theme),
            horizontal: ctx.config.horizontal_layout,
            ctx,
            root,
            selected,
            tints: HashMap::new(),
            loading: HashSet::new(),
            messages: MessageLog::default(),
            should_quit: false,
            tx,
            rx: Some(rx),
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            anyhow::bail!("app already running");
        };

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ──────────────────────────────────
        let input_stop = Arc::new(AtomicBool::new(false));
        let input = {
            let stop = Arc::clone(&input_stop);
            let tx = self.tx.clone();
            tokio::task::spawn_blocking(move || pump_input(&stop, &tx, next_terminal_event))
        };

        self.load_archive();
        self.watch_live();

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            let Some(msg) = rx.recv().await else {
                break;
            };
            self.handle_message(msg);
            while let Ok(next) = rx.try_recv() {
                self.handle_message(next);
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        input_stop.store(true, Ordering::Release);
        if let Err(e) = input.await {
            warn!("input reader task failed: {}", e);
        }
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.dispatch(Action::from_key(key));
            }
            AppMessage::Event(_) | AppMessage::Redraw => {}
            AppMessage::Tint(id, color) => {
                self.tints.insert(id, color);
            }
            AppMessage::Relabel(id, label) => {
                if let Some(node) = self.root.find_mut(id) {
                    node.label = label;
                }
            }
            AppMessage::Loaded { node, result } => self.on_loaded(node, result),
            AppMessage::ArchiveLoaded(nodes) => {
                info!("archive: {} categories", nodes.len());
                self.root.children.extend(nodes);
            }
            AppMessage::LiveFound(node) => {
                info!("live session found: {}", node.label);
                self.messages
                    .push(format!("Live now: {}", node.label), MessageKind::Info);
                self.root.insert_child_at_top(node);
            }
            AppMessage::Status(text) => self.messages.push(text, MessageKind::Output),
            AppMessage::Error(text) => self.messages.push(text, MessageKind::Error),
        }
    }

    fn on_loaded(&mut self, id: NodeId, result: Result<Vec<ContentNode>, BuildError>) {
        self.loading.remove(&id);
        self.tints.remove(&id);
        let Some(node) = self.root.find_mut(id) else {
            return;
        };
        match result {
            Ok(children) if children.is_empty() => {
                self.messages.push(
                    format!("Nothing available under {}", node.label),
                    MessageKind::NoContent,
                );
            }
            Ok(children) => {
                debug!("{}: {} children", node.label, children.len());
                node.children = children;
                node.expanded = true;
            }
            Err(e) => {
                error!("loading {} failed: {}", node.label, e);
                self.messages.push(
                    format!("Loading {} failed: {}", node.label, e),
                    MessageKind::Error,
                );
            }
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let rows = visible_rows(&self.root, &self.tints, &self.theme);
        let cursor = self
            .selected
            .and_then(|id| rows.iter().position(|r| r.id == id))
            .unwrap_or(0);
        let last = rows.len().saturating_sub(1);
        let select = |idx: usize| rows.get(idx).map(|r| r.id);

        match action {
            Action::SelectUp(n) => self.selected = select(cursor.saturating_sub(n)),
            Action::SelectDown(n) => self.selected = select((cursor + n).min(last)),
            Action::SelectFirst => self.selected = select(0),
            Action::SelectLast => self.selected = select(last),
            Action::Activate => {
                if let Some(id) = select(cursor) {
                    self.activate(id);
                }
            }
            Action::Collapse => {
                if let Some(id) = select(cursor) {
                    self.collapse(id);
                }
            }
            Action::Quit => self.should_quit = true,
            Action::Noop => {}
        }
    }

    fn collapse(&mut self, id: NodeId) {
        if let Some(node) = self.root.find_mut(id) {
            if node.expanded && !node.children.is_empty() {
                node.expanded = false;
                return;
            }
        }
        if let Some(parent) = parent_of(&self.root, id) {
            if parent.id() != self.root.id() {
                let parent_id = parent.id();
                self.selected = Some(parent_id);
                if let Some(parent) = self.root.find_mut(parent_id) {
                    parent.expanded = false;
                }
            }
        }
    }

    fn activate(&mut self, id: NodeId) {
        let title = parent_of(&self.root, id)
            .map(|p| p.label.clone())
            .unwrap_or_default();
        let Some(node) = self.root.find_mut(id) else {
            return;
        };
        if !node.children.is_empty() {
            node.expanded = !node.expanded;
            return;
        }
        if tree::is_loadable(node.payload()) {
            if self.loading.insert(id) {
                let original = self.theme.node_color(node);
                let (label, payload) = (node.label.clone(), node.payload().clone());
                self.messages
                    .push(format!("Loading {}...", label), MessageKind::Loading);
                self.spawn_load(id, label, payload, original);
            }
            return;
        }

        let api = Arc::clone(&self.ctx.api);
        match node.payload().clone() {
            Payload::Play(stream_id) => self.spawn_action(async move {
                player::play(api.as_ref(), &stream_id, &title).await
            }),
            Payload::StreamUrl(stream_id) => self.spawn_action(async move {
                player::stream_url(api.as_ref(), &stream_id).await
            }),
            Payload::Download(request) => {
                let dir = self.ctx.config.paths.download_dir.clone();
                self.spawn_action(async move {
                    let path = player::download_playlist(api.as_ref(), &request, &dir).await?;
                    Ok(format!("Saved {}", path.display()))
                })
            }
            Payload::Playback(playback) => self.spawn_action(async move {
                player::run_custom(api.as_ref(), &playback).await
            }),
            _ => {}
        }
    }

    fn spawn_load(&self, id: NodeId, label: String, payload: Payload, original: Color) {
        let canvas = TreeCanvas {
            node: id,
            label: label.clone(),
            tx: self.tx.clone(),
        };
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let indicator = LiveIndicator::start(canvas, original);
            let result = tree::load_children(&ctx, &label, &payload).await;
            indicator.finish().await;
            let _ = tx.send(AppMessage::Loaded { node: id, result });
        });
    }

    fn spawn_action<F>(&self, action: F)
    where
        F: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let msg = match action.await {
                Ok(text) => AppMessage::Status(text),
                Err(e) => {
                    error!("{:#}", e);
                    AppMessage::Error(format!("{:#}", e))
                }
            };
            let _ = tx.send(msg);
        });
    }

    fn load_archive(&self) {
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tree::build_archive_nodes(&ctx).await {
                Ok(nodes) => {
                    let _ = tx.send(AppMessage::ArchiveLoaded(nodes));
                }
                Err(e) => {
                    warn!("archive unavailable: {}", e);
                    let _ = tx.send(AppMessage::Error(format!("Archive unavailable: {}", e)));
                }
            }
        });
    }

    /// Check for a live session now and then every `retry_timeout_secs`
    /// until one turns up.
    fn watch_live(&self) {
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let retry = ctx.config.live.retry_timeout_secs;
            loop {
                match tree::detect_live_session(&ctx).await {
                    Ok(Some(node)) => {
                        let _ = tx.send(AppMessage::LiveFound(node));
                        return;
                    }
                    Ok(None) => debug!("no live session"),
                    Err(e) => warn!("live check failed: {}", e),
                }
                if retry == 0 || tx.is_closed() {
                    return;
                }
                tokio::time::sleep(Duration::from_secs(retry)).await;
            }
        });
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        let (tree_area, output_area) = split_panes(frame.area(), self.horizontal);

        let rows = visible_rows(&self.root, &self.tints, &self.theme);
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let marker = match row.fold {
                    Some(true) => "▾ ",
                    Some(false) => "▸ ",
                    None => "  ",
                };
                ListItem::new(Line::from(vec![
                    Span::raw("  ".repeat(row.depth)),
                    Span::styled(marker, Style::default().fg(self.theme.border)),
                    Span::styled(row.label.clone(), Style::default().fg(row.color)),
                ]))
            })
            .collect();

        let cursor = self
            .selected
            .and_then(|id| rows.iter().position(|r| r.id == id));
        let mut state = ListState::default().with_selected(cursor);
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.style_border())
                    .title(" paddock "),
            )
            .style(Style::default().bg(self.theme.background))
            .highlight_style(self.theme.style_selected());
        frame.render_stateful_widget(list, tree_area, &mut state);

        let visible = output_area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .messages
            .tail(visible)
            .map(|(text, kind)| {
                Line::styled(text.clone(), Style::default().fg(self.theme.message_color(*kind)))
            })
            .collect();
        let output = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.style_accent())
                    .title(Span::styled(" output ", self.theme.style_accent()))
                    .title_bottom(Span::styled(KEY_HINT, self.theme.style_accent())),
            )
            .style(self.theme.style_panel());
        frame.render_widget(output, output_area);
    }
}
