//! Live indicator: cycles a node's color while its subtree loads.
//!
//! The animator never touches the tree directly. It talks to a
//! [`NodeCanvas`], which the app backs with messages into its event loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::style::Color;
use tokio::task::JoinHandle;
use tracing::warn;

pub const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Rgb(255, 165, 0),
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Rgb(75, 0, 130),
    Color::Rgb(238, 130, 238),
];

pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub const LOADING_LABEL: &str = "loading...";

/// A single node as seen by the animator.
pub trait NodeCanvas: Send + Sync + 'static {
    /// Current label, captured once so it can be put back.
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
    fn set_color(&self, color: Color);
    fn redraw(&self);
}

/// Cycle `canvas` through [`PALETTE`] until `stop` is set, then put the
/// original color and label back.
pub async fn animate_live<C: NodeCanvas>(canvas: C, stop: Arc<AtomicBool>, original: Color) {
    let original_label = canvas.label();
    canvas.set_label(LOADING_LABEL);

    'cycle: while !stop.load(Ordering::Acquire) {
        for color in PALETTE {
            if stop.load(Ordering::Acquire) {
                break 'cycle;
            }
            canvas.set_color(color);
            canvas.redraw();
            tokio::time::sleep(FRAME_INTERVAL).await;
        }
    }

    canvas.set_color(original);
    canvas.set_label(&original_label);
    canvas.redraw();
}

/// Running animation. [`LiveIndicator::finish`] returns only after the
/// original color and label have been restored.
pub struct LiveIndicator {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl LiveIndicator {
    pub fn start<C: NodeCanvas>(canvas: C, original: Color) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(animate_live(canvas, Arc::clone(&stop), original));
        Self { stop, handle }
    }

    pub async fn finish(self) {
        self.stop.store(true, Ordering::Release);
        if let Err(e) = self.handle.await {
            warn!("live indicator task failed: {}", e);
        }
    }
}
