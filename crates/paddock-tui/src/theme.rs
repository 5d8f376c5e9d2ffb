//! Colors and styles for the browser, resolved once from the `[theme]`
//! section of the config.

use std::str::FromStr;

use paddock_proto::config::ThemeConfig;
use ratatui::style::{Color, Modifier, Style};
use tracing::warn;

use crate::tree::{Category, ContentNode, NodeStyle, Payload};

pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);

/// How a line in the output panel is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Loading,
    NoContent,
    Error,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub border: Color,
    pub category: Color,
    pub folder: Color,
    pub item: Color,
    pub action: Color,
    pub loading: Color,
    pub live: Color,
    pub no_content: Color,
    pub info: Color,
    pub error: Color,
    pub terminal_accent: Color,
    pub terminal_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    /// Parse every configured color. A value that does not parse falls back
    /// to the built-in color for that slot.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = ThemeConfig::default();
        let color = |key: &str, value: &str, fallback: &str| match Color::from_str(value) {
            Ok(c) => c,
            Err(_) => {
                warn!("theme: invalid {} {:?}, using {}", key, value, fallback);
                Color::from_str(fallback).unwrap_or(Color::Reset)
            }
        };
        Self {
            background: color("background_color", &config.background_color, &defaults.background_color),
            border: color("border_color", &config.border_color, &defaults.border_color),
            category: color("category_node_color", &config.category_node_color, &defaults.category_node_color),
            folder: color("folder_node_color", &config.folder_node_color, &defaults.folder_node_color),
            item: color("item_node_color", &config.item_node_color, &defaults.item_node_color),
            action: color("action_node_color", &config.action_node_color, &defaults.action_node_color),
            loading: color("loading_color", &config.loading_color, &defaults.loading_color),
            live: color("live_color", &config.live_color, &defaults.live_color),
            no_content: color("no_content_color", &config.no_content_color, &defaults.no_content_color),
            info: color("info_color", &config.info_color, &defaults.info_color),
            error: color("error_color", &config.error_color, &defaults.error_color),
            terminal_accent: color(
                "terminal_accent_color",
                &config.terminal_accent_color,
                &defaults.terminal_accent_color,
            ),
            terminal_text: color(
                "terminal_text_color",
                &config.terminal_text_color,
                &defaults.terminal_text_color,
            ),
        }
    }

    /// Resting color of a node: live and playable styles first, then by what
    /// the node refers to.
    pub fn node_color(&self, node: &ContentNode) -> Color {
        match node.style {
            NodeStyle::Red => return self.live,
            NodeStyle::Green => return self.item,
            NodeStyle::Default => {}
        }
        match node.payload() {
            Payload::Category(Category::Root)
            | Payload::Category(Category::FullRaceWeekends)
            | Payload::Archive(_) => self.category,
            Payload::Playback(_) | Payload::Play(_) | Payload::StreamUrl(_) | Payload::Download(_) => {
                self.action
            }
            _ => self.folder,
        }
    }

    pub fn message_color(&self, kind: MessageKind) -> Color {
        match kind {
            MessageKind::Info => self.info,
            MessageKind::Loading => self.loading,
            MessageKind::NoContent => self.no_content,
            MessageKind::Error => self.error,
            MessageKind::Output => self.terminal_text,
        }
    }

    // ── Predefined styles ─────────────────────────────────────────────────────

    pub fn style_selected(&self) -> Style {
        Style::default()
            .bg(C_SELECTION_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn style_panel(&self) -> Style {
        Style::default().fg(self.terminal_text).bg(self.background)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.terminal_accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_proto::dto::Episode;

    #[test]
    fn test_configured_colors_are_used() {
        let config = ThemeConfig {
            live_color: "magenta".to_string(),
            item_node_color: "#010203".to_string(),
            action_node_color: "12".to_string(),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);
        assert_eq!(theme.live, Color::Magenta);
        assert_eq!(theme.item, Color::Rgb(1, 2, 3));
        assert_eq!(theme.action, Color::Indexed(12));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let config = ThemeConfig {
            error_color: "not a color".to_string(),
            ..ThemeConfig::default()
        };
        assert_eq!(Theme::from_config(&config).error, Theme::default().error);
    }

    #[test]
    fn test_node_color_by_kind() {
        let theme = Theme::default();
        let live = ContentNode::new("Race - LIVE", Payload::Bonus).with_style(NodeStyle::Red);
        let episode = ContentNode::new("Race", Payload::Episode(Episode::default()))
            .with_style(NodeStyle::Green);
        let weekends = ContentNode::new("Weekends", Payload::Category(Category::FullRaceWeekends));
        let year = ContentNode::new("2021", Payload::YearGroup("2021".into()));
        let play = ContentNode::new("Play with MPV", Payload::Play("id".into()));

        assert_eq!(theme.node_color(&live), theme.live);
        assert_eq!(theme.node_color(&episode), theme.item);
        assert_eq!(theme.node_color(&weekends), theme.category);
        assert_eq!(theme.node_color(&year), theme.folder);
        assert_eq!(theme.node_color(&play), theme.action);
    }
}
