//! Theme system for Convo Desktop
//!
//! A dark and a light palette; the active one is a GPUI global.

mod colors;

pub use colors::*;

use gpui::*;

/// Colors used by the conversation view
#[derive(Debug, Clone)]
pub struct Theme {
    pub id: &'static str,
    pub is_dark: bool,

    // Core colors
    pub primary: Hsla,
    pub secondary: Hsla,

    // Status colors
    pub error: Hsla,

    // Text colors
    pub text: Hsla,
    pub text_muted: Hsla,

    // Background colors
    pub background: Hsla,
    pub background_panel: Hsla,
    pub background_element: Hsla,

    // Rows
    pub user_row: Hsla,
    pub assistant_row: Hsla,

    // Border colors
    pub border: Hsla,
    pub border_subtle: Hsla,

    pub code: Hsla,
    pub cursor: Hsla,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            id: "dark",
            is_dark: true,

            primary: hex("#fab283"),
            secondary: hex("#5c9cf5"),

            error: hex("#e06c75"),

            text: hex("#eeeeee"),
            text_muted: hex("#808080"),

            background: hex("#0a0a0a"),
            background_panel: hex("#141414"),
            background_element: hex("#1e1e1e"),

            user_row: hex("#141414"),
            assistant_row: hex("#1e1e1e"),

            border: hex("#484848"),
            border_subtle: hex("#3c3c3c"),

            code: hex("#7fd88f"),
            cursor: hex("#eeeeee"),
        }
    }

    pub fn light() -> Self {
        Self {
            id: "light",
            is_dark: false,

            primary: hex("#3b7dd8"),
            secondary: hex("#7b5bb6"),

            error: hex("#d1383d"),

            text: hex("#1a1a1a"),
            text_muted: hex("#8a8a8a"),

            background: hex("#ffffff"),
            background_panel: hex("#fafafa"),
            background_element: hex("#f0f0f0"),

            user_row: hex("#ffffff"),
            assistant_row: hex("#f7f7f8"),

            border: hex("#d4d4d4"),
            border_subtle: hex("#e5e5e5"),

            code: hex("#3d9a57"),
            cursor: hex("#1a1a1a"),
        }
    }

    /// Badge color of a model, falling back to the secondary color.
    pub fn badge(&self, color: Option<&str>) -> Hsla {
        color.map(hex).unwrap_or(self.secondary)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Global for Theme {}

/// Initialize the theme system
pub fn init(cx: &mut App) {
    cx.set_global(Theme::default());
    tracing::debug!("Theme system initialized");
}

/// Toggle between the dark and light palettes
pub fn toggle_theme_mode(cx: &mut App) {
    let theme = if cx.global::<Theme>().is_dark {
        Theme::light()
    } else {
        Theme::dark()
    };
    tracing::info!("Theme changed to: {}", theme.id);
    cx.set_global(theme);
}
