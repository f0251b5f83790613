//! Button/keyboard commands and the page-number entry field.

use crate::error::NavigationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prev,
    Next,
    Home,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Download,
}

impl Command {
    /// Keyboard shortcut for a key name as reported by the browser
    /// (`KeyboardEvent.key`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Prev),
            "ArrowRight" => Some(Self::Next),
            "Home" => Some(Self::Home),
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            _ => None,
        }
    }
}

/// What a key press inside the entry field resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    /// Enter: hand the text to `Navigator::go_to_entry`.
    Submit(String),
    /// Escape: show `page` again.
    Cancel { page: u32 },
    /// Any other key is left to the text field.
    Ignored,
}

/// The clickable page indicator. Clicking swaps the number for an input
/// seeded with the current page; confirming or cancelling swaps it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageEntry {
    #[default]
    Display,
    Editing {
        text: String,
        shown_page: u32,
    },
}

impl PageEntry {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    /// Indicator clicked. A second click while editing does nothing.
    pub fn begin(&mut self, current_page: u32) {
        if !self.is_editing() {
            *self = Self::Editing {
                text: current_page.to_string(),
                shown_page: current_page,
            };
        }
    }

    pub fn set_text(&mut self, value: &str) {
        if let Self::Editing { text, .. } = self {
            *text = value.to_string();
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Editing { text, .. } => Some(text),
            Self::Display => None,
        }
    }

    /// Enter confirms, Escape cancels; both leave editing mode.
    pub fn key(&mut self, key: &str) -> EntryAction {
        let Self::Editing { text, shown_page } = self else {
            return EntryAction::Ignored;
        };
        let action = match key {
            "Enter" => EntryAction::Submit(std::mem::take(text)),
            "Escape" => EntryAction::Cancel { page: *shown_page },
            _ => return EntryAction::Ignored,
        };
        *self = Self::Display;
        action
    }

    /// Page the indicator should show once a submitted entry settled:
    /// the new page on success, the previous one on rejection.
    pub fn settle(shown_page: u32, result: Result<u32, &NavigationError>) -> u32 {
        result.unwrap_or(shown_page)
    }
}
