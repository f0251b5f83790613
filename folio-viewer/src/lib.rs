//! Page-render scheduling and navigation core for a single-document PDF
//! viewer.
//!
//! The crate never parses PDF content itself. A [`DocumentLoader`] supplies
//! pages, a [`Surface`] receives pixels and a [`ControlSurface`] reflects
//! navigation state back to the page chrome. Between them sit:
//!
//! - [`RenderScheduler`]: one render at a time on one surface, with a
//!   single last-write-wins pending slot
//! - [`Navigator`]: the current-page state machine
//! - [`zoom`]: responsive fit-to-container scaling
//! - [`scroll`]: the narrow-screen layout that draws every page once
//! - [`load_document`]: load, clamp the restored page, pick a layout

pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod navigation;
pub mod scheduler;
pub mod scroll;
pub mod store;
pub mod viewer;
pub mod zoom;

#[cfg(feature = "pdfium")]
pub mod pdfium;

#[cfg(test)]
mod testing;

pub use config::ViewerConfig;
pub use document::{Canvas, DocumentHandle, DocumentLoader, Page, Surface, Viewport};
pub use error::{ConfigError, LoadError, NavigationError, RenderError};
pub use input::{Command, EntryAction, PageEntry};
pub use navigation::{ControlState, ControlSurface, Direction, Navigator};
pub use scheduler::{RenderListener, RenderOutcome, RenderReport, RenderScheduler};
pub use scroll::{ScrollContainer, ScrollLayout, ScrollReport};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, NavigationStore};
pub use viewer::{load_document, LayoutMode, LoadedDocument};
pub use zoom::{Layout, ZoomState};
