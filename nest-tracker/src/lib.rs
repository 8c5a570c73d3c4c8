pub mod types;
pub mod events;
pub mod tracker;
pub mod client;
pub mod submitter;
pub mod browser;
pub mod catalog;
pub mod replay;

pub use types::*;
pub use events::{ChatMessage, ChatMessageKind, GameState, NestEvent};
pub use tracker::{DeferredLookup, NestTracker, TrackerCycleState};
pub use client::NestApiClient;
pub use submitter::ApiSubmitter;
pub use browser::{BrowseRequest, ItemBrowser, ItemDetails, ItemFilter};
pub use catalog::NameTable;
