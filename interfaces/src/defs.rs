use serde::{Deserialize, Serialize};
use std::fmt;

/// Game item identifier as shown in dialogs and stored by the remote service.
pub type ItemId = i32;

/// One crowdsourced outcome: did `item_id` transform when placed in a nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemObservation {
    pub item_id: ItemId,
    pub transformed: bool,
}

impl ItemObservation {
    pub fn new(item_id: ItemId, transformed: bool) -> Self {
        Self { item_id, transformed }
    }
}

/// Tri-state classification kept by the remote service.
///
/// Tags the service may add later are preserved in `Other` instead of
/// failing the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransformedState {
    Unknown,
    Yes,
    No,
    Other(String),
}

impl TransformedState {
    pub fn as_tag(&self) -> &str {
        match self {
            TransformedState::Unknown => "unknown",
            TransformedState::Yes => "yes",
            TransformedState::No => "no",
            TransformedState::Other(tag) => tag,
        }
    }
}

impl From<String> for TransformedState {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "unknown" => TransformedState::Unknown,
            "yes" => TransformedState::Yes,
            "no" => TransformedState::No,
            _ => TransformedState::Other(tag),
        }
    }
}

impl From<TransformedState> for String {
    fn from(state: TransformedState) -> Self {
        state.as_tag().to_owned()
    }
}

impl fmt::Display for TransformedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// An item as listed by the remote service. The name is never sent by the
/// service and gets filled in locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub transformed_state: TransformedState,
}

// Host collaborator seams.
// The tracker core runs inside the game client's event loop, so all of
// these are plain synchronous calls; anything slow (network) must be
// handed off by the implementation itself.

/// Synchronous query of the interaction dialog currently on screen.
pub trait DialogWidget {
    /// Item id shown in the dialog sprite, `None` when no dialog is rendered.
    /// Values `<= 0` mean the widget exists but is not populated yet.
    fn current_item_id(&self) -> Option<ItemId>;
}

/// Fire-and-forget destination for resolved observations.
pub trait ObservationSink {
    fn submit(&self, observation: ItemObservation);
}

/// Local item definitions, used to give listed items a display name.
pub trait ItemCatalog {
    fn item_name(&self, item_id: ItemId) -> Option<String>;
}
