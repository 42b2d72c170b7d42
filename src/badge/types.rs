//! Values returned by the badge contract's view methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Details stored for an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,

    /// Fields this client does not interpret, kept for display.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event as listed by `get_all_events`, which answers `[name, details]` pairs.
/// It serializes back to the same pair shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, EventDetails)", into = "(String, EventDetails)")]
pub struct Event {
    pub name: String,
    pub details: EventDetails,
}

impl From<(String, EventDetails)> for Event {
    fn from((name, details): (String, EventDetails)) -> Self {
        Self { name, details }
    }
}

impl From<Event> for (String, EventDetails) {
    fn from(event: Event) -> Self {
        (event.name, event.details)
    }
}

/// NEP-177 style token metadata, reduced to what badges use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A badge token owned by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeToken {
    pub token_id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub metadata: TokenMetadata,
}

/// What an account may do on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccountRoles {
    pub is_owner: bool,
    pub is_organizer: bool,
    pub is_manager: bool,
}

impl AccountRoles {
    /// Owners and organizers create events and share magic links.
    pub fn can_manage_events(&self) -> bool {
        self.is_owner || self.is_organizer
    }
}
