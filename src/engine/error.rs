use thiserror::Error;

use crate::engine::transport::TransportError;
use crate::model::denial::{DenialReason, Operation};

/// Every way a session operation can end without a new snapshot.
/// None of these touch the held state, but after `RefreshFailed` the held
/// state is known to be behind the backend.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("denied: {0}")]
    Denied(DenialReason),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no scene loaded")]
    NotLoaded,

    #[error("choice '{0}' is not in the current scene")]
    UnknownChoice(String),

    #[error("choice requires item '{item_code}'")]
    ItemLocked { item_code: String, price_gems: u32 },

    #[error("debug grants are unavailable in host-authenticated mode")]
    DebugUnavailable,

    /// The backend applied `applied`; only the follow-up state fetch failed
    #[error("{} applied, refresh failed: {source}", .applied.name())]
    RefreshFailed {
        applied: Operation,
        #[source]
        source: Box<SessionError>,
    },
}

impl SessionError {
    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            SessionError::Denied(reason) => Some(reason),
            _ => None,
        }
    }

    /// The text shown to the player when `op` fails with this error.
    pub fn user_message(&self, op: Operation) -> String {
        use crate::model::denial::DenialReason as D;

        match (op, self) {
            (Operation::Choose, SessionError::Denied(D::GemsRequired)) => {
                "You need more gems 💎".to_string()
            }
            (Operation::Choose, SessionError::Denied(D::EnergyRequired)) => {
                "Not enough energy ⚡".to_string()
            }
            (Operation::Choose, SessionError::Denied(D::PremiumRequired)) => {
                "Premium required 🔒".to_string()
            }
            (Operation::Choose, SessionError::Denied(D::ItemRequired { item_code, .. })) => {
                match item_code {
                    Some(item) => format!("You need the item \"{item}\" 🧩"),
                    None => "An item is required 🧩".to_string(),
                }
            }
            (Operation::BuyItem, SessionError::Denied(D::GemsRequired)) => {
                "You need more gems 💎 to buy this item".to_string()
            }
            (op, SessionError::Denied(reason)) => {
                format!("{} failed: {}", op.label(), detail_or_fallback(reason))
            }
            (op, SessionError::Transport(e)) => format!("{} failed: {}", op.label(), e),
            (op, SessionError::Decode(e)) => {
                format!("{} failed: unexpected server response ({})", op.label(), e)
            }
            (_, SessionError::NotLoaded) => "Start the story first.".to_string(),
            (_, SessionError::UnknownChoice(code)) => {
                format!("That choice is no longer available ({code}).")
            }
            (_, SessionError::ItemLocked { item_code, price_gems }) => {
                format!("You need the item \"{item_code}\" first ({price_gems} 💎).")
            }
            (_, SessionError::DebugUnavailable) => {
                "Debug grants are not available in this session.".to_string()
            }
            (_, SessionError::RefreshFailed { applied, .. }) => format!(
                "{} went through, but refreshing failed. Reload to see the result.",
                applied.label()
            ),
        }
    }
}

fn detail_or_fallback(reason: &DenialReason) -> String {
    match reason {
        DenialReason::Other(detail) if detail.trim().is_empty() => {
            "something went wrong".to_string()
        }
        other => other.to_string(),
    }
}
