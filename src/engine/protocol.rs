use crate::engine::api::{DebugGrant, PurchaseKind};
use crate::model::denial::{DenialReason, Operation};
use crate::model::game_state::GameState;
use crate::model::message::Acknowledgement;

pub enum EngineCommand {
    Load {
        story_code: String,
        lang: String,
    },
    Choose {
        story_code: String,
        choice_code: String,
        lang: String,
    },
    BuyItem {
        story_code: String,
        item_code: String,
        price_gems: Option<u32>,
        lang: String,
    },
    GrantDebugResources {
        grant: DebugGrant,
        story_code: String,
        lang: String,
    },
    ConfirmAge {
        agree: bool,
        story_code: String,
        lang: String,
    },
    Restart {
        story_code: String,
        lang: String,
    },
    Purchase {
        kind: PurchaseKind,
        story_code: String,
        lang: String,
    },

    /// Not an operation: no request, never blocked by the busy flag
    SetDebugUserId(String),
}

impl EngineCommand {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            EngineCommand::Load { .. } => Some(Operation::Load),
            EngineCommand::Choose { .. } => Some(Operation::Choose),
            EngineCommand::BuyItem { .. } => Some(Operation::BuyItem),
            EngineCommand::GrantDebugResources { .. } => Some(Operation::GrantDebugResources),
            EngineCommand::ConfirmAge { .. } => Some(Operation::ConfirmAge),
            EngineCommand::Restart { .. } => Some(Operation::Restart),
            EngineCommand::Purchase { .. } => Some(Operation::Purchase),
            EngineCommand::SetDebugUserId(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum EngineResponse {
    StateReplaced(GameState),

    Failed {
        operation: Operation,
        message: String,
        denial: Option<DenialReason>,
    },

    Acknowledged(Acknowledgement),

    AgeGateBlocked,

    /// Always the last response for an operation
    Finished(Operation),
}
