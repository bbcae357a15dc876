use std::time::Duration;

use log::{debug, info, warn};

use crate::engine::api::{ApiClient, BuyItemRequest, ChooseRequest, DebugGrant, PurchaseKind};
use crate::engine::error::SessionError;
use crate::engine::identity::Identity;
use crate::engine::transport::Transport;
use crate::model::denial::Operation;
use crate::model::game_state::{Choice, GameState};
use crate::model::message::Acknowledgement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceAvailability {
    Selectable,
    /// Blocked locally; offer buying `item_code` instead
    NeedsItem { item_code: String, price_gems: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGate {
    Confirmed,
    /// The player did not agree; nothing was sent
    Blocked,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Price sent for items the shop listing does not know about
    pub default_item_price: u32,
    /// How long a grant acknowledgement stays visible
    pub ack_ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_item_price: 10,
            ack_ttl: Duration::from_secs(2),
        }
    }
}

/// Owns the authoritative snapshot. Every successful operation replaces it
/// with what the backend returned; every failure leaves it untouched.
pub struct Session<T: Transport> {
    api: ApiClient<T>,
    state: Option<GameState>,
    options: SessionOptions,
}

impl<T: Transport> Session<T> {
    pub fn new(api: ApiClient<T>, options: SessionOptions) -> Self {
        Self {
            api,
            state: None,
            options,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn identity(&self) -> &Identity {
        self.api.identity()
    }

    pub fn set_debug_user_id(&mut self, id: &str) -> bool {
        self.api.identity_mut().set_debug_user_id(id)
    }

    /// Shop price if listed, otherwise the configured default.
    pub fn item_price(&self, item_code: &str) -> u32 {
        item_price(self.state.as_ref(), item_code, self.options.default_item_price)
    }

    pub fn availability(&self, choice: &Choice) -> ChoiceAvailability {
        choice_availability(self.state.as_ref(), choice, self.options.default_item_price)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn load(&mut self, story_code: &str, lang: &str) -> Result<&GameState, SessionError> {
        debug!("load story={} lang={}", story_code, lang);
        let fresh = record(Operation::Load, self.api.fetch_state(story_code, lang))?;
        Ok(self.replace(fresh))
    }

    pub fn choose(
        &mut self,
        story_code: &str,
        choice_code: &str,
        lang: &str,
    ) -> Result<&GameState, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NotLoaded)?;
        let choice = state
            .choice(choice_code)
            .ok_or_else(|| SessionError::UnknownChoice(choice_code.to_string()))?;

        if let ChoiceAvailability::NeedsItem { item_code, price_gems } = self.availability(choice) {
            debug!("choice {} blocked locally: needs {}", choice_code, item_code);
            return Err(SessionError::ItemLocked { item_code, price_gems });
        }

        debug!("choose story={} choice={} lang={}", story_code, choice_code, lang);
        let body = ChooseRequest {
            story_code,
            choice_code,
            lang,
        };
        let next = record(Operation::Choose, self.api.choose(&body))?;
        Ok(self.replace(next))
    }

    /// `price_gems` of `None` uses [`Session::item_price`]. The backend has the
    /// final say on price and balance either way.
    pub fn buy_item(
        &mut self,
        story_code: &str,
        item_code: &str,
        price_gems: Option<u32>,
        lang: &str,
    ) -> Result<&GameState, SessionError> {
        let price_gems = price_gems.unwrap_or_else(|| self.item_price(item_code));
        debug!("buy_item story={} item={} price={}", story_code, item_code, price_gems);

        let body = BuyItemRequest {
            story_code,
            item_code,
            price_gems,
            lang,
        };
        record(Operation::BuyItem, self.api.buy_item(&body))?;
        self.reload(Operation::BuyItem, story_code, lang)
    }

    pub fn grant_debug_resources(
        &mut self,
        grant: DebugGrant,
        story_code: &str,
        lang: &str,
    ) -> Result<Acknowledgement, SessionError> {
        if self.identity().is_host() {
            warn!("Debug grant requested in host-authenticated mode; refused");
            return Err(SessionError::DebugUnavailable);
        }

        debug!("grant {:?}", grant);
        record(Operation::GrantDebugResources, self.api.grant(&grant))?;
        self.reload(Operation::GrantDebugResources, story_code, lang)?;
        Ok(Acknowledgement::new(grant.describe(), self.options.ack_ttl))
    }

    pub fn confirm_age(
        &mut self,
        agree: bool,
        story_code: &str,
        lang: &str,
    ) -> Result<AgeGate, SessionError> {
        if !agree {
            debug!("age gate not accepted; staying put");
            return Ok(AgeGate::Blocked);
        }

        record(Operation::ConfirmAge, self.api.confirm_age())?;
        self.reload(Operation::ConfirmAge, story_code, lang)?;
        Ok(AgeGate::Confirmed)
    }

    /// Resets scene progression only; wallet and items are kept by the backend.
    pub fn restart(&mut self, story_code: &str, lang: &str) -> Result<&GameState, SessionError> {
        debug!("restart story={} lang={}", story_code, lang);
        record(Operation::Restart, self.api.restart(story_code, lang))?;
        self.reload(Operation::Restart, story_code, lang)
    }

    pub fn purchase(
        &mut self,
        kind: PurchaseKind,
        story_code: &str,
        lang: &str,
    ) -> Result<&GameState, SessionError> {
        debug!("purchase {:?}", kind);
        record(Operation::Purchase, self.api.purchase(kind))?;
        self.reload(Operation::Purchase, story_code, lang)
    }

    /// State fetch after `applied` went through on the backend. A failure
    /// here means the held snapshot is stale, not that `applied` failed.
    fn reload(&mut self, applied: Operation, story_code: &str, lang: &str) -> Result<&GameState, SessionError> {
        let fetched = self
            .api
            .fetch_state(story_code, lang)
            .map_err(|e| SessionError::RefreshFailed {
                applied,
                source: Box::new(e),
            });
        let fresh = record(applied, fetched)?;
        Ok(self.replace(fresh))
    }

    fn replace(&mut self, fresh: GameState) -> &GameState {
        debug!(
            "snapshot replaced: scene={} energy={} gems={}",
            fresh.scene.code, fresh.wallet.energy, fresh.wallet.gems
        );
        self.state.insert(fresh)
    }
}

pub fn item_price(state: Option<&GameState>, item_code: &str, default_price: u32) -> u32 {
    state
        .and_then(|s| s.shop_price(item_code))
        .unwrap_or(default_price)
}

/// Whether `choice` may be submitted given what `state` owns.
pub fn choice_availability(
    state: Option<&GameState>,
    choice: &Choice,
    default_price: u32,
) -> ChoiceAvailability {
    // Without a snapshot nothing is owned
    let missing = match state {
        Some(state) => choice.missing_item(state),
        None => choice.requires_item.as_deref(),
    };

    match missing {
        Some(item_code) => ChoiceAvailability::NeedsItem {
            item_code: item_code.to_string(),
            price_gems: item_price(state, item_code, default_price),
        },
        None => ChoiceAvailability::Selectable,
    }
}

fn record<R>(op: Operation, result: Result<R, SessionError>) -> Result<R, SessionError> {
    if let Err(e) = &result {
        match e {
            SessionError::Denied(reason) => info!("{} denied: {}", op.name(), reason),
            SessionError::Transport(_) | SessionError::Decode(_) => {
                warn!("{} failed: {}", op.name(), e)
            }
            SessionError::RefreshFailed { .. } => warn!("{}", e),
            _ => debug!("{} rejected locally: {}", op.name(), e),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(items: &[&str]) -> GameState {
        serde_json::from_value(json!({
            "scene": {"code": "office_flirt_intro", "text": "..."},
            "choices": [
                {"code": "vault", "label": "Open", "requires_item": "key_card"},
                {"code": "smile", "label": "Smile", "requires_item": ""}
            ],
            "wallet": {"energy": 5, "gems": 0, "is_premium": false},
            "items": items,
            "shop": [{"code": "key_card", "price_gems": 15}]
        }))
        .unwrap()
    }

    #[test]
    fn shop_price_beats_default() {
        let s = state(&[]);
        assert_eq!(item_price(Some(&s), "key_card", 10), 15);
        assert_eq!(item_price(Some(&s), "rose", 10), 10);
        assert_eq!(item_price(None, "key_card", 7), 7);
    }

    #[test]
    fn missing_item_blocks_choice() {
        let s = state(&[]);
        let vault = s.choice("vault").unwrap();
        assert_eq!(
            choice_availability(Some(&s), vault, 10),
            ChoiceAvailability::NeedsItem {
                item_code: "key_card".into(),
                price_gems: 15
            }
        );

        let owned = state(&["key_card"]);
        assert_eq!(
            choice_availability(Some(&owned), vault, 10),
            ChoiceAvailability::Selectable
        );
    }

    #[test]
    fn blank_requirement_is_no_requirement() {
        let s = state(&[]);
        let smile = s.choice("smile").unwrap();
        assert_eq!(smile.requires_item, None);
        assert_eq!(choice_availability(None, smile, 10), ChoiceAvailability::Selectable);
    }

    #[test]
    fn nothing_is_owned_without_a_snapshot() {
        let s = state(&["key_card"]);
        let vault = s.choice("vault").unwrap();
        assert_eq!(
            choice_availability(None, vault, 10),
            ChoiceAvailability::NeedsItem {
                item_code: "key_card".into(),
                price_gems: 10
            }
        );
    }
}
