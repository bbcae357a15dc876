use serde::{Deserialize, Deserializer, Serialize};

/// A full snapshot of the player's story position and economy.
/// Issued by the backend and replaced wholesale after every operation.
/// This is READ-ONLY outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub scene: Scene,

    #[serde(default)]
    pub choices: Vec<Choice>,

    pub wallet: Wallet,

    /// Item codes currently owned in this story
    #[serde(default)]
    pub items: Vec<String>,

    #[serde(default)]
    pub shop: Vec<ShopEntry>,

    /// Seconds until the next passive +1 energy; 0 means nothing pending
    #[serde(default, rename = "next_energy_in")]
    pub next_energy_in_seconds: Option<u32>,

    #[serde(default)]
    pub age_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub code: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub is_premium: bool,

    #[serde(default)]
    pub energy_cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub code: String,
    pub label: String,

    #[serde(default)]
    pub gem_cost: u32,

    #[serde(default)]
    pub is_premium: bool,

    /// Narrative heat gained when taken (may be negative)
    #[serde(default)]
    pub heat_points: i32,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub requires_item: Option<String>,

    #[serde(default)]
    pub leads_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub energy: u32,
    pub gems: u32,
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub code: String,
    pub price_gems: u32,

    #[serde(default)]
    pub owned: bool,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl GameState {
    pub fn owns(&self, item_code: &str) -> bool {
        self.items.iter().any(|i| i == item_code)
    }

    pub fn choice(&self, code: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.code == code)
    }

    pub fn shop_price(&self, item_code: &str) -> Option<u32> {
        self.shop
            .iter()
            .find(|entry| entry.code == item_code)
            .map(|entry| entry.price_gems)
    }

    /// Whole minutes until the next energy tick, rounded up.
    pub fn next_energy_minutes(&self) -> Option<u32> {
        match self.next_energy_in_seconds {
            Some(secs) if secs > 0 => Some(secs.div_ceil(60)),
            _ => None,
        }
    }
}

impl Choice {
    /// The item this choice needs that `state` does not hold, if any.
    pub fn missing_item<'a>(&'a self, state: &GameState) -> Option<&'a str> {
        self.requires_item
            .as_deref()
            .filter(|item| !state.owns(item))
    }
}
