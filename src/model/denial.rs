use serde_json::Value;
use thiserror::Error;

/// Why the backend refused a mutating call.
///
/// The backend reports these through the `detail` field of an error body,
/// either as a bare code string or as an object carrying a `code`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("gems_required")]
    GemsRequired,

    #[error("energy_required")]
    EnergyRequired,

    #[error("premium_required")]
    PremiumRequired,

    #[error("item_required")]
    ItemRequired {
        item_code: Option<String>,
        price_gems: Option<u32>,
    },

    /// Any detail the client has no dedicated handling for
    #[error("{0}")]
    Other(String),
}

impl DenialReason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "gems_required" => DenialReason::GemsRequired,
            "energy_required" => DenialReason::EnergyRequired,
            "premium_required" => DenialReason::PremiumRequired,
            "item_required" => DenialReason::ItemRequired {
                item_code: None,
                price_gems: None,
            },
            other => DenialReason::Other(other.to_string()),
        }
    }

    /// Decode the `detail` value of an error body.
    pub fn from_detail(detail: &Value) -> Self {
        match detail {
            Value::String(code) => Self::from_code(code),
            Value::Object(map) => {
                let Some(code) = map.get("code").and_then(Value::as_str) else {
                    return DenialReason::Other(detail.to_string());
                };

                match Self::from_code(code) {
                    DenialReason::ItemRequired { .. } => DenialReason::ItemRequired {
                        item_code: map
                            .get("item_code")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        price_gems: map
                            .get("price_gems")
                            .and_then(Value::as_u64)
                            .and_then(|p| u32::try_from(p).ok()),
                    },
                    reason => reason,
                }
            }
            Value::Null => DenialReason::Other(String::new()),
            other => DenialReason::Other(other.to_string()),
        }
    }

    /// Decode a raw error response body. Bodies that are not JSON, or have
    /// no `detail`, fall back to the body text (or the HTTP status).
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned());

        match detail {
            Some(detail) => Self::from_detail(&detail),
            None if body.trim().is_empty() => DenialReason::Other(format!("HTTP {status}")),
            None => DenialReason::Other(body.trim().to_string()),
        }
    }
}

/// The named operations a session exposes. Used to pick user-facing wording
/// and to tag log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Choose,
    BuyItem,
    GrantDebugResources,
    ConfirmAge,
    Restart,
    Purchase,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Choose => "choose",
            Operation::BuyItem => "buy_item",
            Operation::GrantDebugResources => "grant_debug_resources",
            Operation::ConfirmAge => "confirm_age",
            Operation::Restart => "restart",
            Operation::Purchase => "purchase",
        }
    }

    /// Human wording for failure messages.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Load => "Loading",
            Operation::Choose => "Choice",
            Operation::BuyItem => "Item purchase",
            Operation::GrantDebugResources => "Grant",
            Operation::ConfirmAge => "Age confirmation",
            Operation::Restart => "Restart",
            Operation::Purchase => "Purchase",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_codes_map_to_variants() {
        assert_eq!(DenialReason::from_detail(&json!("gems_required")), DenialReason::GemsRequired);
        assert_eq!(DenialReason::from_detail(&json!("energy_required")), DenialReason::EnergyRequired);
        assert_eq!(DenialReason::from_detail(&json!("premium_required")), DenialReason::PremiumRequired);
        assert_eq!(
            DenialReason::from_detail(&json!("item_required")),
            DenialReason::ItemRequired { item_code: None, price_gems: None }
        );
        assert_eq!(
            DenialReason::from_detail(&json!("invalid_choice")),
            DenialReason::Other("invalid_choice".into())
        );
    }

    #[test]
    fn structured_item_detail_keeps_item_and_price() {
        let detail = json!({"code": "item_required", "item_code": "whip", "price_gems": 15});
        assert_eq!(
            DenialReason::from_detail(&detail),
            DenialReason::ItemRequired {
                item_code: Some("whip".into()),
                price_gems: Some(15),
            }
        );
    }

    #[test]
    fn structured_detail_without_code_is_other() {
        let detail = json!({"reason": "nope"});
        assert_eq!(
            DenialReason::from_detail(&detail),
            DenialReason::Other(r#"{"reason":"nope"}"#.into())
        );
    }

    #[test]
    fn body_fallbacks() {
        assert_eq!(
            DenialReason::from_body(400, r#"{"detail": "gems_required"}"#),
            DenialReason::GemsRequired
        );
        assert_eq!(
            DenialReason::from_body(502, "Bad Gateway"),
            DenialReason::Other("Bad Gateway".into())
        );
        assert_eq!(DenialReason::from_body(500, "  "), DenialReason::Other("HTTP 500".into()));
    }
}
