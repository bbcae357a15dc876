use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::error::SessionError;
use crate::engine::identity::Identity;
use crate::engine::transport::{ApiRequest, Method, Transport};
use crate::model::denial::DenialReason;
use crate::model::game_state::GameState;

#[derive(Serialize)]
pub struct ChooseRequest<'a> {
    pub story_code: &'a str,
    pub choice_code: &'a str,
    pub lang: &'a str,
}

#[derive(Serialize)]
pub struct BuyItemRequest<'a> {
    pub story_code: &'a str,
    pub item_code: &'a str,
    pub price_gems: u32,
    pub lang: &'a str,
}

/// A non-production resource grant. Unset fields are left out of the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DebugGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gems: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
}

impl DebugGrant {
    /// What the debug panel hands out by default.
    pub fn standard() -> Self {
        Self {
            energy: Some(50),
            gems: Some(100),
            premium: Some(false),
        }
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(energy) = self.energy.filter(|e| *e > 0) {
            parts.push(format!("+{energy} energy"));
        }
        if let Some(gems) = self.gems.filter(|g| *g > 0) {
            parts.push(format!("+{gems} 💎"));
        }
        if self.premium == Some(true) {
            parts.push("Premium".to_string());
        }

        if parts.is_empty() {
            "Granted: nothing".to_string()
        } else {
            format!("Granted: {}", parts.join(", "))
        }
    }
}

#[derive(Serialize)]
struct AgeConfirmRequest {
    agree: bool,
}

#[derive(Serialize)]
struct RestartRequest<'a> {
    story_code: &'a str,
    lang: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseKind {
    Gems(u32),
    PremiumDays(u32),
}

#[derive(Serialize)]
struct PurchaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    gems: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    premium_days: Option<u32>,
}

impl From<PurchaseKind> for PurchaseRequest {
    fn from(kind: PurchaseKind) -> Self {
        match kind {
            PurchaseKind::Gems(n) => Self {
                gems: Some(n),
                premium_days: None,
            },
            PurchaseKind::PremiumDays(n) => Self {
                gems: None,
                premium_days: Some(n),
            },
        }
    }
}

/// Typed access to the backend endpoints, authenticated by the session identity.
pub struct ApiClient<T: Transport> {
    transport: T,
    identity: Identity,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, identity: Identity) -> Self {
        Self {
            transport,
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    pub fn fetch_state(&self, story_code: &str, lang: &str) -> Result<GameState, SessionError> {
        let request = ApiRequest {
            method: Method::Get,
            path: "/api/state".into(),
            query: vec![
                ("story".into(), story_code.into()),
                ("lang".into(), lang.into()),
            ],
            headers: self.identity.headers(),
            body: None,
        };
        self.send(&request)
    }

    pub fn choose(&self, body: &ChooseRequest<'_>) -> Result<GameState, SessionError> {
        self.post("/api/choose", body)
    }

    pub fn buy_item(&self, body: &BuyItemRequest<'_>) -> Result<(), SessionError> {
        self.post_ack("/api/item/buy", body)
    }

    pub fn grant(&self, grant: &DebugGrant) -> Result<(), SessionError> {
        self.post_ack("/api/dev/grant", grant)
    }

    pub fn confirm_age(&self) -> Result<(), SessionError> {
        self.post_ack("/api/age/confirm", &AgeConfirmRequest { agree: true })
    }

    pub fn restart(&self, story_code: &str, lang: &str) -> Result<(), SessionError> {
        self.post_ack("/api/restart", &RestartRequest { story_code, lang })
    }

    pub fn purchase(&self, kind: PurchaseKind) -> Result<(), SessionError> {
        self.post_ack("/api/purchase/mock", &PurchaseRequest::from(kind))
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, SessionError> {
        let request = self.post_request(path, body)?;
        self.send(&request)
    }

    /// POST whose success body is not needed; the caller re-loads instead.
    fn post_ack<B: Serialize>(&self, path: &str, body: &B) -> Result<(), SessionError> {
        let request = self.post_request(path, body)?;
        self.send_raw(&request).map(|_| ())
    }

    fn post_request<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiRequest, SessionError> {
        Ok(ApiRequest {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            headers: self.identity.headers(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    fn send<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, SessionError> {
        let body = self.send_raw(request)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn send_raw(&self, request: &ApiRequest) -> Result<String, SessionError> {
        let resp = self.transport.execute(request)?;

        if resp.is_success() {
            return Ok(resp.body);
        }

        debug!("{} -> HTTP {}: {}", request.path, resp.status, resp.body);
        Err(SessionError::Denied(DenialReason::from_body(resp.status, &resp.body)))
    }
}
