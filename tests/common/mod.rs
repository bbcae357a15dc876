//! Test utilities & fixtures.
//! An in-memory stand-in for the story backend, reachable through the
//! crate's `Transport` trait. It keeps a tiny scene graph and wallet so
//! tests can observe real state transitions, and records every request.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use love_paths::engine::api::ApiClient;
use love_paths::engine::identity::{Identity, DEBUG_USER_HEADER, HOST_INIT_DATA_HEADER};
use love_paths::engine::session::{Session, SessionOptions};
use love_paths::engine::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

pub const STORY: &str = "office_flirt";
pub const ENTRY_SCENE: &str = "office_flirt_intro";

#[derive(Clone)]
struct SceneDef {
    energy_cost: u32,
    is_premium: bool,
    choices: Vec<ChoiceDef>,
}

#[derive(Clone)]
struct ChoiceDef {
    code: &'static str,
    leads_to: &'static str,
    gem_cost: u32,
    heat_points: i32,
    is_premium: bool,
    requires_item: Option<&'static str>,
}

fn choice(code: &'static str, leads_to: &'static str) -> ChoiceDef {
    ChoiceDef {
        code,
        leads_to,
        gem_cost: 0,
        heat_points: 0,
        is_premium: false,
        requires_item: None,
    }
}

pub struct World {
    scenes: HashMap<&'static str, SceneDef>,
    shop: Vec<(&'static str, u32)>,
    pub current_scene: String,
    pub energy: u32,
    pub gems: u32,
    pub premium: bool,
    pub items: Vec<String>,
    pub heat: i32,
    pub age_confirmed: bool,
    pub next_energy_in: u32,
}

impl World {
    fn office_flirt() -> Self {
        let mut scenes = HashMap::new();
        scenes.insert(
            ENTRY_SCENE,
            SceneDef {
                energy_cost: 1,
                is_premium: false,
                choices: vec![
                    ChoiceDef {
                        heat_points: 1,
                        ..choice("smile", "coffee")
                    },
                    ChoiceDef {
                        gem_cost: 50,
                        heat_points: 3,
                        ..choice("gift", "dinner")
                    },
                    ChoiceDef {
                        requires_item: Some("key_card"),
                        ..choice("vault", "archive")
                    },
                    ChoiceDef {
                        is_premium: true,
                        ..choice("vip", "lounge")
                    },
                ],
            },
        );
        scenes.insert(
            "coffee",
            SceneDef {
                energy_cost: 1,
                is_premium: false,
                choices: vec![choice("leave", "dinner")],
            },
        );
        for code in ["dinner", "archive"] {
            scenes.insert(
                code,
                SceneDef {
                    energy_cost: 1,
                    is_premium: false,
                    choices: Vec::new(),
                },
            );
        }
        scenes.insert(
            "lounge",
            SceneDef {
                energy_cost: 1,
                is_premium: true,
                choices: Vec::new(),
            },
        );

        Self {
            scenes,
            shop: vec![("key_card", 15), ("whip", 25)],
            current_scene: ENTRY_SCENE.to_string(),
            energy: 5,
            gems: 0,
            premium: false,
            items: Vec::new(),
            heat: 0,
            age_confirmed: false,
            next_energy_in: 0,
        }
    }

    fn state_json(&self) -> Value {
        let scene = &self.scenes[self.current_scene.as_str()];
        let choices: Vec<Value> = scene
            .choices
            .iter()
            .map(|c| {
                json!({
                    "code": c.code,
                    "label": format!("Label {}", c.code),
                    "leads_to": c.leads_to,
                    "gem_cost": c.gem_cost,
                    "heat_points": c.heat_points,
                    "requires_item": c.requires_item,
                    "is_premium": c.is_premium,
                })
            })
            .collect();
        let shop: Vec<Value> = self
            .shop
            .iter()
            .map(|(code, price)| {
                json!({"code": code, "price_gems": price, "owned": self.items.iter().any(|i| i == code)})
            })
            .collect();

        json!({
            "scene": {
                "code": self.current_scene,
                "image_url": "",
                "is_premium": scene.is_premium,
                "energy_cost": scene.energy_cost,
                "text": format!("Text of {}", self.current_scene),
            },
            "choices": choices,
            "wallet": {"energy": self.energy, "gems": self.gems, "is_premium": self.premium},
            "age_confirmed": self.age_confirmed,
            "items": self.items,
            "next_energy_in": self.next_energy_in,
            "shop": shop,
        })
    }

    fn choose(&mut self, choice_code: &str) -> Result<Value, Value> {
        let scene = &self.scenes[self.current_scene.as_str()];
        let Some(ch) = scene.choices.iter().find(|c| c.code == choice_code).cloned() else {
            return Err(json!("invalid_choice"));
        };

        if let Some(item) = ch.requires_item {
            if !self.items.iter().any(|i| i == item) {
                let price = self.shop.iter().find(|(c, _)| *c == item).map(|(_, p)| *p);
                return Err(json!({"code": "item_required", "item_code": item, "price_gems": price}));
            }
        }
        if ch.is_premium && !self.premium {
            return Err(json!("premium_required"));
        }
        if ch.gem_cost > 0 && self.gems < ch.gem_cost {
            return Err(json!("gems_required"));
        }
        let next = &self.scenes[ch.leads_to];
        if next.is_premium && !self.premium {
            return Err(json!("premium_required"));
        }
        if self.energy < next.energy_cost {
            return Err(json!("energy_required"));
        }

        self.gems -= ch.gem_cost;
        self.energy -= next.energy_cost;
        self.heat += ch.heat_points;
        self.current_scene = ch.leads_to.to_string();
        Ok(self.state_json())
    }
}

struct Inner {
    world: World,
    requests: Vec<ApiRequest>,
    scripted: VecDeque<Result<ApiResponse, String>>,
}

/// Shared handle: clone one into the session, keep one to inspect.
#[derive(Clone)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                world: World::office_flirt(),
                requests: Vec::new(),
                scripted: VecDeque::new(),
            })),
        }
    }

    /// Answer the next request with this status/body instead of simulating.
    pub fn script(&self, status: u16, body: Value) {
        self.inner.lock().unwrap().scripted.push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn script_raw(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().scripted.push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn script_network_error(&self, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .scripted
            .push_back(Err(message.to_string()));
    }

    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.inner.lock().unwrap().world)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn header<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.as_str())
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: body.to_string(),
    }
}

fn denied(status: u16, detail: Value) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({ "detail": detail }).to_string(),
    }
}

fn field<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a Value> {
    request.body.as_ref().and_then(|b| b.get(name))
}

impl Transport for FakeBackend {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());

        if let Some(scripted) = inner.scripted.pop_front() {
            return scripted.map_err(TransportError::Network);
        }

        let host = header(request, HOST_INIT_DATA_HEADER).is_some();
        match header(request, DEBUG_USER_HEADER) {
            _ if host => {}
            None => return Ok(denied(401, json!("missing_tg_id"))),
            Some(id) if id.parse::<i64>().is_err() => {
                return Ok(denied(400, json!("invalid_tg_id")))
            }
            Some(_) => {}
        }

        let world = &mut inner.world;
        let resp = match (request.method, request.path.as_str()) {
            (Method::Get, "/api/state") => ok(world.state_json()),
            (Method::Post, "/api/choose") => {
                let code = field(request, "choice_code").and_then(Value::as_str).unwrap_or("");
                match world.choose(code) {
                    Ok(state) => ok(state),
                    Err(detail) => denied(400, detail),
                }
            }
            (Method::Post, "/api/item/buy") => {
                let item = field(request, "item_code").and_then(Value::as_str).unwrap_or("").to_string();
                let price = field(request, "price_gems").and_then(Value::as_u64).unwrap_or(0) as u32;
                if world.items.contains(&item) {
                    ok(world.state_json())
                } else if world.gems < price {
                    denied(400, json!("gems_required"))
                } else {
                    world.gems -= price;
                    world.items.push(item);
                    ok(world.state_json())
                }
            }
            (Method::Post, "/api/dev/grant") if host => denied(403, json!("dev_disabled")),
            (Method::Post, "/api/dev/grant") => {
                world.energy += field(request, "energy").and_then(Value::as_u64).unwrap_or(0) as u32;
                world.gems += field(request, "gems").and_then(Value::as_u64).unwrap_or(0) as u32;
                if field(request, "premium").and_then(Value::as_bool) == Some(true) {
                    world.premium = true;
                }
                ok(json!({"ok": true}))
            }
            (Method::Post, "/api/age/confirm") => {
                world.age_confirmed = field(request, "agree").and_then(Value::as_bool) == Some(true);
                ok(json!({"ok": true}))
            }
            (Method::Post, "/api/restart") => {
                world.current_scene = ENTRY_SCENE.to_string();
                world.heat = 0;
                ok(world.state_json())
            }
            (Method::Post, "/api/purchase/mock") => {
                world.gems += field(request, "gems").and_then(Value::as_u64).unwrap_or(0) as u32;
                if field(request, "premium_days").and_then(Value::as_u64).unwrap_or(0) > 0 {
                    world.premium = true;
                }
                ok(json!({"ok": true}))
            }
            _ => denied(404, json!("Not Found")),
        };
        Ok(resp)
    }
}

pub fn debug_session(backend: &FakeBackend) -> Session<FakeBackend> {
    session_with(backend, Identity::debug("12345", true))
}

pub fn session_with(backend: &FakeBackend, identity: Identity) -> Session<FakeBackend> {
    Session::new(
        ApiClient::new(backend.clone(), identity),
        SessionOptions::default(),
    )
}
