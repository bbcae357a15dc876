use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::warn;

use love_paths::config::{ClientConfig, INIT_DATA_ENV};
use love_paths::engine::api::{ApiClient, DebugGrant, PurchaseKind};
use love_paths::engine::engine::SessionHandle;
use love_paths::engine::identity::{HostBridge, HostError, Identity};
use love_paths::engine::protocol::EngineCommand;
use love_paths::engine::session::Session;
use love_paths::engine::transport::HttpTransport;
use love_paths::model::denial::DenialReason;
use love_paths::model::message::Notice;

use super::center_panel::draw_center_panel;
use super::left_panel::draw_left_panel;
use super::right_panel::draw_right_panel;
use super::scene_image::SceneImages;

/* =========================
   Host bridge
   ========================= */

/// Desktop stand-in for the embedding host: the token comes from the
/// environment, and "expand" maximises the native window.
struct DesktopHost {
    ctx: egui::Context,
}

impl HostBridge for DesktopHost {
    fn init_data(&self) -> Result<Option<String>, HostError> {
        match std::env::var(INIT_DATA_ENV) {
            Ok(data) => Ok(Some(data)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(HostError(e.to_string())),
        }
    }

    fn expand_viewport(&self) -> Result<bool, HostError> {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Maximized(true));
        Ok(true)
    }
}

/* =========================
   UI State
   ========================= */

pub struct UiState {
    pub config: ClientConfig,
    pub config_path: PathBuf,

    pub age_agree: bool,
    pub show_menu: bool,

    /// Edit buffer for the debug identity field
    pub debug_user_id: String,

    pub alert: Option<String>,
    /// Item offered for purchase after a server-side item denial
    pub offered_item: Option<(String, Option<u32>)>,
}

/* =========================
   App
   ========================= */

pub struct MyApp {
    pub ui: UiState,
    pub session: SessionHandle,
    pub images: SceneImages,
}

impl MyApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ClientConfig,
        config_path: PathBuf,
        transport: HttpTransport,
    ) -> Self {
        let host = DesktopHost {
            ctx: cc.egui_ctx.clone(),
        };
        let identity = Identity::resolve(&host, config.debug_user_id.clone(), config.tunnel_bypass);
        let session = Session::new(ApiClient::new(transport, identity), config.session_options());

        Self {
            ui: UiState {
                debug_user_id: config.debug_user_id.clone(),
                config,
                config_path,
                age_agree: false,
                show_menu: false,
                alert: None,
                offered_item: None,
            },
            session: SessionHandle::spawn(session),
            images: SceneImages::new(),
        }
    }

    pub fn busy(&self) -> bool {
        self.session.is_busy()
    }

    fn story(&self) -> String {
        self.ui.config.story_code.clone()
    }

    fn lang(&self) -> String {
        self.ui.config.lang.clone()
    }

    pub fn load(&mut self) {
        let cmd = EngineCommand::Load {
            story_code: self.story(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn choose(&mut self, choice_code: &str) {
        let cmd = EngineCommand::Choose {
            story_code: self.story(),
            choice_code: choice_code.to_string(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn buy_item(&mut self, item_code: &str, price_gems: Option<u32>) {
        let cmd = EngineCommand::BuyItem {
            story_code: self.story(),
            item_code: item_code.to_string(),
            price_gems,
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn grant(&mut self, grant: DebugGrant) {
        let cmd = EngineCommand::GrantDebugResources {
            grant,
            story_code: self.story(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn confirm_age(&mut self) {
        let cmd = EngineCommand::ConfirmAge {
            agree: self.ui.age_agree,
            story_code: self.story(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn restart(&mut self) {
        let cmd = EngineCommand::Restart {
            story_code: self.story(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn purchase(&mut self, kind: PurchaseKind) {
        let cmd = EngineCommand::Purchase {
            kind,
            story_code: self.story(),
            lang: self.lang(),
        };
        self.session.dispatch(cmd);
    }

    pub fn commit_debug_user_id(&mut self) {
        self.session.set_debug_user_id(&self.ui.debug_user_id);
        self.ui.config.debug_user_id = self.ui.debug_user_id.clone();
        self.save_config();
    }

    pub fn save_config(&self) {
        if let Err(e) = self.ui.config.save_to(&self.ui.config_path) {
            warn!("Could not save settings: {:#}", e);
        }
    }

    fn drain_notices(&mut self) {
        while let Some(notice) = self.session.take_notice() {
            match notice {
                Notice::Failed {
                    message, denial, ..
                } => {
                    self.ui.offered_item = match denial {
                        Some(DenialReason::ItemRequired {
                            item_code: Some(item_code),
                            price_gems,
                        }) => Some((item_code, price_gems)),
                        _ => None,
                    };
                    self.ui.alert = Some(message);
                }
                Notice::AgeGateBlocked => {
                    self.ui.alert = Some("Please confirm that you are 18 or older.".into());
                }
                Notice::EngineStopped => {
                    self.ui.offered_item = None;
                    self.ui.alert = Some("The game stopped responding. Please restart the app.".into());
                }
            }
        }
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(text) = self.ui.alert.clone() else {
            return;
        };

        let mut close = false;
        let mut buy: Option<(String, Option<u32>)> = None;

        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(text);
                ui.horizontal(|ui| {
                    if let Some((item, price)) = &self.ui.offered_item {
                        let label = match price {
                            Some(p) => format!("Buy {item} ({p} 💎)"),
                            None => format!("Buy {item}"),
                        };
                        if ui.add_enabled(!self.session.is_busy(), egui::Button::new(label)).clicked() {
                            buy = Some((item.clone(), *price));
                        }
                    }
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });

        if let Some((item, price)) = buy {
            self.buy_item(&item, price);
            close = true;
        }
        if close {
            self.ui.alert = None;
            self.ui.offered_item = None;
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.config.ui_scale);

        self.session.poll();
        self.drain_notices();

        if let Some(url) = self
            .session
            .state()
            .and_then(|s| s.scene.image_url.clone())
        {
            self.images.request(ctx, &self.ui.config.api_base, &url);
        }
        self.images.poll(ctx);

        if self.session.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        if let Some(ack) = self.session.acknowledgement(Instant::now()) {
            ctx.request_repaint_after(ack.remaining(Instant::now()));
        }

        draw_left_panel(ctx, self);
        if self.ui.show_menu {
            draw_right_panel(ctx, self);
        }
        draw_center_panel(ctx, self);
        self.draw_alert(ctx);
    }
}
