use love_paths::config::ClientConfig;
use love_paths::engine::api::{DebugGrant, PurchaseKind};
use love_paths::engine::identity::AuthKind;
use love_paths::model::game_state::GameState;

use super::app::MyApp;

pub fn draw_right_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(340.0)
        .min_width(260.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Menu");
                if ui.button("Back to story").clicked() {
                    app.ui.show_menu = false;
                }
            });
            ui.separator();

            let state = app.session.state().cloned();
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_profile(ui, state.as_ref());
                ui.separator();
                draw_inventory(ui, app, state.as_ref());
                ui.separator();
                draw_purchases(ui, app);
                ui.separator();
                draw_settings(ui, app);
            });
        });
}

/* =========================
   Profile
   ========================= */

fn draw_profile(ui: &mut egui::Ui, state: Option<&GameState>) {
    ui.label(egui::RichText::new("Profile").strong());

    let wallet = state.map(|s| s.wallet);
    ui.label(format!("⚡ Energy: {}", wallet.map_or(0, |w| w.energy)));
    ui.label(format!("💎 Gems: {}", wallet.map_or(0, |w| w.gems)));
    ui.label(format!(
        "⭐ Status: {}",
        if wallet.is_some_and(|w| w.is_premium) { "Premium" } else { "Free" }
    ));

    if let Some(minutes) = state.and_then(GameState::next_energy_minutes) {
        ui.label(egui::RichText::new(format!("⏱ +1⚡ in ~{minutes} min")).weak());
    }
}

/* =========================
   Inventory / shop
   ========================= */

fn draw_inventory(ui: &mut egui::Ui, app: &mut MyApp, state: Option<&GameState>) {
    ui.label(egui::RichText::new("Inventory").strong());

    let Some(state) = state else {
        ui.label("None");
        return;
    };
    if state.shop.is_empty() {
        ui.label("None");
    }

    for entry in &state.shop {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&entry.code).strong());
                    let status = if entry.owned {
                        "Owned".to_string()
                    } else {
                        format!("Price: {}💎", entry.price_gems)
                    };
                    ui.label(egui::RichText::new(status).weak());
                });

                if !entry.owned
                    && ui
                        .add_enabled(!app.busy(), egui::Button::new("Buy"))
                        .clicked()
                {
                    app.buy_item(&entry.code, Some(entry.price_gems));
                }
            });
        });
    }
}

/* =========================
   Purchases
   ========================= */

fn draw_purchases(ui: &mut egui::Ui, app: &mut MyApp) {
    ui.label(egui::RichText::new("Purchases").strong());
    let enabled = !app.busy();

    ui.horizontal_wrapped(|ui| {
        if ui.add_enabled(enabled, egui::Button::new("Buy 100💎")).clicked() {
            app.purchase(PurchaseKind::Gems(100));
        }

        // Energy is only sold through the debug grant for now
        if app.session.auth() == AuthKind::Debug
            && ui.add_enabled(enabled, egui::Button::new("Buy 10⚡")).clicked()
        {
            app.grant(DebugGrant {
                energy: Some(10),
                ..Default::default()
            });
        }

        if ui
            .add_enabled(enabled, egui::Button::new("Buy Premium 30d"))
            .clicked()
        {
            app.purchase(PurchaseKind::PremiumDays(30));
        }
    });

    ui.label(egui::RichText::new("Purchases are mocked.").small().weak());
}

/* =========================
   Settings
   ========================= */

/// Language combo box. Returns true when the selection changed.
pub fn language_picker(ui: &mut egui::Ui, config: &mut ClientConfig) -> bool {
    let before = config.lang.clone();
    let languages = config.languages.clone();

    egui::ComboBox::from_label("Language")
        .selected_text(config.lang.clone())
        .show_ui(ui, |ui| {
            for lang in &languages {
                ui.selectable_value(&mut config.lang, lang.clone(), lang.as_str());
            }
        });

    config.lang != before
}

fn draw_settings(ui: &mut egui::Ui, app: &mut MyApp) {
    ui.label(egui::RichText::new("Settings").strong());

    if language_picker(ui, &mut app.ui.config) {
        app.save_config();
    }

    ui.horizontal(|ui| {
        let enabled = !app.busy();
        if ui.add_enabled(enabled, egui::Button::new("Apply")).clicked() {
            app.load();
            app.ui.show_menu = false;
        }
        if ui.add_enabled(enabled, egui::Button::new("Restart story")).clicked() {
            app.restart();
            app.ui.show_menu = false;
        }
    });

    ui.label("UI Scale");
    if ui
        .add(egui::Slider::new(&mut app.ui.config.ui_scale, 0.75..=2.0))
        .drag_stopped()
    {
        app.save_config();
    }
}
