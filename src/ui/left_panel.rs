use std::time::Instant;

use egui::Color32;

use love_paths::engine::api::DebugGrant;
use love_paths::engine::identity::AuthKind;

use super::app::MyApp;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Love Paths");
            ui.separator();

            if let Some(wallet) = app.session.state().map(|s| s.wallet) {
                ui.label(format!("⚡ {}", wallet.energy));
                ui.label(format!("💎 {}", wallet.gems));
                ui.label(format!(
                    "⭐ {}",
                    if wallet.is_premium { "Premium" } else { "Free" }
                ));
            }

            if ui
                .add_enabled(!app.busy(), egui::Button::new("Menu"))
                .clicked()
            {
                app.ui.show_menu = !app.ui.show_menu;
            }

            if app.session.auth() == AuthKind::Debug {
                ui.separator();
                draw_debug(ui, app);
            }
        });
}

/* =========================
   Debug identity
   ========================= */

fn draw_debug(ui: &mut egui::Ui, app: &mut MyApp) {
    ui.label(egui::RichText::new("DEBUG").weak());

    ui.label("Player id");
    let response = ui.add(egui::TextEdit::singleline(&mut app.ui.debug_user_id).desired_width(120.0));
    if response.changed() {
        app.session.set_debug_user_id(&app.ui.debug_user_id);
    }
    if response.lost_focus() {
        app.commit_debug_user_id();
    }

    if ui
        .add_enabled(!app.busy(), egui::Button::new("DEV: +energy/+gems"))
        .clicked()
    {
        app.grant(DebugGrant::standard());
    }

    if let Some(ack) = app.session.acknowledgement(Instant::now()) {
        ui.colored_label(Color32::GREEN, ack.text.as_str());
    }
}
