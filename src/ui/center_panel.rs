use love_paths::engine::session::ChoiceAvailability;
use love_paths::model::game_state::{Choice, GameState};

use super::app::MyApp;
use super::right_panel::language_picker;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| match app.session.state().cloned() {
            Some(state) => draw_scene(ui, app, &state),
            None => draw_welcome(ui, app),
        });
    });
}

/* =========================
   Welcome / age gate
   ========================= */

fn draw_welcome(ui: &mut egui::Ui, app: &mut MyApp) {
    ui.heading("Welcome!");
    ui.add_space(8.0);

    if language_picker(ui, &mut app.ui.config) {
        app.save_config();
    }

    ui.add_space(8.0);
    ui.checkbox(&mut app.ui.age_agree, "I am 18 years of age or older");
    ui.add_space(8.0);

    let can_start = !app.busy() && app.ui.age_agree;
    if ui.add_enabled(can_start, egui::Button::new("Start")).clicked() {
        app.confirm_age();
    }

    if app.busy() {
        ui.spinner();
    }
}

/* =========================
   Scene
   ========================= */

fn draw_scene(ui: &mut egui::Ui, app: &mut MyApp, state: &GameState) {
    let scene = &state.scene;

    let mut header = format!("Scene: {}", scene.code);
    if scene.is_premium {
        header.push_str(" (Premium)");
    }
    header.push_str(&format!(" • ⚡ {}", scene.energy_cost));
    ui.label(egui::RichText::new(header).weak());

    if let Some(url) = &scene.image_url {
        if let Some(texture) = app.images.texture(url) {
            ui.add(
                egui::Image::new((texture.id(), texture.size_vec2()))
                    .max_width(ui.available_width()),
            );
        }
    }

    ui.add_space(8.0);
    ui.label(scene.text.as_str());
    ui.add_space(12.0);

    for choice in &state.choices {
        draw_choice(ui, app, choice);
        ui.add_space(4.0);
    }

    ui.add_space(12.0);
    ui.separator();

    ui.horizontal_wrapped(|ui| {
        ui.label(format!("⚡ Energy: {}", state.wallet.energy));
        ui.label(format!("💎 Gems: {}", state.wallet.gems));
        ui.label(format!(
            "⭐ Premium: {}",
            if state.wallet.is_premium { "yes" } else { "no" }
        ));
        if ui
            .add_enabled(!app.busy(), egui::Button::new("Back to menu"))
            .clicked()
        {
            app.ui.show_menu = true;
        }
    });
}

fn choice_label(choice: &Choice) -> String {
    let mut label = choice.label.clone();
    if choice.gem_cost > 0 {
        label.push_str(&format!(" • {}💎", choice.gem_cost));
    }
    if choice.is_premium {
        label.push_str(" • Premium");
    }
    if choice.heat_points != 0 {
        label.push_str(&format!(" • +heat {}", choice.heat_points));
    }
    if let Some(item) = &choice.requires_item {
        label.push_str(&format!(" • item: {item}"));
    }
    label
}

fn draw_choice(ui: &mut egui::Ui, app: &mut MyApp, choice: &Choice) {
    let availability = app.session.availability(choice);
    let busy = app.busy();

    ui.horizontal(|ui| {
        let selectable = availability == ChoiceAvailability::Selectable;
        let button = egui::Button::new(choice_label(choice));
        if ui.add_enabled(!busy && selectable, button).clicked() {
            app.choose(&choice.code);
        }

        if let ChoiceAvailability::NeedsItem { item_code, price_gems } = &availability {
            let buy = egui::Button::new(format!("Buy item ({price_gems} 💎)"));
            if ui.add_enabled(!busy, buy).clicked() {
                app.buy_item(item_code, Some(*price_gems));
            }
        }
    });
}
