use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Result;
use log::{debug, warn};

type Fetched = (String, Result<egui::ColorImage>);

/// Scene illustrations, fetched and decoded off the UI thread and cached by URL.
pub struct SceneImages {
    textures: HashMap<String, egui::TextureHandle>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
    tx: Sender<Fetched>,
    rx: Receiver<Fetched>,
}

impl SceneImages {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            textures: HashMap::new(),
            in_flight: HashSet::new(),
            failed: HashSet::new(),
            tx,
            rx,
        }
    }

    pub fn request(&mut self, ctx: &egui::Context, api_base: &str, url: &str) {
        if self.textures.contains_key(url) || self.in_flight.contains(url) || self.failed.contains(url) {
            return;
        }

        self.in_flight.insert(url.to_string());
        let key = url.to_string();
        let full = resolve_url(api_base, url);
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            debug!("Fetching scene image {}", full);
            let _ = tx.send((key, fetch_image(&full)));
            ctx.request_repaint();
        });
    }

    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((url, result)) = self.rx.try_recv() {
            self.in_flight.remove(&url);
            match result {
                Ok(image) => {
                    let texture = ctx.load_texture(url.clone(), image, egui::TextureOptions::LINEAR);
                    self.textures.insert(url, texture);
                }
                Err(e) => {
                    warn!("Scene image {} unavailable: {:#}", url, e);
                    self.failed.insert(url);
                }
            }
        }
    }

    pub fn texture(&self, url: &str) -> Option<&egui::TextureHandle> {
        self.textures.get(url)
    }
}

/// Absolute URLs pass through; paths are resolved against the API origin.
fn resolve_url(api_base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            api_base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

fn fetch_image(url: &str) -> Result<egui::ColorImage> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let decoded = image::load_from_memory(&bytes)?.to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw()))
}
