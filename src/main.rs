//! MarkAI
//!
//! A GUI application for turning repository activity into marketing tweets.

use anyhow::{anyhow, Context as _};
use eframe::egui;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use markai::app::{spawn_refresh, App, AppWrapper, Dashboard};
use markai::generation::GenerationClient;
use markai::items::ItemFetcher;
use markai::Config;

fn init_tracing() {
    let default_filter = if cfg!(feature = "dev") {
        "markai=debug"
    } else {
        "markai=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    let store = config.slot_store()?;
    let fetcher = ItemFetcher::new(Arc::new(config.item_source()?));
    let generator = GenerationClient::new(config.text_backend());

    // Initialize the Tokio runtime
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (dashboard, startup) = Dashboard::restore(fetcher, generator, store);
        let fetcher = dashboard.fetcher();
        let app = Arc::new(Mutex::new(App::new(dashboard)));

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1200.0, 800.0])
                .with_min_inner_size([800.0, 600.0])
                .with_title("MarkAI"),
            ..Default::default()
        };

        eframe::run_native(
            "MarkAI",
            options,
            Box::new(move |cc| {
                if let Some(request) = startup {
                    spawn_refresh(Arc::clone(&app), fetcher, request, cc.egui_ctx.clone());
                }
                Ok(Box::new(AppWrapper { app }) as Box<dyn eframe::App>)
            }),
        )
        .map_err(|e| anyhow!("Error running application: {e}"))
    })
}
