use eframe::App as EApp;
use egui::{Color32, Context, RichText};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use super::state::{Dashboard, GenerationRequest, Notice, Phase, RefreshRequest};
use crate::generation::GenerationClient;
use crate::items::ItemFetcher;
use crate::share::BrowserSharer;
use crate::types::Mode;

const BODY_PREVIEW_CHARS: usize = 280;

/// Dashboard plus the view-only state around it.
pub struct App {
    pub dashboard: Dashboard,
    pub search: String,
    /// Keys with a generation in flight.
    pub generating: HashSet<String>,
    pub notices: Vec<Notice>,
    sharer: BrowserSharer,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            search: String::new(),
            generating: HashSet::new(),
            notices: Vec::new(),
            sharer: BrowserSharer,
        }
    }
}

/// Thread-safe wrapper around App for use with eframe
pub struct AppWrapper {
    pub app: Arc<Mutex<App>>,
}

impl EApp for AppWrapper {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut app = lock_app(&self.app);
        draw_ui(&mut app, ctx, Arc::clone(&self.app));
    }
}

/// Lock the shared app, recovering it if a panicking task poisoned the mutex.
///
/// Every mutation of `App` leaves it consistent between statements, so the
/// inner value is still usable after a panic elsewhere.
fn lock_app(app_arc: &Mutex<App>) -> MutexGuard<'_, App> {
    app_arc.lock().unwrap_or_else(|poisoned| {
        warn!("App lock was poisoned; recovering");
        poisoned.into_inner()
    })
}

enum UiAction {
    AddRepository(String),
    RemoveRepository,
    SetMode(Mode),
    Generate(String),
    Publish(String),
    DismissNotices,
}

/// Draw the main application UI
pub fn draw_ui(app: &mut App, ctx: &Context, app_arc: Arc<Mutex<App>>) {
    app.notices.extend(app.dashboard.take_notices());
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
        ui.heading("MarkAI");
    });

    egui::SidePanel::left("side_panel").show(ctx, |ui| {
        ui.heading("Repository");
        ui.separator();

        let mut pulls = app.dashboard.mode() == Mode::PullRequests;
        ui.horizontal(|ui| {
            ui.label("Commits");
            if ui.checkbox(&mut pulls, "Pulls").changed() {
                let mode = if pulls { Mode::PullRequests } else { Mode::Commits };
                actions.push(UiAction::SetMode(mode));
            }
        });

        ui.add(
            egui::TextEdit::singleline(&mut app.search)
                .hint_text("USERNAME/REPOSITORY or local clone path"),
        );
        if ui.button("Add repository").clicked() {
            actions.push(UiAction::AddRepository(app.search.clone()));
        }

        if let Some(repository) = app.dashboard.repository() {
            ui.separator();
            ui.horizontal(|ui| {
                ui.label(RichText::new(repository.as_str()).strong());
                if ui.button("Remove").clicked() {
                    actions.push(UiAction::RemoveRepository);
                }
            });
        }

        if !app.notices.is_empty() {
            ui.separator();
            for notice in &app.notices {
                ui.colored_label(
                    Color32::YELLOW,
                    format!("[{}] {}", notice.raised_at.format("%H:%M:%S"), notice.message),
                );
            }
            if ui.button("Dismiss").clicked() {
                actions.push(UiAction::DismissNotices);
            }
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Recent items");
        if app.dashboard.phase() == Phase::Loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }
        ui.separator();

        let items = app.dashboard.display_items();
        if items.is_empty() {
            ui.label("No items found. Please add a repository.");
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for display in &items {
                ui.group(|ui| {
                    ui.label(RichText::new(display.item.title.as_str()).strong());
                    ui.label(RichText::new(preview(&display.item.body)).weak());

                    match &display.current_text {
                        None => {
                            let busy = app.generating.contains(&display.item.key);
                            ui.horizontal(|ui| {
                                let button = egui::Button::new("Generate tweet");
                                if ui.add_enabled(!busy, button).clicked() {
                                    actions.push(UiAction::Generate(display.item.key.clone()));
                                }
                                if busy {
                                    ui.spinner();
                                }
                            });
                        }
                        Some(text) => {
                            ui.label(text.as_str());
                            if ui.button("Tweet").clicked() {
                                actions.push(UiAction::Publish(display.item.key.clone()));
                            }
                        }
                    }
                });
            }
        });
    });

    for action in actions {
        handle_action(app, action, ctx, &app_arc);
    }
}

fn handle_action(app: &mut App, action: UiAction, ctx: &Context, app_arc: &Arc<Mutex<App>>) {
    match action {
        UiAction::AddRepository(input) => match app.dashboard.select_repository_input(&input) {
            Ok(request) => {
                spawn_refresh(Arc::clone(app_arc), app.dashboard.fetcher(), request, ctx.clone())
            }
            Err(e) => app.notices.push(Notice::new(e.to_string())),
        },
        UiAction::RemoveRepository => app.dashboard.remove_repository(),
        UiAction::SetMode(mode) => {
            if let Some(request) = app.dashboard.set_mode(mode) {
                spawn_refresh(Arc::clone(app_arc), app.dashboard.fetcher(), request, ctx.clone());
            }
        }
        UiAction::Generate(key) => match app.dashboard.begin_generation(&key) {
            Ok(request) => {
                app.generating.insert(key);
                spawn_generation(
                    Arc::clone(app_arc),
                    app.dashboard.generator(),
                    request,
                    ctx.clone(),
                );
            }
            Err(e) => warn!(error = %e, "Cannot generate tweet"),
        },
        UiAction::Publish(key) => {
            if let Err(e) = app.dashboard.publish(&key, &app.sharer) {
                app.notices.push(Notice::new(e.to_string()));
            }
        }
        UiAction::DismissNotices => app.notices.clear(),
    }
}

/// Run a fetch on the runtime and apply it once it resolves.
pub fn spawn_refresh(
    app_arc: Arc<Mutex<App>>,
    fetcher: ItemFetcher,
    request: RefreshRequest,
    ctx: Context,
) {
    tokio::spawn(async move {
        let outcome = fetcher.fetch_selection(&request.selection).await;
        lock_app(&app_arc).dashboard.apply_fetch(&request, outcome);
        ctx.request_repaint();
    });
}

fn spawn_generation(
    app_arc: Arc<Mutex<App>>,
    generator: GenerationClient,
    request: GenerationRequest,
    ctx: Context,
) {
    tokio::spawn(async move {
        let text = generator.generate(&request.item).await;
        record_generation(&app_arc, request, text);
        ctx.request_repaint();
    });
}

fn record_generation(app_arc: &Mutex<App>, request: GenerationRequest, text: String) {
    let mut app = lock_app(app_arc);
    app.generating.remove(&request.item.key);
    app.dashboard.complete_generation(request, text);
}

fn preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        return body.to_string();
    }
    let mut short: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RelayBackend;
    use crate::items::GitHubSource;
    use crate::storage::SlotStore;
    use crate::types::Item;
    use pretty_assertions::assert_eq;

    fn test_app() -> App {
        let fetcher = ItemFetcher::new(Arc::new(GitHubSource::new("http://127.0.0.1:9").unwrap()));
        let generator = GenerationClient::new(Arc::new(RelayBackend::new("http://127.0.0.1:9")));
        let (dashboard, _) = Dashboard::restore(fetcher, generator, SlotStore::in_memory());
        App::new(dashboard)
    }

    #[test]
    fn test_record_generation_recovers_poisoned_lock() {
        let key = "https://github.com/owner/repo/pull/1".to_string();
        let mut app = test_app();
        app.generating.insert(key.clone());
        let app_arc = Arc::new(Mutex::new(app));

        let poisoner = Arc::clone(&app_arc);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("task panicked while holding the app lock");
        })
        .join();
        assert!(app_arc.is_poisoned());

        let item = Item {
            key: key.clone(),
            title: "Add X".to_string(),
            body: String::new(),
            source_id: "1".to_string(),
            sha: None,
        };
        record_generation(&app_arc, GenerationRequest { item }, "Shipped X".to_string());

        let app = lock_app(&app_arc);
        assert!(app.generating.is_empty());
        assert_eq!(app.dashboard.tweets().resolve(&key), Some("Shipped X"));
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "a".repeat(BODY_PREVIEW_CHARS + 10);
        let short = preview(&body);
        assert_eq!(short.chars().count(), BODY_PREVIEW_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
