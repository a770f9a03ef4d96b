mod editor_ui;
mod shell;

use crate::assets::AssetKind;
use crate::clipboard::SystemClipboard;
use crate::config::{AppConfig, AppConfigOverrides};
use crate::editor::EditorHost;
use crate::host::{ObjectInspector, ObjectRef};
use crate::panel::{self, HistoryPanel, PanelAction};
use crate::prefs::JsonPreferences;
use crate::renderer::WindowSurface;
use crate::theme::PanelTheme;

use anyhow::{Context, Result};
use std::path::Path;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};

use egui::Context as EguiCtx;
use egui_wgpu::{Renderer as EguiRenderer, RendererOptions, ScreenDescriptor};
use egui_winit::State as EguiWinit;

use self::editor_ui::{EditorUiOutput, UiActions};

pub fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default(), "config/app.json")
}

pub fn run_with_overrides(overrides: AppConfigOverrides, config_path: impl AsRef<Path>) -> Result<()> {
    let mut config = AppConfig::load_or_default(config_path);
    if !overrides.is_empty() {
        log::info!(target: "config", "CLI overrides applied: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

pub struct App {
    config: AppConfig,
    surface: WindowSurface,
    pub(crate) host: EditorHost,
    prefs: JsonPreferences,
    clipboard: SystemClipboard,
    history_panel: Option<HistoryPanel>,
    should_close: bool,

    // egui
    egui_ctx: EguiCtx,
    egui_winit: Option<EguiWinit>,
    egui_renderer: Option<EguiRenderer>,
    egui_screen: Option<ScreenDescriptor>,

    // UI State
    new_entity_name: String,
    reveal: Option<ObjectRef>,
    status: Option<String>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let mut host = EditorHost::new(config.project.assets_root.clone());
        match host.assets.scan() {
            Ok(count) => log::info!(target: "assets", "indexed {count} assets under {}", host.assets.root().display()),
            Err(err) => log::warn!(target: "assets", "asset scan failed: {err:?}"),
        }
        if config.project.watch_assets {
            if let Err(err) = host.watch_assets() {
                log::warn!(target: "assets", "asset watcher unavailable: {err:?}");
            }
        }
        if host.scene.entity_count() == 0 {
            seed_demo_scene(&mut host);
        }
        let prefs = JsonPreferences::load_or_default(&config.history.prefs_path);
        let mut app = Self {
            surface: WindowSurface::new(&config.window),
            host,
            prefs,
            clipboard: SystemClipboard::new(),
            history_panel: None,
            should_close: false,
            egui_ctx: EguiCtx::default(),
            egui_winit: None,
            egui_renderer: None,
            egui_screen: None,
            new_entity_name: String::new(),
            reveal: None,
            status: None,
            config,
        };
        if app.config.history.open_on_start {
            app.open_history_panel();
        }
        app
    }

    /// Opens the panel with an empty history. No-op when it is already open.
    pub fn open_history_panel(&mut self) {
        if self.history_panel.is_some() {
            return;
        }
        let theme = PanelTheme::load_or_default(&self.config.history.theme_path);
        self.history_panel = Some(HistoryPanel::open(&self.host.selection, &self.prefs, theme));
    }

    /// Closing drops the history and its selection subscription.
    pub fn close_history_panel(&mut self) {
        self.history_panel = None;
    }

    fn apply_ui_actions(&mut self, actions: UiActions) {
        if let Some(open) = actions.history_open {
            if open {
                self.open_history_panel();
            } else {
                self.close_history_panel();
            }
        }
        if let Some(enabled) = actions.vsync_request {
            if let Err(err) = self.surface.set_vsync(enabled) {
                log::error!(target: "renderer", "Failed to toggle VSync: {err:?}");
            }
        }
        if let Some(name) = actions.spawn_root {
            let entity = self.host.scene.spawn_named(entity_name_or_default(&name, self.host.scene.entity_count()));
            self.host.select(Some(ObjectRef::Entity(entity)));
        }
        if let Some((parent, name)) = actions.spawn_child {
            let name = entity_name_or_default(&name, self.host.scene.entity_count());
            match self.host.scene.spawn_child(parent, name) {
                Some(entity) => {
                    self.host.select(Some(ObjectRef::Entity(entity)));
                }
                None => self.status = Some("Parent no longer exists".to_string()),
            }
        }
        if let Some((entity, name)) = actions.rename_entity {
            if self.host.scene.rename(entity, name) {
                self.status = Some("Entity renamed".to_string());
            }
        }
        if let Some(entity) = actions.delete_entity {
            if self.host.despawn_entity(entity) {
                self.status = Some("Entity deleted".to_string());
            }
        }
        if actions.rescan_assets {
            match self.host.assets.scan() {
                Ok(added) => self.status = Some(format!("Rescan found {added} new assets")),
                Err(err) => {
                    log::warn!(target: "assets", "asset scan failed: {err:?}");
                    self.status = Some(format!("Rescan failed: {err}"));
                }
            }
        }
        if actions.create_transient {
            let count = self.host.assets.len();
            let guid = self.host.assets.create_transient(format!("Material {count}"), AssetKind::Material);
            self.host.select(Some(ObjectRef::Asset(guid)));
        }
        if let Some(object) = actions.forget_asset {
            if self.host.delete_asset(object) {
                self.status = Some("Asset removed from the catalogue".to_string());
            }
        }
        if let Some(selection) = actions.select {
            self.host.select(selection);
        }
        for action in actions.history {
            self.apply_history_action(action);
        }
    }

    fn apply_history_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::Select(object) => {
                if self.host.is_alive(object) {
                    self.host.select(Some(object));
                    self.reveal = Some(object);
                }
            }
            PanelAction::Open(object) | PanelAction::ShowInFileSystem(object) => {
                let Some(path) = object.asset().and_then(|guid| self.host.assets.absolute_path(guid)) else {
                    self.status = Some("Asset has no file on disk".to_string());
                    return;
                };
                let result = if matches!(action, PanelAction::Open(_)) {
                    shell::open_path(&path)
                } else {
                    shell::reveal_path(&path)
                };
                if let Err(err) = result {
                    log::warn!(target: "history", "{err:?}");
                    self.status = Some(err.to_string());
                }
            }
            PanelAction::CopyGuid(_) | PanelAction::CopyName(_) | PanelAction::CopyPath(_) => {
                if panel::apply_copy(action, &self.host, &mut self.clipboard) {
                    self.status = Some("Copied to clipboard".to_string());
                }
            }
            // applied by the panel before the actions reach the host
            PanelAction::Remove(_) => {}
        }
    }

    fn render_frame(&mut self) {
        if self.egui_winit.is_none() {
            return;
        }
        let raw_input = {
            let (Some(window), Some(state)) = (self.surface.window(), self.egui_winit.as_mut()) else {
                return;
            };
            state.take_egui_input(window)
        };
        let pixels_per_point = self.surface.pixels_per_point();
        self.egui_ctx.set_pixels_per_point(pixels_per_point);
        if let Some(screen) = self.egui_screen.as_mut() {
            screen.pixels_per_point = pixels_per_point;
        }

        let EditorUiOutput { full_output, actions } = self.render_editor_ui(raw_input);
        self.apply_ui_actions(actions);

        let egui::FullOutput { platform_output, textures_delta, shapes, .. } = full_output;
        let (Some(window), Some(state)) = (self.surface.window(), self.egui_winit.as_mut()) else {
            return;
        };
        state.handle_platform_output(window, platform_output);

        let (Some(ren), Some(screen)) = (self.egui_renderer.as_mut(), self.egui_screen.as_ref()) else {
            return;
        };
        if let (Ok(device), Ok(queue)) = (self.surface.device(), self.surface.queue()) {
            for (id, delta) in &textures_delta.set {
                ren.update_texture(device, queue, *id, delta);
            }
        }
        let meshes = self.egui_ctx.tessellate(shapes, screen.pixels_per_point);
        if let Err(err) = self.surface.render_egui(ren, &meshes, screen) {
            log::error!(target: "renderer", "Egui render error: {err:?}");
        }
        for id in &textures_delta.free {
            ren.free_texture(id);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.surface.ensure_window(event_loop) {
            log::error!(target: "renderer", "Renderer initialization error: {err:?}");
            self.should_close = true;
            return;
        }

        if self.egui_winit.is_none() {
            if let Some(window) = self.surface.window() {
                let state = EguiWinit::new(
                    self.egui_ctx.clone(),
                    egui::ViewportId::ROOT,
                    window,
                    Some(self.surface.pixels_per_point()),
                    window.theme(),
                    None,
                );
                self.egui_winit = Some(state);
            }
        }

        let egui_renderer = match (self.surface.device(), self.surface.surface_format()) {
            (Ok(device), Ok(format)) => EguiRenderer::new(device, format, RendererOptions::default()),
            (Err(err), _) | (_, Err(err)) => {
                log::error!(target: "renderer", "Unable to initialize egui renderer: {err:?}");
                self.should_close = true;
                return;
            }
        };
        self.egui_renderer = Some(egui_renderer);
        let size = self.surface.size();
        self.egui_screen = Some(ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.surface.pixels_per_point(),
        });
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, id: winit::window::WindowId, event: WindowEvent) {
        let mut consumed = false;
        if let (Some(window), Some(state)) = (self.surface.window(), self.egui_winit.as_mut()) {
            if id == window.id() {
                consumed = state.on_window_event(window, &event).consumed;
            }
        }

        match &event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => {
                self.surface.resize(*size);
                if let Some(sd) = &mut self.egui_screen {
                    sd.size_in_pixels = [size.width, size.height];
                    sd.pixels_per_point = self.surface.pixels_per_point();
                }
            }
            WindowEvent::KeyboardInput { event: KeyEvent { logical_key, state, .. }, .. } if !consumed => {
                if let Key::Named(NamedKey::Escape) = logical_key {
                    if *state == ElementState::Pressed {
                        self.should_close = true;
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_close {
            event_loop.exit();
            return;
        }
        if self.host.poll_asset_changes() {
            log::debug!(target: "assets", "asset catalogue updated ({} records)", self.host.assets.len());
        }
        self.render_frame();
    }
}

fn entity_name_or_default(name: &str, count: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Entity {count}")
    } else {
        trimmed.to_string()
    }
}

fn seed_demo_scene(host: &mut EditorHost) {
    let scene = &mut host.scene;
    scene.spawn_named("Main Camera");
    let player = scene.spawn_named("Player");
    scene.spawn_child(player, "Weapon");
    scene.spawn_child(player, "Shadow");
    let environment = scene.spawn_named("Environment");
    scene.spawn_child(environment, "Ground");
    scene.spawn_child(environment, "Sun");
}
