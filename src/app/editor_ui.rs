use super::App;
use crate::host::ObjectRef;
use crate::panel::PanelAction;
use bevy_ecs::prelude::Entity;

#[derive(Default)]
pub(super) struct UiActions {
    pub select: Option<Option<ObjectRef>>,
    pub spawn_root: Option<String>,
    pub spawn_child: Option<(Entity, String)>,
    pub rename_entity: Option<(Entity, String)>,
    pub delete_entity: Option<Entity>,
    pub forget_asset: Option<ObjectRef>,
    pub rescan_assets: bool,
    pub create_transient: bool,
    pub history_open: Option<bool>,
    pub vsync_request: Option<bool>,
    pub history: Vec<PanelAction>,
}

pub(super) struct EditorUiOutput {
    pub full_output: egui::FullOutput,
    pub actions: UiActions,
}

struct AssetRow {
    object: ObjectRef,
    glyph: &'static str,
    label: String,
    transient: bool,
}

impl App {
    pub(super) fn render_editor_ui(&mut self, raw_input: egui::RawInput) -> EditorUiOutput {
        let mut actions = UiActions::default();
        let ctx = self.egui_ctx.clone();
        let selected = self.host.selection.current();
        let hierarchy = self.host.scene.hierarchy();
        let asset_rows: Vec<AssetRow> = self
            .host
            .assets
            .records()
            .into_iter()
            .map(|record| AssetRow {
                object: ObjectRef::Asset(record.guid),
                glyph: record.kind.icon().glyph(),
                label: if record.is_transient() {
                    format!("{} (unsaved)", record.name)
                } else {
                    record.path.clone()
                },
                transient: record.is_transient(),
            })
            .collect();
        let assets_root = self.host.assets.root().display().to_string();
        let mut reveal = self.reveal.take();
        let history_open = self.history_panel.is_some();
        let vsync_enabled = self.surface.vsync_enabled();
        let status = self.status.clone();

        let full_output = ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("studio_top_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let mut open = history_open;
                    if ui.checkbox(&mut open, "Selection History").changed() {
                        actions.history_open = Some(open);
                    }
                    let mut vsync = vsync_enabled;
                    if ui.checkbox(&mut vsync, "VSync").changed() {
                        actions.vsync_request = Some(vsync);
                    }
                    ui.separator();
                    match selected {
                        Some(object) => ui.label(format!("Selected: {object}")),
                        None => ui.weak("Nothing selected"),
                    };
                    if let Some(status) = status.as_deref() {
                        ui.separator();
                        ui.label(status);
                    }
                });
            });

            egui::SidePanel::left("studio_hierarchy").default_width(260.0).show(ctx, |ui| {
                ui.heading("Hierarchy");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_entity_name)
                            .hint_text("Entity name")
                            .desired_width(120.0),
                    );
                    if ui.button("+ Root").clicked() {
                        actions.spawn_root = Some(self.new_entity_name.clone());
                    }
                    let selected_entity = selected.and_then(ObjectRef::entity);
                    if ui.add_enabled(selected_entity.is_some(), egui::Button::new("+ Child")).clicked() {
                        if let Some(parent) = selected_entity {
                            actions.spawn_child = Some((parent, self.new_entity_name.clone()));
                        }
                    }
                    let can_rename = selected_entity.is_some() && !self.new_entity_name.trim().is_empty();
                    if ui.add_enabled(can_rename, egui::Button::new("Rename")).clicked() {
                        if let Some(entity) = selected_entity {
                            actions.rename_entity = Some((entity, self.new_entity_name.trim().to_string()));
                        }
                    }
                    if ui.add_enabled(selected_entity.is_some(), egui::Button::new("Delete")).clicked() {
                        actions.delete_entity = selected_entity;
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().id_salt("hierarchy_scroll").show(ui, |ui| {
                    if hierarchy.is_empty() {
                        ui.weak("Scene is empty.");
                    }
                    for row in &hierarchy {
                        let object = ObjectRef::Entity(row.entity);
                        ui.horizontal(|ui| {
                            ui.add_space(row.depth as f32 * 14.0);
                            let response = ui.selectable_label(selected == Some(object), &row.name);
                            if reveal == Some(object) {
                                response.scroll_to_me(Some(egui::Align::Center));
                                reveal = None;
                            }
                            if response.clicked() {
                                actions.select = Some(Some(object));
                            }
                        });
                    }
                });
            });

            if let Some(panel) = self.history_panel.as_mut() {
                egui::SidePanel::right("studio_selection_history").default_width(340.0).show(ctx, |ui| {
                    ui.heading("Selection History");
                    let output = panel.show(ui, &self.host, &mut self.prefs, selected);
                    actions.history.extend(output);
                });
            }

            egui::CentralPanel::default().show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Project");
                    ui.weak(&assets_root);
                });
                ui.horizontal(|ui| {
                    if ui.button("Rescan").clicked() {
                        actions.rescan_assets = true;
                    }
                    if ui.button("New unsaved material").clicked() {
                        actions.create_transient = true;
                    }
                    let selected_asset = selected.filter(|object| object.asset().is_some());
                    if ui.add_enabled(selected_asset.is_some(), egui::Button::new("Forget asset")).clicked() {
                        actions.forget_asset = selected_asset;
                    }
                    if ui.button("Deselect").clicked() {
                        actions.select = Some(None);
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().id_salt("project_scroll").show(ui, |ui| {
                    if asset_rows.is_empty() {
                        ui.weak("No assets found.");
                    }
                    for row in &asset_rows {
                        let text = format!("{} {}", row.glyph, row.label);
                        let text = if row.transient { egui::RichText::new(text).italics() } else { text.into() };
                        let response = ui.selectable_label(selected == Some(row.object), text);
                        if reveal == Some(row.object) {
                            response.scroll_to_me(Some(egui::Align::Center));
                            reveal = None;
                        }
                        if response.clicked() {
                            actions.select = Some(Some(row.object));
                        }
                    }
                });
            });
        });

        EditorUiOutput { full_output, actions }
    }
}
