// app.rs
use egui::{Context, CentralPanel, SidePanel, TopBottomPanel, ScrollArea, RichText};
use linkpuppet::{config, database, json_loader, DragOutcome, Model, PoseCollection, PoseState, Session, Sources, Tier};
use crate::canvas3d::{draw_3d_canvas, Camera3D, Grab};

/// Precomputed collection (JSON) to use instead of the bundled one.
const POSES_ENV: &str = "LINKPUPPET_POSES";
/// Pose database text, tried when the precomputed collection is missing or unusable.
const DATABASE_ENV: &str = "LINKPUPPET_DB";

fn read_env_file(var: &str) -> Option<String> {
    let path = std::env::var(var).ok()?;
    std::fs::read_to_string(&path).map_err(|e| tracing::warn!(%path, "cannot read {var}: {e}")).ok()
}

pub struct LinkPuppetApp {
    pub collection:     PoseCollection,
    pub tier:           Tier,
    pub session:        Session,
    pub camera_3d:      Camera3D,
    pub dragging_joint: Option<Grab>,
    pub search:         String,
    pub status_message: String,
    pub status_timer:   f32,
}

impl Default for LinkPuppetApp {
    fn default() -> Self {
        let cfg = config::get();
        let precomputed = read_env_file(POSES_ENV);
        let db = read_env_file(DATABASE_ENV);
        let bundled = json_loader::text("poses.json").map_err(|e| tracing::warn!("{e}")).ok();
        let sources = Sources {
            precomputed: precomputed.as_deref().or(bundled),
            database: db.as_deref(),
        };
        let (collection, tier) = database::load_collection(sources, cfg);

        // Prefer the full skeleton; every loaded pose has chains, and a collection is never empty
        let session = Session::new(&collection, 0, Model::Skeleton, cfg.min_separation)
            .or_else(|_| Session::new(&collection, 0, Model::Chain, cfg.min_separation))
            .expect("FATAL: pose collection is empty");
        Self {
            collection, tier, session,
            camera_3d: Camera3D::default(),
            dragging_joint: None,
            search: String::new(),
            status_message: String::new(),
            status_timer: 0.0,
        }
    }
}

impl LinkPuppetApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        Self::default()
    }
    pub fn set_status(&mut self, msg: &str, dur: f32) {
        self.status_message = msg.to_string(); self.status_timer = dur;
    }
    fn load(&mut self, index: usize) {
        match self.session.load_pose(&self.collection, index) {
            Ok(pose) => { let msg = format!("Loaded \"{}\"", pose.name); self.set_status(&msg, 2.0); }
            Err(e) => self.set_status(&format!("Cannot load pose: {e}"), 4.0),
        }
    }
    fn switch_model(&mut self, model: Model) {
        if let Err(e) = self.session.set_model(&self.collection, model) {
            self.set_status(&format!("Cannot switch: {e}"), 4.0);
        }
    }
}

// ── Panels ────────────────────────────────────────────────────────────────────

fn tier_label(t: Tier) -> &'static str {
    match t { Tier::Precomputed => "precomputed", Tier::Database => "database", Tier::Builtin => "built-in" }
}

fn readout(app: &mut LinkPuppetApp, ui: &mut egui::Ui) {
    let fv = app.session.live_features();
    ui.heading("Linking");
    ui.label(RichText::new(format!("{:+.1}", fv.linking)).size(28.0).strong());
    ui.label(format!("Centroid separation: {:.2}", fv.separation));
    ui.label(format!("Closest joints: {:.2}", app.session.separation()));
    ui.add_space(6.0);

    let Some(hit) = app.session.nearest_pose(&app.collection) else { return };
    let Some(name) = app.collection.get(hit.index).map(|p| p.name.clone()) else { return };
    ui.horizontal(|ui| {
        ui.label(format!("Nearest: {name} ({:.2})", hit.distance));
        if ui.button("Apply").clicked() { app.load(hit.index); }
    });
}

fn pose_list(app: &mut LinkPuppetApp, ui: &mut egui::Ui) {
    ui.heading(format!("Poses ({})", tier_label(app.tier)));
    ui.add(egui::TextEdit::singleline(&mut app.search).desired_width(f32::INFINITY).hint_text("Search poses"));
    ui.add_space(4.0);
    let current = match app.session.state() { PoseState::Loaded(i) => Some(i), PoseState::Edited => None };
    let mut clicked = None;
    ScrollArea::vertical().show(ui, |ui| {
        for i in app.collection.search(&app.search) {
            let Some(pose) = app.collection.get(i) else { continue };
            if ui.selectable_label(current == Some(i), &pose.name).clicked() { clicked = Some(i); }
        }
    });
    if let Some(i) = clicked { app.load(i); }
}

// ── Main loop ─────────────────────────────────────────────────────────────────

impl eframe::App for LinkPuppetApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("LinkPuppet").strong());
                ui.add_space(12.0);
                let mut model = self.session.model();
                ui.radio_value(&mut model, Model::Skeleton, "Skeleton");
                ui.radio_value(&mut model, Model::Chain, "Chain");
                if model != self.session.model() { self.switch_model(model); }
                ui.add_space(12.0);
                if ui.button("Reset Pose").clicked() { let m = self.session.model(); self.switch_model(m); }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    ui.label(&self.status_message);
                });
            });
            ui.add_space(4.0);
        });

        SidePanel::left("controls").min_width(260.0).max_width(400.0).show(ctx, |ui| {
            readout(self, ui);
            ui.separator();
            pose_list(self, ui);
        });

        CentralPanel::default().show(ctx, |ui| {
            let sz = ui.available_size();
            let (_, outcome) = draw_3d_canvas(ui, &mut self.session, &mut self.camera_3d, sz, &mut self.dragging_joint);
            if outcome == Some(DragOutcome::Reverted) {
                self.set_status("Figures overlapped; move undone", 2.5);
            }
        });

        if self.status_timer > 0.0 {
            self.status_timer -= ctx.input(|i| i.stable_dt);
            if self.status_timer <= 0.0 { self.status_message.clear(); }
            ctx.request_repaint();
        }
    }
}
