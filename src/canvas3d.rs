// canvas3d.rs
use egui::{Pos2, Vec2, Color32, Stroke, Rect, Ui, Response, Sense};
use linkpuppet::{DragOutcome, FigureId, Session, Vec3};

/// Joint currently held by the pointer.
pub type Grab = (FigureId, usize);

#[derive(Clone, Debug)]
pub struct Camera3D { pub focus: Vec3, pub yaw: f32, pub pitch: f32, pub radius: f32, pub scale: f32 }
impl Default for Camera3D {
    fn default() -> Self { Self { focus: Vec3::ZERO, yaw: 0.0, pitch: 0.15, radius: 10.0, scale: 220.0 } }
}

impl Camera3D {
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let ((sy,cy),(sp,cp)) = (self.yaw.sin_cos(), self.pitch.sin_cos());
        (Vec3::new(-cp*sy,-sp,-cp*cy), Vec3::new(cy,0.,-sy), Vec3::new(-sp*sy,cp,-sp*cy))
    }
    fn eye(&self) -> Vec3 {
        let ((sy,cy),(sp,cp)) = (self.yaw.sin_cos(), self.pitch.sin_cos());
        self.focus + Vec3::new(self.radius*cp*sy, self.radius*sp, self.radius*cp*cy)
    }
    /// Orthographic; Y up in the world, down on screen.
    fn project(&self, p: Vec3, r: Rect) -> Option<(Pos2,f32)> {
        let (fwd,right,up) = self.basis();
        let d = p - self.eye();
        let z = d.dot(fwd);
        if z < 0.01 { return None; }
        Some((Pos2::new(r.center().x + d.dot(right)*self.scale, r.center().y - d.dot(up)*self.scale), z))
    }
    /// World point under `pos` at the depth of `at`.
    fn unproject(&self, pos: Pos2, at: Vec3, r: Rect) -> Vec3 {
        let (fwd,right,up) = self.basis();
        let eye = self.eye();
        let depth = (at - eye).dot(fwd).clamp(0.1, 100.0);
        let (sx, sy) = ((pos.x - r.center().x) / self.scale, (r.center().y - pos.y) / self.scale);
        eye + fwd*depth + right*sx + up*sy
    }
}

fn figure_color(f: FigureId) -> Color32 {
    match f { FigureId::First => Color32::from_rgb(100,180,255), FigureId::Second => Color32::from_rgb(255,160,0) }
}

const JOINT_RADIUS: f32 = 6.0;

/// Draws both figures and handles joint dragging and orbiting.
/// Returns the outcome when a joint drag ended this frame.
pub fn draw_3d_canvas(ui: &mut Ui, session: &mut Session, cam: &mut Camera3D, size: Vec2, drag: &mut Option<Grab>) -> (Response, Option<DragOutcome>) {
    let (resp,p) = ui.allocate_painter(size, Sense::click_and_drag());
    p.rect_filled(resp.rect, 0.0, if ui.visuals().dark_mode { Color32::from_gray(18) } else { Color32::from_gray(80) });

    // Follow the pair's centre, snapping on the first frame
    let all: Vec<Vec3> = FigureId::BOTH.iter().flat_map(|&f| session.joints(f).iter().copied()).collect();
    let target_focus = linkpuppet::vector::centroid(&all);
    if cam.focus == Vec3::ZERO {
        cam.focus = target_focus;
    } else {
        let lerp_speed = if drag.is_some() { 0.15 } else { 0.25 };
        cam.focus = cam.focus.lerp(target_focus, lerp_speed);
    }

    let mut outcome = None;

    // Grab on raw press, before egui's drag threshold moves the pointer off small joints.
    let just_pressed = resp.hovered() && ui.input(|i| i.pointer.primary_pressed());
    if just_pressed {
        if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
            *drag = find_nearest(session, cam, resp.rect, pos);
            if drag.is_some() { session.begin_drag(); }
        }
    }
    if resp.dragged() {
        if let Some(pos) = resp.interact_pointer_pos() {
            match *drag {
                Some((f, j)) => {
                    if let Some(&at) = session.joints(f).get(j) {
                        let delta = cam.unproject(pos, at, resp.rect) - at;
                        if let Err(e) = session.move_joint(f, j, delta) { tracing::warn!("drag ignored: {e}"); }
                    }
                }
                None => {
                    cam.yaw -= resp.drag_delta().x * 0.008;
                    cam.pitch = (cam.pitch + resp.drag_delta().y * 0.008).clamp(-1.4, 1.4);
                }
            }
        }
    }
    if ui.input(|i| i.pointer.primary_released()) && drag.take().is_some() {
        outcome = Some(session.end_drag());
    }

    if resp.hovered() {
        let s = ui.input(|i| i.smooth_scroll_delta.y);
        if s != 0.0 { cam.scale *= 1.0 + s*0.001; cam.scale = cam.scale.clamp(20.0, 2000.0); }
    }

    // Floor grid on y = 0 under the pair
    let grid_color = if ui.visuals().dark_mode { Color32::from_gray(60) } else { Color32::from_gray(100) };
    let (grid_size, grid_step) = (3.0, 0.25);
    let steps = (2.0 * grid_size / grid_step) as i32;
    for k in 0..=steps {
        let t = -grid_size + k as f32 * grid_step;
        for (a, b) in [
            (Vec3::new(cam.focus.x + t, 0.0, cam.focus.z - grid_size), Vec3::new(cam.focus.x + t, 0.0, cam.focus.z + grid_size)),
            (Vec3::new(cam.focus.x - grid_size, 0.0, cam.focus.z + t), Vec3::new(cam.focus.x + grid_size, 0.0, cam.focus.z + t)),
        ] {
            if let (Some((p1, _)), Some((p2, _))) = (cam.project(a, resp.rect), cam.project(b, resp.rect)) {
                p.line_segment([p1, p2], Stroke::new(1.0, grid_color));
            }
        }
    }

    let hovered: Option<Grab> = if drag.is_some() {
        *drag
    } else {
        ui.input(|i| i.pointer.hover_pos())
            .filter(|pos| resp.rect.contains(*pos))
            .and_then(|pos| find_nearest(session, cam, resp.rect, pos))
    };

    struct Draw { a:Pos2, b:Pos2, z:f32, c:Color32, is_j:bool, hovered:bool }
    let mut draws: Vec<Draw> = Vec::new();
    for f in FigureId::BOTH {
        let fig = session.figure(f);
        let joints = fig.joints();
        let c = figure_color(f);
        for (a, b) in fig.bones() {
            if let (Some((pa,za)),Some((pb,zb))) = (cam.project(joints[a],resp.rect),cam.project(joints[b],resp.rect)) {
                draws.push(Draw{a:pa,b:pb,z:(za+zb)*0.5,c,is_j:false,hovered:false});
            }
        }
        for (j, &pt) in joints.iter().enumerate() {
            if let Some((pos,z)) = cam.project(pt,resp.rect) {
                draws.push(Draw{a:pos,b:pos,z,c,is_j:true,hovered:hovered == Some((f, j))});
            }
        }
    }
    draws.sort_by(|a,b| b.z.total_cmp(&a.z));
    let r = JOINT_RADIUS;
    for d in draws {
        if d.is_j {
            if d.hovered {
                p.circle_filled(d.a, r + 7.0, Color32::from_rgba_premultiplied(255,255,255,25));
                p.circle_stroke(d.a, r + 5.0, Stroke::new(2.0, Color32::from_rgba_premultiplied(255,255,255,170)));
            }
            p.circle_filled(d.a, r, d.c);
            p.circle_stroke(d.a, r, Stroke::new(1.5, Color32::from_rgba_premultiplied(255,255,255,80)));
        } else {
            p.line_segment([d.a,d.b], Stroke::new(4.0,d.c.linear_multiply(0.8)));
        }
    }
    let hint = match (hovered, drag.is_some()) {
        (Some((f, j)), dragging) => {
            let name = session.figure(f).joint_name(j).unwrap_or("joint");
            format!("{} figure {}: {name}", if dragging { "Dragging" } else { "Hover" }, f.index() + 1)
        }
        (None, _) => "Drag joint: move   Drag empty: orbit   Scroll: zoom".to_string(),
    };
    p.text(resp.rect.min+Vec2::new(8.,6.), egui::Align2::LEFT_TOP, hint,
        egui::FontId::proportional(11.0), Color32::from_rgba_premultiplied(200,200,200,120));
    (resp, outcome)
}

/// Joint under `pos`; nearer-to-camera joints win, then screen distance.
fn find_nearest(session: &Session, cam: &Camera3D, r: Rect, pos: Pos2) -> Option<Grab> {
    let hit_radius = JOINT_RADIUS + 8.0;
    FigureId::BOTH.iter()
        .flat_map(|&f| session.joints(f).iter().enumerate().map(move |(j, &pt)| (f, j, pt)))
        .filter_map(|(f, j, pt)| {
            let (sp, z) = cam.project(pt, r)?;
            let dist = sp.distance(pos);
            (dist < hit_radius).then_some(((f, j), dist, z))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.1.total_cmp(&b.1)))
        .map(|(grab, _, _)| grab)
}
