// builtin.rs — hand-authored poses, the last fallback when nothing else loads.
//
// Figures are about 1.75 units tall, feet on y = 0, facing +Z.

use crate::layout::{ext, EXTENDED_LEN};
use crate::pose::{Pose, PoseCollection, Skeleton};
use crate::vector::Vec3;

/// Rest figure centred on x = 0, z = 0.
fn standing() -> Skeleton {
    let mut s = [Vec3::ZERO; EXTENDED_LEN];
    s[ext::HEAD]           = Vec3::new( 0.00, 1.75, 0.00);
    s[ext::NECK]           = Vec3::new( 0.00, 1.50, 0.00);
    s[ext::LEFT_SHOULDER]  = Vec3::new(-0.20, 1.45, 0.00);
    s[ext::LEFT_ELBOW]     = Vec3::new(-0.25, 1.15, 0.00);
    s[ext::LEFT_WRIST]     = Vec3::new(-0.27, 0.90, 0.02);
    s[ext::LEFT_HAND]      = Vec3::new(-0.28, 0.80, 0.03);
    s[ext::RIGHT_SHOULDER] = Vec3::new( 0.20, 1.45, 0.00);
    s[ext::RIGHT_ELBOW]    = Vec3::new( 0.25, 1.15, 0.00);
    s[ext::RIGHT_WRIST]    = Vec3::new( 0.27, 0.90, 0.02);
    s[ext::RIGHT_HAND]     = Vec3::new( 0.28, 0.80, 0.03);
    s[ext::LEFT_HIP]       = Vec3::new(-0.10, 0.95, 0.00);
    s[ext::LEFT_KNEE]      = Vec3::new(-0.10, 0.50, 0.02);
    s[ext::LEFT_ANKLE]     = Vec3::new(-0.10, 0.08, 0.00);
    s[ext::LEFT_FOOT]      = Vec3::new(-0.10, 0.00, 0.12);
    s[ext::RIGHT_HIP]      = Vec3::new( 0.10, 0.95, 0.00);
    s[ext::RIGHT_KNEE]     = Vec3::new( 0.10, 0.50, 0.02);
    s[ext::RIGHT_ANKLE]    = Vec3::new( 0.10, 0.08, 0.00);
    s[ext::RIGHT_FOOT]     = Vec3::new( 0.10, 0.00, 0.12);
    s
}

/// Shoulder height; the lean stops here so head and shoulders keep their spacing.
const LEAN_TOP: f32 = 1.45;

/// Moves the figure to (x, z) and leans it: joints shift sideways by `lean * y`, capped at
/// shoulder height.
fn placed(x: f32, z: f32, lean: f32) -> Skeleton {
    standing().map(|p| Vec3::new(p.x + x + lean * p.y.min(LEAN_TOP), p.y, p.z + z))
}

/// Raises both hands above the head.
fn arms_up(mut s: Skeleton) -> Skeleton {
    for (shoulder, elbow, wrist, hand) in [
        (ext::LEFT_SHOULDER, ext::LEFT_ELBOW, ext::LEFT_WRIST, ext::LEFT_HAND),
        (ext::RIGHT_SHOULDER, ext::RIGHT_ELBOW, ext::RIGHT_WRIST, ext::RIGHT_HAND),
    ] {
        let side = (s[shoulder].x - s[ext::NECK].x).signum();
        let base = s[shoulder];
        s[elbow] = base + Vec3::new(side * 0.08, 0.29, 0.0);
        s[wrist] = base + Vec3::new(side * 0.10, 0.54, 0.0);
        s[hand]  = base + Vec3::new(side * 0.11, 0.64, 0.0);
    }
    s
}

pub fn poses() -> Vec<Pose> {
    let authored = [
        ("Side by side", placed(-0.6, 0.0, 0.0), placed(0.6, 0.0, 0.0)),
        ("Back to back", placed(-0.25, -0.2, 0.0), placed(0.25, 0.2, 0.0)),
        ("Leaning across", placed(-0.6, -0.3, 0.8), placed(0.6, 0.3, -0.8)),
        ("One leans over", placed(-0.6, -0.3, 1.0), placed(0.4, 0.3, 0.0)),
        ("Hands up", arms_up(placed(-0.6, 0.0, 0.0)), arms_up(placed(0.6, 0.0, 0.0))),
    ];
    authored.into_iter()
        .filter_map(|(name, a, b)| match Pose::from_skeletons(name, a, b) {
            Ok(p) => Some(p),
            Err(e) => { tracing::error!(pose = name, "built-in pose is malformed: {e}"); None }
        })
        .collect()
}

pub fn collection() -> PoseCollection { poses().into_iter().collect() }
