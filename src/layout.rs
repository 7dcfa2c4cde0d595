// layout.rs — joint index conventions and the reductions between them.
//
// Raw (23 per figure) is the database order and must not change. Extended (18) is the
// editable skeleton. Compact (14) is the older precomputed-file skeleton without ankles
// and wrists. Chain (6) is the foot-to-head polyline used for linking and features.

use crate::config::BlendWeights;
use crate::error::{Error, Result};
use crate::skeleton::RingJoints;
use crate::vector::{centroid, Vec3};

pub const RAW_LEN: usize = 23;
pub const EXTENDED_LEN: usize = 18;
pub const COMPACT_LEN: usize = 14;
pub const CHAIN_LEN: usize = 6;

/// Raw joint indices, one figure.
pub mod raw {
    pub const LEFT_TOE: usize = 0;
    pub const LEFT_HEEL: usize = 1;
    pub const LEFT_ANKLE: usize = 2;
    pub const LEFT_KNEE: usize = 3;
    pub const LEFT_HIP: usize = 4;
    pub const RIGHT_TOE: usize = 5;
    pub const RIGHT_HEEL: usize = 6;
    pub const RIGHT_ANKLE: usize = 7;
    pub const RIGHT_KNEE: usize = 8;
    pub const RIGHT_HIP: usize = 9;
    pub const LEFT_SHOULDER: usize = 10;
    pub const LEFT_ELBOW: usize = 11;
    pub const LEFT_WRIST: usize = 12;
    pub const LEFT_HAND: usize = 13;
    pub const RIGHT_SHOULDER: usize = 14;
    pub const RIGHT_ELBOW: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const RIGHT_HAND: usize = 17;
    pub const PELVIS: usize = 18;
    pub const CORE: usize = 19;
    pub const CHEST: usize = 20;
    pub const NECK: usize = 21;
    pub const HEAD: usize = 22;
}

/// Extended skeleton indices.
pub mod ext {
    pub const HEAD: usize = 0;
    pub const NECK: usize = 1;
    pub const LEFT_SHOULDER: usize = 2;
    pub const LEFT_ELBOW: usize = 3;
    pub const LEFT_WRIST: usize = 4;
    pub const LEFT_HAND: usize = 5;
    pub const RIGHT_SHOULDER: usize = 6;
    pub const RIGHT_ELBOW: usize = 7;
    pub const RIGHT_WRIST: usize = 8;
    pub const RIGHT_HAND: usize = 9;
    pub const LEFT_HIP: usize = 10;
    pub const LEFT_KNEE: usize = 11;
    pub const LEFT_ANKLE: usize = 12;
    pub const LEFT_FOOT: usize = 13;
    pub const RIGHT_HIP: usize = 14;
    pub const RIGHT_KNEE: usize = 15;
    pub const RIGHT_ANKLE: usize = 16;
    pub const RIGHT_FOOT: usize = 17;
}

/// Compact skeleton indices: extended order with ankles and wrists left out.
pub mod compact {
    pub const HEAD: usize = 0;
    pub const NECK: usize = 1;
    pub const LEFT_SHOULDER: usize = 2;
    pub const LEFT_ELBOW: usize = 3;
    pub const LEFT_HAND: usize = 4;
    pub const RIGHT_SHOULDER: usize = 5;
    pub const RIGHT_ELBOW: usize = 6;
    pub const RIGHT_HAND: usize = 7;
    pub const LEFT_HIP: usize = 8;
    pub const LEFT_KNEE: usize = 9;
    pub const LEFT_FOOT: usize = 10;
    pub const RIGHT_HIP: usize = 11;
    pub const RIGHT_KNEE: usize = 12;
    pub const RIGHT_FOOT: usize = 13;
}

pub const EXTENDED_NAMES: [&str; EXTENDED_LEN] = [
    "head", "neck",
    "left_shoulder", "left_elbow", "left_wrist", "left_hand",
    "right_shoulder", "right_elbow", "right_wrist", "right_hand",
    "left_hip", "left_knee", "left_ankle", "left_foot",
    "right_hip", "right_knee", "right_ankle", "right_foot",
];

pub const CHAIN_NAMES: [&str; CHAIN_LEN] = ["foot", "knee", "hip", "core", "neck", "head"];

/// Neck is the root; hips hang straight off it.
pub const EXTENDED_PARENTS: [Option<usize>; EXTENDED_LEN] = [
    Some(ext::NECK), None,
    Some(ext::NECK), Some(ext::LEFT_SHOULDER), Some(ext::LEFT_ELBOW), Some(ext::LEFT_WRIST),
    Some(ext::NECK), Some(ext::RIGHT_SHOULDER), Some(ext::RIGHT_ELBOW), Some(ext::RIGHT_WRIST),
    Some(ext::NECK), Some(ext::LEFT_HIP), Some(ext::LEFT_KNEE), Some(ext::LEFT_ANKLE),
    Some(ext::NECK), Some(ext::RIGHT_HIP), Some(ext::RIGHT_KNEE), Some(ext::RIGHT_ANKLE),
];

pub const EXTENDED_RING: RingJoints = RingJoints {
    head: ext::HEAD,
    left_shoulder: ext::LEFT_SHOULDER,
    right_shoulder: ext::RIGHT_SHOULDER,
};

/// Raw index feeding each extended joint.
const EXTENDED_FROM_RAW: [usize; EXTENDED_LEN] = [
    raw::HEAD, raw::NECK,
    raw::LEFT_SHOULDER, raw::LEFT_ELBOW, raw::LEFT_WRIST, raw::LEFT_HAND,
    raw::RIGHT_SHOULDER, raw::RIGHT_ELBOW, raw::RIGHT_WRIST, raw::RIGHT_HAND,
    raw::LEFT_HIP, raw::LEFT_KNEE, raw::LEFT_ANKLE, raw::LEFT_TOE,
    raw::RIGHT_HIP, raw::RIGHT_KNEE, raw::RIGHT_ANKLE, raw::RIGHT_TOE,
];

/// Raw index groups averaged into each chain joint, foot first.
const CHAIN_FROM_RAW: [&[usize]; CHAIN_LEN] = [
    &[raw::LEFT_TOE, raw::LEFT_HEEL, raw::LEFT_ANKLE, raw::RIGHT_TOE, raw::RIGHT_HEEL, raw::RIGHT_ANKLE],
    &[raw::LEFT_KNEE, raw::RIGHT_KNEE],
    &[raw::LEFT_HIP, raw::RIGHT_HIP, raw::PELVIS],
    &[raw::CORE, raw::CHEST],
    &[raw::LEFT_SHOULDER, raw::RIGHT_SHOULDER, raw::NECK],
    &[raw::HEAD],
];

/// Extended index groups averaged into each chain joint.
const CHAIN_FROM_EXTENDED: [&[usize]; CHAIN_LEN] = [
    &[ext::LEFT_ANKLE, ext::LEFT_FOOT, ext::RIGHT_ANKLE, ext::RIGHT_FOOT],
    &[ext::LEFT_KNEE, ext::RIGHT_KNEE],
    &[ext::LEFT_HIP, ext::RIGHT_HIP],
    &[ext::LEFT_HIP, ext::RIGHT_HIP, ext::LEFT_SHOULDER, ext::RIGHT_SHOULDER],
    &[ext::LEFT_SHOULDER, ext::RIGHT_SHOULDER, ext::NECK],
    &[ext::HEAD],
];

fn mean_of(points: &[Vec3], group: &[usize]) -> Vec3 {
    let picked: Vec<Vec3> = group.iter().map(|&i| points[i]).collect();
    centroid(&picked)
}

fn check_len(points: &[Vec3], len: usize, expected: &'static str) -> Result<()> {
    if points.len() == len { Ok(()) } else { Err(Error::PointCount { expected, found: points.len() }) }
}

pub fn chain_from_raw(points: &[Vec3]) -> Result<[Vec3; CHAIN_LEN]> {
    check_len(points, RAW_LEN, "23")?;
    Ok(CHAIN_FROM_RAW.map(|group| mean_of(points, group)))
}

pub fn extended_from_raw(points: &[Vec3]) -> Result<[Vec3; EXTENDED_LEN]> {
    check_len(points, RAW_LEN, "23")?;
    Ok(EXTENDED_FROM_RAW.map(|i| points[i]))
}

pub fn chain_from_extended(points: &[Vec3]) -> Result<[Vec3; CHAIN_LEN]> {
    check_len(points, EXTENDED_LEN, "18")?;
    Ok(CHAIN_FROM_EXTENDED.map(|group| mean_of(points, group)))
}

/// Rebuilds the 18-joint layout from the 14-joint one by synthesizing ankles and wrists.
///
/// The synthesized joints are blends of their neighbours, not measurements.
pub fn extended_from_compact(points: &[Vec3], w: &BlendWeights) -> Result<[Vec3; EXTENDED_LEN]> {
    check_len(points, COMPACT_LEN, "14")?;
    let p = |i: usize| points[i];
    let ankle = |foot: usize, knee: usize| p(foot) * w.ankle_foot + p(knee) * w.ankle_knee;
    let wrist = |elbow: usize, hand: usize| p(elbow) * w.wrist_elbow + p(hand) * w.wrist_hand;
    use compact as c;
    Ok([
        p(c::HEAD), p(c::NECK),
        p(c::LEFT_SHOULDER), p(c::LEFT_ELBOW), wrist(c::LEFT_ELBOW, c::LEFT_HAND), p(c::LEFT_HAND),
        p(c::RIGHT_SHOULDER), p(c::RIGHT_ELBOW), wrist(c::RIGHT_ELBOW, c::RIGHT_HAND), p(c::RIGHT_HAND),
        p(c::LEFT_HIP), p(c::LEFT_KNEE), ankle(c::LEFT_FOOT, c::LEFT_KNEE), p(c::LEFT_FOOT),
        p(c::RIGHT_HIP), p(c::RIGHT_KNEE), ankle(c::RIGHT_FOOT, c::RIGHT_KNEE), p(c::RIGHT_FOOT),
    ])
}

/// Accepts either skeleton convention and returns the extended one.
pub fn normalize_skeleton(points: &[Vec3], w: &BlendWeights) -> Result<[Vec3; EXTENDED_LEN]> {
    match points.len() {
        EXTENDED_LEN => {
            let mut out = [Vec3::ZERO; EXTENDED_LEN];
            out.copy_from_slice(points);
            Ok(out)
        }
        COMPACT_LEN => extended_from_compact(points, w),
        found => Err(Error::PointCount { expected: "14 or 18", found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_raw() -> Vec<Vec3> {
        (0..RAW_LEN).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn extended_is_a_plain_selection() {
        let ext_pts = extended_from_raw(&indexed_raw()).unwrap();
        assert_eq!(ext_pts[ext::HEAD].x, raw::HEAD as f32);
        assert_eq!(ext_pts[ext::LEFT_FOOT].x, raw::LEFT_TOE as f32);
        assert_eq!(ext_pts[ext::RIGHT_WRIST].x, raw::RIGHT_WRIST as f32);
        assert_eq!(ext_pts[ext::RIGHT_SHOULDER].x, raw::RIGHT_SHOULDER as f32);
    }

    #[test]
    fn chain_averages_symmetric_groups() {
        let chain = chain_from_raw(&indexed_raw()).unwrap();
        // feet: (0 + 1 + 2 + 5 + 6 + 7) / 6
        assert!((chain[0].x - 21.0 / 6.0).abs() < 1e-6);
        assert_eq!(chain[1].x, (3.0 + 8.0) / 2.0);
        assert_eq!(chain[2].x, (4.0 + 9.0 + 18.0) / 3.0);
        assert_eq!(chain[3].x, (19.0 + 20.0) / 2.0);
        assert_eq!(chain[5].x, 22.0);
    }

    #[test]
    fn compact_upgrade_blends_ankles_and_wrists() {
        let mut pts = vec![Vec3::ZERO; COMPACT_LEN];
        pts[compact::LEFT_FOOT] = Vec3::new(0.0, 0.0, 0.0);
        pts[compact::LEFT_KNEE] = Vec3::new(0.0, 1.0, 0.0);
        pts[compact::RIGHT_ELBOW] = Vec3::new(1.0, 0.0, 0.0);
        pts[compact::RIGHT_HAND] = Vec3::new(2.0, 0.0, 0.0);
        let up = extended_from_compact(&pts, &BlendWeights::default()).unwrap();
        assert!((up[ext::LEFT_ANKLE].y - 0.3).abs() < 1e-6);
        assert!((up[ext::RIGHT_WRIST].x - 1.7).abs() < 1e-6);
        assert_eq!(up[ext::RIGHT_HAND], pts[compact::RIGHT_HAND]);
    }

    #[test]
    fn blend_weights_are_configurable() {
        let mut pts = vec![Vec3::ZERO; COMPACT_LEN];
        pts[compact::LEFT_KNEE] = Vec3::new(0.0, 1.0, 0.0);
        let w = BlendWeights { ankle_foot: 0.5, ankle_knee: 0.5, ..BlendWeights::default() };
        let up = extended_from_compact(&pts, &w).unwrap();
        assert_eq!(up[ext::LEFT_ANKLE].y, 0.5);
    }

    #[test]
    fn wrong_counts_are_errors() {
        assert!(matches!(chain_from_raw(&[Vec3::ZERO; 5]), Err(Error::PointCount { found: 5, .. })));
        assert!(matches!(normalize_skeleton(&[Vec3::ZERO; 16], &BlendWeights::default()),
            Err(Error::PointCount { expected: "14 or 18", found: 16 })));
    }

    #[test]
    fn extended_parents_have_one_root() {
        for (i, p) in EXTENDED_PARENTS.iter().enumerate() {
            if let Some(p) = p { assert_ne!(*p, i); }
        }
        assert_eq!(EXTENDED_PARENTS.iter().filter(|p| p.is_none()).count(), 1);
    }
}
