// features.rs — two-number fingerprint of a pose and nearest-pose lookup.
use crate::linking::linking_number;
use crate::pose::PoseCollection;
use crate::vector::{centroid, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector {
    pub linking: f32,
    /// Distance between the two chains' centroids.
    pub separation: f32,
}

impl FeatureVector {
    pub fn distance(self, o: FeatureVector) -> f32 {
        (self.linking - o.linking).hypot(self.separation - o.separation)
    }
}

impl From<[f32; 2]> for FeatureVector {
    fn from([linking, separation]: [f32; 2]) -> Self { Self { linking, separation } }
}

impl From<FeatureVector> for [f32; 2] {
    fn from(f: FeatureVector) -> Self { [f.linking, f.separation] }
}

pub fn feature_vector(a: &[Vec3], b: &[Vec3]) -> FeatureVector {
    FeatureVector {
        linking: linking_number(a, b),
        separation: centroid(a).distance(centroid(b)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance: f32,
}

/// Linear scan; on equal distances the earlier pose wins.
pub fn nearest(collection: &PoseCollection, query: FeatureVector) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;
    for index in 0..collection.len() {
        let Some(fv) = collection.features(index) else { continue };
        let distance = fv.distance(query);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Nearest { index, distance });
        }
    }
    best
}
