// pose.rs
use std::cell::OnceCell;
use serde::{Deserialize, Serialize};
use crate::codec::RawPose;
use crate::config::BlendWeights;
use crate::error::{Error, Result};
use crate::features::{feature_vector, FeatureVector};
use crate::layout::{self, CHAIN_LEN, EXTENDED_LEN};
use crate::vector::Vec3;

pub type Chain = [Vec3; CHAIN_LEN];
pub type Skeleton = [Vec3; EXTENDED_LEN];

/// Which of the two figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FigureId { First, Second }

impl FigureId {
    pub const BOTH: [FigureId; 2] = [FigureId::First, FigureId::Second];
    pub fn index(self) -> usize { match self { FigureId::First => 0, FigureId::Second => 1 } }
}

/// Named joint configuration for both figures. Skeletons are always stored in the
/// 18-joint layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub name: String,
    pub chain1: Chain,
    pub chain2: Chain,
    pub skeleton1: Option<Skeleton>,
    pub skeleton2: Option<Skeleton>,
}

impl Pose {
    pub fn chain(&self, f: FigureId) -> &Chain {
        match f { FigureId::First => &self.chain1, FigureId::Second => &self.chain2 }
    }

    pub fn skeleton(&self, f: FigureId) -> Option<&Skeleton> {
        match f { FigureId::First => self.skeleton1.as_ref(), FigureId::Second => self.skeleton2.as_ref() }
    }

    /// Pose decoded from the database: chains by averaging, skeletons by selection.
    pub fn from_raw(name: impl Into<String>, raw: &RawPose) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            chain1: layout::chain_from_raw(&raw.first)?,
            chain2: layout::chain_from_raw(&raw.second)?,
            skeleton1: Some(layout::extended_from_raw(&raw.first)?),
            skeleton2: Some(layout::extended_from_raw(&raw.second)?),
        })
    }

    /// Pose authored as two extended skeletons; chains are derived from them.
    pub fn from_skeletons(name: impl Into<String>, first: Skeleton, second: Skeleton) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            chain1: layout::chain_from_extended(&first)?,
            chain2: layout::chain_from_extended(&second)?,
            skeleton1: Some(first),
            skeleton2: Some(second),
        })
    }

    pub fn from_record(rec: PoseRecord, w: &BlendWeights) -> Result<(Self, Option<FeatureVector>)> {
        let chain = |pts: &[Vec3]| -> Result<Chain> {
            pts.try_into().map_err(|_| Error::PointCount { expected: "6", found: pts.len() })
        };
        let skeleton = |pts: Option<Vec<Vec3>>| pts.map(|p| layout::normalize_skeleton(&p, w)).transpose();
        let pose = Self {
            chain1: chain(&rec.chain1)?,
            chain2: chain(&rec.chain2)?,
            skeleton1: skeleton(rec.skeleton1)?,
            skeleton2: skeleton(rec.skeleton2)?,
            name: rec.name,
        };
        Ok((pose, rec.features.map(FeatureVector::from)))
    }

    pub fn to_record(&self, features: Option<FeatureVector>) -> PoseRecord {
        PoseRecord {
            name: self.name.clone(),
            chain1: self.chain1.to_vec(),
            chain2: self.chain2.to_vec(),
            skeleton1: self.skeleton1.map(|s| s.to_vec()),
            skeleton2: self.skeleton2.map(|s| s.to_vec()),
            features: features.map(Into::into),
        }
    }
}

/// One entry of the precomputed collection file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoseRecord {
    pub name: String,
    pub chain1: Vec<Vec3>,
    pub chain2: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub skeleton1: Option<Vec<Vec3>>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub skeleton2: Option<Vec<Vec3>>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub features: Option<[f32; 2]>,
}

#[derive(Clone, Debug)]
struct Entry {
    pose: Pose,
    features: OnceCell<FeatureVector>,
}

/// Ordered poses; each one's feature vector is computed the first time it is asked for.
#[derive(Clone, Debug, Default)]
pub struct PoseCollection {
    entries: Vec<Entry>,
}

impl PoseCollection {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, pose: Pose, features: Option<FeatureVector>) {
        let cell = OnceCell::new();
        if let Some(fv) = features { let _ = cell.set(fv); }
        self.entries.push(Entry { pose, features: cell });
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn get(&self, index: usize) -> Option<&Pose> { self.entries.get(index).map(|e| &e.pose) }
    pub fn iter(&self) -> impl Iterator<Item = &Pose> { self.entries.iter().map(|e| &e.pose) }

    pub fn features(&self, index: usize) -> Option<FeatureVector> {
        let e = self.entries.get(index)?;
        Some(*e.features.get_or_init(|| feature_vector(&e.pose.chain1, &e.pose.chain2)))
    }

    /// Indices of poses whose name contains `query`, ignoring case. Empty query matches all.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let q = query.trim().to_lowercase();
        self.entries.iter().enumerate()
            .filter(|(_, e)| q.is_empty() || e.pose.name.to_lowercase().contains(&q))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn to_records(&self) -> Vec<PoseRecord> {
        (0..self.len()).filter_map(|i| Some(self.get(i)?.to_record(self.features(i)))).collect()
    }
}

impl FromIterator<Pose> for PoseCollection {
    fn from_iter<I: IntoIterator<Item = Pose>>(iter: I) -> Self {
        let mut c = PoseCollection::new();
        for pose in iter { c.push(pose, None); }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(x: f32) -> Vec<Vec3> {
        (0..CHAIN_LEN).map(|i| Vec3::new(x, i as f32 * 0.3, 0.0)).collect()
    }

    fn record(name: &str) -> PoseRecord {
        PoseRecord {
            name: name.into(), chain1: column(-0.5), chain2: column(0.5),
            skeleton1: None, skeleton2: None, features: None,
        }
    }

    #[test]
    fn record_upgrades_compact_skeleton() {
        let mut rec = record("compact");
        rec.skeleton1 = Some(vec![Vec3::new(0.0, 1.0, 0.0); layout::COMPACT_LEN]);
        let (pose, fv) = Pose::from_record(rec, &BlendWeights::default()).unwrap();
        assert_eq!(pose.skeleton1.map(|s| s.len()), Some(EXTENDED_LEN));
        assert!(pose.skeleton2.is_none());
        assert!(fv.is_none());
    }

    #[test]
    fn record_with_wrong_chain_length_is_rejected() {
        let mut rec = record("short");
        rec.chain2.pop();
        assert!(matches!(Pose::from_record(rec, &BlendWeights::default()),
            Err(Error::PointCount { expected: "6", found: 5 })));
    }

    #[test]
    fn record_json_shape() {
        let json = r#"{"name":"a","chain1":[[0,0,0],[0,1,0],[0,2,0],[0,3,0],[0,4,0],[0,5,0]],
                       "chain2":[[1,0,0],[1,1,0],[1,2,0],[1,3,0],[1,4,0],[1,5,0]],
                       "features":[0.5, 1.0]}"#;
        let rec: PoseRecord = serde_json::from_str(json).unwrap();
        let (pose, fv) = Pose::from_record(rec, &BlendWeights::default()).unwrap();
        assert_eq!(pose.chain2[5], Vec3::new(1.0, 5.0, 0.0));
        assert_eq!(fv, Some(FeatureVector { linking: 0.5, separation: 1.0 }));
    }

    #[test]
    fn stored_features_win_over_lazy_ones() {
        let mut c = PoseCollection::new();
        let (pose, _) = Pose::from_record(record("p"), &BlendWeights::default()).unwrap();
        c.push(pose.clone(), Some(FeatureVector { linking: 7.0, separation: 7.0 }));
        c.push(pose, None);
        assert_eq!(c.features(0).unwrap().linking, 7.0);
        let lazy = c.features(1).unwrap();
        assert_eq!(lazy.linking, 0.0);
        assert!((lazy.separation - 1.0).abs() < 1e-6);
        assert!(c.features(2).is_none());
    }

    #[test]
    fn search_is_case_insensitive() {
        let w = BlendWeights::default();
        let c: PoseCollection = ["Hug", "Back to back", "huddle"].iter()
            .map(|n| Pose::from_record(record(n), &w).unwrap().0)
            .collect();
        assert_eq!(c.search("hu"), vec![0, 2]);
        assert_eq!(c.search(""), vec![0, 1, 2]);
        assert!(c.search("xyz").is_empty());
    }
}
