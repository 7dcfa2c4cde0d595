// session.rs — the live pair of figures the viewer edits.
//
// Everything the input layer needs goes through here: move a joint by a world-space
// delta, read the linking number, look up or load a pose. A drag is bracketed by
// begin_drag/end_drag so an overlapping result can be undone in one step.

use crate::chain::RigidChain;
use crate::error::{Error, Result};
use crate::features::{self, feature_vector, FeatureVector, Nearest};
use crate::layout;
use crate::linking::linking_number;
use crate::pose::{FigureId, Pose, PoseCollection};
use crate::skeleton::SkeletonTree;
use crate::vector::Vec3;

/// Which structure figures are edited as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// The 6-joint foot-to-head chain.
    Chain,
    /// The 18-joint humanoid tree.
    Skeleton,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Figure {
    Chain(RigidChain),
    Skeleton(SkeletonTree),
}

impl Figure {
    fn from_pose(pose: &Pose, id: FigureId, model: Model) -> Result<Self> {
        match model {
            Model::Chain => Ok(Figure::Chain(RigidChain::new(pose.chain(id).to_vec()))),
            Model::Skeleton => {
                let s = pose.skeleton(id)
                    .ok_or_else(|| Error::MissingSkeleton { name: pose.name.clone(), figure: id.index() + 1 })?;
                Ok(Figure::Skeleton(SkeletonTree::humanoid(s)?))
            }
        }
    }

    pub fn joints(&self) -> &[Vec3] {
        match self { Figure::Chain(c) => c.joints(), Figure::Skeleton(s) => s.joints() }
    }

    /// Foot-to-head polyline used for linking and features.
    pub fn polyline(&self) -> Vec<Vec3> {
        match self {
            Figure::Chain(c) => c.joints().to_vec(),
            Figure::Skeleton(s) => layout::chain_from_extended(s.joints())
                .map(|c| c.to_vec())
                .unwrap_or_else(|_| s.joints().to_vec()),
        }
    }

    pub fn joint_name(&self, j: usize) -> Option<&'static str> {
        match self {
            Figure::Chain(_) => layout::CHAIN_NAMES.get(j).copied(),
            Figure::Skeleton(_) => layout::EXTENDED_NAMES.get(j).copied(),
        }
    }

    /// (a, b) joint pairs drawn as bones.
    pub fn bones(&self) -> Vec<(usize, usize)> {
        match self {
            Figure::Chain(c) => (1..c.len()).map(|i| (i - 1, i)).collect(),
            Figure::Skeleton(s) => s.bones().collect(),
        }
    }

    /// Displacement the dragged joint actually received.
    fn move_by(&mut self, joint: usize, delta: Vec3) -> Result<Vec3> {
        match self {
            Figure::Chain(c) => c.move_by(joint, delta).map(|_| delta),
            Figure::Skeleton(s) => s.move_joint(joint, delta),
        }
    }
}

/// Where the live joints came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoseState {
    Loaded(usize),
    Edited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    Kept,
    /// The figures ended up overlapping; both were put back as they were before the drag.
    Reverted,
    /// `end_drag` without a matching `begin_drag`.
    NotDragging,
}

#[derive(Clone, Debug)]
struct Snapshot {
    figures: [Figure; 2],
    state: PoseState,
}

#[derive(Clone, Debug)]
pub struct Session {
    model: Model,
    figures: [Figure; 2],
    state: PoseState,
    /// Pose most recently loaded, kept after edits so the model can be switched.
    loaded: usize,
    min_separation: f32,
    snapshot: Option<Snapshot>,
}

impl Session {
    /// Session showing pose `index` of `collection`.
    pub fn new(collection: &PoseCollection, index: usize, model: Model, min_separation: f32) -> Result<Self> {
        let pose = collection.get(index).ok_or(Error::PoseOutOfRange { index, len: collection.len() })?;
        Ok(Self {
            model,
            figures: [Figure::from_pose(pose, FigureId::First, model)?, Figure::from_pose(pose, FigureId::Second, model)?],
            state: PoseState::Loaded(index),
            loaded: index,
            min_separation,
            snapshot: None,
        })
    }

    pub fn model(&self) -> Model { self.model }
    pub fn state(&self) -> PoseState { self.state }
    pub fn figure(&self, id: FigureId) -> &Figure { &self.figures[id.index()] }
    pub fn joints(&self, id: FigureId) -> &[Vec3] { self.figure(id).joints() }

    /// Replaces both figures with pose `index`; rest lengths are re-measured from it.
    pub fn load_pose<'c>(&mut self, collection: &'c PoseCollection, index: usize) -> Result<&'c Pose> {
        let pose = collection.get(index).ok_or(Error::PoseOutOfRange { index, len: collection.len() })?;
        let figures = [
            Figure::from_pose(pose, FigureId::First, self.model)?,
            Figure::from_pose(pose, FigureId::Second, self.model)?,
        ];
        self.figures = figures;
        self.state = PoseState::Loaded(index);
        self.loaded = index;
        self.snapshot = None;
        Ok(pose)
    }

    /// Rebuilds both figures as `model` from the last loaded pose. Edits are discarded;
    /// on error nothing changes.
    pub fn set_model(&mut self, collection: &PoseCollection, model: Model) -> Result<()> {
        let previous = std::mem::replace(&mut self.model, model);
        self.load_pose(collection, self.loaded).map(|_| ()).inspect_err(|_| self.model = previous)
    }

    /// Moves one joint by a world-space delta and lets its figure's constraints settle.
    /// A move that leaves the joint where it was does not count as an edit.
    pub fn move_joint(&mut self, id: FigureId, joint: usize, delta: Vec3) -> Result<()> {
        let real = self.figures[id.index()].move_by(joint, delta)?;
        if real != Vec3::ZERO {
            self.state = PoseState::Edited;
        }
        Ok(())
    }

    pub fn current_linking(&self) -> f32 {
        linking_number(&self.figures[0].polyline(), &self.figures[1].polyline())
    }

    pub fn live_features(&self) -> FeatureVector {
        feature_vector(&self.figures[0].polyline(), &self.figures[1].polyline())
    }

    pub fn nearest_pose(&self, collection: &PoseCollection) -> Option<Nearest> {
        features::nearest(collection, self.live_features())
    }

    /// Closest approach between any joint of one figure and any joint of the other.
    pub fn separation(&self) -> f32 {
        min_joint_distance(self.figures[0].joints(), self.figures[1].joints())
    }

    pub fn begin_drag(&mut self) {
        tracing::debug!("drag started");
        self.snapshot = Some(Snapshot { figures: self.figures.clone(), state: self.state });
    }

    /// Ends a drag; if it left the figures overlapping (closer than the minimum separation
    /// and closer than when the drag began) every change made during the drag is undone.
    pub fn end_drag(&mut self) -> DragOutcome {
        let Some(snapshot) = self.snapshot.take() else { return DragOutcome::NotDragging };
        let before = min_joint_distance(snapshot.figures[0].joints(), snapshot.figures[1].joints());
        let after = self.separation();
        if after < self.min_separation && after < before {
            tracing::debug!(before, after, "figures overlap, reverting drag");
            self.figures = snapshot.figures;
            self.state = snapshot.state;
            DragOutcome::Reverted
        } else {
            DragOutcome::Kept
        }
    }
}

fn min_joint_distance(a: &[Vec3], b: &[Vec3]) -> f32 {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| p.distance(*q)))
        .fold(f32::INFINITY, f32::min)
}
