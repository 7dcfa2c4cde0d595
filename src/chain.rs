// chain.rs — linear figure of rigid segments.
use crate::error::{Error, Result};
use crate::vector::{constrain, Vec3};

/// Ordered joints joined by segments whose lengths are fixed when the chain is built.
///
/// Lengths are never re-measured from the live joints; only [`RigidChain::load`]
/// replaces them.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidChain {
    joints: Vec<Vec3>,
    lengths: Vec<f32>,
}

impl RigidChain {
    pub fn new(joints: Vec<Vec3>) -> Self {
        let lengths = segment_lengths(&joints);
        Self { joints, lengths }
    }

    /// Replaces the joints and re-measures the rest lengths (a new pose was loaded).
    pub fn load(&mut self, joints: &[Vec3]) {
        self.joints = joints.to_vec();
        self.lengths = segment_lengths(&self.joints);
    }

    pub fn joints(&self) -> &[Vec3] { &self.joints }
    pub fn lengths(&self) -> &[f32] { &self.lengths }
    pub fn len(&self) -> usize { self.joints.len() }
    pub fn is_empty(&self) -> bool { self.joints.is_empty() }

    pub fn joint(&self, k: usize) -> Result<Vec3> {
        self.joints.get(k).copied().ok_or(Error::JointOutOfRange { index: k, len: self.joints.len() })
    }

    /// Puts joint `k` at `target` and drags both ends of the chain after it.
    ///
    /// Single pass in each direction: every segment ends the call at its rest length,
    /// except a segment whose two joints coincided, which is left as is.
    pub fn move_joint(&mut self, k: usize, target: Vec3) -> Result<()> {
        let n = self.joints.len();
        if k >= n { return Err(Error::JointOutOfRange { index: k, len: n }); }
        self.joints[k] = target;

        for i in k..n.saturating_sub(1) {
            if let Some(p) = constrain(self.joints[i], self.joints[i + 1], self.lengths[i]) {
                self.joints[i + 1] = p;
            }
        }
        for i in (1..=k).rev() {
            if let Some(p) = constrain(self.joints[i], self.joints[i - 1], self.lengths[i - 1]) {
                self.joints[i - 1] = p;
            }
        }
        Ok(())
    }

    /// Offsets joint `k` by `delta` (world space), then propagates as [`RigidChain::move_joint`].
    pub fn move_by(&mut self, k: usize, delta: Vec3) -> Result<()> {
        let p = self.joint(k)?;
        self.move_joint(k, p + delta)
    }
}

fn segment_lengths(joints: &[Vec3]) -> Vec<f32> {
    joints.windows(2).map(|w| w[0].distance(w[1])).collect()
}
