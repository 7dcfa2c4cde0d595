// skeleton.rs — tree-shaped figure: joints in an arena, each pointing at its parent.
use crate::error::{Error, Result};
use crate::layout;
use crate::vector::{constrain, Vec3};

/// Slack allowed on the head/shoulder ring before a move counts as breaking it.
pub const RING_EPS: f32 = 1e-4;

/// The three joints tied together by the ring constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingJoints {
    pub head: usize,
    pub left_shoulder: usize,
    pub right_shoulder: usize,
}

#[derive(Clone, Debug, PartialEq)]
struct Ring {
    joints: RingJoints,
    width: f32,
}

/// Joints with a fixed parent index each; bone lengths are measured once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonTree {
    joints: Vec<Vec3>,
    parents: Vec<Option<usize>>,
    bone_lengths: Vec<f32>,
    children: Vec<Vec<usize>>,
    root: usize,
    ring: Option<Ring>,
}

impl SkeletonTree {
    /// Builds the tree, checking that `parents` describes exactly one rooted, acyclic tree.
    pub fn new(joints: Vec<Vec3>, parents: Vec<Option<usize>>) -> Result<Self> {
        let n = joints.len();
        if parents.len() != n {
            return Err(Error::PointCount { expected: "one parent entry per joint", found: parents.len() });
        }
        for (joint, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                if parent >= n { return Err(Error::InvalidParent { joint, parent, len: n }); }
            }
        }
        let roots: Vec<usize> = (0..n).filter(|&i| parents[i].is_none()).collect();
        let &[root] = roots.as_slice() else { return Err(Error::RootCount { found: roots.len() }) };
        for start in 0..n {
            let (mut at, mut steps) = (start, 0);
            while let Some(p) = parents[at] {
                at = p;
                steps += 1;
                if steps > n { return Err(Error::ParentCycle { joint: start }); }
            }
        }

        let mut children = vec![Vec::new(); n];
        let bone_lengths = (0..n).map(|i| match parents[i] {
            Some(p) => { children[p].push(i); joints[i].distance(joints[p]) }
            None    => 0.0,
        }).collect();

        Ok(Self { joints, parents, bone_lengths, children, root, ring: None })
    }

    /// Humanoid in the 18-joint layout, with the head/shoulder ring enabled.
    pub fn humanoid(points: &[Vec3]) -> Result<Self> {
        if points.len() != layout::EXTENDED_LEN {
            return Err(Error::PointCount { expected: "18", found: points.len() });
        }
        Self::new(points.to_vec(), layout::EXTENDED_PARENTS.to_vec())?.with_ring(layout::EXTENDED_RING)
    }

    /// Enables the ring constraint; its width is the current shoulder-to-shoulder distance.
    pub fn with_ring(mut self, joints: RingJoints) -> Result<Self> {
        let len = self.joints.len();
        for index in [joints.head, joints.left_shoulder, joints.right_shoulder] {
            if index >= len { return Err(Error::JointOutOfRange { index, len }); }
        }
        let width = self.joints[joints.left_shoulder].distance(self.joints[joints.right_shoulder]);
        self.ring = Some(Ring { joints, width });
        Ok(self)
    }

    pub fn joints(&self) -> &[Vec3] { &self.joints }
    pub fn len(&self) -> usize { self.joints.len() }
    pub fn is_empty(&self) -> bool { self.joints.is_empty() }
    pub fn root(&self) -> usize { self.root }
    pub fn parent(&self, i: usize) -> Option<usize> { self.parents.get(i).copied().flatten() }
    pub fn children(&self, i: usize) -> &[usize] { self.children.get(i).map_or(&[], Vec::as_slice) }
    pub fn bone_length(&self, i: usize) -> Option<f32> { self.parent(i).map(|_| self.bone_lengths[i]) }
    pub fn ring_width(&self) -> Option<f32> { self.ring.as_ref().map(|r| r.width) }
    pub fn ring_joints(&self) -> Option<RingJoints> { self.ring.as_ref().map(|r| r.joints) }

    /// (child, parent) pairs.
    pub fn bones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents.iter().enumerate().filter_map(|(i, p)| p.map(|p| (i, p)))
    }

    /// Joints `i` is held within ring width of: both shoulders for the head, the head for a shoulder.
    pub fn ring_partners(&self, i: usize) -> Vec<usize> {
        let Some(ring) = &self.ring else { return Vec::new() };
        let r = ring.joints;
        if i == r.head { vec![r.left_shoulder, r.right_shoulder] }
        else if i == r.left_shoulder || i == r.right_shoulder { vec![r.head] }
        else { Vec::new() }
    }

    /// Moves joint `i` by `delta` and carries its whole subtree along.
    ///
    /// Returns the displacement joint `i` actually received: ring clamping and the bone
    /// rescale toward its parent both change it. When the rescale pushes a ring joint back
    /// out, it is slid along its bone sphere onto the ring; if the two spheres never meet
    /// the move is dropped and `ZERO` comes back.
    pub fn move_joint(&mut self, i: usize, delta: Vec3) -> Result<Vec3> {
        let len = self.joints.len();
        if i >= len { return Err(Error::JointOutOfRange { index: i, len }); }

        let partners = self.ring_partners(i);
        let delta = self.clamp_to_ring(i, delta, &partners);

        let Some(parent) = self.parents[i] else {
            for p in &mut self.joints { *p += delta; }
            return Ok(delta);
        };

        let before = self.joints[i];
        let mut after = before + delta;
        if let Some(p) = constrain(self.joints[parent], after, self.bone_lengths[i]) { after = p; }
        let Some(after) = self.hold_ring(i, parent, before, after, &partners) else {
            tracing::debug!(joint = i, "move dropped: bone cannot reach the head/shoulder ring");
            return Ok(Vec3::ZERO);
        };
        self.joints[i] = after;
        let real = after - before;

        let mut pending: Vec<(usize, Vec3)> = self.children[i].iter().map(|&c| (c, real)).collect();
        while let Some((c, d)) = pending.pop() {
            let old = self.joints[c];
            let mut p = old + d;
            if let Some(parent) = self.parents[c] {
                if let Some(q) = constrain(self.joints[parent], p, self.bone_lengths[c]) { p = q; }
            }
            self.joints[c] = p;
            let carried = p - old;
            pending.extend(self.children[c].iter().map(|&g| (g, carried)));
        }
        Ok(real)
    }

    /// Removes the part of `delta` that would carry joint `i` beyond ring width of a partner.
    ///
    /// Only a delta heading away from the partner is touched, and then the target is pulled
    /// back onto the sphere of ring width around that partner. For the head the second
    /// shoulder sees the delta already corrected for the first.
    fn clamp_to_ring(&self, i: usize, mut delta: Vec3, partners: &[usize]) -> Vec3 {
        let Some(ring) = &self.ring else { return delta };
        let p = self.joints[i];
        for &j in partners {
            let anchor = self.joints[j];
            let Some(u) = (p - anchor).normalize() else { continue };
            if delta.dot(u) <= 0.0 { continue; }
            let reach = p + delta - anchor;
            let dist = reach.length();
            if dist > ring.width {
                delta -= reach * ((dist - ring.width) / dist);
            }
        }
        delta
    }

    /// `after` when it keeps the ring; otherwise the point of the bone sphere nearest it
    /// that sits on the ring of each partner it stretched. `None` if there is no such point.
    fn hold_ring(&self, i: usize, parent: usize, before: Vec3, mut after: Vec3, partners: &[usize]) -> Option<Vec3> {
        let Some(ring) = &self.ring else { return Some(after) };
        for _ in 0..partners.len() {
            let Some(&j) = partners.iter().find(|&&j| self.stretches(before, after, j, ring.width)) else { break };
            after = onto_ring(self.joints[parent], self.bone_lengths[i], self.joints[j], ring.width, after)?;
        }
        let stretched = partners.iter().any(|&j| self.stretches(before, after, j, ring.width));
        (!stretched).then_some(after)
    }

    fn stretches(&self, before: Vec3, after: Vec3, partner: usize, width: f32) -> bool {
        let anchor = self.joints[partner];
        let d = after.distance(anchor);
        d > width + RING_EPS && d > before.distance(anchor)
    }
}

/// Point nearest `target` that lies `bone` from `parent` and `width` from `partner`,
/// i.e. on the circle where the two spheres cut. `None` when they do not meet.
fn onto_ring(parent: Vec3, bone: f32, partner: Vec3, width: f32, target: Vec3) -> Option<Vec3> {
    let axis = partner - parent;
    let d = axis.length();
    if d <= 0.0 || d > bone + width || d < (bone - width).abs() { return None; }
    let n = axis * (1.0 / d);
    let a = (d * d + bone * bone - width * width) / (2.0 * d);
    let centre = parent + n * a;
    let radius = (bone * bone - a * a).max(0.0).sqrt();
    let off = target - centre;
    // target on the axis: any point of the circle will do
    let dir = (off - n * off.dot(n)).normalize()
        .or_else(|| n.cross(Vec3::new(1.0, 0.0, 0.0)).normalize())
        .or_else(|| n.cross(Vec3::new(0.0, 1.0, 0.0)).normalize())?;
    Some(centre + dir * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 root, 1 child of 0, 2 child of 1, 3 child of 0
    fn small_tree() -> SkeletonTree {
        SkeletonTree::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            vec![None, Some(0), Some(1), Some(0)],
        ).unwrap()
    }

    // neck at the origin, head 0.5 above, shoulders 0.3 either side; width 0.6
    fn ring_tree() -> SkeletonTree {
        SkeletonTree::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0), Vec3::new(-0.3, 0.0, 0.0), Vec3::new(0.3, 0.0, 0.0)],
            vec![None, Some(0), Some(0), Some(0)],
        ).unwrap()
        .with_ring(RingJoints { head: 1, left_shoulder: 2, right_shoulder: 3 }).unwrap()
    }

    fn assert_bones(tree: &SkeletonTree, original: &SkeletonTree) {
        for (c, p) in tree.bones() {
            let d = tree.joints()[c].distance(tree.joints()[p]);
            let rest = original.bone_length(c).unwrap();
            assert!((d - rest).abs() < 1e-4, "bone {c}->{p}: {d} vs {rest}");
        }
    }

    #[test]
    fn rejects_bad_parents() {
        let pts = vec![Vec3::ZERO; 3];
        assert!(matches!(SkeletonTree::new(pts.clone(), vec![None, Some(5), Some(0)]),
            Err(Error::InvalidParent { joint: 1, parent: 5, len: 3 })));
        assert!(matches!(SkeletonTree::new(pts.clone(), vec![None, None, Some(0)]),
            Err(Error::RootCount { found: 2 })));
        assert!(matches!(SkeletonTree::new(pts.clone(), vec![None, Some(2), Some(1)]),
            Err(Error::ParentCycle { .. })));
        assert!(matches!(SkeletonTree::new(pts, vec![None, Some(0)]), Err(Error::PointCount { .. })));
    }

    #[test]
    fn root_move_is_rigid_translation() {
        let mut tree = small_tree();
        let before = tree.joints().to_vec();
        let delta = Vec3::new(0.3, -1.0, 2.0);
        assert_eq!(tree.move_joint(0, delta).unwrap(), delta);
        for (a, b) in tree.joints().iter().zip(&before) {
            assert!((*a - (*b + delta)).length() < 1e-6);
        }
    }

    #[test]
    fn inner_move_carries_subtree_and_keeps_bones() {
        let original = small_tree();
        let mut tree = original.clone();
        let real = tree.move_joint(1, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_bones(&tree, &original);
        // joint 1 lands on its unit sphere around the root
        assert!((tree.joints()[1] - Vec3::new(1.0, 1.0, 0.0).normalize().unwrap()).length() < 1e-6);
        // the grandchild followed rigidly
        assert!((tree.joints()[2] - (original.joints()[2] + real)).length() < 1e-6);
        // the sibling branch is untouched
        assert_eq!(tree.joints()[3], original.joints()[3]);
    }

    #[test]
    fn leaf_move_touches_only_the_leaf() {
        let original = small_tree();
        let mut tree = original.clone();
        tree.move_joint(2, Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(&tree.joints()[..2], &original.joints()[..2]);
        assert_bones(&tree, &original);
    }

    #[test]
    fn ring_width_from_shoulders() {
        let tree = ring_tree();
        assert!((tree.ring_width().unwrap() - 0.6).abs() < 1e-6);
        assert_eq!(tree.ring_partners(1), vec![2, 3]);
        assert_eq!(tree.ring_partners(2), vec![1]);
        assert!(tree.ring_partners(0).is_empty());
    }

    #[test]
    fn shoulder_pulled_away_from_head_is_clamped() {
        let mut tree = ring_tree();
        // swinging the left shoulder down around the neck moves it away from the head
        let real = tree.move_joint(2, Vec3::new(0.0, -5.0, 0.0)).unwrap();
        let head = tree.joints()[1];
        let shoulder = tree.joints()[2];
        assert!(real.y < 0.0);
        assert!((head.distance(shoulder) - 0.6).abs() < 1e-4);
        assert!((shoulder.length() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn head_dragged_far_sideways_stops_on_the_ring() {
        let original = ring_tree();
        let mut tree = original.clone();
        let real = tree.move_joint(1, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert!(real.x > 0.0);
        let j = tree.joints();
        assert!((j[1].distance(j[2]) - 0.6).abs() < 1e-4);
        assert!(j[1].distance(j[3]) <= 0.6 + RING_EPS);
        assert_bones(&tree, &original);
    }

    #[test]
    fn head_pulled_straight_up_stays_above_the_neck() {
        let original = ring_tree();
        let mut tree = original.clone();
        tree.move_joint(1, Vec3::new(0.0, 5.0, 0.0)).unwrap();
        let j = tree.joints();
        assert!(j[1].y > 0.4);
        assert!(j[1].distance(j[2]) <= 0.6 + RING_EPS);
        assert!(j[1].distance(j[3]) <= 0.6 + RING_EPS);
        assert_bones(&tree, &original);
    }

    #[test]
    fn head_clamped_against_both_shoulders() {
        let mut tree = ring_tree();
        for _ in 0..20 {
            tree.move_joint(1, Vec3::new(0.3, -0.2, 0.4)).unwrap();
            let j = tree.joints();
            assert!(j[1].distance(j[2]) <= 0.6 + RING_EPS);
            assert!(j[1].distance(j[3]) <= 0.6 + RING_EPS);
        }
    }

    #[test]
    fn move_is_dropped_when_the_bone_cannot_reach_the_ring() {
        // head bone 2.0 against shoulders 0.2 from the neck: the spheres never meet
        let original = SkeletonTree::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::new(-0.2, 0.0, 0.0), Vec3::new(0.2, 0.0, 0.0)],
            vec![None, Some(0), Some(0), Some(0)],
        ).unwrap()
        .with_ring(RingJoints { head: 1, left_shoulder: 2, right_shoulder: 3 }).unwrap();
        let mut tree = original.clone();
        assert_eq!(tree.move_joint(1, Vec3::new(0.5, 0.0, 0.0)).unwrap(), Vec3::ZERO);
        assert_eq!(tree, original);
    }

    #[test]
    fn moving_toward_a_partner_is_not_clamped() {
        let mut tree = ring_tree();
        let real = tree.move_joint(2, Vec3::new(0.0, 0.1, 0.0)).unwrap();
        assert!(real.y > 0.0);
        assert!((tree.joints()[2].length() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn out_of_range() {
        let mut tree = small_tree();
        assert!(matches!(tree.move_joint(9, Vec3::ZERO), Err(Error::JointOutOfRange { index: 9, len: 4 })));
    }
}
