//! Bone chain for one leaf
//!
//! The chain is an arena of `segments + 1` joints. Joint `i` is parented to
//! joint `i - 1`; the root has no parent. Every joint except the root rests
//! one segment width further along the local x axis than its parent.
//! Topology never changes after construction, only the flat rotation array
//! does.

use bevy::prelude::*;

/// Rotation of one joint: `turn` about the local y axis (the page turn) and
/// `fold` about the local x axis (the paper buckling near the free edge).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointRotation {
    pub turn: f32,
    pub fold: f32,
}

impl JointRotation {
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.fold, self.turn, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneChain {
    parents: Vec<Option<usize>>,
    rest_offsets: Vec<Vec3>,
    rotations: Vec<JointRotation>,
}

impl BoneChain {
    pub fn new(segments: usize, segment_width: f32) -> Self {
        let joint_count = segments + 1;
        let parents = (0..joint_count)
            .map(|i| i.checked_sub(1))
            .collect();
        let rest_offsets = (0..joint_count)
            .map(|i| {
                if i == 0 {
                    Vec3::ZERO
                } else {
                    Vec3::new(segment_width, 0.0, 0.0)
                }
            })
            .collect();
        Self {
            parents,
            rest_offsets,
            rotations: vec![JointRotation::default(); joint_count],
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, joint: usize) -> Option<usize> {
        self.parents.get(joint).copied().flatten()
    }

    pub fn rest_offset(&self, joint: usize) -> Vec3 {
        self.rest_offsets[joint]
    }

    pub fn rotations(&self) -> &[JointRotation] {
        &self.rotations
    }

    pub fn rotations_mut(&mut self) -> &mut [JointRotation] {
        &mut self.rotations
    }

    /// Local transform of a joint relative to its parent
    pub fn local_transform(&self, joint: usize) -> Transform {
        Transform::from_translation(self.rest_offsets[joint])
            .with_rotation(self.rotations[joint].to_quat())
    }

    /// Chain-space matrices of every joint for the current rotations
    pub fn posed_matrices(&self) -> Vec<Mat4> {
        let mut matrices: Vec<Mat4> = Vec::with_capacity(self.len());
        for joint in 0..self.len() {
            let local = self.local_transform(joint).compute_matrix();
            let matrix = match self.parent(joint) {
                Some(parent) => matrices[parent] * local,
                None => local,
            };
            matrices.push(matrix);
        }
        matrices
    }

    /// Inverse bind poses for a chain at rest
    pub fn inverse_bind_poses(&self) -> Vec<Mat4> {
        let mut position = Vec3::ZERO;
        (0..self.len())
            .map(|joint| {
                position += self.rest_offsets[joint];
                Mat4::from_translation(-position)
            })
            .collect()
    }
}

/// Spawns the joint entities for a chain below `parent` and returns them in
/// chain order. The root joint stays at identity; the page root carries the
/// rotation the root joint would have.
pub fn spawn_joints(
    commands: &mut Commands,
    parent: Entity,
    chain: &BoneChain,
) -> Vec<Entity> {
    let mut joints: Vec<Entity> = Vec::with_capacity(chain.len());
    for joint in 0..chain.len() {
        let entity = commands
            .spawn((
                Name::new(format!("Page Joint {joint}")),
                chain.local_transform(joint),
            ))
            .id();
        let parent_entity = chain.parent(joint).map(|p| joints[p]).unwrap_or(parent);
        commands.entity(parent_entity).add_child(entity);
        joints.push(entity);
    }
    joints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear_with_one_extra_joint() {
        let chain = BoneChain::new(30, 0.1);
        assert_eq!(chain.len(), 31);
        assert_eq!(chain.parent(0), None);
        for joint in 1..chain.len() {
            assert_eq!(chain.parent(joint), Some(joint - 1));
        }
        assert_eq!(chain.rest_offset(0), Vec3::ZERO);
        assert_eq!(chain.rest_offset(5), Vec3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn rest_pose_cancels_inverse_bind_poses() {
        let chain = BoneChain::new(4, 0.25);
        let posed = chain.posed_matrices();
        let inverse = chain.inverse_bind_poses();
        for (pose, inverse) in posed.iter().zip(&inverse) {
            let skin = *pose * *inverse;
            assert!(skin.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn rotating_a_joint_swings_its_children() {
        let mut chain = BoneChain::new(2, 1.0);
        chain.rotations_mut()[1].turn = std::f32::consts::FRAC_PI_2;
        let posed = chain.posed_matrices();
        let tip = posed[2].transform_point3(Vec3::ZERO);
        // Joint 1 sits at x = 1; a quarter turn about y sends its child to -z
        assert!(tip.abs_diff_eq(Vec3::new(1.0, 0.0, -1.0), 1e-5));
    }
}
