//! Voxels of an assembled robot
//!
//! A cube owns no geometry of its own. It maps its 8 local vertices and 28
//! local springs to entries of the robot's mass and spring arenas, and keeps
//! the fusion bookkeeping: which neighbours it is joined to, through which
//! faces, and which faces are still open.

use glam::{IVec3, Vec3};
use smallvec::SmallVec;

use crate::face::{Face, FaceSet};
use crate::lattice::{PointMass, CUBE_CENTROID, CUBE_MASSES, CUBE_SIDE, CUBE_SPRINGS};

/// A fused face shared with a neighbouring cube
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeJoint {
    /// Index of the neighbour in the robot's cube list
    pub neighbor: usize,
    /// Own face consumed by the fusion
    pub face: Face,
    /// The neighbour's mating face
    pub other_face: Face,
}

/// A voxel of an assembled robot
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    /// Grid cell, one unit per cube side
    pub cell: IVec3,
    /// Fusions in the order they were made
    pub joints: SmallVec<[CubeJoint; 6]>,
    pub free_faces: FaceSet,
    /// Arena index of each local vertex
    pub mass_ids: [usize; CUBE_MASSES],
    /// Arena index of each local spring
    pub spring_ids: [usize; CUBE_SPRINGS],
    /// Mean position of the cube's masses
    pub center: Vec3,
}

impl Cube {
    /// Neighbour indices in fusion order
    pub fn joined_cubes(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints.iter().map(|joint| joint.neighbor)
    }

    /// Own fused faces in fusion order
    pub fn joined_faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.joints.iter().map(|joint| joint.face)
    }

    /// Neighbour fused on `face`, if any
    pub fn neighbor_on(&self, face: Face) -> Option<usize> {
        self.joints
            .iter()
            .find(|joint| joint.face == face)
            .map(|joint| joint.neighbor)
    }

    pub fn is_free(&self, face: Face) -> bool {
        self.free_faces.contains_face(face)
    }

    /// The first fusion this cube took part in after being placed. For every
    /// cube but the first this is the placement it was attached with.
    pub fn placement(&self) -> Option<&CubeJoint> {
        self.joints.first()
    }

    /// Recompute `center` from the arena
    pub fn refresh_center(&mut self, masses: &[PointMass]) {
        let sum: Vec3 = self.mass_ids.iter().map(|&id| masses[id].position).sum();
        self.center = sum / CUBE_MASSES as f32;
    }
}

/// Lattice origin of a grid cell: the center of the cube's bottom face
pub fn cell_origin(cell: IVec3) -> Vec3 {
    cell.as_vec3() * CUBE_SIDE
}

/// Centroid of an undeformed cube in a grid cell
pub fn cell_centroid(cell: IVec3) -> Vec3 {
    cell_origin(cell) + CUBE_CENTROID
}
