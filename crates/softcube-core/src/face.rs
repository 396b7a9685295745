//! Face adjacency tables
//!
//! Each of the six faces of the unit cube owns 4 of the 8 local vertices and
//! 6 of the 28 local springs. Mating faces are antipodal: a cube placed on
//! the top of another mates with its bottom, and so on.
//!
//! The vertex and spring lists of antipodal faces are ordered so that entry
//! `j` of one face coincides with entry `j` of its mate once the two cubes
//! touch.

use bitflags::bitflags;
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// One of the six faces of a unit cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    /// -z
    Bottom = 0,
    /// -y
    Front = 1,
    /// -x
    Left = 2,
    /// +y
    Back = 3,
    /// +x
    Right = 4,
    /// +z
    Top = 5,
}

impl Face {
    /// All faces in index order
    pub const ALL: [Face; 6] = [
        Face::Bottom,
        Face::Front,
        Face::Left,
        Face::Back,
        Face::Right,
        Face::Top,
    ];

    /// Face for an index in 0..6
    pub fn from_index(index: usize) -> Option<Face> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The face that mates with this one on a neighbouring cube
    pub fn antipode(self) -> Face {
        match self {
            Face::Bottom => Face::Top,
            Face::Front => Face::Back,
            Face::Left => Face::Right,
            Face::Back => Face::Front,
            Face::Right => Face::Left,
            Face::Top => Face::Bottom,
        }
    }

    /// Local vertex indices lying on this face
    pub fn vertices(self) -> [usize; 4] {
        FACE_VERTICES[self.index()]
    }

    /// Local spring indices lying on this face
    pub fn springs(self) -> [usize; 6] {
        FACE_SPRINGS[self.index()]
    }

    /// Grid step from a cube to the neighbour touching this face
    pub fn normal(self) -> IVec3 {
        match self {
            Face::Bottom => IVec3::NEG_Z,
            Face::Front => IVec3::NEG_Y,
            Face::Left => IVec3::NEG_X,
            Face::Back => IVec3::Y,
            Face::Right => IVec3::X,
            Face::Top => IVec3::Z,
        }
    }

    /// Face whose neighbour sits at `offset`, if the offset is one grid step
    /// along exactly one axis
    pub fn from_offset(offset: IVec3) -> Option<Face> {
        Self::ALL.into_iter().find(|face| face.normal() == offset)
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Face::Bottom => "bottom",
            Face::Front => "front",
            Face::Left => "left",
            Face::Back => "back",
            Face::Right => "right",
            Face::Top => "top",
        };
        write!(f, "{name}")
    }
}

const FACE_VERTICES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 3, 4, 7],
    [0, 1, 4, 5],
    [1, 2, 5, 6],
    [3, 2, 7, 6],
    [4, 5, 6, 7],
];

const FACE_SPRINGS: [[usize; 6]; 6] = [
    [0, 1, 2, 3, 4, 5],
    [3, 6, 9, 10, 11, 21],
    [0, 6, 7, 12, 13, 18],
    [1, 7, 8, 14, 15, 19],
    [2, 9, 8, 17, 16, 20],
    [18, 19, 20, 21, 22, 23],
];

bitflags! {
    /// Set of faces, one bit per face index
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaceSet: u8 {
        const BOTTOM = 1 << 0;
        const FRONT = 1 << 1;
        const LEFT = 1 << 2;
        const BACK = 1 << 3;
        const RIGHT = 1 << 4;
        const TOP = 1 << 5;
    }
}

impl FaceSet {
    pub fn contains_face(self, face: Face) -> bool {
        self.contains(FaceSet::from(face))
    }

    pub fn insert_face(&mut self, face: Face) {
        self.insert(FaceSet::from(face));
    }

    pub fn remove_face(&mut self, face: Face) {
        self.remove(FaceSet::from(face));
    }

    /// Member faces in index order
    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.contains_face(*face))
    }

    /// Number of faces in the set
    pub fn len(self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl From<Face> for FaceSet {
    fn from(face: Face) -> Self {
        FaceSet::from_bits_truncate(1 << face.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{SPRING_ENDPOINTS, VERTEX_OFFSETS};
    use glam::Vec3;

    #[test]
    fn test_antipode_pairs() {
        assert_eq!(Face::Bottom.antipode(), Face::Top);
        assert_eq!(Face::Front.antipode(), Face::Back);
        assert_eq!(Face::Left.antipode(), Face::Right);
        for face in Face::ALL {
            assert_eq!(face.antipode().antipode(), face);
            assert_eq!(face.antipode().normal(), -face.normal());
        }
    }

    #[test]
    fn test_face_vertices_lie_on_face() {
        for face in Face::ALL {
            let normal = face.normal().as_vec3();
            for v in face.vertices() {
                // Project relative to the cube center; every face vertex sits
                // at +0.25 along the face normal
                let rel = VERTEX_OFFSETS[v] - Vec3::new(0.0, 0.0, 0.25);
                assert!(
                    (rel.dot(normal) - 0.25).abs() < 1e-6,
                    "Vertex {v} is not on face {face}"
                );
            }
        }
    }

    #[test]
    fn test_face_springs_join_face_vertices() {
        for face in Face::ALL {
            let vertices = face.vertices();
            for s in face.springs() {
                let (a, b) = SPRING_ENDPOINTS[s];
                assert!(
                    vertices.contains(&a) && vertices.contains(&b),
                    "Spring {s} is not on face {face}"
                );
            }
        }
    }

    #[test]
    fn test_mated_vertices_coincide() {
        for face in Face::ALL {
            let mate = face.antipode();
            let shift = face.normal().as_vec3() * 0.5;
            for (a, b) in face.vertices().into_iter().zip(mate.vertices()) {
                let here = VERTEX_OFFSETS[a];
                let there = VERTEX_OFFSETS[b] + shift;
                assert!(here.distance(there) < 1e-6, "Face {face} vertex {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_mated_springs_correspond() {
        for face in Face::ALL {
            let mate = face.antipode();
            let pairs: Vec<(usize, usize)> =
                face.vertices().into_iter().zip(mate.vertices()).collect();
            let map = |v: usize| pairs.iter().find(|(_, b)| *b == v).map(|(a, _)| *a);

            for (sa, sb) in face.springs().into_iter().zip(mate.springs()) {
                let (a0, a1) = SPRING_ENDPOINTS[sa];
                let (b0, b1) = SPRING_ENDPOINTS[sb];
                let mapped = (map(b0).unwrap(), map(b1).unwrap());
                assert!(
                    (mapped.0 == a0 && mapped.1 == a1) || (mapped.0 == a1 && mapped.1 == a0),
                    "Spring {sa} on {face} does not mate with {sb} on {mate}"
                );
            }
        }
    }

    #[test]
    fn test_from_offset() {
        assert_eq!(Face::from_offset(IVec3::X), Some(Face::Right));
        assert_eq!(Face::from_offset(IVec3::NEG_Z), Some(Face::Bottom));
        assert_eq!(Face::from_offset(IVec3::new(1, 1, 0)), None);
        assert_eq!(Face::from_offset(IVec3::ZERO), None);
        assert_eq!(Face::from_offset(IVec3::new(2, 0, 0)), None);
    }

    #[test]
    fn test_face_set() {
        let mut set = FaceSet::all();
        assert_eq!(set.len(), 6);
        set.remove_face(Face::Top);
        assert!(!set.contains_face(Face::Top));
        assert!(set.contains_face(Face::Bottom));
        assert_eq!(set.len(), 5);

        let faces: Vec<Face> = set.faces().collect();
        assert_eq!(
            faces,
            vec![Face::Bottom, Face::Front, Face::Left, Face::Back, Face::Right]
        );

        set.insert_face(Face::Top);
        assert_eq!(set, FaceSet::all());
    }

    #[test]
    fn test_from_index() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(Face::from_index(i), Some(*face));
            assert_eq!(face.index(), i);
        }
        assert_eq!(Face::from_index(6), None);
    }
}
