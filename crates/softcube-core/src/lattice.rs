//! Unit cube lattice
//!
//! Every voxel of a robot is the same 8-mass / 28-spring lattice: a cube of
//! side 0.5 spanning z in [0, 0.5], centered on the z axis. Springs cover the
//! 12 edges, 12 face diagonals and 4 body diagonals.

use glam::Vec3;

/// Number of point masses in one cube
pub const CUBE_MASSES: usize = 8;

/// Number of springs in one cube
pub const CUBE_SPRINGS: usize = 28;

/// Edge length of a unit cube
pub const CUBE_SIDE: f32 = 0.5;

const H: f32 = CUBE_SIDE / 2.0;

/// Local vertex positions. Indices 0..4 are the bottom ring, 4..8 the top
/// ring directly above them.
pub const VERTEX_OFFSETS: [Vec3; CUBE_MASSES] = [
    Vec3::new(-H, -H, 0.0),
    Vec3::new(-H, H, 0.0),
    Vec3::new(H, H, 0.0),
    Vec3::new(H, -H, 0.0),
    Vec3::new(-H, -H, CUBE_SIDE),
    Vec3::new(-H, H, CUBE_SIDE),
    Vec3::new(H, H, CUBE_SIDE),
    Vec3::new(H, -H, CUBE_SIDE),
];

/// Local spring endpoints, indexed by local spring index
pub const SPRING_ENDPOINTS: [(usize, usize); CUBE_SPRINGS] = [
    // bottom ring and diagonals
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (0, 2),
    (1, 3),
    // vertical edges
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
    // side face diagonals
    (0, 7),
    (3, 4),
    (0, 5),
    (1, 4),
    (1, 6),
    (2, 5),
    (2, 7),
    (3, 6),
    // top ring and diagonals
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (4, 6),
    (5, 7),
    // inner cross
    (0, 6),
    (2, 4),
    (1, 7),
    (3, 5),
];

/// Centroid of a cube placed at the origin
pub const CUBE_CENTROID: Vec3 = Vec3::new(0.0, 0.0, CUBE_SIDE / 2.0);

/// A point mass in the robot's arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Force accumulated during the current step
    pub force: Vec3,
}

impl PointMass {
    /// Create a mass at rest
    pub fn at_rest(mass: f32, position: Vec3) -> Self {
        Self {
            mass,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            force: Vec3::ZERO,
        }
    }
}

/// A linear spring between two masses of the arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Current rest length, rewritten by actuation
    pub rest_length: f32,
    /// Length measured during the last force pass
    pub length: f32,
    pub stiffness: f32,
    pub m0: usize,
    pub m1: usize,
    /// Un-actuated rest length, the baseline for actuation
    pub original_rest_length: f32,
}

impl Spring {
    /// Create a spring at rest between two masses
    pub fn new(m0: usize, m1: usize, rest_length: f32, stiffness: f32) -> Self {
        Self {
            rest_length,
            length: rest_length,
            stiffness,
            m0,
            m1,
            original_rest_length: rest_length,
        }
    }

    /// Whether this spring joins the given pair of masses, in either order
    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.m0 == a && self.m1 == b) || (self.m0 == b && self.m1 == a)
    }
}

/// Rest length of a local spring, measured on the template
pub fn template_rest_length(local_spring: usize) -> f32 {
    let (a, b) = SPRING_ENDPOINTS[local_spring];
    VERTEX_OFFSETS[a].distance(VERTEX_OFFSETS[b])
}

/// Instantiate the 8 template masses with the cube's local origin at `origin`
pub fn template_masses(origin: Vec3, mass: f32) -> [PointMass; CUBE_MASSES] {
    VERTEX_OFFSETS.map(|offset| PointMass::at_rest(mass, origin + offset))
}

/// Instantiate the 28 template springs with local endpoint indices
pub fn template_springs(stiffness: f32) -> [Spring; CUBE_SPRINGS] {
    let mut index = 0;
    SPRING_ENDPOINTS.map(|(a, b)| {
        let spring = Spring::new(a, b, template_rest_length(index), stiffness);
        index += 1;
        spring
    })
}
