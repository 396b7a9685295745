//! Robot assembly
//!
//! Robots are grown cube by cube on an integer grid. Each new cube is
//! attached to a free face of a placed cube, then fused to every other
//! placed cube it touches, so closed loops of cubes share all their inner
//! faces.
//!
//! Placement comes either from the RNG (a random free face of a random
//! available cube) or from two parent robots, which hand down the face each
//! cube was originally attached through.

use ahash::AHashMap;
use glam::{IVec3, Vec3};
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::config::{AssemblyConfig, PhysicsConfig};
use crate::cube::Cube;
use crate::error::AssemblyError;
use crate::face::Face;
use crate::fusion::{fuse, MassWelds, PendingCube};
use crate::lattice::{PointMass, Spring};
use crate::robot::Robot;

/// A robot under construction
///
/// Arena ids handed out here are provisional: welded masses and the springs
/// between them are merged by [`Scaffold::finish`].
#[derive(Debug, Clone)]
pub struct Scaffold {
    masses: Vec<PointMass>,
    springs: Vec<Spring>,
    welds: MassWelds,
    cubes: Vec<Cube>,
    occupancy: AHashMap<IVec3, usize>,
    available: Vec<usize>,
    point_mass: f32,
    stiffness: f32,
}

impl Scaffold {
    /// Start a robot with its first cube at the origin
    pub fn new(physics: &PhysicsConfig) -> Self {
        let mut scaffold = Self {
            masses: Vec::new(),
            springs: Vec::new(),
            welds: MassWelds::default(),
            cubes: Vec::new(),
            occupancy: AHashMap::new(),
            available: Vec::new(),
            point_mass: physics.point_mass,
            stiffness: physics.spring_stiffness,
        };
        let first = PendingCube::new(0, IVec3::ZERO).flush(
            &mut scaffold.masses,
            &mut scaffold.springs,
            &mut scaffold.welds,
            scaffold.point_mass,
            scaffold.stiffness,
        );
        scaffold.occupancy.insert(IVec3::ZERO, 0);
        scaffold.cubes.push(first);
        scaffold.available.push(0);
        scaffold
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Cubes with at least one free face, in placement order
    pub fn available_cubes(&self) -> &[usize] {
        &self.available
    }

    /// Provisional arena sizes, before welded duplicates are merged
    pub fn arena_len(&self) -> (usize, usize) {
        (self.masses.len(), self.springs.len())
    }

    /// Attach a new cube onto `face` of cube `anchor`, fuse it with every
    /// other placed cube it touches, and return its index.
    pub fn attach(&mut self, anchor: usize, face: Face) -> Result<usize, AssemblyError> {
        let index = self.cubes.len();
        let anchor_cube = self
            .cubes
            .get(anchor)
            .ok_or(AssemblyError::IdOutOfBounds {
                cube: index,
                kind: "cube",
                id: anchor,
                len: index,
            })?;
        if !anchor_cube.is_free(face) {
            return Err(AssemblyError::FaceConsumed { cube: anchor, face });
        }

        let cell = anchor_cube.cell + face.normal();
        if let Some(&occupant) = self.occupancy.get(&cell) {
            return Err(AssemblyError::CellOccupied { cube: index, occupant });
        }

        let mut pending = PendingCube::new(index, cell);
        fuse(
            &mut self.cubes[anchor],
            anchor,
            face,
            &mut pending,
            &mut self.welds,
        )?;

        // Every other touching cube, in cube-list order
        let mut neighbors: SmallVec<[(usize, Face); 6]> = Face::ALL
            .into_iter()
            .filter_map(|own| {
                self.occupancy
                    .get(&(cell + own.normal()))
                    .filter(|&&q| q != anchor)
                    .map(|&q| (q, own.antipode()))
            })
            .collect();
        neighbors.sort_unstable_by_key(|(q, _)| *q);

        for (q, their_face) in &neighbors {
            fuse(
                &mut self.cubes[*q],
                *q,
                *their_face,
                &mut pending,
                &mut self.welds,
            )?;
        }
        if !neighbors.is_empty() {
            debug!(
                "Cube {index} placed on cube {anchor} ({face}) also fused to {} more",
                neighbors.len()
            );
        }

        let cube = pending.flush(
            &mut self.masses,
            &mut self.springs,
            &mut self.welds,
            self.point_mass,
            self.stiffness,
        );
        self.occupancy.insert(cell, index);
        self.cubes.push(cube);

        if !self.cubes[index].free_faces.is_empty() {
            self.available.push(index);
        }
        let cubes = &self.cubes;
        self.available.retain(|&c| !cubes[c].free_faces.is_empty());

        trace!("Cube {index} at cell {cell}");
        Ok(index)
    }

    /// Attach a cube on a uniformly random free face of a uniformly random
    /// available cube
    pub fn attach_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, AssemblyError> {
        let anchor = *self
            .available
            .choose(rng)
            .ok_or(AssemblyError::NoAvailableCube)?;
        let faces: SmallVec<[Face; 6]> = self.cubes[anchor].free_faces.faces().collect();
        let face = *faces.choose(rng).ok_or(AssemblyError::NoAvailableCube)?;
        self.attach(anchor, face)
    }

    /// Attach a cube onto `face` of `anchor`. If that face is already taken,
    /// follow the cubes fused on it until one has the face free.
    pub fn attach_following(
        &mut self,
        anchor: usize,
        face: Face,
        max_steps: usize,
    ) -> Result<usize, AssemblyError> {
        let mut current = anchor;
        for _ in 0..=max_steps {
            let cube = self.cubes.get(current).ok_or(AssemblyError::IdOutOfBounds {
                cube: self.cubes.len(),
                kind: "cube",
                id: current,
                len: self.cubes.len(),
            })?;
            if cube.is_free(face) {
                if current != anchor {
                    debug!("Face {face} of cube {anchor} taken, attaching to cube {current} instead");
                }
                return self.attach(current, face);
            }
            current = cube.neighbor_on(face).ok_or(AssemblyError::FaceAccounting {
                cube: current,
                free: cube.free_faces.len(),
                fused: cube.joints.len(),
            })?;
        }
        Err(AssemblyError::ClashChainExhausted {
            start: anchor,
            face,
            steps: max_steps,
        })
    }

    /// Merge welded masses and the springs they duplicate, drop the robot
    /// onto the ground plane and check its topology.
    pub fn finish(mut self) -> Result<Robot, AssemblyError> {
        let raw_masses = self.masses.len();

        // Representatives are the smallest id of their group, so they are
        // always seen before the ids welded onto them
        let mut mass_map = vec![usize::MAX; raw_masses];
        let mut masses = Vec::with_capacity(raw_masses);
        for raw in 0..raw_masses {
            let root = self.welds.find(raw);
            if root == raw {
                mass_map[raw] = masses.len();
                masses.push(self.masses[raw]);
            } else {
                mass_map[raw] = mass_map[root];
            }
        }

        let mut spring_map = Vec::with_capacity(self.springs.len());
        let mut by_endpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut springs: Vec<Spring> = Vec::with_capacity(self.springs.len());
        for (raw, spring) in self.springs.iter().enumerate() {
            let m0 = mass_map[spring.m0];
            let m1 = mass_map[spring.m1];
            if m0 == m1 {
                return Err(AssemblyError::DegenerateSpring { spring: raw, mass: m0 });
            }
            let key = (m0.min(m1), m0.max(m1));
            let id = *by_endpoints.entry(key).or_insert_with(|| {
                springs.push(Spring { m0, m1, ..*spring });
                springs.len() - 1
            });
            spring_map.push(id);
        }

        for cube in &mut self.cubes {
            for id in &mut cube.mass_ids {
                *id = mass_map[*id];
            }
            for id in &mut cube.spring_ids {
                *id = spring_map[*id];
            }
        }

        let merged = raw_masses - masses.len();
        if merged > 0 {
            debug!(
                "Merged {merged} coincident masses and {} springs",
                self.springs.len() - springs.len()
            );
        }

        let mut robot = Robot::from_parts(masses, springs, self.cubes);
        let floor = robot.min_height();
        if floor.is_finite() && floor != 0.0 {
            robot.translate(Vec3::new(0.0, 0.0, -floor));
        }
        robot.validate()?;
        Ok(robot)
    }
}

/// Builds robots from the RNG or from two parents
#[derive(Debug, Clone, Default)]
pub struct RobotAssembler {
    pub physics: PhysicsConfig,
    pub config: AssemblyConfig,
}

impl RobotAssembler {
    pub fn new(physics: PhysicsConfig, config: AssemblyConfig) -> Self {
        Self { physics, config }
    }

    /// A robot grown from random placements
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Robot, AssemblyError> {
        let mut scaffold = Scaffold::new(&self.physics);
        for _ in 1..self.config.cube_count {
            scaffold.attach_random(rng)?;
        }
        scaffold.finish()
    }

    /// A robot whose cubes repeat the placements of `primary`, except for
    /// the crossover segment which follows `secondary`
    pub fn crossover(&self, primary: &Robot, secondary: &Robot) -> Result<Robot, AssemblyError> {
        let required = self.config.cube_count;
        for parent in [primary, secondary] {
            if parent.cubes.len() < required {
                return Err(AssemblyError::ParentTooSmall {
                    available: parent.cubes.len(),
                    required,
                });
            }
        }

        let mut scaffold = Scaffold::new(&self.physics);
        for i in 1..required {
            let parent = if self.config.cuts.from_second(i) {
                secondary
            } else {
                primary
            };
            let joint = parent.cubes[i]
                .placement()
                .ok_or(AssemblyError::MissingPlacement { cube: i })?;
            // A cube is always placed on an earlier one
            if joint.neighbor >= i {
                return Err(AssemblyError::MissingPlacement { cube: i });
            }
            scaffold.attach_following(joint.neighbor, joint.other_face, self.config.max_clash_steps)?;
        }
        scaffold.finish()
    }

    /// Both siblings of a crossover: the primary-led child and the
    /// secondary-led child
    pub fn crossover_pair(
        &self,
        first: &Robot,
        second: &Robot,
    ) -> (Result<Robot, AssemblyError>, Result<Robot, AssemblyError>) {
        (self.crossover(first, second), self.crossover(second, first))
    }

    /// Build a robot from parents when both are given, otherwise at random
    pub fn build<R: Rng + ?Sized>(
        &self,
        parents: Option<(&Robot, &Robot)>,
        rng: &mut R,
    ) -> Result<Robot, AssemblyError> {
        match parents {
            Some((primary, secondary)) => self.crossover(primary, secondary),
            None => self.random(rng),
        }
    }
}

/// Build a robot with default physics: by crossover when parents are given,
/// otherwise from random placements
pub fn build_robot<R: Rng + ?Sized>(
    parents: Option<(&Robot, &Robot)>,
    rng: &mut R,
) -> Result<Robot, AssemblyError> {
    RobotAssembler::default().build(parents, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FaceSet;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_top_fusion_scenario() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        let one = scaffold.attach(0, Face::Top).unwrap();
        assert_eq!(one, 1);

        let cubes = scaffold.cubes();
        assert!(!cubes[1].is_free(Face::Bottom));
        assert!(!cubes[0].is_free(Face::Top));
        for (a, b) in Face::Top.vertices().into_iter().zip(Face::Bottom.vertices()) {
            assert_eq!(cubes[1].mass_ids[b], cubes[0].mass_ids[a]);
        }

        let robot = scaffold.finish().unwrap();
        assert_eq!(robot.masses.len(), 12);
        assert_eq!(robot.springs.len(), 50);
        assert_eq!(robot.min_height(), 0.0);
    }

    #[test]
    fn test_attach_below_lifts_robot() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Bottom).unwrap();
        let robot = scaffold.finish().unwrap();

        assert_eq!(robot.min_height(), 0.0);
        assert!((robot.cubes[0].center.z - 0.75).abs() < 1e-6, "First cube sits on top");
        assert!((robot.cubes[1].center.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_attach_consumed_face_rejected() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Right).unwrap();
        assert_eq!(
            scaffold.attach(0, Face::Right),
            Err(AssemblyError::FaceConsumed {
                cube: 0,
                face: Face::Right
            })
        );
    }

    #[test]
    fn test_closed_square_fuses_all_neighbors() {
        // 2x2 square in the ground plane: the last cube touches two others
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Right).unwrap(); // (1,0,0)
        scaffold.attach(0, Face::Back).unwrap(); // (0,1,0)
        let last = scaffold.attach(1, Face::Back).unwrap(); // (1,1,0)

        let cubes = scaffold.cubes();
        assert_eq!(cubes[last].joints.len(), 2);
        assert_eq!(cubes[last].neighbor_on(Face::Front), Some(1));
        assert_eq!(cubes[last].neighbor_on(Face::Left), Some(2));
        assert_eq!(cubes[2].neighbor_on(Face::Right), Some(last));

        let robot = scaffold.finish().unwrap();
        // 3x3 grid of vertex columns, two layers
        assert_eq!(robot.masses.len(), 18);
    }

    fn assert_no_duplicates(robot: &Robot) {
        for (i, a) in robot.masses.iter().enumerate() {
            for b in &robot.masses[i + 1..] {
                assert!(
                    a.position.distance(b.position) > 1e-4,
                    "Coincident masses at {}",
                    a.position
                );
            }
        }
        let mut pairs: Vec<(usize, usize)> = robot
            .springs
            .iter()
            .map(|s| (s.m0.min(s.m1), s.m0.max(s.m1)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), robot.springs.len(), "No duplicate springs");
    }

    #[test]
    fn test_upright_square() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Right).unwrap(); // (1,0,0)
        scaffold.attach(0, Face::Top).unwrap(); // (0,0,1)
        scaffold.attach(1, Face::Top).unwrap(); // (1,0,1) touches 1 and 2

        let robot = scaffold.finish().unwrap();
        // 3x3 vertex grid in x/z, two layers in y
        assert_eq!(robot.masses.len(), 18);
        assert_no_duplicates(&robot);
    }

    #[test]
    fn test_edge_contact_is_welded() {
        // Walk around cube 0 so that cube 4 meets it only along an edge, with
        // one of the two edge vertices copied rather than shared
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Back).unwrap(); // (0,1,0)
        scaffold.attach(1, Face::Top).unwrap(); // (0,1,1)
        scaffold.attach(2, Face::Right).unwrap(); // (1,1,1)
        scaffold.attach(3, Face::Front).unwrap(); // (1,0,1)
        assert_eq!(scaffold.arena_len().0, 24);

        // The bridge below cube 4 fuses with both and welds the copy
        let bridge = scaffold.attach(0, Face::Right).unwrap(); // (1,0,0)
        assert_eq!(scaffold.cubes()[bridge].joints.len(), 2);
        assert_eq!(scaffold.arena_len().0, 26);

        let robot = scaffold.finish().unwrap();
        assert_eq!(robot.masses.len(), 25);
        assert_no_duplicates(&robot);
        assert_eq!(
            robot.cubes[4].mass_ids[0], robot.cubes[0].mass_ids[7],
            "Edge vertex resolves to the first cube's mass"
        );
    }

    #[test]
    fn test_attach_following_walks_chain() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Top).unwrap();
        scaffold.attach(1, Face::Top).unwrap();

        let index = scaffold.attach_following(0, Face::Top, 14).unwrap();
        assert_eq!(index, 3);
        assert_eq!(scaffold.cubes()[3].cell, IVec3::new(0, 0, 3));
        assert_eq!(scaffold.cubes()[3].neighbor_on(Face::Bottom), Some(2));
    }

    #[test]
    fn test_attach_following_bounded() {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Top).unwrap();
        scaffold.attach(1, Face::Top).unwrap();

        assert_eq!(
            scaffold.attach_following(0, Face::Top, 1),
            Err(AssemblyError::ClashChainExhausted {
                start: 0,
                face: Face::Top,
                steps: 1
            })
        );
    }

    #[test]
    fn test_random_robot() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);
        let robot = RobotAssembler::default().random(&mut rng).unwrap();

        assert_eq!(robot.cubes.len(), 14);
        assert!(robot.masses.len() < 112);
        assert_eq!(robot.min_height(), 0.0);
        for &c in &robot.available_cubes {
            assert_ne!(robot.cubes[c].free_faces, FaceSet::empty());
        }
    }

    #[test]
    fn test_random_robot_deterministic() {
        let assembler = RobotAssembler::default();
        let mut rng1 = Xoshiro256StarStar::seed_from_u64(99);
        let mut rng2 = Xoshiro256StarStar::seed_from_u64(99);
        assert_eq!(
            assembler.random(&mut rng1).unwrap(),
            assembler.random(&mut rng2).unwrap()
        );
    }

    #[test]
    fn test_crossover_of_identical_parents_is_clone() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let assembler = RobotAssembler::default();
        let parent = assembler.random(&mut rng).unwrap();

        let child = assembler.crossover(&parent, &parent).unwrap();
        assert_eq!(child.masses.len(), parent.masses.len());
        assert_eq!(child.springs.len(), parent.springs.len());
        for (a, b) in child.cubes.iter().zip(&parent.cubes) {
            assert_eq!(a.cell, b.cell);
            assert_eq!(a.free_faces, b.free_faces);
        }
    }

    #[test]
    fn test_crossover_rejects_small_parent() {
        let assembler = RobotAssembler::default();
        let tiny = Scaffold::new(&assembler.physics).finish().unwrap();
        assert_eq!(
            assembler.crossover(&tiny, &tiny),
            Err(AssemblyError::ParentTooSmall {
                available: 1,
                required: 14
            })
        );
    }

    #[test]
    fn test_build_robot_dispatch() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(8);
        let p1 = build_robot(None, &mut rng).unwrap();
        let p2 = build_robot(None, &mut rng).unwrap();
        let child = build_robot(Some((&p1, &p2)), &mut rng).unwrap();
        assert_eq!(child.cubes.len(), 14);
    }
}
