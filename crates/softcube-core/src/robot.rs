//! Assembled robots
//!
//! A robot owns one arena of masses and one of springs. Cubes index into
//! both, so a vertex shared by several cubes is a single mass.

use glam::Vec3;
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;

use crate::controller::Controller;
use crate::cube::Cube;
use crate::error::AssemblyError;
use crate::face::FaceSet;
use crate::lattice::{PointMass, Spring, CUBE_MASSES};

/// A voxel robot: deduplicated masses and springs plus the cubes they form
#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    pub masses: Vec<PointMass>,
    pub springs: Vec<Spring>,
    /// Cubes in placement order
    pub cubes: Vec<Cube>,
    /// Cubes that still have at least one free face
    pub available_cubes: Vec<usize>,
    /// Best displacement achieved with any controller
    pub fitness: f32,
    pub best_controller: Option<Controller>,
    /// Centroid of all masses
    pub center: Vec3,
}

impl Robot {
    pub(crate) fn from_parts(masses: Vec<PointMass>, springs: Vec<Spring>, cubes: Vec<Cube>) -> Self {
        let available_cubes = cubes
            .iter()
            .enumerate()
            .filter(|(_, cube)| !cube.free_faces.is_empty())
            .map(|(i, _)| i)
            .collect();
        let mut robot = Self {
            masses,
            springs,
            cubes,
            available_cubes,
            fitness: 0.0,
            best_controller: None,
            center: Vec3::ZERO,
        };
        robot.refresh_centers();
        robot
    }

    /// Mean position of all masses
    pub fn centroid(&self) -> Vec3 {
        if self.masses.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.masses.iter().map(|m| m.position).sum();
        sum / self.masses.len() as f32
    }

    /// Copy arena positions into the cube and robot centroids
    pub fn refresh_centers(&mut self) {
        for cube in &mut self.cubes {
            cube.refresh_center(&self.masses);
        }
        self.center = self.centroid();
    }

    /// Move every mass rigidly
    pub fn translate(&mut self, offset: Vec3) {
        for mass in &mut self.masses {
            mass.position += offset;
        }
        self.refresh_centers();
    }

    /// Lowest mass height
    pub fn min_height(&self) -> f32 {
        self.masses
            .iter()
            .map(|m| m.position.z)
            .fold(f32::INFINITY, f32::min)
    }

    /// Total kinetic energy, mostly useful to check a robot has settled
    pub fn kinetic_energy(&self) -> f32 {
        self.masses
            .iter()
            .map(|m| 0.5 * m.mass * m.velocity.length_squared())
            .sum()
    }

    /// Record a controller evaluation if it beats the best one so far
    pub fn record(&mut self, controller: &Controller, displacement: f32) -> bool {
        if displacement > self.fitness {
            self.fitness = displacement;
            self.best_controller = Some(controller.clone());
            true
        } else {
            false
        }
    }

    /// Whether any two cubes share a face
    pub fn has_fused_faces(&self) -> bool {
        self.cubes.iter().any(|cube| !cube.joints.is_empty())
    }

    /// Check the topology invariants of an assembled robot
    pub fn validate(&self) -> Result<(), AssemblyError> {
        let n_masses = self.masses.len();
        let n_springs = self.springs.len();

        for (i, cube) in self.cubes.iter().enumerate() {
            let mut fused = FaceSet::empty();
            for joint in &cube.joints {
                let face = FaceSet::from(joint.face);
                if fused.intersects(face) || joint.neighbor >= self.cubes.len() {
                    return Err(AssemblyError::FaceAccounting {
                        cube: i,
                        free: cube.free_faces.len(),
                        fused: cube.joints.len(),
                    });
                }
                fused |= face;
            }
            if fused.intersects(cube.free_faces) || (fused | cube.free_faces) != FaceSet::all() {
                return Err(AssemblyError::FaceAccounting {
                    cube: i,
                    free: cube.free_faces.len(),
                    fused: cube.joints.len(),
                });
            }

            for (v, &id) in cube.mass_ids.iter().enumerate() {
                if id >= n_masses {
                    return Err(AssemblyError::IdOutOfBounds {
                        cube: i,
                        kind: "mass",
                        id,
                        len: n_masses,
                    });
                }
                if cube.mass_ids[..v].contains(&id) {
                    return Err(AssemblyError::DuplicateMassId { cube: i, mass: id });
                }
            }
            for &id in &cube.spring_ids {
                if id >= n_springs {
                    return Err(AssemblyError::IdOutOfBounds {
                        cube: i,
                        kind: "spring",
                        id,
                        len: n_springs,
                    });
                }
            }
        }

        for (s, spring) in self.springs.iter().enumerate() {
            if spring.m0 == spring.m1 {
                return Err(AssemblyError::DegenerateSpring {
                    spring: s,
                    mass: spring.m0,
                });
            }
        }

        self.check_connected()
    }

    fn check_connected(&self) -> Result<(), AssemblyError> {
        if self.cubes.len() <= 1 {
            return Ok(());
        }
        let edges = self.cubes.iter().enumerate().flat_map(|(i, cube)| {
            cube.joined_cubes()
                .map(move |j| (i as u32, j as u32))
        });
        let mut graph = UnGraph::<(), ()>::from_edges(edges);
        // from_edges only creates nodes up to the highest index it sees
        while graph.node_count() < self.cubes.len() {
            graph.add_node(());
        }
        if connected_components(&graph) == 1 {
            return Ok(());
        }

        // Find a cube that is cut off to report it
        let mut reached = vec![false; self.cubes.len()];
        let mut stack = vec![0];
        reached[0] = true;
        while let Some(i) = stack.pop() {
            for j in self.cubes[i].joined_cubes() {
                if !reached[j] {
                    reached[j] = true;
                    stack.push(j);
                }
            }
        }
        let cube = reached.iter().position(|r| !r).unwrap_or(0);
        Err(AssemblyError::Disconnected { cube })
    }

    /// Number of distinct masses a robot of `cubes` isolated cubes would have
    pub fn unfused_mass_count(cubes: usize) -> usize {
        cubes * CUBE_MASSES
    }
}
