//! Soft-body voxel robots
//!
//! This crate implements:
//! - The unit cube lattice (8 masses, 28 springs) and its face tables
//! - Cube fusion and robot assembly on an integer grid, de novo or by
//!   crossover of two parents
//! - An explicit mass-spring integrator with ground contact and friction
//! - Oscillator controllers that actuate cube rest lengths

pub mod actuation;
pub mod assembly;
pub mod config;
pub mod controller;
pub mod cube;
pub mod error;
pub mod face;
pub mod fusion;
pub mod lattice;
pub mod physics;
pub mod robot;
pub mod simulation;

// Re-export main types for convenience
pub use assembly::{build_robot, RobotAssembler, Scaffold};
pub use config::{AssemblyConfig, CrossoverCuts, OscillatorPalette, PhysicsConfig};
pub use controller::{Controller, Oscillator};
pub use cube::Cube;
pub use error::{AssemblyError, SimulationError};
pub use face::{Face, FaceSet};
pub use lattice::{PointMass, Spring};
pub use robot::Robot;
pub use simulation::{simulate, Evaluation};
