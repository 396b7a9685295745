//! Coevolution of soft voxel robots
//!
//! Robot bodies and their oscillator controllers are evolved together on
//! top of `softcube-core`. This crate holds the population management, the
//! layered run configuration and the command line front end.

pub mod config;
pub mod evolution;

pub use config::SoftcubeConfig;
pub use evolution::{Coevolution, EvolutionConfig, RunSummary};
