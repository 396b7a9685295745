//! Error types for robot assembly and simulation

use thiserror::Error;

use crate::face::Face;

/// Topology failures while assembling or validating a robot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("face {face} of cube {cube} is already fused")]
    FaceConsumed { cube: usize, face: Face },

    #[error("no cube along the {face} chain from cube {start} has that face free after {steps} steps")]
    ClashChainExhausted { start: usize, face: Face, steps: usize },

    #[error("grid cell of cube {cube} is already occupied by cube {occupant}")]
    CellOccupied { cube: usize, occupant: usize },

    #[error("no cube has a free face left")]
    NoAvailableCube,

    #[error("parent robot has {available} cubes, {required} required")]
    ParentTooSmall { available: usize, required: usize },

    #[error("cube {cube} of the parent robot has no recorded placement")]
    MissingPlacement { cube: usize },

    #[error("cube {cube} is not reachable from cube 0")]
    Disconnected { cube: usize },

    #[error("cube {cube} accounts for {free} free and {fused} fused faces")]
    FaceAccounting { cube: usize, free: usize, fused: usize },

    #[error("cube {cube} maps two local vertices to mass {mass}")]
    DuplicateMassId { cube: usize, mass: usize },

    #[error("cube {cube} references {kind} {id} outside an arena of {len}")]
    IdOutOfBounds {
        cube: usize,
        kind: &'static str,
        id: usize,
        len: usize,
    },

    #[error("spring {spring} joins mass {mass} to itself")]
    DegenerateSpring { spring: usize, mass: usize },
}

/// Failures while stepping a robot
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("controller has {oscillators} oscillators for a robot of {cubes} cubes")]
    ControllerMismatch { cubes: usize, oscillators: usize },

    #[error("spring {spring} has coincident endpoints")]
    CoincidentEndpoints { spring: usize },
}
