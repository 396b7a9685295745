//! Tunable constants for physics, actuation and assembly
//!
//! Every struct deserializes with `#[serde(default)]` so partial RON files
//! only override what they name.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Constants of the mass-spring integrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical gravitational acceleration (negative is down)
    pub gravity: f32,
    /// Velocity scale applied after every step (1.0 = undamped)
    pub damping: f32,
    /// Stiffness given to springs at assembly time
    pub spring_stiffness: f32,
    /// Mass of every lattice vertex
    pub point_mass: f32,
    pub static_friction: f32,
    pub kinetic_friction: f32,
    /// Penalty stiffness pushing masses out of the ground
    pub ground_stiffness: f32,
    /// Integration timestep in seconds
    pub dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            damping: 1.0,
            spring_stiffness: 5000.0,
            point_mass: 1.0,
            static_friction: 0.74,
            kinetic_friction: 0.57,
            ground_stiffness: 1e6,
            dt: 1e-4,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.dt > 0.0) {
            return Err(format!("dt must be positive, got {}", self.dt));
        }
        if !(self.point_mass > 0.0) {
            return Err(format!("point_mass must be positive, got {}", self.point_mass));
        }
        if self.static_friction < 0.0 || self.kinetic_friction < 0.0 {
            return Err("friction coefficients must not be negative".to_string());
        }
        Ok(())
    }
}

/// A stiffness choice of the oscillator palette
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessOption {
    pub k: f32,
    /// Passive options zero the waveform so the cube only sets stiffness
    pub actuated: bool,
}

/// Discrete values oscillators are drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorPalette {
    pub stiffness: Vec<StiffnessOption>,
    /// Rest length amplitudes
    pub amplitude: Vec<f32>,
    /// Angular frequencies (rad/s)
    pub frequency: Vec<f32>,
    /// Phase offsets (rad)
    pub phase: Vec<f32>,
}

impl Default for OscillatorPalette {
    fn default() -> Self {
        Self {
            stiffness: vec![
                StiffnessOption { k: 1000.0, actuated: false },
                StiffnessOption { k: 5000.0, actuated: true },
                StiffnessOption { k: 5000.0, actuated: true },
                StiffnessOption { k: 10000.0, actuated: false },
            ],
            amplitude: vec![0.1, 0.12, 0.15],
            frequency: vec![PI, 2.0 * PI],
            phase: vec![0.0, PI],
        }
    }
}

impl OscillatorPalette {
    pub fn validate(&self) -> Result<(), String> {
        if self.stiffness.is_empty() {
            return Err("palette has no stiffness options".to_string());
        }
        let actuated = self.stiffness.iter().any(|option| option.actuated);
        if actuated
            && (self.amplitude.is_empty() || self.frequency.is_empty() || self.phase.is_empty())
        {
            return Err("actuated stiffness options need amplitude, frequency and phase values".to_string());
        }
        Ok(())
    }
}

/// Segment boundaries for one-segment crossover: indices in
/// `[first, second)` come from the second parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverCuts {
    pub first: usize,
    pub second: usize,
}

impl Default for CrossoverCuts {
    fn default() -> Self {
        Self { first: 5, second: 10 }
    }
}

impl CrossoverCuts {
    /// Whether index `i` is taken from the second parent
    pub fn from_second(&self, i: usize) -> bool {
        i >= self.first && i < self.second
    }
}

/// Robot shape constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Number of cubes in every robot
    pub cube_count: usize,
    pub cuts: CrossoverCuts,
    /// Longest neighbour chain walked when an inherited face is taken
    pub max_clash_steps: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            cube_count: 14,
            cuts: CrossoverCuts::default(),
            max_clash_steps: 14,
        }
    }
}

impl AssemblyConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.cube_count == 0 {
            return Err("cube_count must be at least 1".to_string());
        }
        if self.cuts.first > self.cuts.second || self.cuts.second > self.cube_count {
            return Err(format!(
                "crossover cuts {}..{} do not fit {} cubes",
                self.cuts.first, self.cuts.second, self.cube_count
            ));
        }
        Ok(())
    }
}
