//! Open-loop oscillator controllers
//!
//! A controller holds one oscillator per cube. Every spring of a cube shares
//! its oscillator: stiffness `k` and a rest length offset `a·sin(w·t + c)`.

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{CrossoverCuts, OscillatorPalette, StiffnessOption};

/// Actuation parameters of one cube
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Oscillator {
    /// Spring stiffness
    pub k: f32,
    /// Rest length amplitude
    pub a: f32,
    /// Angular frequency
    pub w: f32,
    /// Phase
    pub c: f32,
}

impl Oscillator {
    /// Draw an oscillator from the palette. Passive stiffness options
    /// produce a flat waveform.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, palette: &OscillatorPalette) -> Self {
        let stiffness = palette
            .stiffness
            .choose(rng)
            .copied()
            .unwrap_or(StiffnessOption {
                k: 0.0,
                actuated: false,
            });

        // Waveform values are drawn even for passive options so every
        // oscillator consumes the same number of draws
        let a = palette.amplitude.choose(rng).copied().unwrap_or(0.0);
        let w = palette.frequency.choose(rng).copied().unwrap_or(0.0);
        let c = palette.phase.choose(rng).copied().unwrap_or(0.0);

        if stiffness.actuated {
            Self { k: stiffness.k, a, w, c }
        } else {
            Self {
                k: stiffness.k,
                ..Default::default()
            }
        }
    }

    /// Rest length offset at time `t`
    pub fn rest_offset(&self, t: f32) -> f32 {
        self.a * (self.w * t + self.c).sin()
    }

    pub fn is_passive(&self) -> bool {
        self.a == 0.0
    }
}

/// A per-cube oscillator bank and its best evaluation so far
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Controller {
    pub oscillators: Vec<Oscillator>,
    /// Robot centroid at the start of the best evaluation
    pub start: Vec3,
    /// Robot centroid at the end of the best evaluation
    pub end: Vec3,
    /// Best displacement achieved on any robot
    pub fitness: f32,
}

impl Controller {
    pub fn new(oscillators: Vec<Oscillator>) -> Self {
        Self {
            oscillators,
            ..Default::default()
        }
    }

    /// Random controller for a robot of `cubes` cubes
    pub fn random<R: Rng + ?Sized>(rng: &mut R, palette: &OscillatorPalette, cubes: usize) -> Self {
        Self::new((0..cubes).map(|_| Oscillator::random(rng, palette)).collect())
    }

    /// One-segment crossover: oscillators in the cut segment come from
    /// `other`, the rest from `self`. The offspring starts unevaluated.
    pub fn crossover(&self, other: &Controller, cuts: &CrossoverCuts) -> Controller {
        let oscillators = self
            .oscillators
            .iter()
            .enumerate()
            .map(|(i, own)| {
                if cuts.from_second(i) {
                    other.oscillators.get(i).copied().unwrap_or(*own)
                } else {
                    *own
                }
            })
            .collect();
        Controller::new(oscillators)
    }

    /// Swap two distinct oscillators. Returns false when there are fewer
    /// than two to swap.
    pub fn mutate_swap<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let n = self.oscillators.len();
        if n < 2 {
            return false;
        }
        let i = rng.gen_range(0..n);
        // Draw from the other n - 1 positions
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        self.oscillators.swap(i, j);
        true
    }

    /// Record a run if it beats the best one so far
    pub fn record(&mut self, start: Vec3, end: Vec3, displacement: f32) -> bool {
        if displacement > self.fitness {
            self.start = start;
            self.end = end;
            self.fitness = displacement;
            true
        } else {
            false
        }
    }
}
