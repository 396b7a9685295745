//! Coevolution of robot bodies and controllers
//!
//! Robots and controllers are evolved in alternating generations:
//! - Robots breed by crossover of their cube placements
//! - Controllers breed by segment crossover and swap mutation
//! - Controllers are split into a little league and an elite major league
//! - Every few generations the best little-league controllers are promoted
//!   and the weakest robots and controllers are replaced by fresh ones

mod coevolution;
mod league;

pub use coevolution::{Coevolution, GenerationStats, RunSummary};
pub use league::{pick_partner, sort_by_fitness, ControllerLeagues};

use serde::{Deserialize, Serialize};

/// Population sizes and schedule of a coevolution run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of robots
    pub robot_population: usize,
    /// Number of little-league controllers
    pub controller_population: usize,
    /// Controllers promoted to the major league at each promotion
    pub promotion_size: usize,
    /// Major-league controllers kept before a promotion
    pub major_league_survivors: usize,
    /// Robots kept at each promotion; the rest are replaced
    pub robot_survivors: usize,
    /// Generations between promotions
    pub promotion_interval: usize,
    /// Total generations
    pub generations: usize,
    /// Physics steps per controller/robot evaluation
    pub steps_per_evaluation: usize,
    /// Probability that a controller offspring is swap-mutated
    pub mutation_probability: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            robot_population: 10,
            controller_population: 50,
            promotion_size: 25,
            major_league_survivors: 12,
            robot_survivors: 5,
            promotion_interval: 10,
            generations: 1000,
            steps_per_evaluation: 300 * 50,
            mutation_probability: 0.5,
            seed: 42,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.robot_population == 0 || self.controller_population == 0 {
            return Err("populations must not be empty".to_string());
        }
        if self.promotion_size > self.controller_population {
            return Err(format!(
                "cannot promote {} of {} controllers",
                self.promotion_size, self.controller_population
            ));
        }
        if self.robot_survivors > self.robot_population {
            return Err(format!(
                "cannot keep {} of {} robots",
                self.robot_survivors, self.robot_population
            ));
        }
        if self.promotion_interval == 0 {
            return Err("promotion_interval must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(format!(
                "mutation_probability {} is not a probability",
                self.mutation_probability
            ));
        }
        Ok(())
    }
}
