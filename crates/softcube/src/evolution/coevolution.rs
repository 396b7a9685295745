//! Coevolution loop

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use softcube_core::{
    simulate, Controller, OscillatorPalette, PhysicsConfig, Robot, RobotAssembler,
};

use super::league::{pick_partner, sort_by_fitness, ControllerLeagues};
use super::EvolutionConfig;
use crate::config::SoftcubeConfig;

/// Snapshot after one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_robot_fitness: f32,
    pub best_controller_fitness: f32,
    pub little_league: usize,
    pub major_league: usize,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub generations: usize,
    /// Number of simulated controller/robot pairs
    pub simulations: usize,
    pub best_robot: Option<Robot>,
    pub history: Vec<GenerationStats>,
}

impl RunSummary {
    pub fn best_fitness(&self) -> f32 {
        self.best_robot.as_ref().map_or(0.0, |robot| robot.fitness)
    }
}

/// Co-evolving populations of robots and controllers
pub struct Coevolution {
    config: EvolutionConfig,
    physics: PhysicsConfig,
    palette: OscillatorPalette,
    assembler: RobotAssembler,
    rng: Xoshiro256StarStar,
    robots: Vec<Robot>,
    leagues: ControllerLeagues,
    generation: usize,
    simulations: usize,
}

impl Coevolution {
    pub fn new(settings: &SoftcubeConfig) -> Self {
        Self {
            config: settings.evolution.clone(),
            physics: settings.physics.clone(),
            palette: settings.palette.clone(),
            assembler: RobotAssembler::new(settings.physics.clone(), settings.assembly.clone()),
            rng: Xoshiro256StarStar::seed_from_u64(settings.evolution.seed),
            robots: Vec::new(),
            leagues: ControllerLeagues::default(),
            generation: 0,
            simulations: 0,
        }
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn leagues(&self) -> &ControllerLeagues {
        &self.leagues
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    fn cube_count(&self) -> usize {
        self.assembler.config.cube_count
    }

    /// Simulate one pair and credit both sides with the result
    fn evaluate(&mut self, controller: &mut Controller, robot: &mut Robot) {
        self.simulations += 1;
        match simulate(robot, controller, self.config.steps_per_evaluation, &self.physics) {
            Ok(eval) => {
                controller.record(eval.start, eval.end, eval.displacement);
                robot.record(controller, eval.displacement);
            }
            Err(e) => warn!("Evaluation aborted: {e}"),
        }
    }

    /// Evaluate one controller on every robot
    fn evaluate_controller(&mut self, controller: &mut Controller) {
        let mut robots = std::mem::take(&mut self.robots);
        for robot in &mut robots {
            self.evaluate(controller, robot);
        }
        self.robots = robots;
    }

    /// Evaluate one robot against every controller of both leagues
    fn evaluate_robot(&mut self, robot: &mut Robot) {
        let mut leagues = std::mem::take(&mut self.leagues);
        for controller in leagues.iter_mut() {
            self.evaluate(controller, robot);
        }
        self.leagues = leagues;
    }

    fn random_robot(&mut self) -> Result<Robot> {
        self.assembler
            .random(&mut self.rng)
            .context("Failed to assemble random robot")
    }

    fn random_controller(&mut self) -> Controller {
        let cube_count = self.cube_count();
        Controller::random(&mut self.rng, &self.palette, cube_count)
    }

    /// Create both populations and score every pair
    pub fn initialize(&mut self, pb: &ProgressBar) -> Result<()> {
        let mut robots = Vec::with_capacity(self.config.robot_population);
        for _ in 0..self.config.robot_population {
            robots.push(self.random_robot()?);
        }
        self.robots = robots;
        info!("Initialized {} robots", self.robots.len());

        for _ in 0..self.config.controller_population {
            let mut controller = self.random_controller();
            self.evaluate_controller(&mut controller);
            self.leagues.little.push(controller);
            pb.set_message(format!("seeding controllers {}", self.leagues.little.len()));
        }
        info!("Initialized {} controllers", self.leagues.little.len());

        self.sort();
        Ok(())
    }

    fn sort(&mut self) {
        self.leagues.sort();
        sort_by_fitness(&mut self.robots, |r| r.fitness);
    }

    /// Each robot breeds with a random partner; the offspring replaces it
    /// only if it is fitter
    pub fn evolve_robots(&mut self) {
        let parents = self.robots.clone();
        for (r, parent) in parents.iter().enumerate() {
            let Some(partner) = pick_partner(&mut self.rng, parents.len(), r) else {
                continue;
            };
            let mut offspring = match self.assembler.crossover(parent, &parents[partner]) {
                Ok(robot) => robot,
                Err(e) => {
                    warn!("Discarding offspring of robots {r} and {partner}: {e}");
                    continue;
                }
            };
            self.evaluate_robot(&mut offspring);
            if offspring.fitness > self.robots[r].fitness {
                debug!(
                    "Robot {r}: offspring {:.4} beats {:.4}",
                    offspring.fitness, self.robots[r].fitness
                );
                self.robots[r] = offspring;
            }
        }
    }

    /// Breed one league in place. Offspring replace their first parent only
    /// if fitter.
    fn evolve_league(&mut self, league: &mut [Controller]) {
        let parents = league.to_vec();
        for (i, parent) in parents.iter().enumerate() {
            let Some(partner) = pick_partner(&mut self.rng, parents.len(), i) else {
                continue;
            };
            let mut offspring = parent.crossover(&parents[partner], &self.assembler.config.cuts);
            if self.rng.gen_bool(self.config.mutation_probability) {
                offspring.mutate_swap(&mut self.rng);
            }
            self.evaluate_controller(&mut offspring);
            if offspring.fitness > parent.fitness {
                league[i] = offspring;
            }
        }
    }

    pub fn evolve_controllers(&mut self) {
        let mut little = std::mem::take(&mut self.leagues.little);
        self.evolve_league(&mut little);
        self.leagues.little = little;

        let mut major = std::mem::take(&mut self.leagues.major);
        self.evolve_league(&mut major);
        self.leagues.major = major;
    }

    /// Promote the best little-league controllers, then refill the little
    /// league and the robot population with fresh random individuals
    pub fn promote(&mut self) -> Result<()> {
        let promoted = self
            .leagues
            .promote(self.config.promotion_size, self.config.major_league_survivors);

        for _ in 0..promoted {
            let mut controller = self.random_controller();
            self.evaluate_controller(&mut controller);
            self.leagues.little.push(controller);
        }

        self.robots.truncate(self.config.robot_survivors);
        while self.robots.len() < self.config.robot_population {
            let mut robot = self.random_robot()?;
            self.evaluate_robot(&mut robot);
            self.robots.push(robot);
        }

        self.sort();
        info!(
            "Generation {}: promoted {promoted} controllers, major league now {}",
            self.generation,
            self.leagues.major.len()
        );
        Ok(())
    }

    /// Run one generation: robots on even generations, controllers on odd
    pub fn step(&mut self) -> Result<GenerationStats> {
        if self.generation % 2 == 0 {
            self.evolve_robots();
        } else {
            self.evolve_controllers();
        }
        self.sort();
        self.generation += 1;

        if self.generation % self.config.promotion_interval == 0 {
            self.promote()?;
        }

        Ok(self.stats())
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            generation: self.generation,
            best_robot_fitness: self.robots.first().map_or(0.0, |r| r.fitness),
            best_controller_fitness: self.leagues.best().map_or(0.0, |c| c.fitness),
            little_league: self.leagues.little.len(),
            major_league: self.leagues.major.len(),
        }
    }

    fn progress_style() -> Result<ProgressStyle> {
        Ok(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress template")?
            .progress_chars("█▓░"))
    }

    /// Run the configured number of generations with a terminal progress bar
    pub fn run(&mut self) -> Result<RunSummary> {
        let pb = ProgressBar::new(self.config.generations as u64);
        pb.set_style(Self::progress_style()?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        let summary = self.run_with_progress(&pb)?;
        pb.finish_with_message("Evolution complete");
        Ok(summary)
    }

    /// Run the configured number of generations, reporting to `pb`
    pub fn run_with_progress(&mut self, pb: &ProgressBar) -> Result<RunSummary> {
        info!(
            "Starting coevolution: {} generations, {} robots, {} controllers, {} steps per evaluation",
            self.config.generations,
            self.config.robot_population,
            self.config.controller_population,
            self.config.steps_per_evaluation
        );

        if self.robots.is_empty() {
            self.initialize(pb)?;
        }

        let mut history = Vec::with_capacity(self.config.generations);
        while self.generation < self.config.generations {
            let stats = self.step()?;
            pb.set_message(format!(
                "robot {:.4} / controller {:.4}",
                stats.best_robot_fitness, stats.best_controller_fitness
            ));
            pb.inc(1);
            history.push(stats);
        }

        Ok(RunSummary {
            generations: self.generation,
            simulations: self.simulations,
            best_robot: self.robots.first().cloned(),
            history,
        })
    }
}
