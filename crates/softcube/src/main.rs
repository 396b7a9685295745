use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use softcube::{Coevolution, SoftcubeConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON configuration file (default: softcube.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to evolve
    #[arg(long)]
    generations: Option<usize>,

    /// Physics steps per evaluation
    #[arg(long)]
    steps: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut settings = SoftcubeConfig::load(args.config.as_deref())?;
    if let Some(generations) = args.generations {
        settings.evolution.generations = generations;
    }
    if let Some(steps) = args.steps {
        settings.evolution.steps_per_evaluation = steps;
    }
    if let Some(seed) = args.seed {
        settings.evolution.seed = seed;
    }
    settings.validate()?;

    if args.print_config {
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default())
            .context("Failed to serialize configuration")?;
        println!("{text}");
        return Ok(());
    }

    log::info!("Starting softcube");
    log::info!("  Seed: {}", settings.evolution.seed);
    log::info!("  Cubes per robot: {}", settings.assembly.cube_count);
    log::info!("  Timestep: {}", settings.physics.dt);

    let mut evolution = Coevolution::new(&settings);
    let summary = evolution.run()?;

    log::info!(
        "Finished {} generations ({} simulations)",
        summary.generations,
        summary.simulations
    );
    match &summary.best_robot {
        Some(robot) => {
            log::info!(
                "Best robot: fitness {:.4}, {} masses, {} springs",
                robot.fitness,
                robot.masses.len(),
                robot.springs.len()
            );
            for (i, cube) in robot.cubes.iter().enumerate() {
                let joined: Vec<String> = cube
                    .joints
                    .iter()
                    .map(|j| format!("{}:{}", j.neighbor, j.face))
                    .collect();
                log::info!("  Cube {i} at {} fused to [{}]", cube.cell, joined.join(", "));
            }
            if let Some(controller) = &robot.best_controller {
                for (i, osc) in controller.oscillators.iter().enumerate() {
                    log::info!(
                        "  Oscillator {i}: k={} a={} w={:.3} c={:.3}",
                        osc.k,
                        osc.a,
                        osc.w,
                        osc.c
                    );
                }
            }
        }
        None => log::warn!("No robot survived the run"),
    }

    Ok(())
}
