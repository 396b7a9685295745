//! Fitness evaluation by simulation
//!
//! A run actuates and steps a copy of the robot for a fixed number of
//! steps. Time starts at zero and advances by `dt` before each step, so the
//! first actuation happens at `t = dt`.

use glam::Vec3;

use crate::actuation::breathe;
use crate::config::PhysicsConfig;
use crate::controller::Controller;
use crate::error::SimulationError;
use crate::physics;
use crate::robot::Robot;

/// Outcome of one simulated run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Robot centroid before the first step
    pub start: Vec3,
    /// Robot centroid after the last step
    pub end: Vec3,
    /// Horizontal distance between `start` and `end`
    pub displacement: f32,
}

/// Run `controller` on a copy of `robot` for `steps` steps
pub fn simulate(
    robot: &Robot,
    controller: &Controller,
    steps: usize,
    config: &PhysicsConfig,
) -> Result<Evaluation, SimulationError> {
    let mut body = robot.clone();
    run(&mut body, controller, steps, config)
}

/// Run `controller` on `robot` in place for `steps` steps
pub fn run(
    robot: &mut Robot,
    controller: &Controller,
    steps: usize,
    config: &PhysicsConfig,
) -> Result<Evaluation, SimulationError> {
    let start = robot.centroid();
    for n in 1..=steps {
        let t = n as f32 * config.dt;
        breathe(robot, controller, t)?;
        physics::step(robot, config)?;
    }
    let end = robot.centroid();
    Ok(Evaluation {
        start,
        end,
        displacement: horizontal_distance(start, end),
    })
}

/// Distance between two points projected onto the ground plane
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    (b - a).truncate().length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::Scaffold;
    use crate::controller::Oscillator;

    fn passive(n: usize) -> Controller {
        Controller::new(vec![
            Oscillator {
                k: 5000.0,
                ..Default::default()
            };
            n
        ])
    }

    #[test]
    fn test_simulate_leaves_robot_untouched() {
        let config = PhysicsConfig::default();
        let robot = Scaffold::new(&config).finish().unwrap();
        let before = robot.clone();

        let eval = simulate(&robot, &passive(1), 200, &config).unwrap();
        assert_eq!(robot, before);
        assert_eq!(eval.start, robot.centroid());
        assert!(eval.end.z < eval.start.z + 1e-3, "Gravity does not lift the robot");
    }

    #[test]
    fn test_passive_cube_stays_put() {
        let config = PhysicsConfig::default();
        let robot = Scaffold::new(&config).finish().unwrap();
        let eval = simulate(&robot, &passive(1), 2000, &config).unwrap();
        assert!(eval.displacement < 1e-3, "Moved {}", eval.displacement);
    }

    #[test]
    fn test_zero_steps() {
        let config = PhysicsConfig::default();
        let robot = Scaffold::new(&config).finish().unwrap();
        let eval = simulate(&robot, &passive(1), 0, &config).unwrap();
        assert_eq!(eval.start, eval.end);
        assert_eq!(eval.displacement, 0.0);
    }

    #[test]
    fn test_simulate_deterministic() {
        let config = PhysicsConfig::default();
        let mut scaffold = Scaffold::new(&config);
        scaffold.attach(0, crate::face::Face::Right).unwrap();
        let robot = scaffold.finish().unwrap();
        let control = Controller::new(vec![
            Oscillator {
                k: 5000.0,
                a: 0.15,
                w: 2.0 * std::f32::consts::PI,
                c: 0.0,
            },
            Oscillator {
                k: 5000.0,
                a: 0.1,
                w: 2.0 * std::f32::consts::PI,
                c: std::f32::consts::PI,
            },
        ]);

        let a = simulate(&robot, &control, 500, &config).unwrap();
        let b = simulate(&robot, &control, 500, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mismatched_controller() {
        let config = PhysicsConfig::default();
        let robot = Scaffold::new(&config).finish().unwrap();
        assert!(matches!(
            simulate(&robot, &passive(3), 10, &config),
            Err(SimulationError::ControllerMismatch { .. })
        ));
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let d = horizontal_distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 100.0));
        assert_eq!(d, 5.0);
    }
}
