//! Breathing: per-cube sinusoidal actuation of rest lengths

use crate::controller::Controller;
use crate::error::SimulationError;
use crate::robot::Robot;

/// Set every cube's springs to its oscillator's stiffness and to the rest
/// length the oscillator prescribes at time `t`.
///
/// Rest lengths are always recomputed from the un-actuated baseline, so the
/// result depends only on `t`. A spring shared by several cubes ends up
/// following the last of them in cube order.
pub fn breathe(robot: &mut Robot, controller: &Controller, t: f32) -> Result<(), SimulationError> {
    if controller.oscillators.len() != robot.cubes.len() {
        return Err(SimulationError::ControllerMismatch {
            cubes: robot.cubes.len(),
            oscillators: controller.oscillators.len(),
        });
    }

    for (cube, oscillator) in robot.cubes.iter().zip(&controller.oscillators) {
        let offset = oscillator.rest_offset(t);
        for &id in &cube.spring_ids {
            let spring = &mut robot.springs[id];
            spring.rest_length = spring.original_rest_length + offset;
            spring.stiffness = oscillator.k;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::Scaffold;
    use crate::config::PhysicsConfig;
    use crate::controller::Oscillator;
    use crate::face::Face;

    fn pair() -> Robot {
        let mut scaffold = Scaffold::new(&PhysicsConfig::default());
        scaffold.attach(0, Face::Right).unwrap();
        scaffold.finish().unwrap()
    }

    fn controller(oscillators: Vec<Oscillator>) -> Controller {
        Controller::new(oscillators)
    }

    #[test]
    fn test_breathe_idempotent() {
        let mut robot = pair();
        let osc = Oscillator {
            k: 5000.0,
            a: 0.1,
            w: std::f32::consts::PI,
            c: 0.0,
        };
        let control = controller(vec![osc, osc]);

        breathe(&mut robot, &control, 0.3).unwrap();
        let first: Vec<f32> = robot.springs.iter().map(|s| s.rest_length).collect();
        breathe(&mut robot, &control, 0.3).unwrap();
        let second: Vec<f32> = robot.springs.iter().map(|s| s.rest_length).collect();
        assert_eq!(first, second);

        // Moving time back restores the baseline instead of accumulating
        breathe(&mut robot, &control, 0.0).unwrap();
        for spring in &robot.springs {
            assert!((spring.rest_length - spring.original_rest_length).abs() < 1e-6);
        }
    }

    #[test]
    fn test_breathe_sets_stiffness_per_cube() {
        let mut robot = pair();
        let passive = Oscillator {
            k: 1000.0,
            ..Default::default()
        };
        let active = Oscillator {
            k: 10000.0,
            a: 0.12,
            w: 2.0 * std::f32::consts::PI,
            c: std::f32::consts::PI,
        };
        breathe(&mut robot, &controller(vec![passive, active]), 0.125).unwrap();

        // Springs on the shared face belong to both cubes; the later wins
        let shared = robot.cubes[1].spring_ids;
        for &id in &shared {
            assert_eq!(robot.springs[id].stiffness, 10000.0);
        }
        let only_first: Vec<usize> = robot.cubes[0]
            .spring_ids
            .iter()
            .copied()
            .filter(|id| !shared.contains(id))
            .collect();
        assert_eq!(only_first.len(), 22);
        for id in only_first {
            let spring = &robot.springs[id];
            assert_eq!(spring.stiffness, 1000.0);
            assert_eq!(spring.rest_length, spring.original_rest_length);
        }
    }

    #[test]
    fn test_breathe_rejects_mismatch() {
        let mut robot = pair();
        let err = breathe(&mut robot, &controller(vec![Oscillator::default()]), 0.0).unwrap_err();
        assert_eq!(
            err,
            SimulationError::ControllerMismatch {
                cubes: 2,
                oscillators: 1
            }
        );
    }
}
