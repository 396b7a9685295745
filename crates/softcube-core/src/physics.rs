//! Mass-spring integrator
//!
//! One step accumulates spring forces, gravity, the ground penalty and
//! friction into every mass, then integrates with semi-implicit Euler. The
//! order is fixed: all forces must be in place before integration.

use glam::Vec3;

use crate::config::PhysicsConfig;
use crate::error::SimulationError;
use crate::lattice::{PointMass, Spring};
use crate::robot::Robot;

/// Advance a robot by one timestep of `config.dt`
pub fn step(robot: &mut Robot, config: &PhysicsConfig) -> Result<(), SimulationError> {
    reset_forces(&mut robot.masses);
    accumulate_spring_forces(&mut robot.masses, &mut robot.springs)?;
    for mass in &mut robot.masses {
        apply_gravity(mass, config);
        apply_ground_contact(mass, config);
        apply_friction(mass, config);
    }
    integrate(&mut robot.masses, config);
    robot.refresh_centers();
    Ok(())
}

pub fn reset_forces(masses: &mut [PointMass]) {
    for mass in masses {
        mass.force = Vec3::ZERO;
    }
}

/// Measure every spring and push both endpoints along its axis
pub fn accumulate_spring_forces(
    masses: &mut [PointMass],
    springs: &mut [Spring],
) -> Result<(), SimulationError> {
    for (s, spring) in springs.iter_mut().enumerate() {
        let delta = masses[spring.m0].position - masses[spring.m1].position;
        let length = delta.length();
        if length <= f32::EPSILON {
            return Err(SimulationError::CoincidentEndpoints { spring: s });
        }
        spring.length = length;

        let force = delta / length * (-spring.stiffness * (length - spring.rest_length));
        masses[spring.m0].force += force;
        masses[spring.m1].force -= force;
    }
    Ok(())
}

pub fn apply_gravity(mass: &mut PointMass, config: &PhysicsConfig) {
    mass.force.z += mass.mass * config.gravity;
}

/// Below the ground plane the vertical force is replaced by a stiff penalty
pub fn apply_ground_contact(mass: &mut PointMass, config: &PhysicsConfig) {
    if mass.position.z < 0.0 {
        mass.force.z = -mass.position.z * config.ground_stiffness;
    }
}

/// Coulomb friction for masses touching the ground, applied per axis
pub fn apply_friction(mass: &mut PointMass, config: &PhysicsConfig) {
    if mass.position.z > 0.0 {
        return;
    }
    let normal = mass.mass * config.gravity;
    if normal >= 0.0 {
        return;
    }

    let horizontal = mass.force.truncate().length();
    if horizontal < -normal * config.static_friction {
        mass.force.x = 0.0;
        mass.force.y = 0.0;
    } else {
        // `normal` is negative, so this pulls each component toward zero
        let kinetic = config.kinetic_friction * normal;
        mass.force.x += kinetic * direction(mass.force.x);
        mass.force.y += kinetic * direction(mass.force.y);
    }
}

fn direction(component: f32) -> f32 {
    if component > 0.0 {
        1.0
    } else if component < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Semi-implicit Euler: velocity first, then position from the new velocity
pub fn integrate(masses: &mut [PointMass], config: &PhysicsConfig) {
    for mass in masses {
        mass.acceleration = mass.force / mass.mass;
        mass.velocity = (mass.velocity + mass.acceleration * config.dt) * config.damping;
        mass.position += mass.velocity * config.dt;
    }
}
