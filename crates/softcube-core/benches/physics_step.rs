use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use softcube_core::{
    actuation::breathe, physics, Controller, OscillatorPalette, PhysicsConfig, RobotAssembler,
};

fn bench_step(c: &mut Criterion) {
    let config = PhysicsConfig::default();
    let mut rng = Xoshiro256StarStar::seed_from_u64(1);
    let robot = match RobotAssembler::default().random(&mut rng) {
        Ok(robot) => robot,
        Err(e) => panic!("assembly failed: {e}"),
    };
    let controller = Controller::random(&mut rng, &OscillatorPalette::default(), robot.cubes.len());

    c.bench_function("breathe_and_step_14_cubes", |b| {
        let mut body = robot.clone();
        let mut t = 0.0;
        b.iter(|| {
            t += config.dt;
            breathe(&mut body, &controller, t).ok();
            physics::step(black_box(&mut body), &config).ok();
        })
    });

    c.bench_function("assemble_random_robot", |b| {
        let assembler = RobotAssembler::default();
        b.iter(|| assembler.random(&mut rng).ok())
    });
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
