// odomfuse_sim/src/simulation/runner.rs

use tracing::{debug, info};

use odomfuse_core::estimation::{PoseEstimator, PoseFusion, VisionUpdate};
use odomfuse_core::odometry::Odometry;

use super::config::ScenarioConfig;
use super::motion::MotionSchedule;
use super::prng::SimulationRng;
use super::report::{ErrorStats, SimulationReport};
use super::sensors::{DeadwheelEncoders, Gyro, OmniEncoders, VisionCamera, WheelEncoders};
use crate::error::SimError;

// One progress line per simulated second.
const LOG_INTERVAL_SECONDS: f64 = 1.0;

/// Runs a scenario to completion with the given seed.
pub fn run(scenario: &ScenarioConfig, seed: u64) -> Result<SimulationReport, SimError> {
    let noise = scenario.simulation.encoder_noise_std;
    match scenario.drivetrain.omni_kinematics()? {
        Some(kinematics) => {
            let encoders = OmniEncoders::new(kinematics, noise, scenario.motion.max_wheel_speed)?;
            run_with(scenario, encoders, seed)
        }
        None => run_with(scenario, DeadwheelEncoders::new(noise)?, seed),
    }
}

fn run_with<E: WheelEncoders>(
    scenario: &ScenarioConfig,
    mut encoders: E,
    seed: u64,
) -> Result<SimulationReport, SimError> {
    let dt = scenario.simulation.tick_seconds;
    let schedule = MotionSchedule::new(&scenario.motion);
    // The epsilon keeps `8.0 / 0.02` from rounding up to an extra tick.
    let ticks = (schedule.duration() / dt - 1e-9).ceil().max(0.0) as usize;
    let log_every = ((LOG_INTERVAL_SECONDS / dt).round() as usize).max(1);

    let mut rng = SimulationRng::from_seed(seed);
    let mut gyro = Gyro::new(scenario.simulation.gyro_drift_std, dt)?;
    let mut camera = VisionCamera::new(&scenario.vision)?;

    let mut truth = scenario.simulation.start_pose();
    let gyro_angle = gyro.read(truth.rotation, &mut rng);
    let readings = encoders.readings(gyro_angle);

    let mut fused = PoseEstimator::with_config(
        encoders.kinematics().clone(),
        gyro_angle,
        readings.clone(),
        truth,
        &scenario.estimator,
    )?;
    let mut odometry = Odometry::new(encoders.kinematics().clone(), gyro_angle, readings, truth);

    info!(
        drivetrain = encoders.name(),
        ticks,
        dt,
        seed,
        "starting simulation"
    );

    let mut fused_errors = ErrorStats::default();
    let mut odometry_errors = ErrorStats::default();
    let mut vision_applied = 0;
    let mut vision_stale = 0;

    for tick in 1..=ticks {
        let start = (tick - 1) as f64 * dt;
        let now = tick as f64 * dt;

        let commanded = schedule.commanded_speeds(start, &truth.rotation, dt);
        let twist = encoders.achievable(&commanded).to_twist(dt);
        truth = truth.exp(&twist);
        encoders.advance(&twist, &mut rng);

        let gyro_angle = gyro.read(truth.rotation, &mut rng);
        let readings = encoders.readings(gyro_angle);
        let estimate = fused.update_with_time(now, gyro_angle, &readings)?;
        let odometry_pose = odometry.update(gyro_angle, &readings)?;

        for frame in camera.tick(now, &truth, &mut rng) {
            match fused.add_vision_measurement(frame.pose, frame.captured_at) {
                VisionUpdate::Applied => vision_applied += 1,
                VisionUpdate::Stale => vision_stale += 1,
                VisionUpdate::NoOdometry => {}
            }
        }

        fused_errors.record(&truth, &fused.estimated_pose());
        odometry_errors.record(&truth, &odometry_pose);

        if tick % log_every == 0 {
            debug!(
                t = now,
                truth_x = truth.x(),
                truth_y = truth.y(),
                estimate_x = estimate.x(),
                estimate_y = estimate.y(),
                gyro_drift = gyro.drift(),
                "tick"
            );
        }
    }

    let report = SimulationReport {
        seed,
        drivetrain: encoders.name(),
        ticks,
        duration_seconds: ticks as f64 * dt,
        vision_applied,
        vision_stale,
        final_truth: truth,
        final_estimate: fused.estimated_pose(),
        fused: fused_errors,
        odometry_only: odometry_errors,
    };
    info!(
        fused_rms = report.fused.rms_position(),
        odometry_rms = report.odometry_only.rms_position(),
        "simulation finished"
    );
    Ok(report)
}
