// odomfuse_sim/src/simulation/sensors.rs

use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;

use odomfuse_core::geometry::{ChassisSpeeds, Pose2d, Rotation2d, Translation2d, Twist2d};
use odomfuse_core::kinematics::{
    DeadwheelKinematics, DeadwheelPositions, Kinematics, OmniWheelKinematics, OmniWheelPositions,
};

use super::config::Vision;
use super::prng::SimulationRng;
use crate::error::SimError;

fn gaussian(std_dev: f64, what: &str) -> Result<Normal<f64>, SimError> {
    Normal::new(0.0, std_dev)
        .map_err(|e| SimError::InvalidScenario(format!("{what} noise: {e}")))
}

// =========================================================================
// == Wheel Encoders ==
// =========================================================================

/// Turns true chassis motion into the raw readings a drivetrain reports.
pub trait WheelEncoders {
    type Kinematics: Kinematics + Clone;

    fn kinematics(&self) -> &Self::Kinematics;

    /// Current cumulative readings, with `gyro` folded in where the reading carries one.
    fn readings(&self, gyro: Rotation2d) -> <Self::Kinematics as Kinematics>::Positions;

    /// The chassis speeds the drivetrain can actually produce for a command.
    fn achievable(&mut self, commanded: &ChassisSpeeds) -> ChassisSpeeds {
        *commanded
    }

    /// Accumulates the wheel travel caused by the robot-frame motion `twist`.
    fn advance(&mut self, twist: &Twist2d, rng: &mut SimulationRng);

    fn name(&self) -> &'static str;
}

/// Two perpendicular tracking wheels through the robot center.
#[derive(Debug, Clone)]
pub struct DeadwheelEncoders {
    kinematics: DeadwheelKinematics,
    x: f64,
    y: f64,
    noise: Normal<f64>,
}

impl DeadwheelEncoders {
    pub fn new(noise_std: f64) -> Result<Self, SimError> {
        Ok(Self {
            kinematics: DeadwheelKinematics::new(),
            x: 0.0,
            y: 0.0,
            noise: gaussian(noise_std, "encoder")?,
        })
    }
}

impl WheelEncoders for DeadwheelEncoders {
    type Kinematics = DeadwheelKinematics;

    fn kinematics(&self) -> &DeadwheelKinematics {
        &self.kinematics
    }

    fn readings(&self, gyro: Rotation2d) -> DeadwheelPositions {
        DeadwheelPositions::new(self.x, self.y, gyro)
    }

    fn advance(&mut self, twist: &Twist2d, rng: &mut SimulationRng) {
        self.x += twist.dx + self.noise.sample(&mut rng.0);
        self.y += twist.dy + self.noise.sample(&mut rng.0);
    }

    fn name(&self) -> &'static str {
        "deadwheels"
    }
}

/// An omni-wheel array. Each wheel rolls the projection of its contact point's motion
/// onto its rolling direction.
#[derive(Debug, Clone)]
pub struct OmniEncoders {
    kinematics: OmniWheelKinematics,
    positions: Vec<f64>,
    noise: Normal<f64>,
    max_wheel_speed: Option<f64>,
}

impl OmniEncoders {
    pub fn new(
        kinematics: OmniWheelKinematics,
        noise_std: f64,
        max_wheel_speed: Option<f64>,
    ) -> Result<Self, SimError> {
        Ok(Self {
            positions: vec![0.0; kinematics.wheel_count()],
            kinematics,
            noise: gaussian(noise_std, "encoder")?,
            max_wheel_speed,
        })
    }
}

impl WheelEncoders for OmniEncoders {
    type Kinematics = OmniWheelKinematics;

    fn kinematics(&self) -> &OmniWheelKinematics {
        &self.kinematics
    }

    fn readings(&self, _gyro: Rotation2d) -> OmniWheelPositions {
        OmniWheelPositions::new(self.positions.clone())
    }

    fn achievable(&mut self, commanded: &ChassisSpeeds) -> ChassisSpeeds {
        let Some(max_speed) = self.max_wheel_speed else {
            return *commanded;
        };
        let wheel_speeds = self
            .kinematics
            .to_wheel_speeds_about(commanded, &Translation2d::zero())
            .map(|speeds| speeds.desaturate(max_speed));
        match wheel_speeds {
            Ok(speeds) => self
                .kinematics
                .to_chassis_speeds(&speeds)
                .unwrap_or(*commanded),
            Err(_) => *commanded,
        }
    }

    fn advance(&mut self, twist: &Twist2d, rng: &mut SimulationRng) {
        let travel = self
            .kinematics
            .to_wheel_speeds(&ChassisSpeeds::new(twist.dx, twist.dy, twist.dtheta));
        for (position, delta) in self.positions.iter_mut().zip(travel.as_slice()) {
            *position += delta + self.noise.sample(&mut rng.0);
        }
    }

    fn name(&self) -> &'static str {
        "omni"
    }
}

// =========================================================================
// == Gyro ==
// =========================================================================

/// A heading sensor whose bias performs a random walk.
#[derive(Debug, Clone)]
pub struct Gyro {
    drift: f64,
    drift_step: Normal<f64>,
}

impl Gyro {
    /// `drift_std` is in rad per sqrt(second); `dt` is the interval between reads.
    pub fn new(drift_std: f64, dt: f64) -> Result<Self, SimError> {
        Ok(Self {
            drift: 0.0,
            drift_step: gaussian(drift_std * dt.sqrt(), "gyro")?,
        })
    }

    /// Reads the gyro once; call exactly once per tick.
    pub fn read(&mut self, true_heading: Rotation2d, rng: &mut SimulationRng) -> Rotation2d {
        self.drift += self.drift_step.sample(&mut rng.0);
        true_heading + Rotation2d::from_radians(self.drift)
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }
}

// =========================================================================
// == Vision ==
// =========================================================================

/// A vision pose as delivered to the estimator, stamped with its capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionSample {
    pub captured_at: f64,
    pub pose: Pose2d,
}

/// A periodic, noisy, delayed absolute pose sensor.
#[derive(Debug, Clone)]
pub struct VisionCamera {
    enabled: bool,
    period: f64,
    latency: f64,
    noise: [Normal<f64>; 3],
    next_capture: f64,
    in_flight: VecDeque<(f64, VisionSample)>,
}

impl VisionCamera {
    pub fn new(config: &Vision) -> Result<Self, SimError> {
        let [x, y, heading] = config.noise_std_devs;
        Ok(Self {
            enabled: config.enabled,
            period: config.period,
            latency: config.latency,
            noise: [
                gaussian(x, "vision x")?,
                gaussian(y, "vision y")?,
                gaussian(heading, "vision heading")?,
            ],
            next_capture: config.period,
            in_flight: VecDeque::new(),
        })
    }

    /// Captures a frame if one is due at `now` and returns every frame whose latency has
    /// elapsed, oldest first.
    pub fn tick(&mut self, now: f64, truth: &Pose2d, rng: &mut SimulationRng) -> Vec<VisionSample> {
        if !self.enabled {
            return Vec::new();
        }

        if now >= self.next_capture {
            let pose = Pose2d::new(
                truth.x() + self.noise[0].sample(&mut rng.0),
                truth.y() + self.noise[1].sample(&mut rng.0),
                truth.rotation + Rotation2d::from_radians(self.noise[2].sample(&mut rng.0)),
            );
            let sample = VisionSample {
                captured_at: now,
                pose,
            };
            self.in_flight.push_back((now + self.latency, sample));
            while self.next_capture <= now {
                self.next_capture += self.period;
            }
        }

        let mut delivered = Vec::new();
        while let Some((deliver_at, _)) = self.in_flight.front() {
            if *deliver_at > now {
                break;
            }
            if let Some((_, sample)) = self.in_flight.pop_front() {
                delivered.push(sample);
            }
        }
        delivered
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
