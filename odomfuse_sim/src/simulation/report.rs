// odomfuse_sim/src/simulation/report.rs

use std::fmt;

use odomfuse_core::geometry::Pose2d;

/// Running error statistics of one pose source against ground truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorStats {
    samples: usize,
    sum_squared_position: f64,
    max_position: f64,
    final_position: f64,
    final_heading_deg: f64,
}

impl ErrorStats {
    pub fn record(&mut self, truth: &Pose2d, estimate: &Pose2d) {
        let position = truth.translation.distance(&estimate.translation);
        self.samples += 1;
        self.sum_squared_position += position * position;
        self.max_position = self.max_position.max(position);
        self.final_position = position;
        self.final_heading_deg = (estimate.rotation - truth.rotation).degrees().abs();
    }

    pub fn rms_position(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            (self.sum_squared_position / self.samples as f64).sqrt()
        }
    }

    pub fn max_position(&self) -> f64 {
        self.max_position
    }

    pub fn final_position(&self) -> f64 {
        self.final_position
    }

    pub fn final_heading_deg(&self) -> f64 {
        self.final_heading_deg
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub seed: u64,
    pub drivetrain: &'static str,
    pub ticks: usize,
    pub duration_seconds: f64,
    pub vision_applied: usize,
    pub vision_stale: usize,
    pub final_truth: Pose2d,
    pub final_estimate: Pose2d,
    pub fused: ErrorStats,
    pub odometry_only: ErrorStats,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} drivetrain, {} ticks over {:.2} s (seed {})",
            self.drivetrain, self.ticks, self.duration_seconds, self.seed
        )?;
        writeln!(
            f,
            "vision: {} applied, {} stale",
            self.vision_applied, self.vision_stale
        )?;
        writeln!(
            f,
            "truth    ({:.3}, {:.3}, {:.1} deg)",
            self.final_truth.x(),
            self.final_truth.y(),
            self.final_truth.rotation.degrees()
        )?;
        writeln!(
            f,
            "estimate ({:.3}, {:.3}, {:.1} deg)",
            self.final_estimate.x(),
            self.final_estimate.y(),
            self.final_estimate.rotation.degrees()
        )?;
        writeln!(
            f,
            "{:<14} {:>10} {:>10} {:>10} {:>12}",
            "", "rms (m)", "max (m)", "final (m)", "heading (deg)"
        )?;
        for (label, stats) in [("fused", &self.fused), ("odometry only", &self.odometry_only)] {
            writeln!(
                f,
                "{:<14} {:>10.4} {:>10.4} {:>10.4} {:>12.2}",
                label,
                stats.rms_position(),
                stats.max_position(),
                stats.final_position(),
                stats.final_heading_deg()
            )?;
        }
        Ok(())
    }
}
