// odomfuse_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Replays a scripted drive through the localization core and reports how well the
/// fused estimate tracked ground truth compared to odometry alone.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/deadwheels_square.toml")]
    pub scenario: PathBuf,

    /// Overrides the scenario's seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only print the final report.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["odomfuse-sim", "--scenario", "a.toml", "--seed", "9", "-q"]);
        assert_eq!(cli.scenario, PathBuf::from("a.toml"));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.quiet);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["odomfuse-sim"]);
        assert_eq!(cli.seed, None);
        assert!(!cli.quiet);
    }
}
