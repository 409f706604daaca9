//! Inspect command - print a scenario summary.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;

use flyover::scenario::Scenario;

use crate::error::CliError;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Scenario file (JSON)
    pub scenario: PathBuf,

    /// Emit the validated scenario as pretty-printed JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> Result<(), CliError> {
    let scenario = Scenario::from_path(&args.scenario)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
    } else {
        print!("{}", summary(&scenario));
    }
    Ok(())
}

/// Human-readable scenario summary.
fn summary(scenario: &Scenario) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scenario: {}", scenario.name);

    let _ = writeln!(out, "Waypoints: {}", scenario.waypoints.len());
    for (i, wp) in scenario.waypoints.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. [{:.5}, {:.5}]", i, wp[0], wp[1]);
    }

    let _ = writeln!(out, "Vehicles: {}", scenario.vehicles.len());
    for vehicle in &scenario.vehicles {
        let _ = writeln!(
            out,
            "  {:<12} {:>7.0}m path @ {:.1} m/s",
            vehicle.id,
            vehicle.path_meters(),
            vehicle.speed_mps
        );
    }

    let opts = &scenario.options;
    let _ = writeln!(
        out,
        "Tour: {}ms hops, dwell {}ms, loop {}, auto-follow {}",
        opts.hop_duration_ms, opts.dwell_ms, opts.loop_tour, opts.auto_follow
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_reads_scenario_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two-stop.json");
        std::fs::write(
            &path,
            r#"{"name": "two-stop", "waypoints": [[10.7, 59.9], [10.8, 59.95]]}"#,
        )
        .unwrap();

        let result = run(InspectArgs {
            scenario: path,
            json: true,
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_summary_lists_waypoints_and_vehicles() {
        let scenario = Scenario::from_json(
            r#"{
                "name": "two-stop",
                "waypoints": [[10.7, 59.9], [10.8, 59.95]],
                "vehicles": [
                    {"id": "bus-12", "path": [[10.7, 59.9], [10.7, 60.0]], "speed_mps": 6.0}
                ]
            }"#,
        )
        .unwrap();

        let text = summary(&scenario);
        assert!(text.contains("Scenario: two-stop"));
        assert!(text.contains("Waypoints: 2"));
        assert!(text.contains("bus-12"));
        assert!(text.contains("6.0 m/s"));
    }
}
