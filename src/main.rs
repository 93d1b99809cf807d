//! Smart home simulator entry point: CLI wiring and config-driven engine construction.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use smart_home_sim::SimError;
use smart_home_sim::config::ScenarioConfig;
use smart_home_sim::devices::Device;
use smart_home_sim::io::export::{DEFAULT_TEXT_EXPORT, export_csv, export_text};
use smart_home_sim::sim::scheduler::{interval_from_secs, lock_engine};
use smart_home_sim::sim::{AutomationEngine, Simulator};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<PathBuf>,
    preset: Option<String>,
    seed_override: Option<u64>,
    ticks_override: Option<u64>,
    interval_override: Option<f64>,
    export_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    json: bool,
}

fn print_help() {
    eprintln!("smart-home-sim: simulated smart home with rule-based automation");
    eprintln!();
    eprintln!("Usage: smart-home-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>    Load scenario from TOML config file");
    eprintln!("  --preset <name>      Use a built-in preset (home, dashboard)");
    eprintln!("  --seed <u64>         Override random seed");
    eprintln!("  --ticks <u64>        Number of periodic ticks to run before pausing");
    eprintln!("  --interval <secs>    Seconds between ticks");
    eprintln!("  --export [path]      Write one description line per device");
    eprintln!("                       (default path: {DEFAULT_TEXT_EXPORT})");
    eprintln!("  --csv <path>         Write a CSV device snapshot");
    eprintln!("  --json               Print the final snapshot as JSON");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the home preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Fetches the value following a flag or exits with an error.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str, expected: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {expected}");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str, ty: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid {ty}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        ticks_override: None,
        interval_override: None,
        export_path: None,
        csv_path: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                let v = flag_value(&args, i, "--scenario", "a path argument");
                cli.scenario_path = Some(v.into());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "a name argument").to_string());
            }
            "--seed" => {
                i += 1;
                let v = flag_value(&args, i, "--seed", "a u64 argument");
                cli.seed_override = Some(parse_number(v, "--seed", "u64"));
            }
            "--ticks" => {
                i += 1;
                let v = flag_value(&args, i, "--ticks", "a u64 argument");
                cli.ticks_override = Some(parse_number(v, "--ticks", "u64"));
            }
            "--interval" => {
                i += 1;
                let v = flag_value(&args, i, "--interval", "a number of seconds");
                cli.interval_override = Some(parse_number(v, "--interval", "number"));
            }
            "--export" => {
                // The path is optional: a following flag or the end of the
                // arguments selects the default file.
                match args.get(i + 1) {
                    Some(v) if !v.starts_with("--") => {
                        i += 1;
                        cli.export_path = Some(v.into());
                    }
                    _ => cli.export_path = Some(DEFAULT_TEXT_EXPORT.into()),
                }
            }
            "--csv" => {
                i += 1;
                let v = flag_value(&args, i, "--csv", "a path argument");
                cli.csv_path = Some(v.into());
            }
            "--json" => {
                cli.json = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --scenario and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = parse_args();
    init_tracing();

    // Load config: --scenario takes priority, then --preset, then the home default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::home())
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks_override {
        scenario.simulation.ticks = ticks;
    }
    if let Some(interval) = cli.interval_override {
        scenario.simulation.interval_secs = interval;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let engine = scenario.build().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let interval = interval_from_secs(scenario.simulation.interval_secs).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    let simulator = runtime
        .block_on(run(engine, interval, scenario.simulation.ticks))
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    let engine = simulator.engine();
    let engine = lock_engine(&engine);

    if cli.json {
        let snapshot = serde_json::json!({
            "ticks": engine.ticks(),
            "devices": engine.registry().iter().collect::<Vec<_>>(),
            "analysis": engine.analyze(),
        });
        match serde_json::to_string_pretty(&snapshot) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize snapshot: {e}");
                process::exit(1);
            }
        }
    } else {
        for device in engine.registry() {
            println!("{}", device.describe());
        }
        println!("\n{}", engine.analyze());
    }

    if let Some(ref path) = cli.export_path {
        if let Err(e) = export_text(engine.registry(), path) {
            eprintln!("error: failed to write export: {e}");
            process::exit(1);
        }
        eprintln!("Device descriptions written to {}", path.display());
    }
    if let Some(ref path) = cli.csv_path {
        if let Err(e) = export_csv(engine.registry(), path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Snapshot written to {}", path.display());
    }
}

/// Runs the periodic simulation until `ticks` ticks have completed, then pauses.
async fn run(
    engine: AutomationEngine,
    interval: Duration,
    ticks: u64,
) -> Result<Simulator, SimError> {
    let mut simulator = Simulator::new(engine);
    if ticks == 0 {
        return Ok(simulator);
    }
    simulator.run_periodic_simulation(interval)?;
    let reached = simulator.wait_for_ticks(ticks).await;
    simulator.pause_simulation().await;
    reached?;
    Ok(simulator)
}
