//! Home twin entry point: CLI wiring, committed matrix construction and
//! start-time recommendations for the scenario's test routines.

mod cli;

use std::path::Path;
use std::process;

use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::EnvFilter;

use home_twin::config::ScenarioConfig;
use home_twin::error::ScheduleError;
use home_twin::io::export::export_csv;
use home_twin::sim::{DaySummary, RoutineOptimizer, StateMatrix};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_scenario(opts: &cli::CliOptions) -> ScenarioConfig {
    let loaded = match (&opts.scenario, &opts.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::demo()),
    };
    match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn report_schedule_error(context: &str, err: &ScheduleError) {
    eprintln!("{context}: {err}");
    let culprits = err.culprits();
    if !culprits.is_empty() {
        let ids: Vec<String> = culprits.iter().map(ToString::to_string).collect();
        eprintln!("  consider disabling routine(s): {}", ids.join(", "));
    }
}

fn evaluate_test_routines(scenario: &ScenarioConfig, matrix: &StateMatrix, date: NaiveDate) {
    let (tariff, window) = match (scenario.home.tariff(), scenario.home.activity_window()) {
        (Ok(t), Ok(w)) => (t, w),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let optimizer = RoutineOptimizer::new(matrix, &tariff, date).with_window(window);

    for routine in &scenario.test_routines {
        match optimizer.find_best_start_time(routine) {
            Ok(Some(rec)) => println!("{} ({}): {rec}", routine.name, routine.id),
            Ok(None) => match matrix.add_routine(routine.clone()) {
                Ok(_) => println!("{} ({}): no recommendation", routine.name, routine.id),
                Err(e) => report_schedule_error(&format!("{} ({})", routine.name, routine.id), &e),
            },
            Err(e) => report_schedule_error(&format!("{} ({})", routine.name, routine.id), &e),
        }
    }
}

fn main() {
    init_tracing();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    let scenario = load_scenario(&opts);
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let matrix = match scenario.committed_matrix() {
        Ok(m) => m,
        Err(e) => {
            report_schedule_error("committed routines rejected", &e);
            process::exit(1);
        }
    };
    info!(
        appliances = matrix.appliances().len(),
        routines = matrix.routines().len(),
        "committed routines accepted"
    );

    let date = opts.date.unwrap_or_else(|| Local::now().date_naive());
    match scenario.home.tariff() {
        Ok(tariff) => println!("{}\n", DaySummary::from_matrix(&matrix, &tariff, date)),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }

    evaluate_test_routines(&scenario, &matrix, date);

    if let Some(ref path) = opts.timeline_out {
        if let Err(e) = export_csv(&matrix, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Timeline written to {}", path.display());
    }
}
