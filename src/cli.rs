use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    /// Day to report and price; today when absent.
    pub date: Option<NaiveDate>,
    pub timeline_out: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut date = None;
    let mut timeline_out = None;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--date" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --date (expected YYYY-MM-DD)")?;
                let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --date \"{raw}\": {e}"))?;
                if date.replace(parsed).is_some() {
                    return Err("--date provided more than once".to_string());
                }
            }
            "--timeline-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --timeline-out (expected a file path)")?;
                if timeline_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--timeline-out provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some("demo".to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        date,
        timeline_out,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("home-twin: household appliance digital twin");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  home-twin [--scenario <path> | --preset <name>] [--date YYYY-MM-DD] [--timeline-out <path>]"
    );
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the demo preset is used.");
    eprintln!("Set RUST_LOG=debug to trace rejected candidate start times.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;
    use chrono::NaiveDate;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(args(&["--scenario", "home.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("home.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn defaults_to_demo_preset() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("demo"));
        assert!(opts.date.is_none());
    }

    #[test]
    fn parses_date_and_timeline() {
        let opts = parse_args_from(args(&["--date", "2024-01-10", "--timeline-out", "day.csv"]))
            .expect("parse should succeed");
        assert_eq!(opts.date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert!(opts.timeline_out.is_some());
    }

    #[test]
    fn rejects_bad_date() {
        assert!(parse_args_from(args(&["--date", "10/01/2024"])).is_err());
    }

    #[test]
    fn scenario_and_preset_are_exclusive() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "demo"]));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unknown_argument() {
        assert!(parse_args_from(args(&["--seed", "3"])).is_err());
    }
}
