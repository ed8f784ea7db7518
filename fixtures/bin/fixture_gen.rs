//! Fixture generator for the fork accountability monitor
//!
//! Writes `config.yaml` for the monitor and `config_<id>.yaml` for every
//! validator into the output directory (the current directory by default).
//!
//! ```bash
//! fixture-gen -N 4 -M 1
//! fixture-gen -N 7 -M 3 --output-dir fixtures --plan
//! ```

use accountability_fixtures::{generate, GeneratorConfig, PartitionPlan};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("fixture-gen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate validator and monitor fixtures for the fork accountability monitor")
        .arg(Arg::new("validators")
            .short('N')
            .long("validators")
            .value_name("N")
            .help("Number of validators")
            .required(true)
            .value_parser(value_parser!(u32)))
        .arg(Arg::new("rounds")
            .short('M')
            .long("rounds")
            .value_name("M")
            .help("Number of rounds")
            .required(true)
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("TOML file with generator overrides; -N/-M and the other flags take precedence over its keys")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("output-dir")
            .short('o')
            .long("output-dir")
            .value_name("DIR")
            .help("Directory receiving the generated files")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("start-round")
            .long("start-round")
            .value_name("ROUND")
            .help("First round of the range")
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("base-port")
            .long("base-port")
            .value_name("PORT")
            .help("Validator i listens on base-port + i")
            .value_parser(value_parser!(u16)))
        .arg(Arg::new("plan")
            .long("plan")
            .help("Print the partition plan as JSON instead of writing files")
            .action(ArgAction::SetTrue))
}

/// Start from the `--config` file (or defaults) and apply command-line flags on top
fn resolve_config(matches: &ArgMatches) -> anyhow::Result<GeneratorConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GeneratorConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GeneratorConfig::new(),
    };

    if let Some(&validators) = matches.get_one::<u32>("validators") {
        config = config.with_validators(validators);
    }
    if let Some(&rounds) = matches.get_one::<u64>("rounds") {
        config = config.with_rounds(rounds);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config = config.with_output_dir(dir.clone());
    }
    if let Some(&round) = matches.get_one::<u64>("start-round") {
        config = config.with_start_round(round);
    }
    if let Some(&port) = matches.get_one::<u16>("base-port") {
        config = config.with_base_port(port);
    }

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,accountability_fixtures=info")),
        )
        .init();

    let matches = cli().get_matches();
    let config = resolve_config(&matches)?;

    if matches.get_flag("plan") {
        let plan = PartitionPlan::build(&config).context("Failed to partition validators")?;
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    let summary = generate(&config).context("Fixture generation failed")?;
    println!(
        "Wrote {} files ({} bytes) to {}",
        summary.files_written(),
        summary.bytes_written,
        config.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_both_counts() {
        assert!(cli().try_get_matches_from(["fixture-gen", "-N", "4"]).is_err());
        assert!(cli().try_get_matches_from(["fixture-gen", "-M", "2"]).is_err());
    }

    #[test]
    fn test_cli_rejects_non_integers() {
        let result = cli().try_get_matches_from(["fixture-gen", "-N", "four", "-M", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_options() {
        let matches = cli()
            .try_get_matches_from([
                "fixture-gen",
                "-N",
                "7",
                "-M",
                "3",
                "--output-dir",
                "out",
                "--base-port",
                "9000",
                "--plan",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<u32>("validators"), Some(&7));
        assert_eq!(matches.get_one::<u64>("rounds"), Some(&3));
        assert_eq!(matches.get_one::<PathBuf>("output-dir"), Some(&PathBuf::from("out")));
        assert_eq!(matches.get_one::<u16>("base-port"), Some(&9000));
        assert!(matches.get_flag("plan"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixtures.toml");
        std::fs::write(
            &path,
            "validator_count = 10\nround_count = 5\nbase_port = 9000\nvalue2 = 30\nstart_round = 2\n",
        )
        .unwrap();

        let matches = cli()
            .try_get_matches_from([
                "fixture-gen",
                "-N",
                "7",
                "-M",
                "3",
                "--start-round",
                "4",
                "--config",
                path.to_str().unwrap(),
            ])
            .unwrap();
        let config = resolve_config(&matches).unwrap();

        // command-line counts and flags win over the file
        assert_eq!(config.validator_count, 7);
        assert_eq!(config.round_count, 3);
        assert_eq!(config.start_round, 4);
        // keys without a flag come from the file
        assert_eq!(config.base_port, 9000);
        assert_eq!(config.value2, 30);
        // keys absent from both keep their defaults
        assert_eq!(config.value1, 10);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let matches = cli()
            .try_get_matches_from(["fixture-gen", "-N", "4", "-M", "1", "--config", "/nonexistent/fixtures.toml"])
            .unwrap();
        let err = resolve_config(&matches).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixtures.toml"));
    }

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }
}
