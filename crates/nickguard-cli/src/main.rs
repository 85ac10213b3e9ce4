use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use nickguard_core::{CollisionGuard, GuardConfig, Verdict};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to the TOML configuration");

    Command::new("nickguard")
        .version(nickguard_core::VERSION)
        .about("Validate handle equivalence rules and probe collisions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("validate")
                .about("Load and activate a configuration")
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("canonicalize")
                .about("Print the canonical form of handles")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("handles")
                        .required(true)
                        .num_args(1..)
                        .help("Handles to fold"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check a proposed handle against a registry")
                .arg(config_arg)
                .arg(
                    Arg::new("current")
                        .long("current")
                        .required(true)
                        .help("Requester's current handle"),
                )
                .arg(
                    Arg::new("registry")
                        .long("registry")
                        .value_parser(value_parser!(PathBuf))
                        .help("File with one registered handle per line"),
                )
                .arg(
                    Arg::new("handle")
                        .long("handle")
                        .action(ArgAction::Append)
                        .help("Registered handle (repeatable)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(Arg::new("proposed").required(true).help("Requested handle")),
        )
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("validate", args)) => validate(args),
        Some(("canonicalize", args)) => canonicalize(args),
        Some(("check", args)) => check(args),
        _ => unreachable!("subcommand is required"),
    }
}

fn load_guard(args: &ArgMatches) -> Result<(GuardConfig, CollisionGuard)> {
    let path = args
        .get_one::<PathBuf>("config")
        .context("--config is required")?;
    let config = GuardConfig::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let guard = CollisionGuard::from_config(&config)
        .with_context(|| format!("activating {}", path.display()))?;
    tracing::debug!(path = %path.display(), generation = guard.generation(), "guard ready");
    Ok((config, guard))
}

fn validate(args: &ArgMatches) -> Result<ExitCode> {
    let (config, guard) = load_guard(args)?;
    let snapshot = guard.snapshot();

    println!("configuration ok");
    println!("  strength:      {}", config.strength);
    if !config.locale.is_empty() {
        println!("  locale:        {}", config.locale);
    }
    println!("  groups:        {}", config.groups.len());
    println!(
        "  substitutions: {}",
        snapshot.identity().canonicalizer().table().substitution_count()
    );
    println!("  max handle:    {}", config.limits.max_handle_len);
    Ok(ExitCode::SUCCESS)
}

fn canonicalize(args: &ArgMatches) -> Result<ExitCode> {
    let (_, guard) = load_guard(args)?;
    let mut failed = false;

    for handle in args.get_many::<String>("handles").into_iter().flatten() {
        match guard.canonical_form(handle) {
            Ok(canonical) => println!("{handle} -> {canonical}"),
            Err(failure) => {
                failed = true;
                println!("{handle} -> error: {failure}");
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn check(args: &ArgMatches) -> Result<ExitCode> {
    let verdict = run_check(args)?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        match &verdict {
            Verdict::Accept => println!("accept"),
            Verdict::Reject(rejection) => println!("reject: {rejection}"),
        }
    }

    Ok(if verdict.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_check(args: &ArgMatches) -> Result<Verdict> {
    let (_, guard) = load_guard(args)?;

    let proposed = args
        .get_one::<String>("proposed")
        .context("proposed handle is required")?;
    let current = args
        .get_one::<String>("current")
        .context("--current is required")?;

    let mut registry: Vec<String> = match args.get_one::<PathBuf>("registry") {
        Some(path) => read_registry(path)?,
        None => Vec::new(),
    };
    registry.extend(args.get_many::<String>("handle").into_iter().flatten().cloned());

    Ok(guard.check(proposed, current, &registry))
}

/// One handle per line; surrounding whitespace and blank lines ignored
fn read_registry(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading registry {}", path.display()))?;
    Ok(parse_registry(&text))
}

fn parse_registry(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn registry_skips_blank_lines() {
        let handles = parse_registry("Alice\n\n  Bob  \n\t\n");
        assert_eq!(handles, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn check_arguments_parse() {
        let matches = cli()
            .try_get_matches_from([
                "nickguard", "check", "--config", "g.toml", "--current", "Charlie",
                "--handle", "Alice", "--handle", "Bob", "--json", "Bo8",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "check");
        assert_eq!(args.get_one::<String>("proposed").unwrap(), "Bo8");
        assert_eq!(args.get_many::<String>("handle").unwrap().count(), 2);
        assert!(args.get_flag("json"));
    }

    #[test]
    fn check_reports_rejection() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        writeln!(config, "mappings = [\"8, b\"]").unwrap();
        let path = config.path().to_str().unwrap().to_string();

        let matches = cli()
            .try_get_matches_from([
                "nickguard", "check", "--config", &path, "--current", "Charlie",
                "--handle", "Alice", "--handle", "Bob", "Bo8",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let verdict = run_check(args).unwrap();
        assert_eq!(verdict.rejection().unwrap().conflicting, "Bob");
    }

    #[test]
    fn validate_rejects_bad_strength() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        writeln!(config, "collation_strength = \"banana\"").unwrap();
        let path = config.path().to_str().unwrap().to_string();

        let matches = cli()
            .try_get_matches_from(["nickguard", "validate", "--config", &path])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let err = validate(args).unwrap_err();
        assert!(format!("{err:#}").contains("banana"));
    }
}
