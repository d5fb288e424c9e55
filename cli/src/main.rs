use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use contract_schema_core::{Shape, ValidationError};
use contract_schema_service::{ContractFile, ContractSet};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "contract-schema")]
#[command(about = "Check contract files and render endpoint paths and command lines")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build every contract in a contract file and print a summary.
    Check(CheckArgs),
    /// Render the full path of an endpoint.
    Path(PathArgs),
    /// Render the full command line of a command.
    Command(CommandArgs),
    /// Validate a JSON value against one part of a contract.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Path to the YAML contract file.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, Args)]
struct PathArgs {
    /// Path to the YAML contract file.
    #[arg(long)]
    file: PathBuf,
    /// Endpoint name.
    #[arg(long)]
    endpoint: String,
    /// Params as a JSON object. Not needed with --shape-only.
    #[arg(long)]
    params: Option<String>,
    /// Comma-separated param names, in path order.
    #[arg(long, default_value = "")]
    order: String,
    /// Print the path template instead of a concrete path.
    #[arg(long)]
    shape_only: bool,
}

#[derive(Debug, Args)]
struct CommandArgs {
    /// Path to the YAML contract file.
    #[arg(long)]
    file: PathBuf,
    /// Command name.
    #[arg(long)]
    command: String,
    /// Params as a JSON object.
    #[arg(long)]
    params: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Part {
    Body,
    Params,
    Query,
    Response,
    Document,
    Full,
}

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["endpoint", "command", "document"])
))]
struct ValidateArgs {
    /// Path to the YAML contract file.
    #[arg(long)]
    file: PathBuf,
    /// Endpoint name.
    #[arg(long)]
    endpoint: Option<String>,
    /// Command name.
    #[arg(long)]
    command: Option<String>,
    /// Document name.
    #[arg(long)]
    document: Option<String>,
    /// Contract part to validate against.
    #[arg(long)]
    part: Part,
    /// Value as JSON.
    #[arg(long)]
    value: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Path(args) => run_path(args),
        Command::Command(args) => run_command(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let contracts = load_contracts(&args.file)?;
    println!(
        "Built {} contract(s) from '{}': {} endpoint(s), {} command(s), {} document(s).",
        contracts.len(),
        args.file.display(),
        contracts.endpoint_count(),
        contracts.command_count(),
        contracts.document_count()
    );
    for name in contracts.endpoint_names() {
        if let Some(endpoint) = contracts.endpoint(name) {
            println!("  endpoint {name}: {} {}", endpoint.method(), endpoint.path());
        }
    }
    for name in contracts.command_names() {
        if let Some(command) = contracts.command(name) {
            println!("  command {name}: {}", command.key());
        }
    }
    for name in contracts.document_names() {
        if let Some(document) = contracts.document(name) {
            println!("  document {name}: {}", document.full_key());
        }
    }
    Ok(())
}

fn run_path(args: PathArgs) -> Result<(), String> {
    let contracts = load_contracts(&args.file)?;
    let endpoint = contracts
        .endpoint(&args.endpoint)
        .ok_or_else(|| format!("Unknown endpoint '{}'", args.endpoint))?;
    let order = parse_csv_list(&args.order);

    let path = if args.shape_only {
        endpoint.make_full_path_shape(&order)
    } else {
        let raw = args
            .params
            .as_deref()
            .ok_or_else(|| "--params is required unless --shape-only is set".to_string())?;
        endpoint.make_full_path(&parse_json("--params", raw)?, &order)
    }
    .map_err(|err| err.to_string())?;

    println!("{path}");
    Ok(())
}

fn run_command(args: CommandArgs) -> Result<(), String> {
    let contracts = load_contracts(&args.file)?;
    let command = contracts
        .command(&args.command)
        .ok_or_else(|| format!("Unknown command '{}'", args.command))?;
    let params = parse_json("--params", &args.params)?;
    let line = command
        .make_full_path(&params)
        .map_err(|err| format!("Invalid params: {err}"))?;
    println!("{line}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let contracts = load_contracts(&args.file)?;
    let shape = select_shape(&contracts, &args)?;
    let value = parse_json("--value", &args.value)?;

    match shape.parse(&value) {
        Ok(canonical) => {
            let raw = serde_json::to_string_pretty(&canonical)
                .map_err(|err| format!("Failed to serialize value: {err}"))?;
            println!("{raw}");
            Ok(())
        }
        Err(err) => {
            print_issues(&err);
            Err(format!("Value rejected with {} issue(s)", err.len()))
        }
    }
}

fn select_shape<'a>(contracts: &'a ContractSet, args: &ValidateArgs) -> Result<&'a Shape, String> {
    if let Some(name) = &args.endpoint {
        let endpoint = contracts
            .endpoint(name)
            .ok_or_else(|| format!("Unknown endpoint '{name}'"))?;
        return match args.part {
            Part::Body => Ok(endpoint.body()),
            Part::Params => Ok(endpoint.params()),
            Part::Query => Ok(endpoint.query()),
            Part::Response => Ok(endpoint.response()),
            other => Err(format!("Endpoints have no {other:?} part")),
        };
    }
    if let Some(name) = &args.command {
        let command = contracts
            .command(name)
            .ok_or_else(|| format!("Unknown command '{name}'"))?;
        return match args.part {
            Part::Body => Ok(command.body()),
            Part::Params => Ok(command.params()),
            Part::Response => Ok(command.response()),
            other => Err(format!("Commands have no {other:?} part")),
        };
    }
    if let Some(name) = &args.document {
        let document = contracts
            .document(name)
            .ok_or_else(|| format!("Unknown document '{name}'"))?;
        return match args.part {
            Part::Document => Ok(document.document()),
            Part::Full => Ok(document.full_document()),
            other => Err(format!("Documents have no {other:?} part")),
        };
    }
    Err("Specify one of --endpoint, --command or --document".to_string())
}

fn print_issues(err: &ValidationError) {
    for issue in err.issues() {
        eprintln!("  {issue}");
    }
}

fn load_contracts(path: &Path) -> Result<ContractSet, String> {
    debug!(path = %path.display(), "Loading contracts");
    let file = ContractFile::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    file.build()
        .map_err(|err| format!("Failed to build '{}': {err}", path.display()))
}

fn parse_json(flag: &str, raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("{flag} is not valid JSON: {err}"))
}

fn parse_csv_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_list() {
        assert_eq!(parse_csv_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_csv_list("").is_empty());
    }

    #[test]
    fn test_parse_json_reports_flag() {
        let err = parse_json("--params", "{nope").unwrap_err();
        assert!(err.starts_with("--params is not valid JSON"));
    }

    #[test]
    fn test_cli_parses_validate_group() {
        let cli = Cli::try_parse_from([
            "contract-schema",
            "validate",
            "--file",
            "c.yml",
            "--document",
            "user",
            "--part",
            "full",
            "--value",
            "{}",
        ])
        .unwrap();
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.document.as_deref(), Some("user"));
                assert_eq!(args.part, Part::Full);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_validate_without_target() {
        let result = Cli::try_parse_from([
            "contract-schema",
            "validate",
            "--file",
            "c.yml",
            "--part",
            "body",
            "--value",
            "{}",
        ]);
        assert!(result.is_err());
    }
}
