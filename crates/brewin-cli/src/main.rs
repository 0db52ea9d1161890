//! Brewin CLI
//!
//! `brewin run <file>` executes a program, `brewin check <file>` validates it.

mod stdio;

use brewin_eval::{check_source, run_source, ErrorKind, EvalConfig, RunError};
use serde::Serialize;
use std::process::ExitCode;
use stdio::StdioHost;

const USAGE: &str = "\
Usage: brewin <command> <file.br> [options]

Commands:
  run      Run the program's main()
  check    Parse and validate without running

Options:
  --max-depth <n>   Maximum nested calls (default: 10000)
  --json            Report errors as JSON on stderr

Set BREWIN_LOG (e.g. BREWIN_LOG=brewin_eval=trace) to enable tracing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Check,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    command: Command,
    path: String,
    config: EvalConfig,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let command = match args.first().map(String::as_str) {
        Some("run") => Command::Run,
        Some("check") => Command::Check,
        Some(other) => return Err(format!("unknown command '{other}'")),
        None => return Err("missing command".into()),
    };

    let mut path = None;
    let mut config = EvalConfig::default();
    let mut json = false;
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--json" {
            json = true;
        } else if arg == "--max-depth" {
            let value = rest
                .next()
                .ok_or_else(|| "--max-depth requires a value".to_string())?;
            config = config.with_max_call_depth(parse_depth(value)?);
        } else if let Some(value) = arg.strip_prefix("--max-depth=") {
            config = config.with_max_call_depth(parse_depth(value)?);
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument '{arg}'"));
        }
    }

    let path = path.ok_or_else(|| "missing file path".to_string())?;
    Ok(Options {
        command,
        path,
        config,
        json,
    })
}

fn parse_depth(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid --max-depth '{value}': expected a positive integer")),
    }
}

/// Install a subscriber only when `BREWIN_LOG` is set, so program output is
/// never mixed with log lines by default.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("BREWIN_LOG").is_ok() {
        let filter = EnvFilter::from_env("BREWIN_LOG");
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

/// JSON shape of a runtime error report.
#[derive(Debug, Serialize)]
struct RuntimeReport<'a> {
    file: &'a str,
    kind: ErrorKind,
    message: String,
}

fn report(err: &RunError, path: &str, json: bool) {
    match (err, json) {
        (RunError::Syntax(errors), true) => match serde_json::to_string_pretty(errors) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => eprint!("{errors}"),
        },
        (RunError::Syntax(errors), false) => eprint!("{errors}"),
        (RunError::Eval(eval), true) => {
            let runtime = RuntimeReport {
                file: path,
                kind: eval.kind(),
                message: eval.to_string(),
            };
            match serde_json::to_string_pretty(&runtime) {
                Ok(text) => eprintln!("{text}"),
                Err(_) => eprintln!("{path}: {eval}"),
            }
        }
        (RunError::Eval(eval), false) => eprintln!("{path}: {eval}"),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_tracing();

    let source = match std::fs::read_to_string(&options.path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", options.path);
            return ExitCode::FAILURE;
        }
    };

    let result = match options.command {
        Command::Run => {
            let mut host = StdioHost::new();
            run_source(&source, &options.path, &mut host, options.config)
        }
        Command::Check => check_source(&source, &options.path).map(|program| {
            println!(
                "{}: ok ({} function(s))",
                options.path,
                program.functions.len()
            );
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            report(&err, &options.path, options.json);
            ExitCode::FAILURE
        }
    }
}
