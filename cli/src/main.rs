use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use flagscope_core::{App, Command as CommandDef, Context, FlagDescriptor, load_app, process_env, validate_app};
use serde::Serialize;
use tracing::{debug, info};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "flagscope")]
#[command(about = "Validate flag definitions and resolve argv across command lineages")]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. debug, flagscope_core=trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more application definition files.
    Validate(ValidateArgs),
    /// Resolve an argv against a definition and print the context lineage.
    Resolve(ResolveArgs),
    /// List the flags declared for a command path.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition files (.yaml, .yml or .json).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Application definition file.
    #[arg(long)]
    def: PathBuf,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Mark the root context as a shell-completion invocation.
    #[arg(long)]
    shell_complete: bool,
    /// Skip required-flag checks at every level.
    #[arg(long)]
    no_required_check: bool,
    /// Arguments to resolve, given after `--`.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Application definition file.
    #[arg(long)]
    def: PathBuf,
    /// Command path below the application (e.g. `remote add`).
    path: Vec<String>,
}

/// One level of a resolved lineage.
#[derive(Debug, Serialize)]
struct LevelReport {
    command: String,
    set_flags: Vec<String>,
    values: BTreeMap<String, String>,
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolveReport {
    shell_complete: bool,
    flag_names: Vec<String>,
    /// Nearest level first.
    lineage: Vec<LevelReport>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Describe(args) => run_describe(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn load_valid_app(path: &Path) -> Result<App, String> {
    let app = load_app(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    let errors = validate_app(&app);
    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(format!("'{}': {}", path.display(), joined.join("; ")));
    }
    Ok(app)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = 0usize;
    for path in &args.inputs {
        let app = load_valid_app(path)?;
        commands += count_commands(&app.commands);
    }
    println!(
        "Validated {} definition file(s) with {commands} command(s).",
        args.inputs.len()
    );
    Ok(())
}

fn count_commands(commands: &[CommandDef]) -> usize {
    commands
        .iter()
        .map(|c| 1 + count_commands(&c.subcommands))
        .sum()
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let app = load_valid_app(&args.def)?;
    let check_required = !args.no_required_check;

    let root = Context::for_app(app, &args.argv, &process_env)
        .map_err(|err| err.to_string())?
        .with_shell_complete(args.shell_complete)
        .with_metadata("definition", &args.def.display().to_string());
    if check_required {
        root.check_required().map_err(|err| err.to_string())?;
    }

    let mut current = Arc::new(root);
    loop {
        let (next, rest) = {
            let Some((name, rest)) = current.args().split_first() else {
                break;
            };
            let found = match current.command() {
                Some(command) => command.find_subcommand(name),
                None => current.app().and_then(|app| app.find_command(name)),
            };
            match found {
                Some(command) => (command.clone(), rest.to_vec()),
                None => break,
            }
        };

        debug!(command = %next.name, "Entering command");
        let ctx = Context::for_command(Arc::clone(&current), next, &rest, &process_env)
            .map_err(|err| err.to_string())?;
        if check_required {
            ctx.check_required().map_err(|err| err.to_string())?;
        }
        current = Arc::new(ctx);
    }

    let report = build_report(&current);
    info!(levels = report.lineage.len(), "Resolved lineage");
    print_report(&report, args.format)
}

fn build_report(ctx: &Context) -> ResolveReport {
    let lineage = ctx
        .lineage()
        .into_iter()
        .map(|level| {
            let command = match (level.command(), level.app()) {
                (Some(command), _) => command.name.clone(),
                (None, Some(app)) => app.name.clone(),
                (None, None) => String::new(),
            };
            let values = level
                .flag_set()
                .map(|set| {
                    set.defined_names()
                        .filter_map(|name| Some((name.to_string(), set.lookup(name)?.to_string())))
                        .collect()
                })
                .unwrap_or_default();
            LevelReport {
                command,
                set_flags: level.local_flag_names(),
                values,
                args: level.args().to_vec(),
            }
        })
        .collect();

    ResolveReport {
        shell_complete: ctx.shell_complete(),
        flag_names: ctx.flag_names(),
        lineage,
    }
}

fn print_report(report: &ResolveReport, format: CliOutputFormat) -> Result<(), String> {
    match format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(report)
                .map_err(|err| format!("Failed to serialize report: {err}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Yaml => {
            let raw = serde_yaml::to_string(report)
                .map_err(|err| format!("Failed to serialize report: {err}"))?;
            print!("{raw}");
        }
        CliOutputFormat::Text => {
            for (depth, level) in report.lineage.iter().enumerate() {
                println!("[{depth}] {}", level.command);
                for (name, value) in &level.values {
                    let marker = if level.set_flags.contains(name) { "*" } else { " " };
                    println!("    {marker} {name} = {value}");
                }
                if !level.args.is_empty() {
                    println!("    args: {}", level.args.join(" "));
                }
            }
        }
    }
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let app = load_valid_app(&args.def)?;

    let mut flags: &[FlagDescriptor] = &app.flags;
    let mut title = app.name.clone();
    let mut scope: &[CommandDef] = &app.commands;
    for segment in &args.path {
        let command = scope
            .iter()
            .find(|c| c.has_name(segment))
            .ok_or_else(|| format!("Unknown command '{segment}' under '{title}'"))?;
        flags = &command.flags;
        scope = &command.subcommands;
        title = format!("{title} {}", command.name);
    }

    println!("{title}");
    if flags.is_empty() {
        println!("  (no flags)");
    }
    for flag in flags {
        println!("  {}", describe_flag(flag));
    }
    Ok(())
}

fn describe_flag(flag: &FlagDescriptor) -> String {
    let names: Vec<String> = flag
        .names()
        .map(|n| if n.len() == 1 { format!("-{n}") } else { format!("--{n}") })
        .collect();
    let mut line = format!("{} <{}>", names.join(", "), flag.kind);
    if let Some(default) = &flag.default {
        line.push_str(&format!(" (default: {default})"));
    }
    if flag.is_required() {
        line.push_str(" [required]");
    }
    if !flag.env_vars.is_empty() {
        line.push_str(&format!(" [env: {}]", flag.env_vars.join(", ")));
    }
    if let Some(usage) = &flag.usage {
        line.push_str(&format!("  {usage}"));
    }
    line
}
