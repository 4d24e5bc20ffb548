use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use diagnostics_tk::output::{ConsoleTable, JsonOutput, OutputSink};
use diagnostics_tk::{init_logging, Runner, RunnerConfig};

/// Exit code when the run completed but at least one probe failed.
const EXIT_PROBES_FAILED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_PROBES_FAILED),
        Err(err) => {
            eprintln!("diag-runner error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "diag-runner", about = "Run configured diagnostic probes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// `Ok(true)` when every probe passed.
    fn execute(self) -> Result<bool> {
        match self.command {
            Command::Run(args) => run_command(args),
            Command::List(args) => list_command(args).map(|()| true),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every configured probe and render the results.
    Run(RunArgs),
    /// Print the probes a run would execute, without running them.
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// JSON runner configuration.
    #[arg(long)]
    config: PathBuf,
    /// Override the configured worker count.
    #[arg(long)]
    workers: Option<usize>,
    /// How to render the results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// Write the rendered results to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Override the table title.
    #[arg(long)]
    title: Option<String>,
    /// Log debug details to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    /// JSON runner configuration.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn run_command(args: RunArgs) -> Result<bool> {
    init_logging(if args.verbose { Level::DEBUG } else { Level::INFO });

    let mut config = load_config(&args.config)?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let title = args.title.clone().or_else(|| config.title.clone());

    let collections = config.build_collections()?;
    let mut sink = build_sink(args.format, args.output.as_deref(), title)?;

    let mut runner = Runner::new(config.name.as_str(), config.workers)?;
    for (name, collection) in &collections {
        runner.register_collection(name.as_str(), collection)?;
    }
    runner.register_output("results", &mut sink)?;

    let report = runner.run()?;
    if let Some(failure) = report.sink_failures.first() {
        anyhow::bail!("output '{}' failed: {}", failure.output, failure.error);
    }
    Ok(report.all_passed())
}

fn list_command(args: ListArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let collections = config.build_collections()?;

    let mut runner = Runner::new(config.name.as_str(), config.workers)?;
    for (name, collection) in &collections {
        runner.register_collection(name.as_str(), collection)?;
    }
    for probe in runner.plan()? {
        println!("{} - {}", probe.qualified_name, probe.description);
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RunnerConfig> {
    RunnerConfig::load_from_file(path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

fn build_sink(
    format: OutputFormat,
    output: Option<&Path>,
    title: Option<String>,
) -> Result<Box<dyn OutputSink>> {
    let sink: Box<dyn OutputSink> = match (format, output) {
        (OutputFormat::Json, Some(path)) => Box::new(
            JsonOutput::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?,
        ),
        (OutputFormat::Json, None) => Box::new(JsonOutput::stdout()),
        (OutputFormat::Table, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            Box::new(with_title(ConsoleTable::with_writer(BufWriter::new(file)), title))
        }
        (OutputFormat::Table, None) => Box::new(with_title(ConsoleTable::new(), title)),
    };
    Ok(sink)
}

fn with_title<W: Write>(table: ConsoleTable<W>, title: Option<String>) -> ConsoleTable<W> {
    match title {
        Some(title) => table.with_title(title),
        None => table,
    }
}
