use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use intcode_core::{Engine, EngineConfig, ParamMode, Pipeline, Program, Status, Topology, Word};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "intcode-run")]
#[command(about = "Run Intcode programs and engine pipelines", long_about = None)]
struct Args {
    /// JSON engine configuration (fields: missing_mode, memory_limit).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Mode for operands whose mode digit is absent (overrides --config).
    #[arg(long, global = true, value_enum)]
    default_mode: Option<DefaultMode>,

    /// Emit a JSON report instead of plain text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Log engine suspensions, halts and pipeline passes.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single engine with the given inputs.
    Run {
        /// Program file of comma-separated integers.
        program: PathBuf,

        /// Input values, queued in order.
        #[arg(long, value_name = "N", num_args = 1.., value_delimiter = ',', allow_hyphen_values = true)]
        input: Vec<Word>,
    },
    /// Chain one engine per phase setting and drive a signal through them.
    Pipeline {
        /// Program file of comma-separated integers.
        program: PathBuf,

        /// Phase setting per stage, in stage order.
        #[arg(long, value_name = "N", num_args = 1.., value_delimiter = ',', required = true, allow_hyphen_values = true)]
        phases: Vec<Word>,

        /// Initial signal fed to the first stage.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        signal: Word,

        /// Single pass without feeding the last stage back into the first.
        #[arg(long, default_value_t = false)]
        serial: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultMode {
    Position,
    Immediate,
}

impl From<DefaultMode> for ParamMode {
    fn from(mode: DefaultMode) -> Self {
        match mode {
            DefaultMode::Position => ParamMode::Position,
            DefaultMode::Immediate => ParamMode::Immediate,
        }
    }
}

// Words are reported as decimal strings; they may not fit a JSON number.
#[derive(Serialize)]
struct RunReport {
    status: Status,
    outputs: Vec<String>,
    steps: u64,
    memory_cells: usize,
}

#[derive(Serialize)]
struct PipelineReport {
    topology: Topology,
    phases: Vec<String>,
    signal: String,
}

fn decimal(words: &[Word]) -> Vec<String> {
    words.iter().map(Word::to_string).collect()
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,intcode_core=debug")
        } else {
            EnvFilter::new("info,intcode_core=info")
        }
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(mode) = args.default_mode {
        config = config.with_missing_mode(mode.into());
    }
    Ok(config)
}

/// Parse comma-separated integers; whitespace and newlines are ignored.
fn parse_program(text: &str) -> Result<Program> {
    let words = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            token
                .parse::<Word>()
                .with_context(|| format!("word {index}: invalid integer {token:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if words.is_empty() {
        bail!("program is empty");
    }
    Ok(Program::from(words))
}

fn load_program(path: &Path) -> Result<Program> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading program {}", path.display()))?;
    parse_program(&text).with_context(|| format!("parsing program {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = load_config(&args)?;

    match &args.command {
        Command::Run { program, input } => {
            let program = load_program(program)?;
            info!(words = program.len(), inputs = input.len(), "running program");
            let mut engine = Engine::with_config(program, config);
            engine.run(input.iter().cloned())?;

            let report = RunReport {
                status: engine.status(),
                outputs: decimal(engine.outputs()),
                steps: engine.steps_executed(),
                memory_cells: engine.memory().len(),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for value in &report.outputs {
                    println!("{value}");
                }
                eprintln!("status: {} after {} steps", report.status, report.steps);
            }
        }
        Command::Pipeline {
            program,
            phases,
            signal,
            serial,
        } => {
            let program = load_program(program)?;
            let topology = if *serial {
                Topology::Serial
            } else {
                Topology::Feedback
            };
            info!(stages = phases.len(), ?topology, "running pipeline");
            let mut pipeline =
                Pipeline::new(program, phases.len(), config).with_topology(topology);
            let result = pipeline.run(phases, signal.clone())?;

            if args.json {
                let report = PipelineReport {
                    topology,
                    phases: decimal(phases),
                    signal: result.to_string(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{result}");
            }
        }
    }
    Ok(())
}
