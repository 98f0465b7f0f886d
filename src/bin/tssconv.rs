use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tssconv::grid::JsonStore;
use tssconv::pipeline::{PipelineError, PipelineRunner, Severity, StageId};
use tssconv::config;

#[derive(Parser)]
#[command(name = "tssconv", version, about = "Convert vendor compliance spreadsheets into the standardized TSS layout")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the conversion pipeline on one source document
    Convert {
        /// Source document path
        input: PathBuf,

        /// Directory for stage artifacts and the final output
        #[arg(short, long, default_value = "data/output")]
        output_dir: PathBuf,

        /// Stage numbers to run, comma separated (default: all eight)
        #[arg(short, long, value_delimiter = ',')]
        stages: Option<Vec<u8>>,
    },
    /// Run pre-flight validation only and print the findings
    Validate {
        /// Source document path
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        format!("{}=debug", config::APP_NAME)
    } else {
        config::default_log_filter()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn selection_from(numbers: Option<Vec<u8>>) -> Result<Vec<StageId>, PipelineError> {
    match numbers {
        None => Ok(StageId::ALL.to_vec()),
        Some(numbers) => numbers
            .into_iter()
            .map(|n| StageId::from_number(n).ok_or(PipelineError::UnknownStage(n)))
            .collect(),
    }
}

fn convert(input: &PathBuf, output_dir: PathBuf, stages: Option<Vec<u8>>) -> Result<(), PipelineError> {
    let runner = PipelineRunner::new(JsonStore::new(output_dir))?;
    let selection = selection_from(stages)?;

    let outcome = runner.run_stages(input, &selection, &mut |done, total, name| {
        println!("[{done}/{total}] {name}");
    })?;

    println!("Output: {}", outcome.final_output.display());
    Ok(())
}

fn validate(input: &PathBuf) -> bool {
    let store = JsonStore::new(config::default_output_dir());
    let report = tssconv::pipeline::validator::validate(&store, input);

    for finding in &report.findings {
        let tag = match finding.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        println!("[{tag}] {}", finding.message);
        if let Some(hint) = &finding.hint {
            println!("        hint: {hint}");
        }
    }
    println!("{}", if report.passed { "PASSED" } else { "FAILED" });
    report.passed
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Convert {
            input,
            output_dir,
            stages,
        } => match convert(&input, output_dir, stages) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
        Command::Validate { input } => {
            if validate(&input) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
