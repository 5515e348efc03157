use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use persona_core::model::AssessmentConfig;
use services::AssessmentEngine;
use tracing::info;

mod answers;
mod error;
mod session;
mod telemetry;

use answers::parse_answers;
use error::CliError;
use session::{SessionOutcome, run_interactive, write_summary};

#[derive(Parser, Debug)]
#[command(
    name = "persona",
    about = "Take and score personality-style assessments from a JSON config",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take the assessment interactively
    Run(RunArgs),
    /// Score a fixed list of answers and print the result as JSON
    Score(ScoreArgs),
    /// Show the questions, dimensions and thresholds of a config
    Inspect(ConfigArg),
}

#[derive(Args, Debug)]
struct ConfigArg {
    /// Assessment config file (JSON)
    #[arg(long, env = "PERSONA_CONFIG")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArg,
    /// Seed for question shuffling
    #[arg(long)]
    seed: Option<u64>,
    /// Shuffle questions before starting
    #[arg(long)]
    shuffle: bool,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[command(flatten)]
    config: ConfigArg,
    /// Comma-separated answers in question order; `-` skips a question
    #[arg(long)]
    answers: String,
}

fn load_config(path: &Path) -> Result<AssessmentConfig, CliError> {
    let config = AssessmentConfig::load(path).map_err(persona_core::Error::from)?;
    info!(
        path = %path.display(),
        test_id = %config.test_id,
        questions = config.question_count(),
        "config loaded"
    );
    Ok(config)
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config.config)?;
    let mut engine = AssessmentEngine::new(config);
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }
    engine.start();
    if args.shuffle {
        engine.shuffle_questions();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_interactive(&mut engine, stdin.lock(), &mut stdout)? {
        SessionOutcome::Completed(result) => write_summary(&engine, &result, &mut stdout)?,
        SessionOutcome::Aborted => {
            let stats = engine.stats();
            writeln!(
                stdout,
                "\nSession ended with {} answered, {} skipped ({}% complete).",
                stats.answered_count,
                stats.skipped_count,
                stats.completion_percent()
            )?;
        }
    }
    Ok(())
}

fn score(args: ScoreArgs) -> Result<(), CliError> {
    let config = load_config(&args.config.config)?;
    let answers = parse_answers(&args.answers)?;

    let mut engine = AssessmentEngine::new(config);
    engine.start();
    for (index, value) in answers.into_iter().enumerate() {
        match value {
            Some(value) => engine.save_answer(index, Some(value))?,
            None => engine.skip_question(index)?,
        }
    }
    let result = engine.complete()?;

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", serde_json::to_string_pretty(&result)?)?;
    if let Some(result_type) = &result.result_type {
        writeln!(stdout, "{}", engine.generate_share_text(result_type.as_str()))?;
    }
    Ok(())
}

fn inspect(args: ConfigArg) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    let mut stdout = io::stdout();
    writeln!(stdout, "{} ({})", config.test_name, config.test_id)?;
    writeln!(stdout, "questions: {}", config.question_count())?;
    let dimensions: Vec<_> = config
        .dimension_order()
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    writeln!(stdout, "dimensions: {}", dimensions.join(", "))?;
    writeln!(stdout, "min questions: {}", config.min_questions)?;
    writeln!(
        stdout,
        "skip threshold: {:.0}%",
        config.skip_question_threshold * 100.0
    )?;
    Ok(())
}

fn try_main(cli: Cli) -> Result<(), CliError> {
    telemetry::init(&cli.log_level)?;
    match cli.command {
        Command::Run(args) => run(args),
        Command::Score(args) => score(args),
        Command::Inspect(args) => inspect(args),
    }
}

fn main() {
    if let Err(err) = try_main(Cli::parse()) {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
