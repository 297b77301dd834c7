//! aromabot - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use aromabot::{
    cli::{Args, Commands, Verbosity},
    config::{self, Config, Credential},
    doctor::Doctor,
    engine::QueryEngine,
    indexer::Indexer,
    logging,
    provider::OpenAIFactory,
    repl::{DisplayManager, ReplConfig, ReplSession},
    telemetry::TelemetryCollector,
    RagError,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbosity());

    if let Err(e) = run(&args).await {
        let err = RagError::from(e);
        eprintln!(
            "{} {}",
            format!("{}:", err.category()).red().bold(),
            err
        );
        if let Some(hint) = err.hint() {
            eprintln!("  {}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    config::load_dotenv()?;
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    match args.command() {
        Commands::Build => run_build(&config, args.verbosity()).await,
        Commands::Ask { question, sources } => {
            run_ask(&config, &question.join(" "), sources, args.verbosity()).await
        }
        Commands::Start => run_repl(&config, args.verbosity()).await,
        Commands::Doctor => run_doctor(&config).await,
        Commands::Config => show_config(&config),
    }
}

fn spinner(verbosity: Verbosity, message: &str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run_build(config: &Config, verbosity: Verbosity) -> Result<()> {
    let factory = OpenAIFactory::new(config.provider.clone());
    let indexer = Indexer::new(config.index.clone());

    let pb = spinner(
        verbosity,
        &format!("Indexing {}", config.index.source_path.display()),
    );
    let result = indexer.build(Credential::from_env(), &factory).await;
    pb.finish_and_clear();
    let summary = result?;

    println!(
        "{} Indexed {} document(s) ({} dimensions) into {}",
        "✓".green().bold(),
        summary.documents,
        summary.dimensions,
        summary.location.display()
    );
    println!(
        "  {}",
        format!("index {} in {}ms", summary.index_id, summary.duration_ms).dimmed()
    );
    Ok(())
}

async fn run_ask(
    config: &Config,
    question: &str,
    sources: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let factory = OpenAIFactory::new(config.provider.clone());
    let engine = QueryEngine::open(config, Credential::from_env(), &factory)?;

    let display = if verbosity.show_progress() {
        DisplayManager::new()
    } else {
        DisplayManager::new().without_progress()
    };

    let pb = display.start_thinking();
    let result = engine.answer(question).await;
    pb.finish_and_clear();

    let answered = result?;
    display.show_answer(&answered, sources || config.repl.show_sources);
    Ok(())
}

async fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let telemetry = TelemetryCollector::new();
    let factory = OpenAIFactory::new(config.provider.clone());

    // Startup failures end the process; per-question failures do not
    let engine = QueryEngine::open(config, Credential::from_env(), &factory)?
        .with_telemetry(telemetry.clone());

    let repl_config = ReplConfig {
        history_file: Some(
            config
                .repl
                .history_file
                .clone()
                .unwrap_or_else(Config::default_history_path),
        ),
        show_sources: config.repl.show_sources,
        show_progress: verbosity.show_progress(),
    };

    let mut session = ReplSession::new(&repl_config, telemetry.clone())?;
    session.run(&engine).await?;
    tracing::debug!(events = telemetry.event_count(), "session ended");

    if verbosity != Verbosity::Quiet {
        telemetry.display_summary();
    }
    println!("Goodbye!");
    Ok(())
}

async fn run_doctor(config: &Config) -> Result<()> {
    let credential = Credential::from_env().ok();
    let doctor = Doctor::new(config.clone());

    let checks = doctor.run_diagnostics(credential.as_ref()).await;
    Doctor::display_results(&checks);

    if !Doctor::overall_status(&checks) {
        std::process::exit(1);
    }
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "aromabot Configuration".bold().cyan());
    if let Some(path) = Config::default_path() {
        println!("{}", format!("# default location: {}", path.display()).dimmed());
    }
    println!();
    print!("{}", config.to_toml()?);
    println!();

    match Credential::from_env() {
        Ok(credential) => println!("{}: {}", config::API_KEY_ENV, credential.masked()),
        Err(_) => println!("{}: {}", config::API_KEY_ENV, "not set".yellow()),
    }
    Ok(())
}
