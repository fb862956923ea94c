//! Copyglot - placeholder-safe translation of web copy with quality evaluation
//!
//! Command-line front end: translates text with an LLM and a baseline
//! translator, scores translations with METEOR and BLEU, and evaluates whole
//! CSV datasets against human references.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use copyglot::cli::{Args, Commands};
use copyglot::config::Config;
use copyglot::error::CopyglotError;
use copyglot::language::Language;
use copyglot::quality::Evaluator;
use copyglot::translate::Engine;
use copyglot::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { text, lang, baseline } => {
            let language: Language = lang.parse()?;
            let workflow = Workflow::new(config)?;

            if baseline {
                let comparison = workflow.compare(&text, language).await;
                println!("\nLLM translation ({}):", language);
                println!("{}", display_outcome(comparison.llm));
                println!("\nBaseline translation ({}):", language);
                println!("{}", display_outcome(comparison.baseline));
            } else {
                let translation = workflow.service().translate(&text, language).await?;
                println!("{}", translation);
            }
        }
        Commands::Score { candidate, reference, lang } => {
            let language = lang.as_deref().map(str::parse::<Language>).transpose()?;
            let evaluator = Evaluator::new(config.evaluation.clone());
            let record = evaluator.score_in(language, &candidate, &reference)?;

            println!("METEOR: {:.4}", record.meteor_score);
            println!("BLEU:   {:.4}", record.bleu_score);
        }
        Commands::Evaluate { dataset, lang, engines, output } => {
            let language = match lang {
                Some(lang) => lang.parse::<Language>()?,
                None => config.evaluation.default_language,
            };
            let engines = parse_engines(&engines)?;
            let dataset = dataset.unwrap_or_else(|| config.dataset.path.clone().into());

            let workflow = Workflow::new(config)?;
            let report = workflow.evaluate_dataset(&dataset, language, &engines).await?;

            print!("{}", report.render());
            if let Some(output) = output {
                report.save_to_file(&output)?;
                println!("\nReport saved to {}", output.display());
            }
        }
        Commands::Languages => {
            println!("\nSupported Languages:");
            println!("{:<12} {:<6} {:<8}", "Name", "Code", "Stemming");
            println!("{}", "-".repeat(28));
            for language in Language::ALL {
                let stemming = if language.stemmer_algorithm().is_some() { "yes" } else { "no" };
                println!("{:<12} {:<6} {:<8}", language.name(), language.code(), stemming);
            }
        }
        Commands::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Default configuration written to {}", path.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".copyglot").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "copyglot.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("copyglot.log").display()
    );

    Ok(())
}

fn display_outcome(outcome: copyglot::error::Result<String>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => format!("Translation failed: {}", e),
    }
}

/// Parse a comma-separated engine list
fn parse_engines(list: &str) -> Result<Vec<Engine>> {
    let mut engines = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let engine: Engine = name.parse()?;
        if !engines.contains(&engine) {
            engines.push(engine);
        }
    }
    if engines.is_empty() {
        return Err(CopyglotError::Configuration("No engines selected".to_string()).into());
    }
    Ok(engines)
}
