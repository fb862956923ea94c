use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate English text, keeping [placeholder] tokens intact
    Translate {
        /// Text to translate
        #[arg(short, long)]
        text: String,

        /// Target language (name or code, e.g. French or fr)
        #[arg(short, long)]
        lang: String,

        /// Also translate with the baseline service for comparison
        #[arg(short, long)]
        baseline: bool,
    },

    /// Score a candidate translation against a reference (METEOR and BLEU)
    Score {
        /// Candidate translation
        #[arg(short, long)]
        candidate: String,

        /// Human reference translation
        #[arg(short, long)]
        reference: String,

        /// Language of both texts, enables stem matching
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Translate and score every row of a CSV dataset
    Evaluate {
        /// Dataset file (defaults to dataset.path from the config)
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Target language (defaults to evaluation.default_language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Engines to compare (comma-separated)
        #[arg(short, long, default_value = "llm,baseline")]
        engines: String,

        /// Write the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported target languages
    Languages,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate_defaults() {
        let args = Args::parse_from(["copyglot", "evaluate", "--lang", "hu"]);
        match args.command {
            Commands::Evaluate { dataset, lang, engines, output } => {
                assert!(dataset.is_none());
                assert_eq!(lang.as_deref(), Some("hu"));
                assert_eq!(engines, "llm,baseline");
                assert!(output.is_none());
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_parse_translate_with_baseline() {
        let args = Args::parse_from([
            "copyglot", "-v", "translate", "-t", "Hello [name]", "-l", "fr", "--baseline",
        ]);
        assert!(args.verbose);
        assert!(matches!(
            args.command,
            Commands::Translate { ref text, baseline: true, .. } if text == "Hello [name]"
        ));
    }
}
