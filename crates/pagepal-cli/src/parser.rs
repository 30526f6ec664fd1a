//! Main CLI parser and top-level argument handling.

use clap::Parser;
use pagepal_core::TtsProvider;

use crate::commands::Commands;

/// Read assistant replies aloud from the terminal.
#[derive(Parser)]
#[command(name = "pagepal")]
#[command(about = "Read assistant replies aloud with cloud text-to-speech")]
#[command(version)]
pub struct Cli {
    /// Speech provider (overrides PAGEPAL_TTS_PROVIDER)
    #[arg(long, global = true, value_parser = parse_provider)]
    pub provider: Option<TtsProvider>,

    /// Provider voice name (overrides PAGEPAL_TTS_VOICE)
    #[arg(long, global = true)]
    pub voice: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn parse_provider(raw: &str) -> Result<TtsProvider, String> {
    raw.parse().map_err(|e: pagepal_core::SettingsError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "pagepal",
            "--verbose",
            "--provider",
            "gemini",
            "--voice",
            "Puck",
            "clean",
            "hi",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.provider, Some(TtsProvider::Gemini));
        assert_eq!(cli.voice.as_deref(), Some("Puck"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["pagepal", "--provider", "polly", "clean", "hi"]).is_err());
    }

    #[test]
    fn test_speak_requires_text_or_file() {
        assert!(Cli::try_parse_from(["pagepal", "speak"]).is_err());
        assert!(Cli::try_parse_from(["pagepal", "speak", "hi", "--file", "a.txt"]).is_err());

        let cli = Cli::parse_from(["pagepal", "speak", "--file", "reply.md"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Speak { text: None, file: Some(_) })
        ));
    }
}
