//! `pagepal speak`: play a reply and drive it from stdin.

use std::path::Path;

use anyhow::{Context, Result};
use pagepal_voice::{PlaybackEvent, PlaybackState};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// One line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    TogglePause,
    Forward,
    Back,
    Stop,
    Status,
    Quit,
}

impl PlayerCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" | "resume" | "" => Some(Self::TogglePause),
            "f" | "forward" => Some(Self::Forward),
            "b" | "back" => Some(Self::Back),
            "s" | "stop" => Some(Self::Stop),
            "?" | "status" => Some(Self::Status),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Text from the positional argument or `--file`.
pub async fn load_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .map_err(CliError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => return Err(CliError::Arguments("no text given".to_string()).into()),
    };

    if text.trim().is_empty() {
        return Err(CliError::Arguments("nothing to speak".to_string()).into());
    }
    Ok(text)
}

pub async fn execute(ctx: CliContext, text: String) -> Result<()> {
    let CliContext {
        mut controller,
        mut events,
        seek_step_secs,
    } = ctx;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PlaybackEvent::Error { message } => tracing::warn!(%message, "Playback error"),
                other => tracing::debug!(event = ?other, "Playback event"),
            }
        }
    });

    println!("Generating speech...");
    controller.play(&text).await.map_err(CliError::from)?;
    println!("Playing. [p]ause/resume, [f]orward, [b]ack, [s]top, [q]uit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            finished = controller.next_completion() => {
                if finished.is_some() {
                    println!("Finished.");
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read user input")? else {
                    controller.stop(true);
                    break;
                };
                let Some(command) = PlayerCommand::parse(&line) else {
                    println!("Unknown command: {}", line.trim());
                    continue;
                };

                match command {
                    PlayerCommand::TogglePause => {
                        if controller.status() == PlaybackState::Playing {
                            controller.pause();
                        } else {
                            controller.play(&text).await.map_err(CliError::from)?;
                        }
                    }
                    PlayerCommand::Forward => controller.seek(seek_step_secs).map_err(CliError::from)?,
                    PlayerCommand::Back => controller.seek(-seek_step_secs).map_err(CliError::from)?,
                    PlayerCommand::Stop => controller.stop(false),
                    PlayerCommand::Status => {}
                    PlayerCommand::Quit => {
                        controller.stop(true);
                        break;
                    }
                }

                let snapshot = controller.state();
                println!(
                    "[{}] {:.1}s / {:.1}s",
                    controller.status(),
                    snapshot.current_offset,
                    snapshot.duration
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(PlayerCommand::parse("p"), Some(PlayerCommand::TogglePause));
        assert_eq!(PlayerCommand::parse(""), Some(PlayerCommand::TogglePause));
        assert_eq!(PlayerCommand::parse(" F "), Some(PlayerCommand::Forward));
        assert_eq!(PlayerCommand::parse("back"), Some(PlayerCommand::Back));
        assert_eq!(PlayerCommand::parse("s"), Some(PlayerCommand::Stop));
        assert_eq!(PlayerCommand::parse("Quit"), Some(PlayerCommand::Quit));
        assert_eq!(PlayerCommand::parse("rewind"), None);
    }

    #[tokio::test]
    async fn load_text_prefers_argument() {
        let text = load_text(Some("hello".to_string()), None).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn load_text_rejects_blank_and_missing_file() {
        let err = load_text(Some("  ".to_string()), None).await.unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().map(CliError::exit_code), Some(2));

        let err = load_text(None, Some(Path::new("/nonexistent/pagepal.txt")))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().map(CliError::exit_code), Some(74));
    }
}
