//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Speak a reply and control playback interactively
    ///
    /// While playing, type a command and press Enter:
    /// p = pause/resume, f = forward, b = back, s = stop, q = quit.
    Speak {
        /// Text to read aloud
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,
        /// Read the text from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print text as it would be sent to the speech provider
    Clean {
        /// Text to clean
        text: String,
    },

    /// Detect an offer to search the web in an assistant reply
    Intent {
        /// Assistant reply to inspect
        text: String,
        /// User's answer to the offer
        #[arg(long)]
        reply: Option<String>,
        /// Last thing the user asked, used when the offered query is vague
        #[arg(long = "last-user")]
        last_user: Option<String>,
    },
}
