use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xmly", version, about = "Browse and download Ximalaya albums")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Login cookie, required for paid tracks and account info
    #[arg(long, env = "XMLY_COOKIE", global = true, hide_env_values = true)]
    pub cookie: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an album's title, track count and type
    Album {
        album_id: i64,
    },

    /// List one page of an album's tracks
    Tracks {
        album_id: i64,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Newest first
        #[arg(long)]
        desc: bool,
    },

    /// Resolve the play URL of a paid track
    Track {
        track_id: i64,
    },

    /// Show the account behind the cookie
    User,

    /// Log in by scanning a QR code with the mobile app
    Login {
        /// Where to write the QR code image
        #[arg(long, default_value = "xmly-login.png")]
        qr_file: PathBuf,
    },

    /// Download a file with a progress bar
    Download {
        url: String,

        output: PathBuf,

        /// Transfer id reported in progress logs
        #[arg(long, default_value_t = 0)]
        id: i64,
    },
}
