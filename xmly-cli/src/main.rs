mod cli;
mod commands;
mod error;

use std::process;

use anyhow::Result;
use clap::Parser;
use xmly_downloader::{DEFAULT_LOG_FILTER, Settings, XmlyService, init_logging};

use crate::cli::{Args, Commands};
use crate::commands::CommandExecutor;

const QUIET_LOG_FILTER: &str = "xmly=info,xmly_downloader=warn,xmly_api=warn,transfer_engine=warn";

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json = args.json;

    if let Err(e) = run(args).await {
        if json {
            let error_json = serde_json::json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut settings = Settings::from_env()?;
    if args.verbose {
        settings.log_filter = Some(format!("xmly=debug,{}", DEFAULT_LOG_FILTER.replace("=info", "=debug")));
    } else if settings.log_filter.is_none() {
        settings.log_filter = Some(QUIET_LOG_FILTER.to_string());
    }
    let _logging = init_logging(&settings)?;

    let service = XmlyService::from_settings(&settings)?;
    let executor = CommandExecutor::new(service, args.cookie, args.json);

    match args.command {
        Commands::Album { album_id } => executor.album(album_id).await,
        Commands::Tracks {
            album_id,
            page,
            desc,
        } => executor.tracks(album_id, page, desc).await,
        Commands::Track { track_id } => executor.track(track_id).await,
        Commands::User => executor.user().await,
        Commands::Login { qr_file } => executor.login(&qr_file).await,
        Commands::Download { url, output, id } => executor.download(&url, &output, id).await,
    }
}
