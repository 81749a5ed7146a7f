use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vidup_auth::SessionProvider;
use vidup_cli::upsert::{UpsertOutcome, upsert};
use vidup_upload::RetryPolicy;

/// Upload a video or update its metadata from a record file.
#[derive(Parser, Debug)]
#[command(name = "vidup", version, about)]
struct Args {
    /// Path to the video record JSON file.
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vidup=debug")),
        )
        .init();

    let args = Args::parse();

    let session = SessionProvider::from_env()?.obtain_session().await?;
    let outcome = upsert(&session, &args.config, RetryPolicy::default()).await?;

    let video_id = outcome.video_id();
    match &outcome {
        UpsertOutcome::Uploaded { .. } => println!("Upload complete."),
        UpsertOutcome::Updated { .. } => println!("Metadata update complete."),
    }
    println!("[Studio]    https://studio.youtube.com/video/{video_id}/edit");
    println!("[Video URL] https://youtu.be/{video_id}");

    Ok(())
}
