//! Upsert orchestration: upload when the record has no id, update otherwise.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use vidup_api::VideosClient;
use vidup_record::VideoRecord;
use vidup_upload::{ResumableUpload, RetryPolicy, UploadDriver};

/// What the upsert did, with the remote id it acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new video was uploaded and its id written back to the record.
    Uploaded { video_id: String },
    /// An existing video's metadata was updated in place.
    Updated { video_id: String },
}

impl UpsertOutcome {
    pub fn video_id(&self) -> &str {
        match self {
            Self::Uploaded { video_id } | Self::Updated { video_id } => video_id,
        }
    }
}

/// Runs one upsert against the record at `record_path`.
///
/// A record carrying a remote id gets a single metadata update and the file
/// is left untouched. A record without one gets a full resumable upload,
/// after which the new id is persisted into the record so the next run
/// becomes an update.
pub async fn upsert(
    session: &VideosClient,
    record_path: &Path,
    policy: RetryPolicy,
) -> anyhow::Result<UpsertOutcome> {
    let mut record = VideoRecord::load(record_path)
        .with_context(|| format!("loading record {}", record_path.display()))?;

    if let Some(video_id) = record.remote_id().map(str::to_owned) {
        info!(%video_id, "record has a remote id, updating metadata");
        let snippet = record
            .snippet()
            .context("record metadata has no snippet to update")?;
        session
            .update_video(&video_id, snippet)
            .await
            .context("updating video metadata")?;
        return Ok(UpsertOutcome::Updated { video_id });
    }

    let source = record.source_path(record_path);
    let content_length = std::fs::metadata(&source)
        .with_context(|| format!("reading source file {}", source.display()))?
        .len();
    info!(source = %source.display(), content_length, "record has no remote id, uploading");

    let upload_url = session
        .begin_resumable_upload(&record.metadata.video, content_length)
        .await
        .context("initiating resumable upload session")?;

    let mut transport = ResumableUpload::open(upload_url, &source).await?;
    let video_id = UploadDriver::new(&mut transport, policy).drive().await?;

    record.id = Some(video_id.clone());
    record
        .save(record_path)
        .context("writing video id back to record")?;

    Ok(UpsertOutcome::Uploaded { video_id })
}
