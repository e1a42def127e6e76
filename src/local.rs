//! Builds file records from files on local disk.

use crate::mime::{detect_image_mime, mime_from_extension};
use crate::models::FileRecord;
use crate::{Error, Result};
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const SNIFF_LEN: usize = 16;

/// Reads `path` into a record carrying either an in-memory buffer or, with
/// `stream` set, a lazily read file stream.
pub async fn record_from_path(path: &Path, stream: bool) -> Result<FileRecord> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Not a file path: {}", path.display()),
            ))
        })?;

    let mut file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut file).take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    let mime = mime_for(&name, &head);

    let record = FileRecord::new(name, size, mime);
    // Hosts store files as `{stem}_{random}` so derived thumbnail hashes stay unique.
    let hash = format!("{}_{}", record.hash, Uuid::new_v4().simple());
    let record = record.with_hash(hash);

    if stream {
        file.seek(SeekFrom::Start(0)).await?;
        Ok(record.with_stream(Box::pin(ReaderStream::new(file))))
    } else {
        let buffer = tokio::fs::read(path).await?;
        Ok(record.with_buffer(buffer))
    }
}

fn mime_for(name: &str, head: &[u8]) -> &'static str {
    Path::new(name)
        .extension()
        .and_then(|ext| mime_from_extension(&ext.to_string_lossy()))
        .unwrap_or_else(|| detect_image_mime(head))
}
