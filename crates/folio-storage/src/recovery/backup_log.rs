//! Append-only JSON-lines mirror of store mutations.
//!
//! Each mutation is written as one batch of records and fsynced before the
//! SQLite transaction it describes commits. A batch whose commit fails is
//! followed by an `aborted` record carrying the same batch number.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::errors::{FolioError, FolioResult, StorageError};
use folio_core::models::{QualityScore, StageTag, Version, VersionId};

/// Why versions left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    Eviction,
    Deletion,
}

/// One logged mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BackupEntry {
    Added {
        content_id: String,
        version_id: VersionId,
        payload: String,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
        created_at: DateTime<Utc>,
    },
    Removed {
        content_id: String,
        version_ids: Vec<VersionId>,
        reason: RemovalReason,
    },
    /// Lower bound for the item's next version id.
    Counter {
        content_id: String,
        next_version: VersionId,
    },
    /// The batch with this number never committed.
    Aborted,
}

impl BackupEntry {
    pub fn added(version: &Version) -> Self {
        BackupEntry::Added {
            content_id: version.content_id.clone(),
            version_id: version.version_id,
            payload: version.payload.clone(),
            stage_tag: version.stage_tag,
            quality_score: version.quality_score,
            created_at: version.created_at,
        }
    }
}

/// A logged entry tagged with its batch number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub batch: u64,
    #[serde(flatten)]
    pub entry: BackupEntry,
}

/// Decoded log contents.
#[derive(Debug, Clone, Default)]
pub struct LogContents {
    pub records: Vec<BackupRecord>,
    /// Lines that failed to decode, typically a torn final write.
    pub torn_lines: usize,
}

impl LogContents {
    fn max_batch(&self) -> u64 {
        self.records.iter().map(|r| r.batch).max().unwrap_or(0)
    }
}

struct LogWriter {
    file: File,
    next_batch: u64,
}

/// Handle to an open backup log.
pub struct BackupLog {
    path: PathBuf,
    writer: Mutex<LogWriter>,
}

impl BackupLog {
    /// Open (creating if missing) for appending. Batch numbers continue after
    /// the highest one already in the file.
    pub fn open(path: &Path) -> FolioResult<Self> {
        let contents = Self::read(path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| log_failed(path, e))?;
        terminate_partial_line(&mut file).map_err(|e| log_failed(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter {
                file,
                next_batch: contents.max_batch() + 1,
            }),
        })
    }

    /// Read every decodable record. A missing file reads as empty.
    pub fn read(path: &Path) -> FolioResult<LogContents> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LogContents::default())
            }
            Err(e) => return Err(log_failed(path, e)),
        };

        let mut contents = LogContents::default();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| log_failed(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BackupRecord>(&line) {
                Ok(record) => contents.records.push(record),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "skipping undecodable backup log line"
                    );
                    contents.torn_lines += 1;
                }
            }
        }
        Ok(contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one batch and fsync it. Returns the batch number.
    ///
    /// Failures are `TransientIo`: nothing has been committed yet, so the
    /// caller may retry the whole mutation.
    pub fn append(&self, entries: Vec<BackupEntry>) -> FolioResult<u64> {
        let mut writer = self.lock()?;
        let batch = writer.next_batch;
        writer.next_batch += 1;

        let mut buf = Vec::new();
        for entry in entries {
            serde_json::to_writer(&mut buf, &BackupRecord { batch, entry })?;
            buf.push(b'\n');
        }
        let written = writer
            .file
            .write_all(&buf)
            .and_then(|()| writer.file.sync_data());
        if let Err(e) = written {
            // A partial write may have landed; mark the batch dead.
            let _ = write_abort(&mut writer.file, batch);
            return Err(FolioError::transient("backup log append", e.to_string()));
        }
        Ok(batch)
    }

    /// Record that a previously appended batch never committed.
    pub fn abort(&self, batch: u64) -> FolioResult<()> {
        let mut writer = self.lock()?;
        write_abort(&mut writer.file, batch).map_err(|e| log_failed(&self.path, e))
    }

    /// Replace the log with `entries`, one batch each, via write-then-rename.
    pub fn compact(&self, entries: Vec<BackupEntry>) -> FolioResult<usize> {
        let mut writer = self.lock()?;
        let tmp_path = PathBuf::from(format!("{}.tmp", self.path.display()));

        let count = entries.len();
        {
            let mut tmp = File::create(&tmp_path).map_err(|e| log_failed(&tmp_path, e))?;
            let mut buf = Vec::new();
            for (i, entry) in entries.into_iter().enumerate() {
                let record = BackupRecord {
                    batch: i as u64 + 1,
                    entry,
                };
                serde_json::to_writer(&mut buf, &record)?;
                buf.push(b'\n');
            }
            tmp.write_all(&buf)
                .and_then(|()| tmp.sync_all())
                .map_err(|e| log_failed(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| log_failed(&self.path, e))?;

        writer.file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| log_failed(&self.path, e))?;
        writer.next_batch = count as u64 + 1;
        Ok(count)
    }

    fn lock(&self) -> FolioResult<std::sync::MutexGuard<'_, LogWriter>> {
        self.writer.lock().map_err(|e| {
            StorageError::BackupLogFailed {
                path: self.path.display().to_string(),
                reason: format!("lock poisoned: {e}"),
            }
            .into()
        })
    }
}

fn write_abort(file: &mut File, batch: u64) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(&BackupRecord {
        batch,
        entry: BackupEntry::Aborted,
    })
    .map_err(std::io::Error::other)?;
    // Start on a fresh line in case the failed write left a fragment.
    line.insert(0, b'\n');
    line.push(b'\n');
    file.write_all(&line)?;
    file.sync_data()
}

/// Make sure the next append starts on its own line.
fn terminate_partial_line(file: &mut File) -> std::io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(())
}

fn log_failed(path: &Path, e: std::io::Error) -> FolioError {
    StorageError::BackupLogFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}
