//! Append-only WAL manager.

use super::record::{LogPayload, LogRecord, Lsn};
use crate::error::{StorageError, StorageResult};
use log::trace;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

struct WalInner {
    file: BufWriter<std::fs::File>,
    /// LSN the next appended record will receive.
    next_lsn: Lsn,
    /// LSN of the most recently appended record.
    last_lsn: Lsn,
    /// Records up to and including this LSN are durable on disk.
    flush_lsn: Lsn,
}

/// Buffered append-only log over a single file.
///
/// Each record is framed as a little-endian u32 length followed by the
/// bincode-encoded [`LogRecord`]. Appends go through an in-process buffer;
/// durability is only guaranteed up to [`WalManager::flush_lsn`] after an
/// explicit [`WalManager::flush`].
pub struct WalManager {
    inner: Mutex<WalInner>,
}

impl WalManager {
    /// Create a fresh log file, truncating any previous one.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            inner: Mutex::new(WalInner {
                file: BufWriter::new(file),
                next_lsn: Lsn(1),
                last_lsn: Lsn::INVALID,
                flush_lsn: Lsn::INVALID,
            }),
        })
    }

    /// Open an existing log file for appending, resuming the LSN sequence
    /// after the last record already on disk.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let last_lsn = Self::scan(path)?
            .last()
            .map(|record| record.lsn)
            .unwrap_or(Lsn::INVALID);

        let file = OpenOptions::new().append(true).open(path)?;

        Ok(Self {
            inner: Mutex::new(WalInner {
                file: BufWriter::new(file),
                next_lsn: last_lsn.next(),
                last_lsn,
                // Everything already in the file has been written out.
                flush_lsn: last_lsn,
            }),
        })
    }

    /// Append a record and return its LSN. The record is buffered; it is not
    /// durable until [`WalManager::flush`] returns an LSN at least as large.
    pub fn append(&self, payload: LogPayload) -> StorageResult<Lsn> {
        let mut inner = self.inner.lock();

        let lsn = inner.next_lsn;
        let record = LogRecord { lsn, payload };
        let encoded = bincode::serialize(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        inner.file.write_all(&(encoded.len() as u32).to_le_bytes())?;
        inner.file.write_all(&encoded)?;
        inner.next_lsn = lsn.next();
        inner.last_lsn = lsn;
        Ok(lsn)
    }

    /// Force buffered records to disk and return the new durable LSN.
    pub fn flush(&self) -> StorageResult<Lsn> {
        let mut inner = self.inner.lock();

        inner.file.flush()?;
        inner.file.get_mut().sync_all()?;
        inner.flush_lsn = inner.last_lsn;
        trace!("wal flushed through {}", inner.flush_lsn);
        Ok(inner.flush_lsn)
    }

    /// The LSN up to which the log is known durable.
    pub fn flush_lsn(&self) -> Lsn {
        self.inner.lock().flush_lsn
    }

    /// Read every record in a log file, validating the framing.
    pub fn scan(path: &Path) -> StorageResult<Vec<LogRecord>> {
        let bytes = std::fs::read(path)?;
        let mut records = Vec::new();
        let mut cursor = 0usize;

        while cursor < bytes.len() {
            if bytes.len() - cursor < 4 {
                return Err(StorageError::Serialization(
                    "truncated record header".to_string(),
                ));
            }
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(&bytes[cursor..cursor + 4]);
            let len = u32::from_le_bytes(len_bytes) as usize;
            cursor += 4;

            if bytes.len() - cursor < len {
                return Err(StorageError::Serialization(
                    "truncated record body".to_string(),
                ));
            }
            let record: LogRecord = bincode::deserialize(&bytes[cursor..cursor + len])
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            cursor += len;
            records.push(record);
        }

        Ok(records)
    }
}
