use crate::error::StorageResult;
use crate::page::PageId;
use log::trace;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub const PAGE_SIZE: usize = 8192;

/// Cumulative I/O counters, readable at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub writes: u64,
}

/// Page-granular file storage.
///
/// The file is a flat array of `PAGE_SIZE` slots addressed by page id. It
/// grows on demand when a page beyond the current end is written; reading a
/// page that has never been written yields a zeroed image.
pub struct DiskManager {
    file: File,
    stats: IoStats,
}

impl DiskManager {
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            stats: IoStats::default(),
        })
    }

    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        Ok(Self {
            file,
            stats: IoStats::default(),
        })
    }

    /// Fill `buf` with the on-disk image of `page_id`.
    ///
    /// A page past the end of the file has never been written; its image is
    /// all zeroes.
    pub fn read_page(&mut self, page_id: PageId, buf: &mut [u8; PAGE_SIZE]) -> StorageResult<()> {
        self.stats.reads += 1;

        let offset = Self::page_offset(page_id);
        let file_size = self.file.metadata()?.len();

        if offset >= file_size {
            buf.fill(0);
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;

        Ok(())
    }

    /// Persist `data` as the image of `page_id`, extending the file if the
    /// page lies beyond the current end.
    pub fn write_page(&mut self, page_id: PageId, data: &[u8; PAGE_SIZE]) -> StorageResult<()> {
        self.stats.writes += 1;

        let offset = Self::page_offset(page_id);
        let file_size = self.file.metadata()?.len();

        if offset >= file_size {
            self.file.set_len(offset + PAGE_SIZE as u64)?;
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.file.sync_all()?;

        Ok(())
    }

    /// Release a page id.
    ///
    /// The id namespace is append-only; freed ids are retired, not reclaimed,
    /// so this only records the event.
    pub fn deallocate_page(&mut self, page_id: PageId) {
        trace!("deallocated {page_id}");
    }

    pub fn num_pages(&self) -> StorageResult<u32> {
        let file_size = self.file.metadata()?.len();
        Ok((file_size / PAGE_SIZE as u64) as u32)
    }

    pub fn io_stats(&self) -> IoStats {
        self.stats
    }

    fn page_offset(page_id: PageId) -> u64 {
        page_id.0 as u64 * PAGE_SIZE as u64
    }
}
