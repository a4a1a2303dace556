use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, warn};

const IMAGE_PREFIX: &str = "chart_";
const IMAGE_SUFFIX: &str = ".png";

/// Directory owning every rendered chart.
///
/// With a retention set, charts older than it are removed before each new
/// allocation. Without one they are kept until something else deletes them.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    retention: Option<Duration>,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, retention: Option<Duration>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ImageStore { dir, retention })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> Option<Duration> {
        self.retention
    }

    /// Creates a uniquely named `chart_*.png` file, lets `write` fill it and
    /// keeps it only if `write` succeeds. On failure the file is removed.
    pub fn write_with<E, F>(&self, write: F) -> Result<PathBuf, E>
    where
        E: From<io::Error>,
        F: FnOnce(&Path) -> Result<(), E>,
    {
        if let Err(e) = self.evict_expired(SystemTime::now()) {
            warn!("image store | eviction failed | dir: {} | {}", self.dir.display(), e);
        }

        let file = tempfile::Builder::new()
            .prefix(IMAGE_PREFIX)
            .suffix(IMAGE_SUFFIX)
            .tempfile_in(&self.dir)?;

        // dropping `file` on error deletes it
        write(file.path())?;

        let (_, path) = file.keep().map_err(|e| e.error)?;
        debug!("image store | stored: {}", path.display());
        Ok(path)
    }

    /// Removes charts last modified more than the retention before `now`.
    /// Returns how many files were deleted.
    pub fn evict_expired(&self, now: SystemTime) -> io::Result<usize> {
        let Some(retention) = self.retention else {
            return Ok(0);
        };
        let Some(cutoff) = now.checked_sub(retention) else {
            return Ok(0);
        };

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !is_chart_file(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() || metadata.modified()? >= cutoff {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                // another worker got there first
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        if removed > 0 {
            debug!("image store | evicted {} expired charts", removed);
        }
        Ok(removed)
    }
}

fn is_chart_file(name: &str) -> bool {
    name.starts_with(IMAGE_PREFIX) && name.ends_with(IMAGE_SUFFIX)
}
