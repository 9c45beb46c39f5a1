//! File-backed entity log sink.
//!
//! Writes one file per entity, `<directory>/<entity_id>.csv`, with one
//! line per tick: `tick,x,y,z,text`. Files are opened lazily on the first
//! line for an entity and truncated on open. Line breaks in the text are
//! written as `\n` and `\r`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use srocs_core::entity_log::EntityLogSink;
use srocs_types::{EntityId, Vec3};
use tracing::{debug, warn};

/// Entity log sink writing CSV files into a directory.
pub struct CsvLogSink {
    directory: PathBuf,
    writers: BTreeMap<EntityId, BufWriter<File>>,
}

impl CsvLogSink {
    /// Create a sink over `directory`, creating it if needed.
    pub fn create(directory: impl AsRef<Path>) -> io::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            writers: BTreeMap::new(),
        })
    }

    /// Flush every open file.
    pub fn flush(&mut self) -> io::Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn writer(&mut self, entity: &EntityId) -> io::Result<&mut BufWriter<File>> {
        match self.writers.entry(entity.clone()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let path = log_path(&self.directory, entity);
                debug!(entity = %entity, path = %path.display(), "opening entity log");
                let file = File::create(path)?;
                Ok(slot.insert(BufWriter::new(file)))
            }
        }
    }
}

/// Escape line breaks so each record stays on one line.
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\n', '\r']) {
        Cow::Owned(text.replace('\n', "\\n").replace('\r', "\\r"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Path of the log file for an entity.
fn log_path(directory: &Path, entity: &EntityId) -> PathBuf {
    let name: String = entity
        .as_str()
        .chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect();
    directory.join(format!("{name}.csv"))
}

impl EntityLogSink for CsvLogSink {
    fn log_line(&mut self, entity: &EntityId, tick: u64, position: Vec3, text: &str) {
        let result = self
            .writer(entity)
            .and_then(|w| writeln!(w, "{tick},{position},{}", single_line(text)));
        if let Err(e) = result {
            warn!(entity = %entity, error = %e, "could not write entity log line");
        }
    }
}
