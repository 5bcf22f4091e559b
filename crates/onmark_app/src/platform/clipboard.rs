use std::path::{Path, PathBuf};

use onmark_engine::{AtomicFileWriter, PersistError};

pub(crate) const CLIPBOARD_FILENAME: &str = "clipboard.txt";

/// Stands in for the system clipboard: the last copied text lives in a
/// file in the data directory.
pub(crate) struct FileClipboard {
    writer: AtomicFileWriter,
}

impl FileClipboard {
    pub(crate) fn new(dir: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.to_path_buf()),
        }
    }

    pub(crate) fn write_text(&self, text: &str) -> Result<PathBuf, PersistError> {
        self.writer.write(CLIPBOARD_FILENAME, text)
    }
}
