//! Output sinks for rendered pages.

use std::path::PathBuf;

use crate::page::OutputPage;

/// Error returned when a sink cannot accept a page.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing the page failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Receives each page as soon as it is rendered.
pub trait PageSink {
    /// Accept one page.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the page cannot be stored.
    fn accept(&mut self, page: OutputPage) -> Result<(), SinkError>;
}

/// Collects pages in memory, in emission order.
impl PageSink for Vec<OutputPage> {
    fn accept(&mut self, page: OutputPage) -> Result<(), SinkError> {
        self.push(page);
        Ok(())
    }
}

/// Writes pages to their paths on disk, creating directories as needed.
#[derive(Debug, Default)]
pub struct DirectorySink {
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create a sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths written so far.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PageSink for DirectorySink {
    fn accept(&mut self, page: OutputPage) -> Result<(), SinkError> {
        let OutputPage { path, contents } = page;
        let write = |path: &PathBuf| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents.as_bytes())
        };
        if let Err(source) = write(&path) {
            return Err(SinkError::Write { path, source });
        }
        tracing::debug!(path = %path.display(), "Wrote page");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<OutputPage> = Vec::new();
        for name in ["index.html", "section-1.html"] {
            sink.accept(OutputPage {
                path: PathBuf::from(name),
                contents: String::new(),
            })
            .unwrap();
        }
        assert_eq!(sink[0].path, PathBuf::from("index.html"));
        assert_eq!(sink[1].path, PathBuf::from("section-1.html"));
    }

    #[test]
    fn test_directory_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/guide/index.html");
        let mut sink = DirectorySink::new();

        sink.accept(OutputPage {
            path: path.clone(),
            contents: "<h1>Guide</h1>".to_owned(),
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>Guide</h1>");
        assert_eq!(sink.written(), [path]);
    }

    #[test]
    fn test_directory_sink_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("index.html");

        let err = DirectorySink::new()
            .accept(OutputPage {
                path: path.clone(),
                contents: String::new(),
            })
            .unwrap_err();

        let SinkError::Write { path: failed, .. } = err;
        assert_eq!(failed, path);
    }
}
