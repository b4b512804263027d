use std::path::{Path, PathBuf};

/// Receives the corpus files a batch operation had to skip.
pub trait Diagnostics {
    fn file_skipped(&mut self, path: &Path, err: &eyre::Report);
}

/// Logs skipped files as warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn file_skipped(&mut self, path: &Path, err: &eyre::Report) {
        warn!(path = %path.display(), "skipping sequence: {err:#}");
    }
}

/// Keeps skipped files for a summary, after logging them.
#[derive(Clone, Debug, Default)]
pub struct CollectedDiagnostics {
    pub skipped: Vec<(PathBuf, String)>,
}

impl CollectedDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn file_skipped(&mut self, path: &Path, err: &eyre::Report) {
        TracingDiagnostics.file_skipped(path, err);
        self.skipped.push((path.to_path_buf(), format!("{err:#}")));
    }
}
