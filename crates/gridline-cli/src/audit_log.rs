//! Append-only audit log kept as JSON lines in the store directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use gridline_query::{AuditEvent, AuditFilter, AuditSink, NewAuditEvent};

/// File name of the audit log inside the store directory.
pub const AUDIT_LOG_FILE: &str = "audit.jsonl";

/// Audit sink that appends one JSON object per line.
///
/// Appends never fail the calling command: a write error is logged and the
/// event is still returned.
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(dir: &Path) -> Self {
        FileAuditSink {
            path: dir.join(AUDIT_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every event in the log. Lines that do not parse are skipped.
    pub fn read_all(&self) -> io::Result<Vec<AuditEvent>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut events = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(event) => events.push(event),
                Err(err) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %err,
                    "skipping unreadable audit entry"
                ),
            }
        }
        Ok(events)
    }

    fn write(&self, event: &AuditEvent) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{payload}")
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, event: NewAuditEvent) -> AuditEvent {
        let recorded = AuditEvent::record(event);
        if let Err(err) = self.write(&recorded) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to write audit event"
            );
        }
        recorded
    }

    fn query(&self, filter: &AuditFilter) -> Vec<AuditEvent> {
        match self.read_all() {
            Ok(events) => events.into_iter().filter(|e| filter.matches(e)).collect(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read audit log"
                );
                Vec::new()
            }
        }
    }

    fn clear(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to clear audit log"
            ),
        }
    }
}
