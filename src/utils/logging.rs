//! Optional plain-text transcript of a chat session.
//!
//! Enabled with `-l/--log <file>`. Messages are appended as they land in the
//! conversation; a write failure never interrupts the session.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub struct TranscriptLog {
    path: Option<PathBuf>,
}

impl TranscriptLog {
    /// Create a transcript log. When a path is given, write access is checked
    /// up front and a session header is appended so consecutive sessions in
    /// the same file stay distinguishable.
    pub fn new(path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let log = TranscriptLog {
            path: path.map(PathBuf::from),
        };
        if log.path.is_some() {
            log.append(&format!(
                "— session started {} —",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ))?;
        }
        Ok(log)
    }

    pub fn disabled() -> Self {
        TranscriptLog { path: None }
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    /// Append one speaker-tagged message, preserving its line breaks.
    pub fn record(&self, speaker: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.path.is_none() {
            return Ok(());
        }
        let mut body = String::new();
        let mut lines = content.lines();
        if let Some(first) = lines.next() {
            body.push_str(&format!("{speaker}: {first}\n"));
        } else {
            body.push_str(&format!("{speaker}:\n"));
        }
        for line in lines {
            body.push_str(line);
            body.push('\n');
        }
        self.append(body.trim_end_matches('\n'))
    }

    fn append(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{text}")?;
        // Blank separator line, matching the on-screen spacing.
        writeln!(file)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_log_swallows_records() {
        let log = TranscriptLog::disabled();
        assert!(!log.is_active());
        assert!(log.record("You", "hello").is_ok());
    }

    #[test]
    fn records_are_appended_with_speaker_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned())).unwrap();
        log.record("You", "first line\nsecond line").unwrap();
        log.record("Assistant", "reply").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("— session started"));
        assert!(contents.contains("You: first line\nsecond line\n"));
        assert!(contents.contains("Assistant: reply\n"));
    }
}
