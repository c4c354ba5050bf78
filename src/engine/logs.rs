//! Per-request operational log
//!
//! Every response carries an ordered, human-readable trail of what the
//! engine did: cache hits, retries, skips, failures. Lines are mirrored
//! into `tracing` as they are pushed so process logs and response logs
//! stay in step.

/// Ordered log lines for one request.
#[derive(Debug, Default)]
pub struct RequestLog {
    lines: Vec<String>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{}", line);
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_order() {
        let mut log = RequestLog::new();
        log.push("first");
        log.push(format!("second {}", 2));
        assert_eq!(log.into_lines(), vec!["first", "second 2"]);
    }
}
