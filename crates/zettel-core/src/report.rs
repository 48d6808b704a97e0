use std::io::Write;
use std::path::PathBuf;

use crate::model::ErrorMap;
use crate::route::Route;

/// Operator-facing view of one erroring identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Logical output path of the affected zettel
    pub path: PathBuf,
    /// Never empty
    pub messages: Vec<String>,
}

impl ErrorReport {
    /// `E <path>` followed by one bullet per message; continuation lines are indented.
    pub fn render(&self) -> String {
        let mut out = format!("E {}\n", self.path.display());
        for message in &self.messages {
            let mut lines = message.lines();
            out.push_str("  - ");
            out.push_str(lines.next().unwrap_or(""));
            out.push('\n');
            for line in lines {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

pub fn error_reports(errors: &ErrorMap) -> Vec<ErrorReport> {
    errors
        .iter()
        .map(|(id, error)| {
            let mut messages = error.messages();
            if messages.is_empty() {
                messages.push("Unknown error".to_string());
            }
            ErrorReport {
                path: Route::Zettel(id.clone()).output_path(),
                messages,
            }
        })
        .collect()
}

/// Write every report to `out`. A failed write is logged and the
/// remaining reports are still attempted. Returns how many were written.
pub fn report_errors(errors: &ErrorMap, out: &mut dyn Write) -> usize {
    let mut written = 0;
    for report in error_reports(errors) {
        match out.write_all(report.render().as_bytes()) {
            Ok(()) => written += 1,
            Err(e) => log::warn!("Could not report errors for {:?}: {}", report.path, e),
        }
    }
    if let Err(e) = out.flush() {
        log::warn!("Could not flush error report: {}", e);
    }
    written
}
