use crate::model::{RunOutcome, RunStatusRecord};
use crate::output::{failure, icon, muted, number, success, warning};
use std::io::Write;

/// One status line per fetched workflow, written while the report is built.
pub fn print_progress(
    mut w: impl Write,
    position: usize,
    total: usize,
    record: &RunStatusRecord,
) -> std::io::Result<()> {
    let counter = muted(&format!("[{position}/{total}]"));

    let status = match &record.outcome {
        RunOutcome::Completed { conclusion, .. } => match conclusion.as_deref() {
            Some("success") => success("success"),
            Some(other) => failure(other),
            None => warning("pending"),
        },
        RunOutcome::HttpStatus(code) => {
            format!("{} {}", failure("http"), number(&code.to_string()))
        }
        RunOutcome::NoRuns => warning("no runs"),
    };

    writeln!(
        w,
        "{counter} {} {} {status}",
        icon(record.icon),
        record.url
    )
}
