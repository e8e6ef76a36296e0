use crate::config::Entry;
use crate::github::{FetchError, RunFetcher};
use crate::model::{RunStatusRecord, WorkflowRef};
use crate::output::{Format, Page};
use crate::timestamp::{self, TimestampError, Zone};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("write report: {0}")]
    Write(#[from] io::Error),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// An output document being written, one row at a time.
#[derive(Debug)]
pub struct Document<W> {
    pub format: Format,
    pub writer: W,
}

impl<W: Write> Document<W> {
    pub fn new(format: Format, writer: W) -> Self {
        Self { format, writer }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub succeeded: usize,
    pub warnings: usize,
}

/// Fetches the latest run for `workflow` and turns it into a display record.
///
/// A non-200 response or an empty run list yields a degraded record. Transport
/// failures and bodies that do not have the expected shape are errors.
pub fn fetch_record(
    fetcher: &impl RunFetcher,
    workflow: &WorkflowRef,
    zone: Option<Zone>,
) -> Result<RunStatusRecord, FetchError> {
    let latest = fetcher.latest_run(workflow)?;

    let mut bad_timestamp = None;
    let outcome = latest.into_outcome(|raw| match timestamp::localize(&raw, zone) {
        Ok(text) => text,
        Err(err) => {
            bad_timestamp = Some(err);
            raw
        }
    });

    if let Some(err) = bad_timestamp {
        return Err(FetchError::Malformed {
            url: workflow.web_url(),
            message: err.to_string(),
        });
    }

    Ok(RunStatusRecord::new(workflow.clone(), outcome))
}

/// Writes every document's header, then fetches each entry in order and
/// appends its row to all documents, then writes the footers.
///
/// `clock` is read twice: once for the headers and again for the footers, so
/// a footer stamp reflects the end of the run. Stamps are shown in `zone`, or
/// UTC when no zone is configured.
///
/// `on_row` observes each record after it has been written. An error stops
/// generation immediately and leaves the rows written so far in place.
pub fn generate<W: Write>(
    documents: &mut [Document<W>],
    fetcher: &impl RunFetcher,
    page: &Page,
    entries: &[Entry],
    zone: Option<Zone>,
    clock: impl Fn() -> OffsetDateTime,
    mut on_row: impl FnMut(usize, &RunStatusRecord),
) -> Result<Summary, ReportError> {
    let stamp = || timestamp::format_generated_at(clock(), zone.unwrap_or(Zone::UTC));

    let started_at = stamp()?;
    for doc in documents.iter_mut() {
        doc.format.write_header(&mut doc.writer, page, &started_at)?;
    }

    let mut summary = Summary::default();
    let mut current_group: Option<&str> = None;

    for (idx, entry) in entries.iter().enumerate() {
        if !entry.group.is_empty() && current_group != Some(entry.group.as_str()) {
            for doc in documents.iter_mut() {
                doc.format.write_group(&mut doc.writer, &entry.group)?;
            }
            current_group = Some(entry.group.as_str());
        }

        let record = fetch_record(fetcher, &entry.workflow, zone)?;

        for doc in documents.iter_mut() {
            doc.format.write_row(&mut doc.writer, &record)?;
        }

        summary.rows += 1;
        if record.is_success() {
            summary.succeeded += 1;
        } else {
            summary.warnings += 1;
        }

        on_row(idx, &record);
    }

    let finished_at = stamp()?;
    for doc in documents.iter_mut() {
        doc.format.write_footer(&mut doc.writer, &finished_at)?;
        doc.writer.flush()?;
    }

    Ok(summary)
}
