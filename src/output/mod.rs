mod html;
mod markdown;
mod progress;
mod style;
mod workflows;

use crate::model::RunStatusRecord;
use std::io::{self, Write};

pub use progress::print_progress;
pub use style::{accent, bold, command, configure, failure, icon, muted, number, success, warning};
pub use workflows::{WorkflowRow, print_workflows};

/// Document flavour produced by the report loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Markdown,
}

impl Format {
    pub fn default_path(self) -> &'static str {
        match self {
            Format::Html => "index.html",
            Format::Markdown => "README.md",
        }
    }

    /// `generated_at` is the "Last Updated" stamp. Markdown prints it here.
    pub fn write_header(
        self,
        w: &mut impl Write,
        page: &Page,
        generated_at: &str,
    ) -> io::Result<()> {
        match self {
            Format::Html => html::write_header(w, page),
            Format::Markdown => markdown::write_header(w, generated_at),
        }
    }

    /// Section heading between rows. Markdown keeps a single flat table.
    pub fn write_group(self, w: &mut impl Write, group: &str) -> io::Result<()> {
        match self {
            Format::Html => html::write_group(w, group),
            Format::Markdown => Ok(()),
        }
    }

    pub fn write_row(self, w: &mut impl Write, record: &RunStatusRecord) -> io::Result<()> {
        match self {
            Format::Html => html::write_row(w, record),
            Format::Markdown => markdown::write_row(w, record),
        }
    }

    /// HTML prints the "Last Updated" stamp here, after every row.
    pub fn write_footer(self, w: &mut impl Write, generated_at: &str) -> io::Result<()> {
        match self {
            Format::Html => html::write_footer(w, generated_at),
            Format::Markdown => markdown::write_footer(w),
        }
    }
}

/// Document-level values for the page header.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub stylesheet: String,
}
