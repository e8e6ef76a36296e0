use crate::model::RunStatusRecord;
use std::io::{self, Write};

pub fn write_header(w: &mut impl Write, generated_at: &str) -> io::Result<()> {
    writeln!(w, "Last Updated {generated_at}")?;
    writeln!(w)?;
    writeln!(w, "| ? | repo | workflow | conclusion | updated at |")?;
    writeln!(w, "| - | ---- | -------- | ---------- | ---------- |")
}

pub fn write_row(w: &mut impl Write, record: &RunStatusRecord) -> io::Result<()> {
    let workflow = cell(&record.workflow.workflow);
    let workflow_cell = if record.url.is_empty() {
        workflow
    } else {
        format!("[{workflow}]({})", record.url)
    };

    writeln!(
        w,
        "| {} | {} | {} | {} | {} |",
        record.icon.glyph(),
        cell(&record.workflow.repo),
        workflow_cell,
        cell(&record.conclusion_text()),
        cell(record.updated_at_text()),
    )
}

pub fn write_footer(_w: &mut impl Write) -> io::Result<()> {
    Ok(())
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
