use crate::output::{accent, bold, muted};
use std::io::Write;

#[derive(Debug, Clone)]
pub struct WorkflowRow {
    pub group: String,
    pub repo: String,
    pub workflow: String,
    pub url: String,
}

pub fn print_workflows(mut w: impl Write, rows: &[WorkflowRow]) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(w, "{}", muted("No workflows configured."))?;
        return Ok(());
    }

    let mut current_group: Option<&str> = None;

    for row in rows {
        if !row.group.is_empty() && current_group != Some(row.group.as_str()) {
            if current_group.is_some() {
                writeln!(w)?;
            }
            writeln!(w, "{}", bold(&row.group))?;
            current_group = Some(row.group.as_str());
        }

        writeln!(
            w,
            "  {} {}",
            accent(&format!("{}/{}", row.repo, row.workflow)),
            muted(&row.url)
        )?;
    }

    Ok(())
}
