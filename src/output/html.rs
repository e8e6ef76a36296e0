use crate::model::RunStatusRecord;
use crate::output::Page;
use std::io::{self, Write};

pub fn write_header(w: &mut impl Write, page: &Page) -> io::Result<()> {
    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html lang=\"en\">")?;
    writeln!(w, "<head>")?;
    writeln!(w, "    <meta charset=\"utf-8\">")?;
    writeln!(w, "    <title>{}</title>", escape(&page.title))?;
    writeln!(
        w,
        "    <link rel=\"stylesheet\" href=\"{}\">",
        escape(&page.stylesheet)
    )?;
    writeln!(w, "</head>")?;
    writeln!(w, "<body>")?;
    writeln!(w, "<table>")?;
    writeln!(w, "<tr>")?;
    for heading in [" ", "Repository", "Workflow", "Conclusion", "Last Run"] {
        writeln!(w, "    <th>{heading}</th>")?;
    }
    writeln!(w, "</tr>")
}

pub fn write_group(w: &mut impl Write, group: &str) -> io::Result<()> {
    writeln!(
        w,
        "<tr class=\"group\"><th colspan=\"5\">{}</th></tr>",
        escape(group)
    )
}

pub fn write_row(w: &mut impl Write, record: &RunStatusRecord) -> io::Result<()> {
    let icon_class = if record.is_success() {
        "green-icon"
    } else {
        "red-icon"
    };

    writeln!(
        w,
        "<tr><td class=\"{icon_class}\">{}</td><td>{}</td><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
        record.icon.glyph(),
        escape(&record.workflow.repo),
        escape(&record.url),
        escape(&record.workflow.workflow),
        escape(&record.conclusion_text()),
        escape(record.updated_at_text()),
    )
}

pub fn write_footer(w: &mut impl Write, generated_at: &str) -> io::Result<()> {
    writeln!(w, "</table>")?;
    writeln!(w, "<p>Last Updated {}</p>", escape(generated_at))?;
    writeln!(w, "</body></html>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
