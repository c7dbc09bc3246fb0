use std::io::{self, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::dashboard::{Block, MessageLevel, ProgressEvent, ProgressSink, Render};
use crate::table::{RecordTable, cell_text};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_render(render: &Render) -> io::Result<()> {
        Self::print_json(render)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, event: ProgressEvent) {
        tracing::debug!(elapsed = ?event.elapsed, "{}", event.message);
    }
}

/// Renders a [`Render`] as a standalone HTML fragment.
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn print_render(render: &Render) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(Self::render(render).as_bytes())?;
        Ok(())
    }

    pub fn render(render: &Render) -> String {
        let mut out = String::new();
        for block in &render.blocks {
            match block {
                Block::Title { text } => {
                    out.push_str(&format!("<h1>{}</h1>\n", encode_text(text)));
                }
                Block::Heading { level, text } => {
                    out.push_str(&format!("<h{level}>{}</h{level}>\n", encode_text(text)));
                }
                Block::QueryInput { prompt, value } => {
                    out.push_str(&format!(
                        "<label>{}</label>\n<input type=\"text\" value=\"{}\">\n",
                        encode_text(prompt),
                        encode_double_quoted_attribute(value)
                    ));
                }
                Block::Message { level, text } => {
                    let class = match level {
                        MessageLevel::Info => "info",
                        MessageLevel::Error => "error",
                    };
                    out.push_str(&format!(
                        "<p class=\"{class}\">{}</p>\n",
                        encode_text(text)
                    ));
                }
                Block::TargetTable { table } => push_table(&mut out, table),
                Block::TargetSelect {
                    prompt,
                    options,
                    selected,
                } => {
                    out.push_str(&format!("<label>{}</label>\n<select>\n", encode_text(prompt)));
                    for option in options {
                        let marker = if option == selected { " selected" } else { "" };
                        out.push_str(&format!(
                            "<option{marker}>{}</option>\n",
                            encode_text(option)
                        ));
                    }
                    out.push_str("</select>\n");
                }
                Block::SelectedTarget { fields, .. } => {
                    push_table(&mut out, &RecordTable::from_field_maps([fields]));
                }
                Block::ActivityPreview { table, .. } => push_table(&mut out, table),
                Block::ColumnSelect {
                    prompt,
                    options,
                    selected,
                } => {
                    out.push_str(&format!(
                        "<label>{}</label>\n<select multiple>\n",
                        encode_text(prompt)
                    ));
                    for option in options {
                        let marker = if selected.contains(option) {
                            " selected"
                        } else {
                            ""
                        };
                        out.push_str(&format!(
                            "<option{marker}>{}</option>\n",
                            encode_text(option)
                        ));
                    }
                    out.push_str("</select>\n");
                }
                Block::Download { link } => {
                    out.push_str(&link.html);
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn push_table(out: &mut String, table: &RecordTable) {
    out.push_str("<table>\n<thead><tr>");
    for column in table.columns() {
        out.push_str(&format!("<th>{}</th>", encode_text(column)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in table.rows() {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", encode_text(&cell_text(cell))));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}
