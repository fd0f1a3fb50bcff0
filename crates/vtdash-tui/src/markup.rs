//! Markup fragments produced by the view renderers.
//!
//! A `Fragment` is a small block tree with two outputs: escaped HTML using
//! the dashboard stylesheet class names, and plain text lines for the
//! terminal host. Regions only ever receive whole fragments.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Primary,
    Replica,
    Success,
    Warning,
    Info,
}

impl Tone {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Primary => "badge-primary",
            Self::Replica => "badge-replica",
            Self::Success => "badge-success",
            Self::Warning => "badge-warning",
            Self::Info => "badge-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Badge { tone: Tone, text: String },
    Link { href: String, text: String },
    Status { serving: bool },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self::Strong(text.into())
    }

    pub fn badge(tone: Tone, text: impl Into<String>) -> Self {
        Self::Badge {
            tone,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoItem {
    pub label: String,
    pub value: Vec<Inline>,
    pub extra: Vec<Inline>,
}

impl InfoItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: vec![Inline::Text(value.into())],
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: Vec<Inline>) -> Self {
        self.extra = extra;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Card {
        title: String,
        badges: Vec<Inline>,
        body: Vec<Block>,
    },
    InfoGrid(Vec<InfoItem>),
    Section {
        title: String,
        body: Vec<Block>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Details {
        summary: String,
        body: String,
    },
    Line(Vec<Inline>),
    Loading(String),
    Error {
        title: String,
        message: String,
    },
    Empty {
        title: String,
        message: String,
    },
    Warning(String),
}

/// A whole-region replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    blocks: Vec<Block>,
}

impl Fragment {
    #[must_use]
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Loading(_)])
    }

    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Empty { .. }])
    }

    /// `(title, message)` when this fragment reports a failure.
    #[must_use]
    pub fn error(&self) -> Option<(&str, &str)> {
        self.blocks.iter().find_map(|block| match block {
            Block::Error { title, message } => Some((title.as_str(), message.as_str())),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_table(&self) -> bool {
        fn walk(blocks: &[Block]) -> bool {
            blocks.iter().any(|block| match block {
                Block::Table { .. } => true,
                Block::Card { body, .. } | Block::Section { body, .. } => walk(body),
                _ => false,
            })
        }
        walk(&self.blocks)
    }

    /// Plain text rendering joined with newlines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.to_lines().join("\n")
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_block_html(&mut out, block);
        }
        out
    }

    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            write_block_lines(&mut lines, block, 0);
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

fn write_inlines_html(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Strong(text) => {
                let _ = write!(out, "<strong>{}</strong>", escape_html(text));
            }
            Inline::Badge { tone, text } => {
                let _ = write!(
                    out,
                    r#"<span class="badge {}">{}</span>"#,
                    tone.css_class(),
                    escape_html(text)
                );
            }
            Inline::Link { href, text } => {
                let _ = write!(
                    out,
                    r#"<a href="{}" target="_blank" class="btn btn-small btn-secondary">{}</a>"#,
                    escape_html(href),
                    escape_html(text)
                );
            }
            Inline::Status { serving } => {
                let class = if *serving { "serving" } else { "not-serving" };
                let _ = write!(out, r#"<span class="status-indicator {class}"></span>"#);
            }
        }
    }
}

fn write_block_html(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            let _ = write!(out, "<h{level}>{}</h{level}>", escape_html(text));
        }
        Block::Card {
            title,
            badges,
            body,
        } => {
            out.push_str(r#"<div class="card"><div class="card-header">"#);
            let _ = write!(out, "<h3>{}</h3>", escape_html(title));
            if !badges.is_empty() {
                out.push_str("<div>");
                write_inlines_html(out, badges);
                out.push_str("</div>");
            }
            out.push_str("</div>");
            for child in body {
                write_block_html(out, child);
            }
            out.push_str("</div>");
        }
        Block::InfoGrid(items) => {
            out.push_str(r#"<div class="info-grid">"#);
            for item in items {
                out.push_str(r#"<div class="info-item">"#);
                let _ = write!(
                    out,
                    r#"<div class="info-label">{}</div><div class="info-value">"#,
                    escape_html(&item.label)
                );
                write_inlines_html(out, &item.value);
                out.push_str("</div>");
                if !item.extra.is_empty() {
                    out.push_str(r#"<div class="info-extra">"#);
                    write_inlines_html(out, &item.extra);
                    out.push_str("</div>");
                }
                out.push_str("</div>");
            }
            out.push_str("</div>");
        }
        Block::Section { title, body } => {
            let _ = write!(
                out,
                r#"<div class="card-section"><h4>{}</h4>"#,
                escape_html(title)
            );
            for child in body {
                write_block_html(out, child);
            }
            out.push_str("</div>");
        }
        Block::Table { headers, rows } => {
            out.push_str(r#"<div class="table-container"><table class="table"><thead><tr>"#);
            for header in headers {
                let _ = write!(out, "<th>{}</th>", escape_html(header));
            }
            out.push_str("</tr></thead><tbody>");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    write_inlines_html(out, cell);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table></div>");
        }
        Block::Details { summary, body } => {
            let _ = write!(
                out,
                "<details><summary>{}</summary><pre>{}</pre></details>",
                escape_html(summary),
                escape_html(body)
            );
        }
        Block::Line(inlines) => {
            out.push_str("<div>");
            write_inlines_html(out, inlines);
            out.push_str("</div>");
        }
        Block::Loading(message) => {
            let _ = write!(
                out,
                r#"<div class="loading"><div class="spinner"></div><p>{}</p></div>"#,
                escape_html(message)
            );
        }
        Block::Error { title, message } => {
            let _ = write!(
                out,
                r#"<h2>{}</h2><div class="error"><strong>Error:</strong> {}</div>"#,
                escape_html(title),
                escape_html(message)
            );
        }
        Block::Empty { title, message } => {
            let _ = write!(
                out,
                r#"<div class="empty-state"><div class="empty-state-message">{}</div><p>{}</p></div>"#,
                escape_html(title),
                escape_html(message)
            );
        }
        Block::Warning(message) => {
            let _ = write!(out, r#"<div class="warning">{}</div>"#, escape_html(message));
        }
    }
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

fn inlines_text(inlines: &[Inline]) -> String {
    let mut parts = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Strong(text) => parts.push(text.clone()),
            Inline::Badge { text, .. } => parts.push(format!("[{text}]")),
            Inline::Link { href, .. } => parts.push(href.clone()),
            Inline::Status { serving } => parts.push(if *serving { "●" } else { "○" }.to_string()),
        }
    }
    parts.join(" ")
}

fn push_line(lines: &mut Vec<String>, indent: usize, text: &str) {
    lines.push(format!("{}{text}", " ".repeat(indent)));
}

fn write_block_lines(lines: &mut Vec<String>, block: &Block, indent: usize) {
    match block {
        Block::Heading { level, text } => {
            push_line(lines, indent, text);
            let rule = if *level <= 2 { "=" } else { "-" };
            push_line(lines, indent, &rule.repeat(text.chars().count()));
        }
        Block::Card {
            title,
            badges,
            body,
        } => {
            let header = if badges.is_empty() {
                title.clone()
            } else {
                format!("{title}  {}", inlines_text(badges))
            };
            push_line(lines, indent, &header);
            for child in body {
                write_block_lines(lines, child, indent + 2);
            }
            lines.push(String::new());
        }
        Block::InfoGrid(items) => {
            for item in items {
                let mut line = format!("{}: {}", item.label, inlines_text(&item.value));
                if !item.extra.is_empty() {
                    line.push_str("  ");
                    line.push_str(&inlines_text(&item.extra));
                }
                push_line(lines, indent, &line);
            }
        }
        Block::Section { title, body } => {
            push_line(lines, indent, &format!("{title}:"));
            for child in body {
                write_block_lines(lines, child, indent + 2);
            }
        }
        Block::Table { headers, rows } => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|row| row.iter().map(|cell| inlines_text(cell)).collect())
                .collect();
            let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
            for row in &cells {
                for (idx, cell) in row.iter().enumerate() {
                    let width = cell.chars().count();
                    match widths.get_mut(idx) {
                        Some(current) => *current = (*current).max(width),
                        None => widths.push(width),
                    }
                }
            }
            push_line(lines, indent, &format_row(headers, &widths));
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            push_line(lines, indent, &format_row(&rule, &widths));
            for row in &cells {
                push_line(lines, indent, &format_row(row, &widths));
            }
        }
        Block::Details { summary, body } => {
            push_line(lines, indent, &format!("{summary}:"));
            for line in body.lines() {
                push_line(lines, indent + 4, line);
            }
        }
        Block::Line(inlines) => push_line(lines, indent, &inlines_text(inlines)),
        Block::Loading(message) => push_line(lines, indent, &format!("... {message}")),
        Block::Error { title, message } => {
            push_line(lines, indent, title);
            push_line(lines, indent, &format!("Error: {message}"));
        }
        Block::Empty { title, message } => {
            push_line(lines, indent, title);
            push_line(lines, indent, message);
        }
        Block::Warning(message) => push_line(lines, indent, &format!("! {message}")),
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let pad = width.saturating_sub(cell.chars().count());
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
    }
    out.trim_end().to_string()
}
