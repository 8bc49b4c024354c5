#![forbid(unsafe_code)]

use crate::pages::PageView;
use fm_store::{Notice, NoticeLevel};
use std::fmt::Write;

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Plain-text table with an error banner and the empty-state line.
pub fn page(view: &PageView) -> String {
    let mut out = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if view.loading {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(message) = &view.empty_message {
        out.push_str(message);
        out.push('\n');
        return out;
    }

    let mut widths: Vec<usize> = view.headers.iter().map(|h| width(h)).collect();
    for row in &view.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(width(cell));
            }
        }
    }

    let line = |out: &mut String, marker: char, cells: &mut dyn Iterator<Item = &str>| {
        out.push(marker);
        for (i, cell) in cells.enumerate() {
            let pad = widths.get(i).copied().unwrap_or(0);
            let _ = write!(out, " {cell:<pad$}");
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
    };

    line(&mut out, ' ', &mut view.headers.iter().copied());
    for (index, row) in view.rows.iter().enumerate() {
        let marker = if view.highlight == Some(index) { '*' } else { ' ' };
        line(&mut out, marker, &mut row.iter().map(String::as_str));
    }
    out
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Failure => "failed",
    };
    format!("[{}] {tag}: {}", notice.at, notice.text)
}

pub fn list(title: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{title}: -\n");
    }
    format!("{title}: {}\n", values.join(", "))
}
