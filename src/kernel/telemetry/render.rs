use super::event::LogEntry;
use crate::kernel::time;

pub const EMPTY_TABLE: &str = "No logs available";
pub const PLACEHOLDER: &str = "-";

const HEADERS: [&str; 6] = ["Timestamp", "Type", "Operation", "Name", "Success", "Duration (ms)"];

/// Grid-style text table over log entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl TableRenderer {
    /// Render the last `limit` entries (all of them if `None`) in input order.
    pub fn render(&self, entries: &[LogEntry], limit: Option<usize>) -> String {
        let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
        let rows: Vec<[String; 6]> = entries[skip..].iter().map(row).collect();
        if rows.is_empty() {
            return EMPTY_TABLE.to_string();
        }

        let mut widths = HEADERS.map(|h| h.chars().count());
        for r in &rows {
            for (w, cell) in widths.iter_mut().zip(r.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&rule(&widths, '-'));
        out.push_str(&line(&widths, &HEADERS.map(str::to_string)));
        out.push_str(&rule(&widths, '='));
        for r in &rows {
            out.push_str(&line(&widths, r));
            out.push_str(&rule(&widths, '-'));
        }
        // No trailing newline.
        out.pop();
        out
    }
}

fn row(entry: &LogEntry) -> [String; 6] {
    [
        time::truncate_to_seconds(&entry.timestamp),
        entry.request_type.clone(),
        entry.operation.clone(),
        entry.name.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        if entry.success() { "yes" } else { "no" }.to_string(),
        entry
            .response_time_ms()
            .map_or_else(|| PLACEHOLDER.to_string(), |ms| format!("{:.2}", ms)),
    ]
}

fn rule(widths: &[usize; 6], fill: char) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.extend(std::iter::repeat(fill).take(w + 2));
        s.push('+');
    }
    s.push('\n');
    s
}

fn line(widths: &[usize; 6], cells: &[String; 6]) -> String {
    let mut s = String::from("|");
    for (w, cell) in widths.iter().zip(cells.iter()) {
        let pad = w - cell.chars().count();
        s.push(' ');
        s.push_str(cell);
        s.extend(std::iter::repeat(' ').take(pad + 1));
        s.push('|');
    }
    s.push('\n');
    s
}
