//! Terminal output helpers.
//!
//! [`Table`] renders a box-drawn table that shrinks its widest columns to fit
//! the terminal. [`print_summary`] uses it to report what was vendored.

use crate::manifest::ModuleRecord;
use colored::*;
use console::{Term, measure_text_width, truncate_str};

/// Columns are never shrunk below this width.
const MIN_COLUMN_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        let mut total: usize = widths.iter().sum();
        while total > available {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= MIN_COLUMN_WIDTH {
                break;
            }
            widths[idx] -= 1;
            total -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = truncate_str(cell, width, "...").to_string();
                let padding = width.saturating_sub(measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers, true)];
        lines.push(border("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(line(row, false));
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    pub fn print(&self) {
        let (_, cols) = Term::stdout().size();
        for line in self.render(cols as usize) {
            println!("{}", line);
        }
    }
}

/// Prints one row per module that contributed files to the vendor tree.
pub fn print_summary(modules: &[ModuleRecord], copied: &[usize]) {
    let mut table = Table::new(&["Module", "Version", "Source", "Entries"]);
    for (module, count) in modules.iter().zip(copied) {
        if *count == 0 {
            continue;
        }
        table.add_row(vec![
            module.import_path.cyan().to_string(),
            module.version.dimmed().to_string(),
            module.origin(),
            count.to_string(),
        ]);
    }
    if !table.is_empty() {
        table.print();
    }
}
