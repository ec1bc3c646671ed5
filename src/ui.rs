//! Terminal UI utilities.
//!
//! `Table` draws a box-bordered table that shrinks its widest columns to fit
//! the terminal. Cells may carry ANSI colors; widths are measured on the
//! visible text.

use colored::*;

const MIN_COL_WIDTH: usize = 8;

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

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row.into_iter().map(|c| flatten(&c)).collect());
        }
    }

    pub fn print(&self) {
        if self.headers.is_empty() {
            return;
        }
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(console::measure_text_width(cell));
            }
        }

        // indent + borders + one space of padding on each side of every cell
        let overhead = 2 + 1 + widths.len() * 3;
        while widths.iter().sum::<usize>() + overhead > max_width {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= MIN_COL_WIDTH {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    fn render(&self, max_width: usize) -> Vec<String> {
        let widths = self.column_widths(max_width);
        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let rendered: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| {
                    let text = console::truncate_str(cell, w, "...");
                    let pad = w.saturating_sub(console::measure_text_width(&text));
                    let text = if bold {
                        text.bold().to_string()
                    } else {
                        text.to_string()
                    };
                    format!(" {}{} ", text, " ".repeat(pad))
                })
                .collect();
            format!("  │{}│", rendered.join("│"))
        };

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(border("┌", "┬", "┐"));
        out.push(line(&self.headers, true));
        out.push(border("├", "┼", "┤"));
        for row in &self.rows {
            out.push(line(row, false));
        }
        out.push(border("└", "┴", "┘"));
        out
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
