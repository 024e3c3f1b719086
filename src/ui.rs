//! Terminal output helpers.
//!
//! `Table` renders box-drawn tables sized to the terminal; the host report
//! shown by `x --verbose` is built on it.

use crate::config::BuildConfiguration;
use crate::probe::{HostInfo, Probed};
use crate::tools::ToolAvailability;
use colored::*;

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

    /// Rows with the wrong number of cells are dropped
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    /// Visible column widths, shrunk (widest first, never below 8) to fit `max_width`
    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(console::measure_text_width(&flatten(cell)));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let budget = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > budget {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);
        let rule = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &w) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&flatten(cell), w, "...").into_owned();
                let pad = w.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            out
        };

        let mut lines = vec![rule("┌", "┬", "┐"), line(&self.headers[..], true), rule("├", "┼", "┤")];
        lines.extend(self.rows.iter().map(|r| line(&r[..], false)));
        lines.push(rule("└", "┴", "┘"));
        lines
    }

    pub fn print(&self) {
        let (_, cols) = console::Term::stdout().size();
        for line in self.render(cols as usize) {
            println!("{}", line);
        }
    }
}

fn flatten(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

fn probed_cell<T: std::fmt::Display>(value: &Probed<T>) -> String {
    match value {
        Probed::Known(v) => v.to_string(),
        Probed::Unknown => "Unknown".dimmed().to_string(),
    }
}

/// Environment summary printed before the command runs with `--verbose`
pub fn print_host_report(host: &HostInfo, tools: &ToolAvailability, config: &BuildConfiguration) {
    println!("{}", "Host".bold());
    let mut table = Table::new(&["Probe", "Value"]);
    table.add_row(vec!["OS".into(), format!("{} ({})", host.os, host.arch)]);
    table.add_row(vec!["Processor".into(), probed_cell(&host.processor)]);
    table.add_row(vec!["Logical cores".into(), probed_cell(&host.logical_cores)]);
    table.add_row(vec!["Physical cores".into(), probed_cell(&host.physical_cores)]);
    let gpus = match &host.gpus {
        Probed::Known(list) => list.join(", "),
        Probed::Unknown => "Unknown".dimmed().to_string(),
    };
    table.add_row(vec!["GPU".into(), gpus]);
    table.add_row(vec!["CMake".into(), probed_cell(&host.cmake_version)]);
    for (name, version) in &host.compiler_versions {
        table.add_row(vec![name.clone(), probed_cell(version)]);
    }
    table.add_row(vec!["Jobs".into(), config.jobs.to_string()]);
    table.add_row(vec!["Build dir".into(), config.build_dir.display().to_string()]);
    table.print();

    println!("{}", "Backend tools".bold());
    let mut table = Table::new(&["Status", "Tool"]);
    for (tool, present) in tools.iter() {
        let status = if present {
            "✓".green().to_string()
        } else {
            "x".red().to_string()
        };
        table.add_row(vec![status, tool.to_string()]);
    }
    table.print();
}
