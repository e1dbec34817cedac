//! Results Grid Module
//!
//! Renders fetched rows as a plain-text table for the console and exports
//! them as CSV, JSON, Markdown or HTML.

use crate::core::db::ResultSet;
use crate::core::{NzError, Result};
use std::collections::BTreeMap;

/// Tabular view of a result set with every value already formatted.
#[derive(Debug, Clone, Default)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid::default()
    }

    pub fn from_result_set(result: &ResultSet) -> Self {
        ResultsGrid {
            headers: result.columns.clone(),
            rows: result.display_rows(),
        }
    }

    /// Sets the headers for the grid.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = headers;
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn column_widths(&self, rows: &[Vec<String>]) -> Vec<usize> {
        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        (0..columns)
            .map(|i| {
                rows.iter()
                    .filter_map(|row| row.get(i))
                    .chain(self.headers.get(i))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders at most `max_rows` rows as an aligned text table.
    pub fn render(&self, max_rows: usize) -> String {
        let shown = &self.rows[..self.rows.len().min(max_rows)];
        let widths = self.column_widths(shown);
        let pad = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<w$}", cell, w = *w)
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut output = String::new();
        if !self.headers.is_empty() {
            output.push_str(&pad(&self.headers[..]));
            output.push('\n');
            let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            output.push_str(&underline.join("-|-"));
            output.push('\n');
        }
        for row in shown {
            output.push_str(&pad(&row[..]));
            output.push('\n');
        }
        if self.rows.len() > shown.len() {
            output.push_str(&format!("({} more rows)\n", self.rows.len() - shown.len()));
        }
        output
    }

    /// Exports the grid data to a specified format.
    /// Supported formats: CSV, JSON, Markdown, HTML.
    pub fn export(&self, format: &str) -> Result<String> {
        match format.to_lowercase().as_str() {
            "csv" => Ok(self.export_to_csv()),
            "json" => self.export_to_json(),
            "markdown" => Ok(self.export_to_markdown()),
            "html" => Ok(self.export_html()),
            _ => Err(NzError::Ui(format!(
                "Unsupported export format: '{}'. Supported formats: csv, json, markdown, html",
                format
            ))),
        }
    }

    fn export_to_csv(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            let headers: Vec<String> = self.headers.iter().map(|h| csv_field(h)).collect();
            output.push_str(&headers.join(","));
            output.push('\n');
        }
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }
        output
    }

    fn export_to_json(&self) -> Result<String> {
        let rows: Vec<BTreeMap<&str, &str>> = self
            .rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(h, c)| (h.as_str(), c.as_str()))
                    .collect()
            })
            .collect();
        Ok(serde_json::to_string(&rows)?)
    }

    fn export_to_markdown(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            output.push_str(&self.headers.join(" | "));
            output.push('\n');
            let underline: Vec<String> = self
                .headers
                .iter()
                .map(|h| "-".repeat(h.len().max(3)))
                .collect();
            output.push_str(&underline.join(" | "));
            output.push('\n');
        }
        for row in &self.rows {
            output.push_str(&row.join(" | "));
            output.push('\n');
        }
        output
    }

    /// Renders the grid as an HTML `<table>`.
    pub fn export_html(&self) -> String {
        let mut output = String::from("<table>\n");
        if !self.headers.is_empty() {
            output.push_str("<tr>");
            for h in &self.headers {
                output.push_str(&format!("<th>{}</th>", html_escape(h)));
            }
            output.push_str("</tr>\n");
        }
        for row in &self.rows {
            output.push_str("<tr>");
            for cell in row {
                output.push_str(&format!("<td>{}</td>", html_escape(cell)));
            }
            output.push_str("</tr>\n");
        }
        output.push_str("</table>");
        output
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::Value;

    fn sample_grid() -> ResultsGrid {
        let mut grid = ResultsGrid::new();
        grid.set_headers(vec!["ID".to_string(), "Name".to_string()]);
        grid.add_row(vec!["1".to_string(), "Alice".to_string()]);
        grid.add_row(vec!["2".to_string(), "Bob".to_string()]);
        grid
    }

    #[test]
    fn test_render_empty_grid() {
        let grid = ResultsGrid::new();
        assert_eq!(grid.render(10), "");
    }

    #[test]
    fn test_render_with_headers_and_rows() {
        let rendered = sample_grid().render(10);
        assert_eq!(rendered, "ID | Name\n---|------\n1  | Alice\n2  | Bob\n");
    }

    #[test]
    fn test_render_truncates() {
        let rendered = sample_grid().render(1);
        assert!(rendered.contains("1  | Alice"));
        assert!(!rendered.contains("Bob"));
        assert!(rendered.ends_with("(1 more rows)\n"));
    }

    #[test]
    fn test_from_result_set() {
        let rs = ResultSet::new(
            vec!["id".into(), "score".into()],
            vec![vec![Value::Integer(7), Value::Null]],
        );
        let grid = ResultsGrid::from_result_set(&rs);
        assert_eq!(grid.headers, vec!["id", "score"]);
        assert_eq!(grid.rows, vec![vec!["7".to_string(), "NULL".to_string()]]);
    }

    #[test]
    fn test_export_to_csv() {
        let mut grid = sample_grid();
        grid.add_row(vec!["3".to_string(), "Smith, J".to_string()]);
        let csv = grid.export("csv").unwrap();
        assert_eq!(csv, "ID,Name\n1,Alice\n2,Bob\n3,\"Smith, J\"\n");
    }

    #[test]
    fn test_export_to_json() {
        let json = sample_grid().export("json").unwrap();
        assert!(json.contains(r#""ID":"1""#));
        assert!(json.contains(r#""Name":"Alice""#));
        assert!(json.contains(r#""Name":"Bob""#));
    }

    #[test]
    fn test_export_to_markdown() {
        let markdown = sample_grid().export("markdown").unwrap();
        let lines: Vec<&str> = markdown.trim().lines().collect();
        let expected = ["ID | Name", "--- | ----", "1 | Alice", "2 | Bob"];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_export_to_html_escapes() {
        let mut grid = ResultsGrid::new();
        grid.set_headers(vec!["expr".to_string()]);
        grid.add_row(vec!["a < b".to_string()]);
        let html = grid.export("HTML").unwrap();
        assert!(html.starts_with("<table>"));
        assert!(html.contains("<th>expr</th>"));
        assert!(html.contains("<td>a &lt; b</td>"));
    }

    #[test]
    fn test_export_unsupported_format() {
        let result = sample_grid().export("xml");
        if let Err(NzError::Ui(msg)) = result {
            assert!(msg.contains("Unsupported export format"));
            assert!(msg.contains("xml"));
        } else {
            panic!("Expected UI error");
        }
    }
}
