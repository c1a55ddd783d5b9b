//! Elastic ASCII table rendering for terminal output.
//!
//! Telemetry values routinely carry multi-line stack traces and very long
//! payloads, so cells are sanitized to a single line and clipped to a
//! configurable width before column widths are measured.

use std::borrow::Cow;
use std::fmt::Write as _;

/// Renders `rows` under `headers` with two-space column gutters. Cells wider
/// than `max_width` characters are clipped with an ellipsis; zero disables
/// clipping.
pub fn render_table(headers: &[String], rows: &[Vec<String>], max_width: usize) -> String {
    let column_count = headers.len();
    let cells_of = |row: &[String]| {
        row.iter()
            .take(column_count)
            .map(|cell| clip(sanitize(cell), max_width))
            .collect::<Vec<_>>()
    };

    let header_cells = cells_of(headers);
    let body = rows.iter().map(|row| cells_of(row)).collect::<Vec<_>>();

    let mut widths = header_cells
        .iter()
        .map(|cell| cell.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in &body {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths));
    let separator = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &body {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>], max_width: usize) {
    print!("{}", render_table(headers, rows, max_width));
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        if idx + 1 < cells.len() {
            let padding = widths[idx].saturating_sub(cell.chars().count());
            line.push_str(&" ".repeat(padding));
        }
    }
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn sanitize(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            value
                .chars()
                .map(|ch| match ch {
                    '\n' | '\r' | '\t' => ' ',
                    other => other,
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

fn clip(value: Cow<'_, str>, max_width: usize) -> String {
    if max_width == 0 || value.chars().count() <= max_width {
        return value.into_owned();
    }
    let keep = max_width.saturating_sub(1).max(1);
    let mut clipped = value.chars().take(keep).collect::<String>();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn columns_align_under_their_headers() {
        let rendered = render_table(
            &strings(&["name", "count"]),
            &[strings(&["alpha", "2"]), strings(&["b", "10"])],
            0,
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "name   count");
        assert_eq!(lines[1], "-----  -----");
        assert_eq!(lines[2], "alpha  2");
        assert_eq!(lines[3], "b      10");
    }

    #[test]
    fn long_cells_are_clipped_with_an_ellipsis() {
        let rendered = render_table(
            &strings(&["value"]),
            &[strings(&["abcdefghij"])],
            6,
        );
        assert!(rendered.lines().nth(2).unwrap().starts_with("abcde…"));
    }

    #[test]
    fn control_characters_collapse_to_spaces() {
        let rendered = render_table(
            &strings(&["value"]),
            &[strings(&["line1\nline2\ttail"])],
            0,
        );
        assert!(rendered.contains("line1 line2 tail"));
    }
}
