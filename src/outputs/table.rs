//! Plain-text table rendering.

use crate::models::Record;
use std::fmt::Write;

/// Render `records` under their column headers, each column padded to its
/// widest cell. An empty set renders the header line only.
pub fn render<T: Record>(records: &[T]) -> String {
    let columns = T::KIND.columns();
    let rows: Vec<Vec<&str>> = records.iter().map(|r| r.values()).collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    write_line(&mut out, columns, &widths);
    for row in &rows {
        write_line(&mut out, row, &widths);
    }
    out
}

fn write_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;

    #[test]
    fn test_render_aligns_columns() {
        let groups = vec![
            Group {
                name: "ran1".to_string(),
                url: "http://a".to_string(),
            },
            Group {
                name: "ran-plenary".to_string(),
                url: "http://b".to_string(),
            },
        ];
        let text = render(&groups);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name         Url");
        assert_eq!(lines[1], "ran1         http://a");
        assert_eq!(lines[2], "ran-plenary  http://b");
    }

    #[test]
    fn test_render_empty_set_is_header_only() {
        let text = render::<Group>(&[]);
        assert_eq!(text, "Name  Url\n");
    }
}
