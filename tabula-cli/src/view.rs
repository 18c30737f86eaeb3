//! Plain-text rendering of a table for the terminal.

use tabula::Table;
use tabula::group::RenderItem;
use tabula::model::{Column, Path, Row, value_to_string};
use tabula::viewport::ColumnMeasure;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Measures header and cell text in terminal columns.
pub struct TextMeasure {
    titles: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl TextMeasure {
    pub fn new(columns: &[Column], rows: &[Row]) -> Self {
        let titles = columns.iter().map(title).collect();
        let cells = columns
            .iter()
            .map(|column| {
                let path = Path::parse(&column.field).ok();
                rows.iter()
                    .map(|row| width(&cell(row, path.as_ref())))
                    .collect()
            })
            .collect();
        Self { titles, cells }
    }
}

impl ColumnMeasure for TextMeasure {
    fn header_widths(&self) -> Option<Vec<f64>> {
        Some(self.titles.iter().map(|t| width(t) + 2.0).collect())
    }

    fn natural_header_width(&self, column: usize) -> f64 {
        self.titles.get(column).map_or(0.0, |t| width(t) + 2.0)
    }

    fn natural_cell_widths(&self, column: usize) -> Vec<f64> {
        self.cells.get(column).cloned().unwrap_or_default()
    }
}

fn title(column: &Column) -> String {
    column.title.clone().unwrap_or_else(|| column.field.clone())
}

fn width(text: &str) -> f64 {
    text.width() as f64
}

fn cell(row: &Row, path: Option<&Path>) -> String {
    path.and_then(|p| row.value(p))
        .map(value_to_string)
        .unwrap_or_default()
}

/// Truncates or pads `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Renders the header and the render sequence, one line each.
pub fn render(table: &Table) -> Vec<String> {
    let columns = table.columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| c.computed_width.unwrap_or(c.min_width.unwrap_or(10.0)).max(1.0) as usize)
        .collect();
    let paths: Vec<Option<Path>> = columns.iter().map(|c| Path::parse(&c.field).ok()).collect();

    let mut lines = Vec::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &w)| {
            let marker = match table.sorting().order_of(&column.field) {
                Some((direction, order)) => format!(" {direction:?}{order}"),
                None => String::new(),
            };
            fit(&format!("{}{}", title(column), marker), w)
        })
        .collect();
    lines.push(header.join("|"));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("+"),
    );

    for (index, item) in table.render_sequence().iter().enumerate() {
        match item {
            RenderItem::Header(group) => {
                let arrow = if group.collapsed { '>' } else { 'v' };
                lines.push(format!("{arrow} {} ({})", group.group_id, group.member_count));
            }
            RenderItem::Row(_) => {
                let Some(row) = table.row_at(index) else {
                    continue;
                };
                let selected = row
                    .id
                    .as_ref()
                    .is_some_and(|id| table.selection().is_selected(id));
                let cells: Vec<String> = paths
                    .iter()
                    .zip(&widths)
                    .map(|(path, &w)| fit(&cell(row, path.as_ref()), w))
                    .collect();
                let mark = if selected { '*' } else { ' ' };
                lines.push(format!("{mark}{}", cells.join("|")));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("日本語", 5), "日本 ");
    }
}
