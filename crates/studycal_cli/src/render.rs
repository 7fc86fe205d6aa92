//! Plain-text rendering of a calendar view.

use studycal_core::{CalendarView, CellView};

const CELL_WIDTH: usize = 4;

/// Renders the title, weekday header and one line per week.
///
/// Real days print as `NN` followed by `*` when studied; filler cells are blank.
pub fn render_month(view: &CalendarView) -> String {
    let width = CELL_WIDTH * view.weekday_labels.len();
    let mut lines = vec![format!("{:^width$}", view.title).trim_end().to_string()];
    lines.push(
        view.weekday_labels
            .iter()
            .map(|label| format!("{label:>3} "))
            .collect::<String>()
            .trim_end()
            .to_string(),
    );
    for row in &view.rows {
        let line: String = row.iter().map(render_cell).collect();
        lines.push(line.trim_end().to_string());
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_cell(cell: &CellView) -> String {
    if !cell.interactive {
        return " ".repeat(CELL_WIDTH);
    }
    let marker = if cell.studied { '*' } else { ' ' };
    format!("{:>3}{marker}", cell.label)
}
