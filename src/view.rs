//! Plain-text rendering of the people table.
use crate::controller::ListState;
use crate::model::Person;

const HEADERS: [&str; 4] = ["No.", "Name", "Birth Year", "URL"];
const NAME_WIDTH: usize = 24;
const BIRTH_YEAR_WIDTH: usize = 10;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const END_MESSAGE: &str = "All Data Loaded!";

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len > width {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{}{}", value, " ".repeat(width - len))
    }
}

fn number_width(total: usize) -> usize {
    total.max(1).to_string().len().max(HEADERS[0].len())
}

pub fn header(total_rows: usize) -> String {
    let n = number_width(total_rows);
    format!(
        "{} | {} | {} | {}",
        pad(HEADERS[0], n),
        pad(HEADERS[1], NAME_WIDTH),
        pad(HEADERS[2], BIRTH_YEAR_WIDTH),
        HEADERS[3]
    )
}

pub fn row(index: usize, person: &Person, total_rows: usize) -> String {
    let n = number_width(total_rows);
    format!(
        "{:>n$} | {} | {} | {}",
        index + 1,
        pad(&person.name, NAME_WIDTH),
        pad(&person.birth_year, BIRTH_YEAR_WIDTH),
        person.url,
        n = n
    )
}

/// Render rows from `start` onward; `start == 0` also emits the header.
pub fn render_rows(state: &ListState, start: usize) -> String {
    let rows = state.rows();
    let width_hint = state.total_count().max(rows.len() as u64) as usize;
    let mut out = String::new();
    if start == 0 {
        out.push_str(&header(width_hint));
        out.push('\n');
    }
    for (i, person) in rows.iter().enumerate().skip(start) {
        out.push_str(&row(i, person, width_hint));
        out.push('\n');
    }
    out
}

/// Rows appended since `shown` followed by the status line. A list shorter
/// than `shown` means a new search started, so the table is reprinted in full.
pub fn render_update(state: &ListState, shown: &mut usize) -> String {
    if state.rows().len() < *shown {
        *shown = 0;
    }
    let mut out = render_rows(state, *shown);
    *shown = state.rows().len();
    out.push_str(&status_line(state));
    out.push('\n');
    out
}

pub fn status_line(state: &ListState) -> String {
    let message = if state.has_more() {
        LOADING_MESSAGE
    } else {
        END_MESSAGE
    };
    let query = if state.query().is_empty() {
        String::new()
    } else {
        format!(" for \"{}\"", state.query())
    };
    format!(
        "{} ({} of {} fetched{})",
        message,
        state.fetched_count(),
        state.total_count(),
        query
    )
}
