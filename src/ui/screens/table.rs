use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::catalog::store::{Collection, Display};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{scroll_offset, truncate};

const MAX_CELL: usize = 40;

/// One collection: its table, the info line and the pagination line.
pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, collection: &Collection, query: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_table(f, chunks[0], app, collection, query);
    render_footer(f, chunks[1], collection);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, collection: &Collection, query: &str) {
    let kind = collection.kind();
    let columns = kind.columns();

    let header = Row::new(
        columns
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = match collection.placeholder() {
        Some(msg) => {
            let style = if collection.display() == &Display::Failed {
                theme::error_style()
            } else {
                theme::dim_style()
            };
            vec![Row::new(vec![Cell::from(Span::styled(msg, style))])]
        }
        None => {
            let page = area.height.saturating_sub(3) as usize;
            let skip = scroll_offset(app.selected(), page);
            collection
                .rows()
                .iter()
                .enumerate()
                .skip(skip)
                .take(page.max(1))
                .map(|(i, record)| {
                    let style = if i == app.selected() {
                        theme::selected_style()
                    } else if i % 2 == 1 {
                        theme::alt_row_style()
                    } else {
                        theme::normal_style()
                    };
                    Row::new(
                        record
                            .cells()
                            .into_iter()
                            .map(|c| Cell::from(truncate(&c, MAX_CELL))),
                    )
                    .style(style)
                })
                .collect()
        }
    };

    let widths: Vec<Constraint> = columns
        .iter()
        .enumerate()
        .map(|(i, _)| match i {
            0 => Constraint::Length(8),
            1 => Constraint::Min(20),
            _ => Constraint::Length(20),
        })
        .collect();

    let title = if collection.in_search() {
        format!(" {kind} · search: '{query}' ")
    } else {
        format!(" {kind} ")
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, collection: &Collection) {
    let mut spans = vec![Span::styled(
        format!(" {}", collection.info_text()),
        theme::dim_style(),
    )];

    if let Some(window) = collection.window().filter(|_| collection.pagination_visible()) {
        let enabled = |on: bool| {
            if on {
                Style::default().fg(theme::ACCENT)
            } else {
                Style::default().fg(theme::OVERLAY)
            }
        };
        spans.push(Span::raw("   "));
        spans.push(Span::styled("‹ p prev", enabled(window.prev_enabled())));
        spans.push(Span::styled(
            format!("  page {}  ", window.status_text()),
            theme::normal_style(),
        ));
        spans.push(Span::styled("next n ›", enabled(window.next_enabled())));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
