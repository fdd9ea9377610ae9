use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::catalog::form::FormState;
use crate::models::Id;
use crate::ui::theme;
use crate::ui::util::{centered, truncate};

const LABEL_WIDTH: usize = 15;

/// The create/edit overlay for `form`. `focus` 0 is the name field.
pub(crate) fn render(f: &mut Frame, area: Rect, form: &FormState, editing: Option<&Id>, focus: usize) {
    let kind = form.kind();
    let title = match editing {
        Some(id) => format!(" Edit {} #{id} ", kind.singular()),
        None => format!(" New {} ", kind.singular()),
    };

    let field_width = 40;
    let mut lines = vec![Line::from("")];

    let name_style = field_style(focus == 0, true);
    let cursor = if focus == 0 { "▏" } else { "" };
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<LABEL_WIDTH$}", "Name"), label_style(focus == 0)),
        Span::styled(format!("{}{cursor}", truncate(&form.name, field_width)), name_style),
    ]));

    for (i, field) in form.chain.levels().iter().enumerate() {
        let focused = focus == i + 1;
        let arrows = if focused && field.is_enabled() { "◂ ▸ " } else { "    " };
        let value = truncate(field.display(), field_width);
        let style = if field.value().is_none() {
            field_style(focused, field.is_enabled()).add_modifier(Modifier::ITALIC)
        } else {
            field_style(focused, field.is_enabled())
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<LABEL_WIDTH$}", field.level().label()),
                label_style(focused),
            ),
            Span::styled(arrows, Style::default().fg(theme::ACCENT)),
            Span::styled(value, style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab next field | ←/→ choose | Enter save | Esc cancel",
        theme::dim_style(),
    )));

    let popup = centered(area, 72, lines.len() as u16 + 2);
    f.render_widget(Clear, popup);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(widget, popup);
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD)
    } else {
        theme::dim_style()
    }
}

fn field_style(focused: bool, enabled: bool) -> Style {
    match (focused, enabled) {
        (_, false) => theme::disabled_style(),
        (true, true) => theme::selected_style(),
        (false, true) => theme::normal_style(),
    }
}
