use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use crate::api::Gateway;
use crate::catalog::{Catalog, SubmitOutcome};
use crate::models::EntityKind;
use crate::ui::app::{App, InputMode, PendingAction};
use crate::ui::commands::{self, Action};

/// How often the loop wakes without input, so debounced searches fire.
const TICK: Duration = Duration::from_millis(50);

pub(crate) fn as_tui<G: Gateway>(catalog: &mut Catalog<G>) -> Result<()> {
    let mut app = App::new();
    catalog.load_initial();
    app.absorb_notices(catalog.take_notices());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, catalog);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("TUI exited with error: {e:?}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app<G: Gateway>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    catalog: &mut Catalog<G>,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, table borders + header, footer
            let content_height = f.area().height.saturating_sub(7) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app, catalog);
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app, catalog);
                }
            }
        }

        if catalog.poll_search(Instant::now()) {
            clamp_all(app, catalog);
        }
        app.absorb_notices(catalog.take_notices());
    }
    Ok(())
}

fn handle_key<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        app.running = false;
        return;
    }
    if app.show_help {
        app.show_help = false;
        return;
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_input(key, app, catalog),
        InputMode::Command => handle_command_input(key, app, catalog),
        InputMode::Search => handle_search_input(key, app, catalog),
        InputMode::Form => handle_form_input(key, app, catalog),
        InputMode::Confirm => handle_confirm_input(key, app, catalog),
    }
    clamp_all(app, catalog);
}

fn clamp_all<G: Gateway>(app: &mut App, catalog: &Catalog<G>) {
    for kind in EntityKind::ALL {
        app.clamp_selection(kind, catalog.collection(kind).rows().len());
    }
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    let rows = catalog.collection(app.screen).rows().len();
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input = catalog.search().query().to_string();
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1, rows),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1, rows),
        KeyCode::Char('g') => app.select_first(),
        KeyCode::Char('G') => app.select_last(rows),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.screen = EntityKind::ALL[index];
        }
        KeyCode::Tab => app.cycle_screen(1),
        KeyCode::BackTab => app.cycle_screen(-1),
        KeyCode::Char('n') | KeyCode::Right => {
            if catalog.next_page(app.screen) {
                app.select_first();
            }
        }
        KeyCode::Char('p') | KeyCode::Left => {
            if catalog.prev_page(app.screen) {
                app.select_first();
            }
        }
        KeyCode::Char('a') => commands::run_action(Action::Add, "", app, catalog),
        KeyCode::Char('e') | KeyCode::Enter => commands::run_action(Action::Edit, "", app, catalog),
        KeyCode::Char('D') => commands::run_action(Action::Delete, "", app, catalog),
        KeyCode::Char('r') => commands::run_action(Action::Refresh, "", app, catalog),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Esc => {
            app.clear_status();
            if catalog.search().is_active() || catalog.search().is_pending() {
                app.search_input.clear();
                catalog.clear_search();
            }
        }
        _ => {}
    }
}

fn handle_command_input<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, catalog);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_search_input<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if catalog.search().is_pending() {
                let input = app.search_input.clone();
                catalog.submit_search(&input);
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            catalog.clear_search();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            catalog.queue_search(&app.search_input, Instant::now());
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            catalog.queue_search(&app.search_input, Instant::now());
        }
        _ => {}
    }
}

fn handle_form_input<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    let Some(form) = catalog.form() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    let fields = form.field_count();

    match key.code {
        KeyCode::Esc => {
            catalog.hide_form();
            app.input_mode = InputMode::Normal;
            app.form_focus = 0;
            app.set_status("Edit cancelled");
        }
        KeyCode::Enter => {
            if catalog.submit() == SubmitOutcome::Saved {
                app.input_mode = InputMode::Normal;
                app.form_focus = 0;
                app.select_first();
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.form_focus = (app.form_focus + 1) % fields;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form_focus = (app.form_focus + fields - 1) % fields;
        }
        KeyCode::Left | KeyCode::Right if app.form_focus > 0 => {
            let index = app.form_focus - 1;
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            let next = form
                .chain
                .level(index)
                .filter(|field| field.is_enabled())
                .map(|field| field.cycled(delta));
            if let Some(value) = next {
                catalog.change_select(index, value);
            }
        }
        KeyCode::Backspace if app.form_focus == 0 => {
            let mut name = form.name.clone();
            name.pop();
            catalog.set_form_name(name);
        }
        KeyCode::Char(c) if app.form_focus == 0 => {
            let mut name = form.name.clone();
            name.push(c);
            catalog.set_form_name(name);
        }
        _ => {}
    }
}

fn handle_confirm_input<G: Gateway>(key: KeyEvent, app: &mut App, catalog: &mut Catalog<G>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(PendingAction::Delete { kind, id, name }) = app.pending_action.take() {
                if catalog.delete(kind, &id) {
                    tracing::info!(%kind, %id, "deleted '{name}' from the terminal");
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            // Any other key = cancel
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tui_tests;
