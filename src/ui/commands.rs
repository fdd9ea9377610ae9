use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction};
use crate::api::Gateway;
use crate::catalog::Catalog;
use crate::models::{EntityKind, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Help,
    Refresh,
    Search,
    ClearSearch,
    Page,
    NextPage,
    PrevPage,
    Add,
    Edit,
    Delete,
    Screen(EntityKind),
}

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) action: Action,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $action:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                action: $action,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit CatalogTUI", Action::Quit, r);
    register_command!("quit", "Quit CatalogTUI", Action::Quit, r);
    register_command!("help", "Show available commands", Action::Help, r);
    register_command!("h", "Show available commands", Action::Help, r);
    register_command!("refresh", "Reload the current page", Action::Refresh, r);
    register_command!("r", "Reload the current page", Action::Refresh, r);
    register_command!(
        "search",
        "Search all collections (e.g. :search renta)",
        Action::Search,
        r
    );
    register_command!("s", "Search all collections (e.g. :s renta)", Action::Search, r);
    register_command!(
        "clear-search",
        "Clear the search and restore paging",
        Action::ClearSearch,
        r
    );
    register_command!("page", "Go to page (e.g. :page 3)", Action::Page, r);
    register_command!("p", "Go to page (e.g. :p 3)", Action::Page, r);
    register_command!("next", "Next page", Action::NextPage, r);
    register_command!("prev", "Previous page", Action::PrevPage, r);
    register_command!("add", "New record in the current tab", Action::Add, r);
    register_command!("a", "New record in the current tab", Action::Add, r);
    register_command!(
        "edit",
        "Edit the selected record, or by id (e.g. :edit 12)",
        Action::Edit,
        r
    );
    register_command!("e", "Edit the selected record", Action::Edit, r);
    register_command!(
        "delete",
        "Delete the selected record, or by id (e.g. :delete 12)",
        Action::Delete,
        r
    );
    register_command!(
        "movement-types",
        "Go to Movement Types",
        Action::Screen(EntityKind::MovementType),
        r
    );
    register_command!("mt", "Go to Movement Types", Action::Screen(EntityKind::MovementType), r);
    register_command!(
        "cost-types",
        "Go to Cost Types",
        Action::Screen(EntityKind::CostType),
        r
    );
    register_command!("ct", "Go to Cost Types", Action::Screen(EntityKind::CostType), r);
    register_command!(
        "categories",
        "Go to Categories",
        Action::Screen(EntityKind::Category),
        r
    );
    register_command!("cat", "Go to Categories", Action::Screen(EntityKind::Category), r);
    register_command!(
        "concepts",
        "Go to Concepts",
        Action::Screen(EntityKind::Concept),
        r
    );
    register_command!("con", "Go to Concepts", Action::Screen(EntityKind::Concept), r);

    r
});

pub(crate) fn handle_command<G: Gateway>(input: &str, app: &mut App, catalog: &mut Catalog<G>) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if cmd_name.is_empty() {
        return;
    }
    if let Some(cmd) = COMMANDS.get(cmd_name) {
        run_action(cmd.action, args, app, catalog);
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

pub(crate) fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Actions ──────────────────────────────────────────────────

/// Run `action` against the current tab. Shared by `:` commands and keys.
pub(crate) fn run_action<G: Gateway>(
    action: Action,
    args: &str,
    app: &mut App,
    catalog: &mut Catalog<G>,
) {
    let kind = app.screen;
    match action {
        Action::Quit => app.running = false,
        Action::Help => app.show_help = true,
        Action::Refresh => {
            if catalog.search().is_active() {
                let query = catalog.search().query().to_string();
                catalog.submit_search(&query);
            } else if catalog.refresh(kind) {
                app.set_status(format!("Reloaded {kind}"));
            }
        }
        Action::Search => {
            if args.is_empty() {
                app.input_mode = InputMode::Search;
                app.search_input = catalog.search().query().to_string();
            } else {
                app.search_input = args.to_string();
                catalog.submit_search(args);
            }
        }
        Action::ClearSearch => {
            app.search_input.clear();
            catalog.clear_search();
        }
        Action::Page => match args.parse::<usize>() {
            Ok(page) => {
                if catalog.collection(kind).in_search() {
                    app.set_status("Paging is off while searching");
                } else if !catalog.goto_page(kind, page) {
                    app.set_status(format!("No page {page} in {kind}"));
                }
            }
            Err(_) => app.set_status("Usage: :page <number>"),
        },
        Action::NextPage => {
            catalog.next_page(kind);
        }
        Action::PrevPage => {
            catalog.prev_page(kind);
        }
        Action::Add => {
            catalog.open_form(kind);
            app.form_focus = 0;
            app.input_mode = InputMode::Form;
        }
        Action::Edit => {
            let Some(id) = target_id(args, app, catalog) else {
                app.set_status(format!("No {} selected", kind.singular()));
                return;
            };
            if catalog.load_for_edit(kind, id) {
                app.form_focus = 0;
                app.input_mode = InputMode::Form;
            }
        }
        Action::Delete => {
            let Some(id) = target_id(args, app, catalog) else {
                app.set_status(format!("No {} selected", kind.singular()));
                return;
            };
            let name = catalog
                .collection(kind)
                .rows()
                .iter()
                .find(|r| r.id() == &id)
                .map(|r| r.name().to_string())
                .unwrap_or_else(|| format!("#{id}"));
            app.confirm_message = format!("Delete {} '{name}'?", kind.singular());
            app.pending_action = Some(PendingAction::Delete { kind, id, name });
            app.input_mode = InputMode::Confirm;
        }
        Action::Screen(screen) => app.screen = screen,
    }
}

/// Id from the command argument, else the selected row's.
fn target_id<G: Gateway>(args: &str, app: &App, catalog: &Catalog<G>) -> Option<Id> {
    Id::parse(args).or_else(|| {
        catalog
            .collection(app.screen)
            .rows()
            .get(app.selected())
            .map(|r| r.id().clone())
    })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
