mod cli;
mod tui;

pub(crate) use cli::{as_cli, print_meta};
pub(crate) use tui::as_tui;
