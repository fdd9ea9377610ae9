use std::time::{Duration, Instant};

use crate::catalog::{Notice, NoticeLevel};
use crate::models::{EntityKind, Id};

/// How long a notice stays in the command bar.
pub(crate) const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Form,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Form => write!(f, "FORM"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    Delete {
        kind: EntityKind,
        id: Id,
        name: String,
    },
}

/// Terminal-side state. Everything about the catalog itself lives in
/// [`crate::catalog::Catalog`]; this only tracks what the user is looking at.
pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: EntityKind,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) show_help: bool,

    status: Option<(Notice, Instant)>,
    selected: [usize; 4],

    // Form overlay: 0 is the name, 1.. the cascade selects.
    pub(crate) form_focus: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: EntityKind::MovementType,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            show_help: false,
            status: None,
            selected: [0; 4],
            form_focus: 0,
            pending_action: None,
            confirm_message: String::new(),
            visible_rows: 10,
        }
    }

    pub(crate) fn selected(&self) -> usize {
        self.selected[self.screen.index()]
    }

    /// Move the row cursor by `delta`, staying within `len` rows.
    pub(crate) fn move_selection(&mut self, delta: isize, len: usize) {
        let current = self.selected();
        let target = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.selected[self.screen.index()] = target.min(len.saturating_sub(1));
    }

    pub(crate) fn select_first(&mut self) {
        self.selected[self.screen.index()] = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected[self.screen.index()] = len.saturating_sub(1);
    }

    /// Keep every tab's cursor inside its (possibly shrunk) row count.
    pub(crate) fn clamp_selection(&mut self, kind: EntityKind, len: usize) {
        let slot = &mut self.selected[kind.index()];
        *slot = (*slot).min(len.saturating_sub(1));
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.status = Some((notice, Instant::now()));
    }

    /// Local feedback that did not come from the catalog.
    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.set_notice(Notice {
            level: NoticeLevel::Success,
            message: msg.into(),
        });
    }

    pub(crate) fn clear_status(&mut self) {
        self.status = None;
    }

    /// The current notice, unless it has been shown for [`NOTICE_TTL`].
    pub(crate) fn status(&self, now: Instant) -> Option<&Notice> {
        self.status
            .as_ref()
            .filter(|(_, shown)| now.duration_since(*shown) < NOTICE_TTL)
            .map(|(notice, _)| notice)
    }

    /// Show the most relevant of `notices`: the last error, else the last one.
    pub(crate) fn absorb_notices(&mut self, notices: Vec<Notice>) {
        let pick = notices
            .iter()
            .rposition(Notice::is_error)
            .or_else(|| notices.len().checked_sub(1));
        if let Some(i) = pick {
            if let Some(notice) = notices.into_iter().nth(i) {
                self.set_notice(notice);
            }
        }
    }

    pub(crate) fn cycle_screen(&mut self, delta: isize) {
        let all = EntityKind::ALL;
        let len = all.len() as isize;
        let next = (self.screen.index() as isize + delta).rem_euclid(len);
        self.screen = all[next as usize];
    }
}
