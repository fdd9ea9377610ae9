//! Dependent select inputs.
//!
//! A form's foreign keys form a chain: movement type → cost type → category.
//! Each level's options are the children of the level above, so changing a
//! parent invalidates everything below it.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::api::Gateway;
use crate::models::Id;

/// One level of a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    MovementType,
    CostType,
    Category,
}

impl Level {
    pub const ORDER: [Level; 3] = [Self::MovementType, Self::CostType, Self::Category];

    /// Request/record field carrying this level's id.
    pub fn param(&self) -> &'static str {
        match self {
            Self::MovementType => "id_tipo_movimiento",
            Self::CostType => "id_tipo_costo",
            Self::Category => "id_categoria",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MovementType => "Movement type",
            Self::CostType => "Cost type",
            Self::Category => "Category",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            Self::MovementType => "Select a movement type",
            Self::CostType => "Select a cost type",
            Self::Category => "Select a category",
        }
    }

    fn locked_prompt(&self) -> &'static str {
        match self {
            Self::MovementType => "Select a movement type",
            Self::CostType => "Select a movement type first",
            Self::Category => "Select a cost type first",
        }
    }

    /// Action listing the next level's options for a value of this level.
    pub fn child_lookup(&self) -> Option<&'static str> {
        match self {
            Self::MovementType => Some("getTiposCostoByMovimiento"),
            Self::CostType => Some("getCategoriasByTipoCosto"),
            Self::Category => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub id: Id,
    #[serde(rename = "nombre")]
    pub label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<Id>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A select input: its options, chosen value and whether it accepts input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    level: Level,
    options: Vec<SelectOption>,
    value: Option<Id>,
    enabled: bool,
}

impl SelectField {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            options: Vec::new(),
            value: None,
            // The root is populated independently of any parent.
            enabled: level == Level::MovementType,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn value(&self) -> Option<&Id> {
        self.value.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn placeholder(&self) -> &'static str {
        if self.enabled {
            self.level.prompt()
        } else {
            self.level.locked_prompt()
        }
    }

    /// Label of the chosen option, or the placeholder.
    pub fn display(&self) -> &str {
        self.value
            .as_ref()
            .and_then(|v| self.options.iter().find(|o| &o.id == v))
            .map(|o| o.label.as_str())
            .unwrap_or_else(|| self.placeholder())
    }

    /// Back to the placeholder with no options, disabled.
    pub fn clear(&mut self) {
        self.options.clear();
        self.value = None;
        self.enabled = false;
    }

    /// Replace the option set and enable the field. The current value
    /// survives only if it is still one of the options.
    pub fn populate(&mut self, options: Vec<SelectOption>) {
        if let Some(current) = &self.value {
            if !options.iter().any(|o| &o.id == current) {
                self.value = None;
            }
        }
        self.options = options;
        self.enabled = true;
    }

    /// Select `value`. Only the placeholder or a listed option is accepted.
    pub fn choose(&mut self, value: Option<Id>) -> bool {
        match value {
            None => {
                self.value = None;
                true
            }
            Some(id) if self.enabled && self.options.iter().any(|o| o.id == id) => {
                self.value = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    /// The value `delta` steps away in `[placeholder, options...]`, wrapping.
    pub fn cycled(&self, delta: isize) -> Option<Id> {
        let slots = self.options.len() as isize + 1;
        let current = self
            .value
            .as_ref()
            .and_then(|v| self.options.iter().position(|o| &o.id == v))
            .map_or(0, |i| i as isize + 1);
        let next = (current + delta).rem_euclid(slots);
        if next == 0 {
            None
        } else {
            self.options.get(next as usize - 1).map(|o| o.id.clone())
        }
    }
}

/// The chain of dependent selects on one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeChain {
    levels: Vec<SelectField>,
}

impl CascadeChain {
    /// A chain with the first `depth` levels of [`Level::ORDER`].
    pub fn new(depth: usize) -> Self {
        Self {
            levels: Level::ORDER
                .iter()
                .take(depth)
                .map(|&level| SelectField::new(level))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[SelectField] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&SelectField> {
        self.levels.get(index)
    }

    pub fn has_root_options(&self) -> bool {
        self.levels.first().is_some_and(|root| !root.options.is_empty())
    }

    /// Repopulate the root from the movement-type list, keeping its value
    /// when still listed.
    pub fn set_root_options(&mut self, options: Vec<SelectOption>) {
        if let Some(root) = self.levels.first_mut() {
            root.populate(options);
        }
    }

    /// Every level back to its initial state; the root keeps its options.
    pub fn reset(&mut self) {
        for (i, field) in self.levels.iter_mut().enumerate() {
            if i == 0 {
                field.value = None;
            } else {
                field.clear();
            }
        }
    }

    /// User changed level `index` to `value`.
    ///
    /// An empty value clears and disables every level below. A non-empty value
    /// repopulates the next level from the server and clears the rest.
    /// Returns `false` if `value` is not a valid choice for that level.
    pub fn on_parent_changed<G: Gateway>(
        &mut self,
        gateway: &G,
        index: usize,
        value: Option<Id>,
    ) -> bool {
        let Some(field) = self.levels.get_mut(index) else {
            return false;
        };
        if !field.choose(value.clone()) {
            return false;
        }
        let level = field.level;

        for deeper in self.levels.iter_mut().skip(index + 2) {
            deeper.clear();
        }
        let Some(child) = self.levels.get_mut(index + 1) else {
            return true;
        };
        match value {
            None => child.clear(),
            Some(parent) => match fetch_children(gateway, level, &parent) {
                Some(options) => child.populate(options),
                None => child.clear(),
            },
        }
        true
    }

    /// Fill the chain for editing an existing record.
    ///
    /// Values are set top-down and each child is populated from the value
    /// just set, with no intermediate resets. Stops at the first missing or
    /// unknown value.
    pub fn hydrate<G: Gateway>(&mut self, gateway: &G, values: &[Option<Id>]) {
        for (index, value) in values.iter().enumerate().take(self.levels.len()) {
            let Some(id) = value else {
                break;
            };
            let field = &mut self.levels[index];
            if !field.choose(Some(id.clone())) {
                warn!(level = field.level.label(), %id, "value not among options");
                break;
            }
            let level = field.level;
            let Some(child) = self.levels.get_mut(index + 1) else {
                break;
            };
            match fetch_children(gateway, level, id) {
                Some(options) => child.populate(options),
                None => break,
            }
        }
    }

    /// `(param, value)` for each level, in order.
    pub fn params(&self) -> impl Iterator<Item = (&'static str, Option<&Id>)> {
        self.levels.iter().map(|f| (f.level.param(), f.value()))
    }

    /// Labels of levels without a value.
    pub fn missing(&self) -> Vec<&'static str> {
        self.levels
            .iter()
            .filter(|f| f.value.is_none())
            .map(|f| f.level.label())
            .collect()
    }
}

/// Options of the level below `level` for `parent`. Failures are logged and
/// yield `None`.
pub(crate) fn fetch_children<G: Gateway>(
    gateway: &G,
    level: Level,
    parent: &Id,
) -> Option<Vec<SelectOption>> {
    let action = level.child_lookup()?;
    let mut params = serde_json::Map::new();
    params.insert(level.param().into(), json!(parent));

    match gateway.call(action, params.into()) {
        Ok(mut resp) if resp.success => {
            match serde_json::from_value::<Option<Vec<SelectOption>>>(resp.take_data()) {
                Ok(options) => {
                    let options = options.unwrap_or_default();
                    debug!(action, %parent, count = options.len(), "loaded options");
                    Some(options)
                }
                Err(e) => {
                    error!(action, %parent, "error decoding options: {e}");
                    None
                }
            }
        }
        Ok(resp) => {
            error!(action, %parent, message = ?resp.message, "options lookup rejected");
            None
        }
        Err(e) => {
            error!(action, %parent, "error loading options: {e}");
            None
        }
    }
}
