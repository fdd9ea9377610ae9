use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::{EntityKind, Id};

use super::cascade::CascadeChain;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Input state of one entity form. The kind tag is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    kind: EntityKind,
    pub name: String,
    pub chain: CascadeChain,
}

impl FormState {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            name: String::new(),
            chain: CascadeChain::new(kind.cascade_depth()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Number of focusable fields: the name plus one per cascade level.
    pub fn field_count(&self) -> usize {
        1 + self.chain.len()
    }

    /// Every required field must hold a value.
    pub fn validate(&self) -> Result<(), FormError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Name");
        }
        missing.extend(self.chain.missing());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::MissingFields(missing))
        }
    }

    /// Request parameters for create/update (without `id`).
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("nombre".into(), json!(self.name.trim()));
        for (param, value) in self.chain.params() {
            if let Some(id) = value {
                params.insert(param.into(), json!(id));
            }
        }
        params
    }
}

/// The single active form, and the record it edits if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditingContext {
    editing_id: Option<Id>,
    form: Option<FormState>,
}

impl EditingContext {
    /// Replace whatever was open with a blank form of `kind`.
    pub(crate) fn open(&mut self, kind: EntityKind) -> &mut FormState {
        self.editing_id = None;
        self.form.insert(FormState::new(kind))
    }

    pub(crate) fn set_editing(&mut self, id: Id) {
        self.editing_id = Some(id);
    }

    pub(crate) fn clear(&mut self) {
        self.editing_id = None;
        self.form = None;
    }

    pub fn editing_id(&self) -> Option<&Id> {
        self.editing_id.as_ref()
    }

    pub fn active_kind(&self) -> Option<EntityKind> {
        self.form.as_ref().map(FormState::kind)
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub(crate) fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.form.is_some()
    }
}
