use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityKind, Id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementType {
    pub id: Id,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostType {
    pub id: Id,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "id_tipo_movimiento", default)]
    pub movement_type_id: Option<Id>,
    #[serde(rename = "tipo_movimiento", default)]
    pub movement_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Id,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "id_tipo_movimiento", default)]
    pub movement_type_id: Option<Id>,
    #[serde(rename = "id_tipo_costo", default)]
    pub cost_type_id: Option<Id>,
    #[serde(rename = "tipo_movimiento", default)]
    pub movement_type: Option<String>,
    #[serde(rename = "tipo_costo", default)]
    pub cost_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: Id,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "id_tipo_movimiento", default)]
    pub movement_type_id: Option<Id>,
    #[serde(rename = "id_tipo_costo", default)]
    pub cost_type_id: Option<Id>,
    #[serde(rename = "id_categoria", default)]
    pub category_id: Option<Id>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "tipo_movimiento", default)]
    pub movement_type: Option<String>,
    #[serde(rename = "tipo_costo", default)]
    pub cost_type: Option<String>,
}

/// A row of any collection, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    MovementType(MovementType),
    CostType(CostType),
    Category(Category),
    Concept(Concept),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::MovementType(_) => EntityKind::MovementType,
            Self::CostType(_) => EntityKind::CostType,
            Self::Category(_) => EntityKind::Category,
            Self::Concept(_) => EntityKind::Concept,
        }
    }

    pub fn id(&self) -> &Id {
        match self {
            Self::MovementType(r) => &r.id,
            Self::CostType(r) => &r.id,
            Self::Category(r) => &r.id,
            Self::Concept(r) => &r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::MovementType(r) => &r.name,
            Self::CostType(r) => &r.name,
            Self::Category(r) => &r.name,
            Self::Concept(r) => &r.name,
        }
    }

    /// Foreign keys in cascade order (movement type, cost type, category),
    /// truncated to the kind's cascade depth.
    pub fn parent_ids(&self) -> Vec<Option<Id>> {
        match self {
            Self::MovementType(_) => Vec::new(),
            Self::CostType(r) => vec![r.movement_type_id.clone()],
            Self::Category(r) => vec![r.movement_type_id.clone(), r.cost_type_id.clone()],
            Self::Concept(r) => vec![
                r.movement_type_id.clone(),
                r.cost_type_id.clone(),
                r.category_id.clone(),
            ],
        }
    }

    /// Display cells in the order of [`EntityKind::columns`].
    pub fn cells(&self) -> Vec<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            Self::MovementType(r) => vec![r.id.to_string(), r.name.clone()],
            Self::CostType(r) => vec![r.id.to_string(), r.name.clone(), text(&r.movement_type)],
            Self::Category(r) => vec![
                r.id.to_string(),
                r.name.clone(),
                text(&r.movement_type),
                text(&r.cost_type),
            ],
            Self::Concept(r) => vec![
                r.id.to_string(),
                r.name.clone(),
                text(&r.category),
                text(&r.movement_type),
                text(&r.cost_type),
            ],
        }
    }

    /// Decode one record of `kind` from a response payload.
    pub fn decode(kind: EntityKind, data: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            EntityKind::MovementType => Self::MovementType(serde_json::from_value(data)?),
            EntityKind::CostType => Self::CostType(serde_json::from_value(data)?),
            EntityKind::Category => Self::Category(serde_json::from_value(data)?),
            EntityKind::Concept => Self::Concept(serde_json::from_value(data)?),
        })
    }

    /// Decode a list payload. `null` decodes as no rows.
    pub fn decode_rows(kind: EntityKind, data: Value) -> serde_json::Result<Vec<Self>> {
        match data {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(|item| Self::decode(kind, item)).collect(),
            other => Err(serde::de::Error::custom(format!(
                "expected a list of {} records, got {other}",
                kind.singular()
            ))),
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}
