/// The four catalog collections, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    MovementType,
    CostType,
    Category,
    Concept,
}

/// Wire action names for one collection.
#[derive(Debug, PartialEq, Eq)]
pub struct Actions {
    /// Paged list (`page`, `limit`), or every record without them.
    pub list: &'static str,
    pub get: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub search: &'static str,
}

const MOVEMENT_TYPE_ACTIONS: Actions = Actions {
    list: "getTiposMovimiento",
    get: "getTipoMovimiento",
    create: "createTipoMovimiento",
    update: "updateTipoMovimiento",
    delete: "deleteTipoMovimiento",
    search: "searchTiposMovimiento",
};

const COST_TYPE_ACTIONS: Actions = Actions {
    list: "getTiposCosto",
    get: "getTipoCosto",
    create: "createTipoCosto",
    update: "updateTipoCosto",
    delete: "deleteTipoCosto",
    search: "searchTiposCosto",
};

const CATEGORY_ACTIONS: Actions = Actions {
    list: "getCategorias",
    get: "getCategoria",
    create: "createCategoria",
    update: "updateCategoria",
    delete: "deleteCategoria",
    search: "searchCategorias",
};

const CONCEPT_ACTIONS: Actions = Actions {
    list: "getConceptos",
    get: "getConcepto",
    create: "createConcepto",
    update: "updateConcepto",
    delete: "deleteConcepto",
    search: "searchConceptos",
};

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        Self::MovementType,
        Self::CostType,
        Self::Category,
        Self::Concept,
    ];

    /// Position in [`EntityKind::ALL`]; used to index per-collection state.
    pub const fn index(self) -> usize {
        match self {
            Self::MovementType => 0,
            Self::CostType => 1,
            Self::Category => 2,
            Self::Concept => 3,
        }
    }

    pub const fn actions(self) -> &'static Actions {
        match self {
            Self::MovementType => &MOVEMENT_TYPE_ACTIONS,
            Self::CostType => &COST_TYPE_ACTIONS,
            Self::Category => &CATEGORY_ACTIONS,
            Self::Concept => &CONCEPT_ACTIONS,
        }
    }

    /// Plural label used for tabs and table titles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MovementType => "Movement Types",
            Self::CostType => "Cost Types",
            Self::Category => "Categories",
            Self::Concept => "Concepts",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Self::MovementType => "movement type",
            Self::CostType => "cost type",
            Self::Category => "category",
            Self::Concept => "concept",
        }
    }

    /// Accepts the CLI/command spellings (`movement-types`, `mt`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "movement-types" | "movement-type" | "movement" | "mt" => Some(Self::MovementType),
            "cost-types" | "cost-type" | "cost" | "ct" => Some(Self::CostType),
            "categories" | "category" | "cat" => Some(Self::Category),
            "concepts" | "concept" | "con" => Some(Self::Concept),
            _ => None,
        }
    }

    /// Column headers, matching [`crate::models::Record::cells`].
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::MovementType => &["ID", "Name"],
            Self::CostType => &["ID", "Name", "Movement Type"],
            Self::Category => &["ID", "Name", "Movement Type", "Cost Type"],
            Self::Concept => &["ID", "Name", "Category", "Movement Type", "Cost Type"],
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            Self::MovementType => "No movement types registered",
            Self::CostType => "No cost types registered",
            Self::Category => "No categories registered",
            Self::Concept => "No concepts registered",
        }
    }

    /// Number of foreign-key selects on this entity's form.
    pub fn cascade_depth(&self) -> usize {
        match self {
            Self::MovementType => 0,
            Self::CostType => 1,
            Self::Category => 2,
            Self::Concept => 3,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
