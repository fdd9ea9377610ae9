//! In-memory stand-in for the catalog API, speaking the same actions and
//! envelope as the real server. Records every call and can be told to fail
//! or reject individual actions.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::api::{ApiError, ApiResponse, Gateway};
use crate::models::EntityKind;

type Row = Map<String, Value>;

#[derive(Default)]
struct State {
    tables: [Vec<Row>; 4],
    next_id: i64,
    calls: Vec<(String, Value)>,
    failing: HashSet<String>,
    rejecting: HashSet<String>,
}

pub(crate) struct FakeServer {
    state: Mutex<State>,
}

fn id_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn row(pairs: Value) -> Row {
    match pairs {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

impl FakeServer {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    /// Two movement types, each with its own cost types, categories and
    /// concepts:
    ///
    /// ```text
    /// 1 Ingreso ── 10 Fijo ────── 100 Nomina ── 1000 Salario
    ///          └── 11 Variable ── 101 Bonos
    /// 2 Egreso ─── 12 Operativo ─ 102 Renta ─── 1001 Alquiler
    ///                          └─ 103 Servicios
    /// ```
    pub(crate) fn seeded() -> Self {
        let server = Self::new();
        server.add_movement_type(1, "Ingreso");
        server.add_movement_type(2, "Egreso");
        server.add_cost_type(10, "Fijo", 1);
        server.add_cost_type(11, "Variable", 1);
        server.add_cost_type(12, "Operativo", 2);
        server.add_category(100, "Nomina", 1, 10);
        server.add_category(101, "Bonos", 1, 11);
        server.add_category(102, "Renta", 2, 12);
        server.add_category(103, "Servicios", 2, 12);
        server.add_concept(1000, "Salario", 1, 10, 100);
        server.add_concept(1001, "Alquiler", 2, 12, 102);
        server
    }

    /// `n` movement types with ids `1..=n`.
    pub(crate) fn with_movement_types(n: i64) -> Self {
        let server = Self::new();
        for i in 1..=n {
            server.add_movement_type(i, &format!("Tipo {i}"));
        }
        server
    }

    fn insert(&self, kind: EntityKind, data: Value) {
        self.state.lock().unwrap().tables[kind.index()].push(row(data));
    }

    pub(crate) fn add_movement_type(&self, id: i64, name: &str) {
        self.insert(EntityKind::MovementType, json!({"id": id, "nombre": name}));
    }

    pub(crate) fn add_cost_type(&self, id: i64, name: &str, mt: i64) {
        self.insert(
            EntityKind::CostType,
            json!({"id": id, "nombre": name, "id_tipo_movimiento": mt}),
        );
    }

    pub(crate) fn add_category(&self, id: i64, name: &str, mt: i64, ct: i64) {
        self.insert(
            EntityKind::Category,
            json!({"id": id, "nombre": name, "id_tipo_movimiento": mt, "id_tipo_costo": ct}),
        );
    }

    pub(crate) fn add_concept(&self, id: i64, name: &str, mt: i64, ct: i64, cat: i64) {
        self.insert(
            EntityKind::Concept,
            json!({
                "id": id,
                "nombre": name,
                "id_tipo_movimiento": mt,
                "id_tipo_costo": ct,
                "id_categoria": cat
            }),
        );
    }

    /// Answer `action` with HTTP 500 from now on.
    pub(crate) fn fail(&self, action: &str) {
        self.state.lock().unwrap().failing.insert(action.to_string());
    }

    /// Answer `action` with `success: false` from now on.
    pub(crate) fn reject(&self, action: &str) {
        self.state.lock().unwrap().rejecting.insert(action.to_string());
    }

    pub(crate) fn restore(&self, action: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(action);
        state.rejecting.remove(action);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub(crate) fn count(&self, action: &str) -> usize {
        self.calls().iter().filter(|(a, _)| a == action).count()
    }

    /// Pages requested through `kind`'s paged list action, in order.
    pub(crate) fn page_fetches(&self, kind: EntityKind) -> Vec<u64> {
        self.calls()
            .iter()
            .filter(|(a, _)| a == kind.actions().list)
            .filter_map(|(_, p)| p.get("page").and_then(Value::as_u64))
            .collect()
    }

    pub(crate) fn len(&self, kind: EntityKind) -> usize {
        self.state.lock().unwrap().tables[kind.index()].len()
    }

    pub(crate) fn stored(&self, kind: EntityKind, id: &str) -> Option<Row> {
        let state = self.state.lock().unwrap();
        state.tables[kind.index()]
            .iter()
            .find(|r| id_text(&r["id"]) == id)
            .cloned()
    }
}

impl State {
    fn name_of(&self, kind: EntityKind, id: Option<&Value>) -> Value {
        let Some(id) = id.map(id_text) else {
            return Value::Null;
        };
        self.tables[kind.index()]
            .iter()
            .find(|r| id_text(&r["id"]) == id)
            .and_then(|r| r.get("nombre").cloned())
            .unwrap_or(Value::Null)
    }

    /// Stored row plus the display names the real API joins in.
    fn joined(&self, kind: EntityKind, stored: &Row) -> Value {
        let mut out = stored.clone();
        let mt = self.name_of(EntityKind::MovementType, stored.get("id_tipo_movimiento"));
        let ct = self.name_of(EntityKind::CostType, stored.get("id_tipo_costo"));
        let cat = self.name_of(EntityKind::Category, stored.get("id_categoria"));
        if kind.cascade_depth() >= 1 {
            out.insert("tipo_movimiento".into(), mt);
        }
        if kind.cascade_depth() >= 2 {
            out.insert("tipo_costo".into(), ct);
        }
        if kind.cascade_depth() >= 3 {
            out.insert("categoria".into(), cat);
        }
        Value::Object(out)
    }

    fn all(&self, kind: EntityKind) -> Vec<Value> {
        self.tables[kind.index()]
            .iter()
            .map(|r| self.joined(kind, r))
            .collect()
    }

    fn position(&self, kind: EntityKind, params: &Value) -> Option<usize> {
        let id = id_text(params.get("id")?);
        self.tables[kind.index()]
            .iter()
            .position(|r| id_text(&r["id"]) == id)
    }

    fn children(&self, kind: EntityKind, key: &str, params: &Value) -> ApiResponse {
        let parent = params.get(key).map(id_text).unwrap_or_default();
        let options: Vec<Value> = self.tables[kind.index()]
            .iter()
            .filter(|r| r.get(key).map(id_text) == Some(parent.clone()))
            .map(|r| json!({"id": r["id"], "nombre": r["nombre"]}))
            .collect();
        ApiResponse::ok(Value::Array(options))
    }

    fn handle(&mut self, action: &str, params: &Value) -> ApiResponse {
        match action {
            "getTiposCostoByMovimiento" => {
                return self.children(EntityKind::CostType, "id_tipo_movimiento", params)
            }
            "getCategoriasByTipoCosto" => {
                return self.children(EntityKind::Category, "id_tipo_costo", params)
            }
            _ => {}
        }

        for kind in EntityKind::ALL {
            let actions = kind.actions();
            let table = kind.index();

            if action == actions.list {
                let rows = self.all(kind);
                let total = rows.len();
                let paging = (
                    params.get("page").and_then(Value::as_u64),
                    params.get("limit").and_then(Value::as_u64),
                );
                if let (Some(page), Some(limit)) = paging {
                    let offset = page.saturating_sub(1).saturating_mul(limit);
                    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
                    let slice: Vec<Value> =
                        rows.into_iter().skip(skip).take(limit as usize).collect();
                    return ApiResponse::ok(Value::Array(slice)).with_total(total);
                }
                return ApiResponse::ok(Value::Array(rows));
            }
            if action == actions.get {
                return match self.position(kind, params) {
                    Some(i) => ApiResponse::ok(self.joined(kind, &self.tables[table][i])),
                    None => ApiResponse::rejected("Registro no encontrado"),
                };
            }
            if action == actions.create {
                self.next_id += 1;
                let mut stored = row(params.clone());
                stored.insert("id".into(), json!(self.next_id));
                self.tables[table].push(stored);
                return ApiResponse::ok(Value::Null).with_message("Registro creado");
            }
            if action == actions.update {
                return match self.position(kind, params) {
                    Some(i) => {
                        let id = self.tables[table][i]["id"].clone();
                        let mut stored = row(params.clone());
                        stored.insert("id".into(), id);
                        self.tables[table][i] = stored;
                        ApiResponse::ok(Value::Null).with_message("Registro actualizado")
                    }
                    None => ApiResponse::rejected("Registro no encontrado"),
                };
            }
            if action == actions.delete {
                return match self.position(kind, params) {
                    Some(i) => {
                        self.tables[table].remove(i);
                        ApiResponse::ok(Value::Null).with_message("Registro eliminado")
                    }
                    None => ApiResponse::rejected("Registro no encontrado"),
                };
            }
            if action == actions.search {
                let q = params
                    .get("q")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_lowercase();
                let hits: Vec<Value> = self
                    .all(kind)
                    .into_iter()
                    .filter(|r| {
                        r["nombre"]
                            .as_str()
                            .is_some_and(|n| n.to_lowercase().contains(&q))
                    })
                    .collect();
                return ApiResponse::ok(Value::Array(hits));
            }
        }

        ApiResponse::rejected(format!("Acción desconocida: {action}"))
    }
}

impl Gateway for FakeServer {
    fn call(&self, action: &str, params: Value) -> Result<ApiResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((action.to_string(), params.clone()));
        if state.failing.contains(action) {
            return Err(ApiError::Status { status: 500 });
        }
        if state.rejecting.contains(action) {
            return Ok(ApiResponse::rejected("rechazado"));
        }
        Ok(state.handle(action, &params))
    }
}
