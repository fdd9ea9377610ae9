#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use super::fake::FakeServer;
use super::store::Display;
use super::*;

const DELAY: Duration = Duration::from_millis(300);

fn catalog(server: FakeServer) -> Catalog<FakeServer> {
    Catalog::new(server, 10, DELAY)
}

fn loaded(server: FakeServer) -> Catalog<FakeServer> {
    let mut c = catalog(server);
    c.load_initial();
    c.gateway().clear_calls();
    c.take_notices();
    c
}

fn names(c: &Catalog<FakeServer>, kind: EntityKind) -> Vec<String> {
    c.collection(kind)
        .rows()
        .iter()
        .map(|r| r.name().to_string())
        .collect()
}

/// Answers every call with the same raw envelope, as decoded off the wire.
struct Canned(Value);

impl Gateway for Canned {
    fn call(&self, _action: &str, _params: Value) -> Result<ApiResponse, ApiError> {
        serde_json::from_value(self.0.clone()).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn movement_rows(ids: std::ops::RangeInclusive<i64>) -> Value {
    ids.map(|i| json!({"id": i, "nombre": format!("Tipo {i}")}))
        .collect()
}

// ── Loading & pagination ──────────────────────────────────────

#[test]
fn test_load_initial_fills_every_collection() {
    let c = loaded(FakeServer::seeded());
    assert_eq!(c.movement_type_options().len(), 2);
    assert_eq!(names(&c, EntityKind::MovementType), vec!["Ingreso", "Egreso"]);
    assert_eq!(c.collection(EntityKind::Category).rows().len(), 4);
    assert_eq!(c.collection(EntityKind::Concept).info_text(), "Showing 1-2 of 2 record(s)");
    assert!(!c.collection(EntityKind::Concept).pagination_visible());
}

#[test]
fn test_rows_carry_joined_names() {
    let c = loaded(FakeServer::seeded());
    let concept = &c.collection(EntityKind::Concept).rows()[1];
    assert_eq!(concept.cells(), vec!["1001", "Alquiler", "Renta", "Egreso", "Operativo"]);
}

#[test]
fn test_page_two_of_25() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    assert!(c.next_page(EntityKind::MovementType));

    let mt = c.collection(EntityKind::MovementType);
    let window = mt.window().unwrap();
    assert_eq!((window.start, window.end, window.total_pages), (11, 20, 3));
    assert!(window.prev_enabled());
    assert!(window.next_enabled());
    assert!(mt.pagination_visible());
    assert_eq!(mt.rows().first().unwrap().name(), "Tipo 11");
    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![2]);
}

#[test]
fn test_navigation_clamps_at_edges() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    assert!(!c.prev_page(EntityKind::MovementType));
    assert!(c.goto_page(EntityKind::MovementType, 3));
    assert!(!c.next_page(EntityKind::MovementType));
    assert!(!c.goto_page(EntityKind::MovementType, 4));
    assert!(!c.goto_page(EntityKind::MovementType, 0));
    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![3]);
    assert_eq!(c.collection(EntityKind::MovementType).cursor().page, 3);
}

#[test]
fn test_page_requests_carry_limit() {
    let mut c = catalog(FakeServer::with_movement_types(3));
    c.fetch_page(EntityKind::MovementType, 1);
    let (action, params) = &c.gateway().calls()[0];
    assert_eq!(action, "getTiposMovimiento");
    assert_eq!(params["page"], 1);
    assert_eq!(params["limit"], 10);
}

#[test]
fn test_empty_collection_shows_placeholder() {
    let c = loaded(FakeServer::new());
    let mt = c.collection(EntityKind::MovementType);
    assert_eq!(mt.display(), &Display::Empty);
    assert_eq!(mt.info_text(), "Showing 0 record(s)");
    assert_eq!(mt.placeholder(), Some("No movement types registered"));
    assert!(!mt.pagination_visible());
}

#[test]
fn test_failed_page_shows_error_and_notice() {
    let server = FakeServer::seeded();
    server.fail("getCategorias");
    let mut c = catalog(server);
    c.load_initial();

    let cat = c.collection(EntityKind::Category);
    assert_eq!(cat.display(), &Display::Failed);
    assert_eq!(cat.placeholder(), Some("Error loading data"));
    let notices = c.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    // The others loaded regardless.
    assert_eq!(c.collection(EntityKind::Concept).rows().len(), 2);
}

#[test]
fn test_rejected_page_is_treated_as_empty() {
    let server = FakeServer::seeded();
    server.reject("getConceptos");
    let c = loaded(server);
    assert_eq!(c.collection(EntityKind::Concept).display(), &Display::Empty);
}

#[test]
fn test_missing_total_falls_back_to_row_count() {
    let mut coll = store::Collection::new(EntityKind::CostType);
    let rows = vec![
        Record::decode(EntityKind::CostType, serde_json::json!({"id": 1, "nombre": "a"})).unwrap(),
        Record::decode(EntityKind::CostType, serde_json::json!({"id": 2, "nombre": "b"})).unwrap(),
    ];
    coll.apply_page(1, rows, None, 10);
    assert_eq!(coll.cursor().total, 2);
    assert_eq!(coll.info_text(), "Showing 1-2 of 2 record(s)");
}

#[test]
fn test_zero_total_with_rows_falls_back_to_row_count() {
    let mut coll = store::Collection::new(EntityKind::CostType);
    let rows = vec![Record::decode(EntityKind::CostType, json!({"id": 1, "nombre": "a"})).unwrap()];
    coll.apply_page(1, rows, Some(0), 10);
    assert_eq!(coll.cursor().total, 1);
    assert_eq!(coll.info_text(), "Showing 1-1 of 1 record(s)");
}

#[test]
fn test_text_total_drives_pagination() {
    let server = Canned(json!({"success": true, "data": movement_rows(11..=20), "total": "25"}));
    let mut c = Catalog::new(server, 10, DELAY);
    assert!(c.fetch_page(EntityKind::MovementType, 2));

    let coll = c.collection(EntityKind::MovementType);
    assert_eq!(coll.info_text(), "Showing 11-20 of 25 record(s)");
    assert!(coll.pagination_visible());
    assert!(c.take_notices().is_empty());
}

#[test]
fn test_zero_total_from_server_keeps_rows_visible() {
    let server = Canned(json!({"success": true, "data": movement_rows(1..=3), "total": 0}));
    let mut c = Catalog::new(server, 10, DELAY);
    assert!(c.fetch_page(EntityKind::MovementType, 1));

    let coll = c.collection(EntityKind::MovementType);
    assert_eq!(coll.rows().len(), 3);
    assert_eq!(coll.info_text(), "Showing 1-3 of 3 record(s)");
}

// ── Mutations ─────────────────────────────────────────────────

#[test]
fn test_create_refetches_page_one_once() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    c.goto_page(EntityKind::MovementType, 3);
    c.gateway().clear_calls();

    c.open_form(EntityKind::MovementType);
    c.set_form_name("  Nuevo  ");
    assert_eq!(c.submit(), SubmitOutcome::Saved);

    let calls = c.gateway().calls();
    let (action, params) = &calls[0];
    assert_eq!(action, "createTipoMovimiento");
    assert_eq!(params["nombre"], "Nuevo");
    assert!(params.get("id").is_none());

    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![1]);
    assert_eq!(c.collection(EntityKind::MovementType).cursor().page, 1);
    assert_eq!(c.collection(EntityKind::MovementType).cursor().total, 26);
    assert!(!c.editing().is_active());

    let notices = c.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Registro creado");
}

#[test]
fn test_movement_type_save_reloads_options() {
    let mut c = loaded(FakeServer::seeded());
    c.open_form(EntityKind::MovementType);
    c.set_form_name("Transferencia");
    c.submit();
    assert_eq!(c.movement_type_options().len(), 3);
}

#[test]
fn test_update_sends_id_and_cascade() {
    let mut c = loaded(FakeServer::seeded());
    assert!(c.load_for_edit(EntityKind::Category, Id::from(101)));
    c.set_form_name("Bonos anuales");
    c.change_select(1, Some(Id::from(10)));
    c.gateway().clear_calls();

    assert_eq!(c.submit(), SubmitOutcome::Saved);
    let (action, params) = &c.gateway().calls()[0];
    assert_eq!(action, "updateCategoria");
    assert_eq!(params["id"], "101");
    assert_eq!(params["nombre"], "Bonos anuales");
    assert_eq!(params["id_tipo_movimiento"], "1");
    assert_eq!(params["id_tipo_costo"], "10");
    assert_eq!(c.gateway().page_fetches(EntityKind::Category), vec![1]);

    let stored = c.gateway().stored(EntityKind::Category, "101").unwrap();
    assert_eq!(stored["id_tipo_costo"], "10");
}

#[test]
fn test_delete_refetches_current_page_once() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    c.next_page(EntityKind::MovementType);
    c.gateway().clear_calls();

    assert!(c.delete(EntityKind::MovementType, &Id::from(15)));
    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![2]);
    let mt = c.collection(EntityKind::MovementType);
    assert_eq!(mt.cursor().total, 24);
    assert!(!names(&c, EntityKind::MovementType).contains(&"Tipo 15".to_string()));
}

#[test]
fn test_deleting_last_item_of_last_page_does_not_navigate() {
    let mut c = loaded(FakeServer::with_movement_types(21));
    assert!(c.goto_page(EntityKind::MovementType, 3));
    assert_eq!(names(&c, EntityKind::MovementType), vec!["Tipo 21"]);
    c.gateway().clear_calls();

    assert!(c.delete(EntityKind::MovementType, &Id::from(21)));
    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![3]);

    let mt = c.collection(EntityKind::MovementType);
    assert_eq!(mt.cursor().page, 3);
    assert!(mt.rows().is_empty());
    assert_eq!(mt.placeholder(), Some("No movement types registered"));
    assert!(!mt.pagination_visible());

    // Going back by hand still works.
    assert!(c.prev_page(EntityKind::MovementType));
    assert_eq!(c.collection(EntityKind::MovementType).rows().len(), 10);
}

#[test]
fn test_failed_delete_does_not_refetch() {
    let server = FakeServer::seeded();
    server.fail("deleteConcepto");
    let mut c = loaded(server);

    assert!(!c.delete(EntityKind::Concept, &Id::from(1000)));
    assert!(c.gateway().page_fetches(EntityKind::Concept).is_empty());
    assert_eq!(c.collection(EntityKind::Concept).rows().len(), 2);
    assert_eq!(c.take_notices()[0].message, "Error deleting data");
}

#[test]
fn test_rejected_delete_reports_server_message() {
    let mut c = loaded(FakeServer::seeded());
    assert!(!c.delete(EntityKind::Concept, &Id::from(5)));
    assert_eq!(c.take_notices()[0].message, "Registro no encontrado");
    assert!(c.gateway().page_fetches(EntityKind::Concept).is_empty());
}

#[test]
fn test_delete_of_record_being_edited_closes_form() {
    let mut c = loaded(FakeServer::seeded());
    c.load_for_edit(EntityKind::Concept, Id::from(1000));
    c.delete(EntityKind::Concept, &Id::from(1000));
    assert!(!c.editing().is_active());
}

// ── Forms & editing context ───────────────────────────────────

#[test]
fn test_validation_blocks_submit() {
    let mut c = loaded(FakeServer::seeded());
    c.open_form(EntityKind::Concept);
    c.set_form_name("   ");
    c.gateway().clear_calls();

    match c.submit() {
        SubmitOutcome::Invalid(form::FormError::MissingFields(missing)) => {
            assert_eq!(missing, vec!["Name", "Movement type", "Cost type", "Category"]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(c.gateway().calls().is_empty());
    assert!(c.editing().is_active());
    assert_eq!(c.take_notices()[0].message, "Please complete all required fields");
}

#[test]
fn test_submit_without_form() {
    let mut c = loaded(FakeServer::seeded());
    assert_eq!(c.submit(), SubmitOutcome::NoForm);
}

#[test]
fn test_rejected_save_keeps_form_open() {
    let server = FakeServer::seeded();
    server.reject("createTipoMovimiento");
    let mut c = loaded(server);
    c.open_form(EntityKind::MovementType);
    c.set_form_name("Dup");

    assert_eq!(c.submit(), SubmitOutcome::Rejected);
    assert!(c.editing().is_active());
    assert!(c.gateway().page_fetches(EntityKind::MovementType).is_empty());
    assert_eq!(c.take_notices()[0].message, "rechazado");
}

#[test]
fn test_failed_save_keeps_form_open() {
    let server = FakeServer::seeded();
    server.fail("createTipoMovimiento");
    let mut c = loaded(server);
    c.open_form(EntityKind::MovementType);
    c.set_form_name("X");

    assert_eq!(c.submit(), SubmitOutcome::Failed);
    assert!(c.editing().is_active());
    assert_eq!(c.take_notices()[0].message, "Error saving data");
}

#[test]
fn test_open_form_replaces_editing_context() {
    let mut c = loaded(FakeServer::seeded());
    c.load_for_edit(EntityKind::Concept, Id::from(1000));
    assert_eq!(c.editing().editing_id(), Some(&Id::from(1000)));

    c.open_form(EntityKind::CostType);
    assert_eq!(c.editing().editing_id(), None);
    assert_eq!(c.editing().active_kind(), Some(EntityKind::CostType));
    let form = c.form().unwrap();
    assert!(form.name.is_empty());
    assert_eq!(form.chain.len(), 1);
}

#[test]
fn test_open_form_loads_root_options() {
    let mut c = catalog(FakeServer::seeded());
    c.open_form(EntityKind::Category);
    let root = c.form().unwrap().chain.level(0).unwrap();
    assert_eq!(root.options().len(), 2);
    assert!(!c.form().unwrap().chain.level(1).unwrap().is_enabled());
}

#[test]
fn test_movement_type_form_skips_option_load() {
    let mut c = loaded(FakeServer::seeded());
    c.open_form(EntityKind::MovementType);
    assert!(c.gateway().calls().is_empty());
}

#[test]
fn test_hide_form_clears_context() {
    let mut c = loaded(FakeServer::seeded());
    c.load_for_edit(EntityKind::CostType, Id::from(12));
    c.hide_form();
    assert_eq!(c.editing(), &form::EditingContext::default());
}

#[test]
fn test_load_for_edit_hydrates_concept() {
    let mut c = loaded(FakeServer::seeded());
    assert!(c.load_for_edit(EntityKind::Concept, Id::from(1001)));

    let form = c.form().unwrap();
    assert_eq!(form.kind(), EntityKind::Concept);
    assert_eq!(form.name, "Alquiler");
    let shown: Vec<&str> = form.chain.levels().iter().map(|f| f.display()).collect();
    assert_eq!(shown, vec!["Egreso", "Operativo", "Renta"]);
    assert!(form.validate().is_ok());

    let actions: Vec<String> = c.gateway().calls().into_iter().map(|(a, _)| a).collect();
    assert_eq!(
        actions,
        vec!["getConcepto", "getTiposCostoByMovimiento", "getCategoriasByTipoCosto"]
    );
}

#[test]
fn test_load_for_edit_fetches_options_when_missing() {
    let mut c = catalog(FakeServer::seeded());
    assert!(c.load_for_edit(EntityKind::CostType, Id::from(11)));
    let root = c.form().unwrap().chain.level(0).unwrap();
    assert_eq!(root.display(), "Ingreso");
    assert_eq!(c.gateway().count("getTiposMovimiento"), 1);
}

#[test]
fn test_load_for_edit_unknown_record() {
    let mut c = loaded(FakeServer::seeded());
    c.open_form(EntityKind::Category);
    assert!(!c.load_for_edit(EntityKind::Category, Id::from(999)));
    assert!(!c.editing().is_active());
    assert_eq!(c.take_notices()[0].message, "Error loading data for editing");
}

#[test]
fn test_user_cascade_after_edit_load() {
    let mut c = loaded(FakeServer::seeded());
    c.load_for_edit(EntityKind::Concept, Id::from(1000));

    assert!(c.change_select(0, None));
    let chain = &c.form().unwrap().chain;
    assert!(!chain.level(1).unwrap().is_enabled());
    assert!(!chain.level(2).unwrap().is_enabled());
    assert!(c.form().unwrap().validate().is_err());
}

#[test]
fn test_change_select_without_form() {
    let mut c = loaded(FakeServer::seeded());
    assert!(!c.change_select(0, Some(Id::from(1))));
}

// ── Search ────────────────────────────────────────────────────

#[test]
fn test_search_fans_out_to_every_collection() {
    let mut c = loaded(FakeServer::seeded());
    c.perform_search("  ren ");

    for kind in EntityKind::ALL {
        assert_eq!(c.gateway().count(kind.actions().search), 1);
        assert!(c.collection(kind).in_search());
        assert!(!c.collection(kind).pagination_visible());
    }
    let (_, params) = c
        .gateway()
        .calls()
        .into_iter()
        .find(|(a, _)| a == "searchCategorias")
        .unwrap();
    assert_eq!(params["q"], "ren");

    assert_eq!(names(&c, EntityKind::Category), vec!["Renta"]);
    assert_eq!(c.collection(EntityKind::Category).info_text(), "Showing 1 search result(s)");
    let none = c.collection(EntityKind::MovementType);
    assert_eq!(none.info_text(), "Showing 0 result(s)");
    assert_eq!(none.placeholder(), Some("No results found"));
    assert_eq!(c.search().query(), "ren");
}

#[test]
fn test_search_results_are_unpaginated() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    c.perform_search("tipo");
    assert_eq!(c.collection(EntityKind::MovementType).rows().len(), 25);
    assert!(!c.next_page(EntityKind::MovementType));
}

#[test]
fn test_clearing_search_restores_pagination() {
    let mut c = loaded(FakeServer::with_movement_types(25));
    c.next_page(EntityKind::MovementType);
    c.perform_search("1");
    assert!(!c.collection(EntityKind::MovementType).pagination_visible());
    c.gateway().clear_calls();

    c.clear_search();
    assert!(!c.search().is_active());
    for kind in EntityKind::ALL {
        assert!(!c.collection(kind).in_search());
    }
    let mt = c.collection(EntityKind::MovementType);
    assert!(mt.pagination_visible());
    assert_eq!(mt.cursor().page, 2, "returns to the last-known page");
    assert_eq!(c.gateway().page_fetches(EntityKind::MovementType), vec![2]);

    let order: Vec<String> = c.gateway().calls().into_iter().map(|(a, _)| a).collect();
    assert_eq!(
        order,
        vec!["getTiposMovimiento", "getTiposCosto", "getCategorias", "getConceptos"]
    );
}

#[test]
fn test_failed_search_keeps_previous_rows() {
    let server = FakeServer::seeded();
    server.fail("searchConceptos");
    let mut c = loaded(server);
    c.perform_search("a");

    let concepts = c.collection(EntityKind::Concept);
    assert!(!concepts.in_search());
    assert_eq!(concepts.rows().len(), 2);
    assert!(c.collection(EntityKind::Category).in_search());

    let notices = c.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[test]
fn test_rejected_search_keeps_previous_rows_silently() {
    let server = FakeServer::seeded();
    server.reject("searchTiposCosto");
    let mut c = loaded(server);
    c.perform_search("o");

    assert!(!c.collection(EntityKind::CostType).in_search());
    assert!(c.take_notices().is_empty());
}

#[test]
fn test_debounced_search_fires_once_after_quiet_period() {
    let mut c = loaded(FakeServer::seeded());
    let t0 = Instant::now();
    c.queue_search("r", t0);
    c.queue_search("re", t0 + Duration::from_millis(100));
    c.queue_search("ren", t0 + Duration::from_millis(200));

    assert!(!c.poll_search(t0 + Duration::from_millis(450)));
    assert!(c.search().is_pending());
    assert!(c.gateway().calls().is_empty());

    assert!(c.poll_search(t0 + Duration::from_millis(500)));
    assert_eq!(c.search().query(), "ren");
    assert_eq!(c.gateway().count("searchCategorias"), 1);
    assert!(!c.poll_search(t0 + Duration::from_secs(5)));
}

#[test]
fn test_debounced_empty_input_restores_pages() {
    let mut c = loaded(FakeServer::seeded());
    c.perform_search("ren");
    let t0 = Instant::now();
    c.queue_search("   ", t0);
    assert!(c.poll_search(t0 + DELAY));
    assert!(!c.collection(EntityKind::Category).in_search());
}

#[test]
fn test_clear_search_cancels_pending_input() {
    let mut c = loaded(FakeServer::seeded());
    let t0 = Instant::now();
    c.queue_search("ren", t0);
    c.clear_search();
    assert!(!c.poll_search(t0 + Duration::from_secs(1)));
    assert_eq!(c.gateway().count("searchConceptos"), 0);
}

#[test]
fn test_submit_search_skips_the_wait() {
    let mut c = loaded(FakeServer::seeded());
    let t0 = Instant::now();
    c.queue_search("ren", t0);
    c.submit_search("ren");
    assert_eq!(c.gateway().count("searchCategorias"), 1);
    assert!(!c.poll_search(t0 + Duration::from_secs(1)));
    assert_eq!(c.gateway().count("searchCategorias"), 1);
}

#[test]
fn test_mutation_during_search_returns_table_to_pages() {
    let mut c = loaded(FakeServer::seeded());
    c.perform_search("a");
    assert!(c.delete(EntityKind::Concept, &Id::from(1001)));
    let concepts = c.collection(EntityKind::Concept);
    assert!(!concepts.in_search());
    assert_eq!(concepts.rows().len(), 1);
    // Other tables keep their overlay.
    assert!(c.collection(EntityKind::Category).in_search());
}

// ── Lookups ───────────────────────────────────────────────────

#[test]
fn test_fetch_record_not_found() {
    let c = loaded(FakeServer::seeded());
    let err = c.fetch_record(EntityKind::CostType, &Id::from(77)).unwrap_err();
    assert!(matches!(err, FetchError::Rejected(_)));
}

#[test]
fn test_fetch_record_transport_error() {
    let server = FakeServer::seeded();
    server.fail("getTipoCosto");
    let c = loaded(server);
    let err = c.fetch_record(EntityKind::CostType, &Id::from(10)).unwrap_err();
    assert!(matches!(err, FetchError::Api(ApiError::Status { status: 500 })));
}

#[test]
fn test_lookup_children() {
    let c = loaded(FakeServer::seeded());
    let options = c.lookup_children(Level::CostType, &Id::from(12)).unwrap();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Renta", "Servicios"]);
    assert!(c.lookup_children(Level::Category, &Id::from(100)).is_none());
}

#[test]
fn test_restore_after_failure() {
    let server = FakeServer::seeded();
    server.fail("getConceptos");
    let mut c = loaded(server);
    c.gateway().restore("getConceptos");
    assert!(c.refresh(EntityKind::Concept));
    assert_eq!(c.collection(EntityKind::Concept).rows().len(), 2);
    assert_eq!(c.gateway().len(EntityKind::Concept), 2);
}
