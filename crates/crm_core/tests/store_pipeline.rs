use crm_core::{
    CrmStore, DashboardSummary, EntityKind, MemorySlotStore, SeedPolicy, Stage, StageDirection,
    StoreError, ValidationError,
};
use std::collections::BTreeMap;

fn seeded_store() -> CrmStore<MemorySlotStore> {
    CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults)
}

#[test]
fn add_deal_starts_at_new_with_fresh_id() {
    let mut store = seeded_store();

    let deal = store.add_deal("C-003", " Helmet ", 95_000).unwrap();

    assert_eq!(deal.id, "D-004");
    assert_eq!(deal.title, "Helmet");
    assert_eq!(deal.value, 95_000);
    assert_eq!(deal.stage, Stage::New);
    assert_eq!(store.deal("D-004"), Some(&deal));
}

#[test]
fn add_deal_validates_before_touching_state() {
    let mut store = seeded_store();

    assert_eq!(
        store.add_deal("C-404", "Helmet", 1).unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::Client,
            id: "C-404".to_string()
        }
    );
    assert!(matches!(
        store.add_deal("C-001", "Helmet", -1),
        Err(StoreError::Validation(ValidationError::NegativeAmount { .. }))
    ));
    assert!(matches!(
        store.add_deal("C-001", "  ", 1),
        Err(StoreError::Validation(ValidationError::EmptyField("title")))
    ));
    assert_eq!(store.deals().len(), 3);
}

#[test]
fn moving_forward_saturates_at_delivered() {
    let mut store = seeded_store();
    let id = store.add_deal("C-001", "Helmet", 1).unwrap().id;

    for _ in 0..5 {
        store.move_deal(&id, StageDirection::Forward).unwrap();
    }
    assert_eq!(store.deal(&id).unwrap().stage, Stage::Delivered);

    let sixth = store.move_deal(&id, StageDirection::Forward).unwrap();
    assert_eq!(sixth.stage, Stage::Delivered);
}

#[test]
fn moving_back_from_new_stays_at_new() {
    let mut store = seeded_store();

    let deal = store.move_deal("D-001", StageDirection::Back).unwrap();
    assert_eq!(deal.stage, Stage::New);
    assert_eq!(store.deal("D-001").unwrap().stage, Stage::New);
}

#[test]
fn moves_step_exactly_one_stage() {
    let mut store = seeded_store();

    assert_eq!(
        store.move_deal("D-002", StageDirection::Forward).unwrap().stage,
        Stage::Paid
    );
    assert_eq!(
        store.move_deal("D-002", StageDirection::Back).unwrap().stage,
        Stage::Quoted
    );
    assert_eq!(store.move_deal_by("D-003", -1).unwrap().stage, Stage::New);
}

#[test]
fn move_deal_rejects_unknown_ids_and_bad_deltas() {
    let mut store = seeded_store();

    assert_eq!(
        store.move_deal("D-404", StageDirection::Forward).unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::Deal,
            id: "D-404".to_string()
        }
    );
    assert_eq!(
        store.move_deal_by("D-001", 2).unwrap_err(),
        StoreError::Validation(ValidationError::InvalidStageDelta(2))
    );
    assert_eq!(store.deal("D-001").unwrap().stage, Stage::New);
}

#[test]
fn stage_moves_survive_rehydration() {
    let mut store = seeded_store();
    store.move_deal("D-001", StageDirection::Forward).unwrap();

    let reloaded = CrmStore::hydrate(store.into_slot_store(), SeedPolicy::Defaults);
    assert_eq!(reloaded.deal("D-001").unwrap().stage, Stage::Contacted);
}

#[test]
fn funnel_sums_values_per_stage_in_pipeline_order() {
    let store = seeded_store();

    let funnel = store.aggregate_funnel();
    let expected = BTreeMap::from([
        (Stage::New, 130_000),
        (Stage::Contacted, 240_000),
        (Stage::Quoted, 2_800_000),
        (Stage::Paid, 0),
        (Stage::Delivered, 0),
    ]);
    assert_eq!(funnel, expected);
    assert_eq!(funnel.keys().copied().collect::<Vec<_>>(), Stage::ALL.to_vec());
}

#[test]
fn funnel_reports_zero_for_every_stage_when_empty() {
    let store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Empty);

    let funnel = store.aggregate_funnel();
    assert_eq!(funnel.len(), 5);
    assert!(funnel.values().all(|total| *total == 0));
    assert_eq!(store.aggregate_order_total(), 0);
}

#[test]
fn funnel_groups_multiple_deals_in_one_stage() {
    let mut store = seeded_store();
    let id = store.add_deal("C-002", "Extra intercom", 200_000).unwrap().id;
    store.move_deal(&id, StageDirection::Forward).unwrap();
    store.move_deal(&id, StageDirection::Forward).unwrap();

    assert_eq!(store.aggregate_funnel()[&Stage::Quoted], 3_000_000);
    let quoted: Vec<_> = store
        .deals_in_stage(Stage::Quoted)
        .into_iter()
        .map(|deal| deal.id.as_str())
        .collect();
    assert_eq!(quoted, vec!["D-002", "D-004"]);
}

#[test]
fn dashboard_matches_seed_numbers() {
    let store = seeded_store();

    assert_eq!(
        store.dashboard(),
        DashboardSummary {
            order_total: 2_930_000,
            open_deals: 3,
            new_deals: 1,
            client_count: 3,
            deal_count: 3,
            funnel_total: 3_170_000,
        }
    );
}

#[test]
fn delivered_deals_are_not_open() {
    let mut store = seeded_store();
    for _ in 0..2 {
        store.move_deal("D-002", StageDirection::Forward).unwrap();
    }

    let summary = store.dashboard();
    assert_eq!(summary.open_deals, 2);
    assert_eq!(summary.funnel_total, 3_170_000);
}
