use crm_core::db::open_db;
use crm_core::{
    CrmSnapshot, CrmStore, LoadOrigin, MemorySlotStore, PersistError, SeedPolicy, Slot,
    SqliteSlotStore, StageDirection,
};

#[test]
fn first_run_seeds_without_writing() {
    let store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults);

    assert_eq!(store.clients().len(), 3);
    assert_eq!(store.conversations().len(), 2);
    assert_eq!(store.deals().len(), 3);
    assert_eq!(store.orders().len(), 2);
    assert_eq!(store.tasks().len(), 2);

    let report = store.hydration_report();
    assert_eq!(report.len(), 5);
    assert!(report
        .iter()
        .all(|(_, origin)| matches!(origin, LoadOrigin::Missing)));
    for slot in Slot::ALL {
        assert_eq!(store.slot_store().raw(slot.key()), None);
    }
}

#[test]
fn empty_policy_starts_blank() {
    let store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Empty);

    assert_eq!(store.snapshot(), CrmSnapshot::default());
    assert!(store.orphaned_references().is_empty());
}

#[test]
fn stored_empty_collection_is_not_reseeded() {
    let mut slots = MemorySlotStore::new();
    slots.insert_raw(Slot::Tasks.key(), b"[]".to_vec());

    let store = CrmStore::hydrate(slots, SeedPolicy::Defaults);
    assert!(store.tasks().is_empty());
    assert_eq!(store.clients().len(), 3);
}

#[test]
fn mutation_writes_only_its_own_slot() {
    let mut store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults);

    store.move_deal("D-003", StageDirection::Forward).unwrap();

    assert!(store.slot_store().raw(Slot::Deals.key()).is_some());
    for slot in [Slot::Clients, Slot::Conversations, Slot::Orders, Slot::Tasks] {
        assert_eq!(store.slot_store().raw(slot.key()), None, "{slot}");
    }
}

#[test]
fn clamped_move_writes_nothing() {
    let mut store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults);

    store.move_deal("D-001", StageDirection::Back).unwrap();
    assert_eq!(store.slot_store().raw(Slot::Deals.key()), None);
}

#[test]
fn corrupted_slot_falls_back_to_seed() {
    let mut slots = MemorySlotStore::new();
    slots.insert_raw(Slot::Deals.key(), b"{\"not\":\"a list\"}".to_vec());

    let store = CrmStore::hydrate(slots, SeedPolicy::Defaults);

    assert_eq!(store.deals().len(), 3);
    let (_, origin) = store
        .hydration_report()
        .iter()
        .find(|(slot, _)| *slot == Slot::Deals)
        .unwrap();
    assert!(matches!(
        origin,
        LoadOrigin::Recovered(PersistError::Decode { .. })
    ));
}

#[test]
fn failed_save_keeps_memory_and_can_be_retried() {
    let mut store = CrmStore::hydrate(MemorySlotStore::with_quota(16), SeedPolicy::Defaults);

    let client = store
        .add_client("Marta Ruiz", "+57 300 111 2222", None)
        .unwrap();

    assert_eq!(store.client(&client.id), Some(&client));
    assert_eq!(store.unsaved_slots(), vec![Slot::Clients]);
    assert_eq!(store.slot_store().raw(Slot::Clients.key()), None);
    assert!(matches!(
        store.retry_unsaved(),
        Err(PersistError::QuotaExceeded { .. })
    ));

    store.slot_store_mut().set_quota(None);
    store.retry_unsaved().unwrap();
    assert!(store.unsaved_slots().is_empty());
    assert!(store.slot_store().raw(Slot::Clients.key()).is_some());
}

#[test]
fn state_survives_restart_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let mut store =
            CrmStore::hydrate(SqliteSlotStore::try_new(&conn).unwrap(), SeedPolicy::Defaults);
        store.add_client("Marta Ruiz", "+57 300 111 2222", None).unwrap();
        store.move_deal("D-002", StageDirection::Forward).unwrap();
        store.send_message("W-1002", "Invoice sent").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let mut store =
        CrmStore::hydrate(SqliteSlotStore::try_new(&conn).unwrap(), SeedPolicy::Defaults);

    let report = store.hydration_report();
    assert!(report
        .iter()
        .filter(|(slot, _)| matches!(slot, Slot::Clients | Slot::Deals | Slot::Conversations))
        .all(|(_, origin)| matches!(origin, LoadOrigin::Stored)));
    assert_eq!(store.deal("D-002").unwrap().stage.label(), "Paid");
    assert_eq!(
        store.conversation("W-1002").unwrap().last_message().unwrap().text,
        "Invoice sent"
    );

    assert_eq!(store.clients().len(), 4);
    let next = store.add_client("Ana Torres", "+57 301 000 0000", None).unwrap();
    assert_eq!(next.id, "C-005");
}
