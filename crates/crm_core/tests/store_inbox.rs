use chrono::{NaiveDate, NaiveDateTime};
use crm_core::{
    Channel, CrmStore, Direction, EntityKind, FixedClock, MemorySlotStore, PhrasePicker,
    SeedPolicy, Slot, StoreError, ValidationError, INBOUND_PHRASES, REPLY_TEMPLATES,
};
use std::cell::Cell;
use std::rc::Rc;

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 6)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap()
}

/// Always picks the same phrase and counts how often it was asked.
struct PinnedPicker {
    index: usize,
    calls: Rc<Cell<usize>>,
}

impl PhrasePicker for PinnedPicker {
    fn pick(&mut self, _len: usize) -> usize {
        self.calls.set(self.calls.get() + 1);
        self.index
    }
}

fn seeded_store() -> CrmStore<MemorySlotStore> {
    CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults)
        .with_clock(FixedClock(fixed_now()))
}

fn pinned_store(index: usize) -> (CrmStore<MemorySlotStore>, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let store = seeded_store().with_phrase_picker(PinnedPicker {
        index,
        calls: Rc::clone(&calls),
    });
    (store, calls)
}

#[test]
fn send_message_appends_outbound_with_next_id() {
    let mut store = seeded_store();
    let before = store.conversation("W-1001").unwrap().messages.clone();
    assert_eq!(before.len(), 2);

    let updated = store.send_message("W-1001", "Black it is, ships today").unwrap();

    assert_eq!(updated.messages.len(), 3);
    assert_eq!(&updated.messages[..2], before.as_slice());
    let sent = &updated.messages[2];
    assert_eq!(sent.id, 3);
    assert_eq!(sent.direction, Direction::Outbound);
    assert_eq!(sent.text, "Black it is, ships today");
    assert_eq!(sent.timestamp, fixed_now());
    assert_eq!(store.conversation("W-1001"), Some(&updated));
}

#[test]
fn send_message_rejects_blank_text_before_lookup() {
    let mut store = seeded_store();

    assert_eq!(
        store.send_message("W-1001", " \n ").unwrap_err(),
        StoreError::Validation(ValidationError::EmptyField("text"))
    );
    assert_eq!(
        store.send_message("W-404", " ").unwrap_err(),
        StoreError::Validation(ValidationError::EmptyField("text"))
    );
    assert_eq!(store.conversation("W-1001").unwrap().messages.len(), 2);
    assert_eq!(store.slot_store().raw(Slot::Conversations.key()), None);
}

#[test]
fn send_message_to_unknown_conversation_is_not_found() {
    let mut store = seeded_store();

    assert_eq!(
        store.send_message("W-404", "hola").unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::Conversation,
            id: "W-404".to_string()
        }
    );
}

#[test]
fn receive_simulated_uses_given_text_as_inbound() {
    let (mut store, calls) = pinned_store(0);

    let updated = store
        .receive_simulated("W-1002", Some("Send it to the warehouse"))
        .unwrap();

    let received = updated.last_message().unwrap();
    assert_eq!(received.id, 3);
    assert_eq!(received.direction, Direction::Inbound);
    assert_eq!(received.text, "Send it to the warehouse");
    assert_eq!(calls.get(), 0);
}

#[test]
fn receive_simulated_without_text_uses_the_picker() {
    let (mut store, calls) = pinned_store(2);

    let first = store.receive_simulated("W-1001", None).unwrap();
    assert_eq!(first.last_message().unwrap().text, INBOUND_PHRASES[2]);

    let second = store.receive_simulated("W-1001", Some("   ")).unwrap();
    let received = second.last_message().unwrap();
    assert_eq!(received.text, INBOUND_PHRASES[2]);
    assert_eq!(received.id, 4);
    assert_eq!(calls.get(), 2);
}

#[test]
fn receive_simulated_for_unknown_conversation_skips_the_picker() {
    let (mut store, calls) = pinned_store(1);

    assert!(matches!(
        store.receive_simulated("W-404", None),
        Err(StoreError::NotFound {
            entity: EntityKind::Conversation,
            ..
        })
    ));
    assert_eq!(calls.get(), 0);
}

#[test]
fn default_picker_always_picks_a_known_phrase() {
    let mut store = CrmStore::hydrate(MemorySlotStore::new(), SeedPolicy::Defaults);

    for _ in 0..20 {
        let updated = store.receive_simulated("W-1002", None).unwrap();
        let text = &updated.last_message().unwrap().text;
        assert!(INBOUND_PHRASES.contains(&text.as_str()));
    }
}

#[test]
fn send_template_sends_the_selected_reply() {
    let mut store = seeded_store();

    let updated = store.send_template("W-1002", 2).unwrap();
    let sent = updated.last_message().unwrap();
    assert_eq!(sent.text, REPLY_TEMPLATES[2]);
    assert_eq!(sent.direction, Direction::Outbound);

    assert_eq!(
        store.send_template("W-1002", 9).unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::ReplyTemplate,
            id: "9".to_string()
        }
    );
}

#[test]
fn open_conversation_requires_existing_client() {
    let mut store = seeded_store();

    let conversation = store.open_conversation("C-003", Channel::Other).unwrap();
    assert_eq!(conversation.id, "W-1003");
    assert!(conversation.open);
    assert!(conversation.messages.is_empty());

    assert!(matches!(
        store.open_conversation("C-404", Channel::WhatsApp),
        Err(StoreError::NotFound {
            entity: EntityKind::Client,
            ..
        })
    ));
    assert_eq!(store.conversations().len(), 3);
}

#[test]
fn closing_a_conversation_keeps_its_messages() {
    let mut store = seeded_store();

    let closed = store.set_conversation_open("W-1001", false).unwrap();
    assert!(!closed.open);
    assert_eq!(closed.messages.len(), 2);
    assert!(store.set_conversation_open("W-404", true).is_err());
}

#[test]
fn previews_pair_threads_with_client_names() {
    let mut store = seeded_store();
    store.remove_client("C-002");

    let previews = store.conversation_previews();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].client_name.as_deref(), Some("Juan Pérez"));
    assert_eq!(
        previews[0].last_message.as_ref().map(|m| m.direction),
        Some(Direction::Outbound)
    );
    assert_eq!(previews[1].conversation_id, "W-1002");
    assert_eq!(previews[1].client_name, None);
}
