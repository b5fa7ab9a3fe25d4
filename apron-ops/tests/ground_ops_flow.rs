use apron_core::models::{BagStatus, NewFlight, NewPassenger, PassengerPatch, Role};
use apron_core::{ManualClock, SequentialIdentityGenerator, Snapshot, SnapshotRepository, StoreError};
use apron_ops::{GroundOpsStore, StoreOptions};
use apron_store::{FileSnapshotRepository, MemorySnapshotRepository};
use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 25, 8, 0, 0).unwrap()
}

/// Reopens share `ids` so entities created after a restart never reuse a stored id
fn open(
    repo: Box<dyn SnapshotRepository>,
    clock: &ManualClock,
    ids: &Arc<SequentialIdentityGenerator>,
) -> GroundOpsStore {
    GroundOpsStore::open(
        repo,
        ids.clone(),
        Arc::new(clock.clone()),
        StoreOptions::default(),
    )
}

fn empty_repo() -> MemorySnapshotRepository {
    let repo = MemorySnapshotRepository::new();
    repo.save(&Snapshot::default()).unwrap();
    repo
}

fn add_flight(store: &mut GroundOpsStore, number: &str, gate: &str) -> String {
    store
        .create_flight(NewFlight {
            airline_flight_no: number.to_string(),
            origin: "DFW".to_string(),
            destination: "LAX".to_string(),
            departure_time: t0() + Duration::hours(2),
            gate: gate.to_string(),
        })
        .unwrap()
        .id
        .clone()
}

fn add_passenger(store: &mut GroundOpsStore, flight_id: &str, ticket: &str, luggage: &str) -> String {
    store
        .create_passenger(NewPassenger {
            full_name: "Rahim Latreche".to_string(),
            email: "rahim@smu.edu".to_string(),
            phone: "2145557777".to_string(),
            ticket_number: ticket.to_string(),
            flight_id: flight_id.to_string(),
            luggage_id: luggage.to_string(),
        })
        .unwrap()
        .id
        .clone()
}

#[test]
fn test_departure_flow_reaches_ready() {
    let clock = ManualClock::new(t0());
    let ids = Arc::new(SequentialIdentityGenerator::new());
    let mut store = open(Box::new(empty_repo()), &clock, &ids);
    let aa = add_flight(&mut store, "AA1234", "A12");
    let dl = add_flight(&mut store, "DL5678", "B05");
    add_passenger(&mut store, &aa, "1234567890", "654321");

    let readiness = store.flight_readiness(&aa).unwrap();
    assert!(!readiness.ready);
    assert_eq!(readiness.passenger_count, 1);

    clock.advance(Duration::minutes(10));
    store.check_in("1234567890").unwrap();

    clock.advance(Duration::minutes(10));
    assert!(store.board("1234567890", &dl).is_err());
    assert!(!store.passenger_by_ticket("1234567890").unwrap().boarded);

    store.board("1234567890", &aa).unwrap();
    assert!(!store.flight_readiness(&aa).unwrap().ready);

    clock.advance(Duration::minutes(10));
    store.load_bag(&aa, "654321").unwrap();

    let readiness = store.flight_readiness(&aa).unwrap();
    assert!(readiness.ready);
    assert_eq!((readiness.boarded_count, readiness.loaded_count), (1, 1));
    assert!(!store.flight_readiness(&dl).unwrap().ready);

    let statuses: Vec<BagStatus> = store.track_bag("654321").unwrap().iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![BagStatus::LoadedPlane, BagStatus::AtGate, BagStatus::ReceivedSecurity]);

    let timestamps: Vec<DateTime<Utc>> = store.bag_history("654321").iter().map(|e| e.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_patch_only_changes_named_fields() {
    let clock = ManualClock::new(t0());
    let ids = Arc::new(SequentialIdentityGenerator::new());
    let mut store = open(Box::new(empty_repo()), &clock, &ids);
    let aa = add_flight(&mut store, "AA1234", "A12");
    let id = add_passenger(&mut store, &aa, "1234567890", "654321");
    let before = store.passenger(&id).unwrap().clone();

    store
        .update_passenger(&id, PassengerPatch { checked_in: Some(true), ..Default::default() })
        .unwrap();

    let after = store.passenger(&id).unwrap();
    assert!(after.checked_in);
    assert_eq!(after.full_name, before.full_name);
    assert_eq!(after.email, before.email);
    assert_eq!(after.phone, before.phone);
    assert_eq!(after.ticket_number, before.ticket_number);
    assert_eq!(after.flight_id, before.flight_id);
    assert_eq!(after.luggage_id, before.luggage_id);
    assert!(!after.boarded);
}

#[test]
fn test_reopen_restores_state_and_session() {
    let clock = ManualClock::new(t0());
    let ids = Arc::new(SequentialIdentityGenerator::new());
    let repo = empty_repo();
    let mut store = open(Box::new(repo.clone()), &clock, &ids);

    let aa = add_flight(&mut store, "AA1234", "A12");
    add_passenger(&mut store, &aa, "1234567890", "654321");
    store.check_in("1234567890").unwrap();

    let mut reopened = open(Box::new(repo.clone()), &clock, &ids);
    assert!(reopened.current_user().is_none());
    assert_eq!(reopened.snapshot(), store.snapshot());

    add_flight(&mut reopened, "DL5678", "B05");
    reopened.check_in("1234567890").unwrap();
    let after = reopened.snapshot();
    let mut stored_ids: Vec<&str> = after
        .flights
        .iter()
        .map(|f| f.id.as_str())
        .chain(after.passengers.iter().map(|p| p.id.as_str()))
        .chain(after.bag_events.iter().map(|e| e.id.as_str()))
        .collect();
    let total = stored_ids.len();
    stored_ids.sort_unstable();
    stored_ids.dedup();
    assert_eq!(stored_ids.len(), total);

    let mut seeded = open(Box::new(MemorySnapshotRepository::new()), &clock, &ids);
    seeded.sign_in("smith01", "Pass1234").unwrap();
    let written = seeded.snapshot();

    let shared = MemorySnapshotRepository::new();
    shared.save(&written).unwrap();
    let restored = open(Box::new(shared.clone()), &clock, &ids);
    assert_eq!(restored.current_user().unwrap().role, Role::Airline);
    assert_eq!(restored.snapshot(), written);
    assert_eq!(shared.raw().unwrap(), written.to_json().unwrap());
}

#[test]
fn test_file_repository_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(t0());
    let ids = Arc::new(SequentialIdentityGenerator::new());

    let mut store = open(Box::new(FileSnapshotRepository::new(dir.path(), "apron_state")), &clock, &ids);
    assert_eq!(store.flights().len(), 2);
    store.check_in("1234567890").unwrap();
    store.post_message(apron_core::models::StaffRole::Gate, "Gate A12 open").unwrap();
    let expected = store.snapshot();
    drop(store);

    let reopened = open(Box::new(FileSnapshotRepository::new(dir.path(), "apron_state")), &clock, &ids);
    assert_eq!(reopened.snapshot(), expected);
    assert!(reopened.passenger_by_ticket("1234567890").unwrap().checked_in);
    assert_eq!(reopened.messages().next().unwrap().body, "Gate A12 open");
}

#[test]
fn test_notifications_expire_and_dismiss() {
    let clock = ManualClock::new(t0());
    let ids = Arc::new(SequentialIdentityGenerator::new());
    let mut store = open(Box::new(MemorySnapshotRepository::new()), &clock, &ids);

    store.check_in("0000000000").unwrap_err();
    clock.advance(Duration::seconds(3));
    store.check_in("1234567890").unwrap();
    assert_eq!(store.notifications().count(), 2);

    clock.advance(Duration::seconds(2));
    assert_eq!(store.sweep_notifications(), 1);
    let remaining: Vec<String> = store.notifications().map(|n| n.title.clone()).collect();
    assert_eq!(remaining, vec!["Checked in".to_string()]);

    let id = store.notifications().next().unwrap().id.clone();
    assert!(store.dismiss_notification(&id));
    clock.advance(Duration::seconds(10));
    assert_eq!(store.sweep_notifications(), 0);
}

#[test]
fn test_role_enforcement_blocks_wrong_desk() {
    let clock = ManualClock::new(t0());
    let mut store = GroundOpsStore::open(
        Box::new(MemorySnapshotRepository::new()),
        Arc::new(SequentialIdentityGenerator::new()),
        Arc::new(clock),
        StoreOptions { enforce_roles: true, ..Default::default() },
    );
    let aa = store.flight_by_number("AA1234").unwrap().id.clone();

    store.sign_in("brown03", "Pass1234").unwrap();
    assert!(matches!(store.check_in("1234567890"), Err(StoreError::Forbidden(_))));
    assert!(!store.passenger_by_ticket("1234567890").unwrap().checked_in);

    store.sign_in("smith01", "Pass1234").unwrap();
    store.check_in("1234567890").unwrap();
    assert!(matches!(store.load_bag(&aa, "654321"), Err(StoreError::Forbidden(_))));

    store.sign_in("johnson02", "Pass1234").unwrap();
    store.board("1234567890", &aa).unwrap();

    store.sign_in("brown03", "Pass1234").unwrap();
    store.load_bag(&aa, "654321").unwrap();
    assert!(store.flight_readiness(&aa).unwrap().ready);
}
