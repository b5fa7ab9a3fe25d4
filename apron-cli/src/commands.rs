use crate::cli::Command;
use anyhow::bail;
use apron_core::models::{NewFlight, NewPassenger, NewUser, User};
use apron_core::{StoreError, StoreResult};
use apron_ops::GroundOpsStore;
use serde::Serialize;
use serde_json::{json, Value};

/// Run one command against the store and render its result as JSON.
///
/// Store failures come back as [`StoreError`] inside the `anyhow` error so
/// the caller can report the failure kind.
pub fn execute(store: &mut GroundOpsStore, command: Command) -> anyhow::Result<Value> {
    let value = match command {
        Command::Summary => json!({
            "session": store.current_user().map(User::view),
            "dashboard": store.dashboard(),
            "readiness": store.readiness_board(),
        }),
        Command::SignIn { username, password } => render(store.sign_in(&username, &password)?.view())?,
        Command::SignOut => {
            store.sign_out();
            Value::Null
        }
        Command::ResetPassword { username, password, confirm } => {
            store.change_password(&username, &password, &confirm)?;
            Value::Null
        }
        Command::AddUser { username, password, role, email, phone } => {
            let user = store.create_user(NewUser { username, password, role, email, phone })?;
            render(user.view())?
        }
        Command::AddFlight { flight_no, origin, destination, departs, gate } => {
            let flight = store.create_flight(NewFlight {
                airline_flight_no: flight_no,
                origin,
                destination,
                departure_time: departs,
                gate,
            })?;
            render(flight)?
        }
        Command::RemoveFlight { flight_no } => {
            let flight_id = flight_id(store, &flight_no)?;
            json!({ "removed": store.remove_flight(&flight_id)? })
        }
        Command::AddPassenger { flight_no, ticket, luggage, email, phone, name } => {
            let flight_id = flight_id(store, &flight_no)?;
            let passenger = store.create_passenger(NewPassenger {
                full_name: name.join(" "),
                email,
                phone,
                ticket_number: ticket,
                flight_id,
                luggage_id: luggage,
            })?;
            render(passenger)?
        }
        Command::CheckIn { ticket } => render(store.check_in(&ticket)?)?,
        Command::Board { ticket, flight_no } => {
            let flight_id = flight_id(store, &flight_no)?;
            render(store.board(&ticket, &flight_id)?)?
        }
        Command::LoadBag { flight_no, luggage } => {
            let flight_id = flight_id(store, &flight_no)?;
            render(store.load_bag(&flight_id, &luggage)?)?
        }
        Command::BagStatus { luggage, status, location } => {
            render(store.update_bag_status(&luggage, &location, status)?)?
        }
        Command::Track { luggage } => render(store.track_bag(&luggage)?)?,
        Command::GateInfo { ticket } => render(store.gate_info(&ticket)?)?,
        Command::Manifest { flight_no } => {
            let flight_id = flight_id(store, &flight_no)?;
            render(store.departure_manifest(&flight_id))?
        }
        Command::Message { to, body } => render(store.post_message(to, &body.join(" "))?)?,
        Command::Inbox { role } => render(store.inbox(role))?,
        Command::Notifications => {
            store.sweep_notifications();
            render(store.notifications().collect::<Vec<_>>())?
        }
        Command::Dismiss { id } => json!({ "dismissed": store.dismiss_notification(&id) }),
        Command::Shell => bail!("Already in a shell"),
    };
    Ok(value)
}

/// JSON body printed to stderr when a command fails
pub fn failure(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<StoreError>() {
        Some(store_err) => json!({
            "error": store_err.kind(),
            "message": store_err.to_string(),
        }),
        None => json!({
            "error": "internal",
            "message": format!("{:#}", err),
        }),
    }
}

fn flight_id(store: &GroundOpsStore, flight_no: &str) -> StoreResult<String> {
    store
        .flight_by_number(flight_no)
        .map(|f| f.id.clone())
        .ok_or_else(|| StoreError::NotFound("Flight not found.".to_string()))
}

fn render<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ShellLine;
    use apron_core::{ManualClock, SequentialIdentityGenerator};
    use apron_ops::StoreOptions;
    use apron_store::MemorySnapshotRepository;
    use chrono::{TimeZone, Utc};
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn store() -> GroundOpsStore {
        GroundOpsStore::open(
            Box::new(MemorySnapshotRepository::new()),
            Arc::new(SequentialIdentityGenerator::new()),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 12, 25, 8, 0, 0).unwrap())),
            StoreOptions::default(),
        )
    }

    fn run(store: &mut GroundOpsStore, line: &str) -> anyhow::Result<Value> {
        let parsed = ShellLine::try_parse_from(line.split_whitespace())?;
        execute(store, parsed.command)
    }

    #[test]
    fn test_desk_commands_by_flight_number() {
        let mut store = store();

        run(&mut store, "check-in 1234567890").unwrap();
        let boarded = run(&mut store, "board 1234567890 aa1234").unwrap();
        assert_eq!(boarded["boarded"], json!(true));

        let event = run(&mut store, "load-bag AA1234 654321").unwrap();
        assert_eq!(event["status"], json!("loaded_plane"));

        let summary = run(&mut store, "summary").unwrap();
        assert_eq!(summary["readiness"][0]["ready"], json!(true));
        assert_eq!(summary["dashboard"]["passengers"], json!(1));
    }

    #[test]
    fn test_unknown_flight_number_is_not_found() {
        let mut store = store();
        let err = run(&mut store, "board 1234567890 UA0001").unwrap_err();

        assert_eq!(
            failure(&err),
            json!({ "error": "not_found", "message": "Flight not found." })
        );
    }

    #[test]
    fn test_consistency_failure_is_reported_by_kind() {
        let mut store = store();
        run(&mut store, "check-in 1234567890").unwrap();
        let err = run(&mut store, "load-bag DL5678 654321").unwrap_err();

        assert_eq!(failure(&err)["error"], json!("consistency"));
    }

    #[test]
    fn test_message_body_keeps_words() {
        let mut store = store();
        run(&mut store, "message gate Gate A12 now boarding").unwrap();

        let inbox = run(&mut store, "inbox gate").unwrap();
        assert_eq!(inbox[0]["body"], json!("Gate A12 now boarding"));
        assert_eq!(inbox[0]["toRole"], json!("gate"));
    }

    #[test]
    fn test_add_passenger_and_manifest() {
        let mut store = store();
        run(
            &mut store,
            "add-passenger DL5678 5555555555 555555 --email ana@smu.edu --phone 2145551111 Ana Ortiz",
        )
        .unwrap();

        let manifest = run(&mut store, "manifest DL5678").unwrap();
        assert_eq!(manifest["passengers"][0]["fullName"], json!("Ana Ortiz"));
        assert_eq!(manifest["flight"]["gate"], json!("B05"));
    }

    #[test]
    fn test_bag_status_rejects_unknown_words() {
        assert!(ShellLine::try_parse_from("bag-status 654321 lost".split_whitespace()).is_err());
        assert!(ShellLine::try_parse_from("bag-status 654321 at-gate --location Gate".split_whitespace()).is_ok());
    }

    #[test]
    fn test_account_output_never_carries_password() {
        let mut store = store();

        let outputs = [
            run(&mut store, "sign-in admin Admin123").unwrap(),
            run(&mut store, "summary").unwrap(),
            run(&mut store, "add-user jones05 Secret99 gate --email jones@aa.com").unwrap(),
        ];

        assert_eq!(outputs[1]["session"]["username"], json!("admin"));
        assert_eq!(outputs[2]["role"], json!("gate"));
        for output in &outputs {
            let text = output.to_string();
            assert!(!text.contains("\"password\""), "password key in {}", text);
            assert!(!text.contains("Admin123") && !text.contains("Secret99"));
        }
    }

    #[test]
    fn test_shell_is_not_nested() {
        let mut store = store();
        assert!(run(&mut store, "shell").is_err());
    }
}
