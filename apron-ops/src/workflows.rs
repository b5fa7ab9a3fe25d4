//! Staff workflows.
//!
//! Each workflow runs all of its checks before touching state, applies the
//! whole change, persists once, and surfaces exactly one notification that
//! describes the outcome.

use crate::notifications::NewNotification;
use crate::policy::Permission;
use crate::store::{check_luggage_id, check_ticket, GroundOpsStore};
use apron_core::models::{BagEvent, BagStatus, Flight, Message, NewBagEvent, NewMessage, Passenger, StaffRole, User};
use apron_core::validation::{is_admin_username, is_password_valid, is_username_valid, ADMIN_USERNAME};
use apron_core::{StoreError, StoreResult};
use serde::Serialize;
use tracing::debug;

/// What a passenger sees when looking up their ticket
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateInfo {
    pub passenger: Passenger,
    pub flight: Flight,
}

impl GroundOpsStore {
    pub fn sign_in(&mut self, username: &str, password: &str) -> StoreResult<User> {
        let outcome = self.try_sign_in(username, password);
        match &outcome {
            Ok(_) => self.notify(NewNotification::success("Welcome").with_message("You are signed in.")),
            Err(e) => self.notify_failure("Login failed", e),
        };
        outcome
    }

    pub fn sign_out(&mut self) {
        self.end_session();
    }

    pub fn change_password(&mut self, username: &str, new_password: &str, confirm: &str) -> StoreResult<()> {
        let outcome = self.try_change_password(username, new_password, confirm);
        match &outcome {
            Ok(()) => self.notify(
                NewNotification::success("Password updated")
                    .with_message("You can now sign in with the new password."),
            ),
            Err(e) => self.notify_failure("Reset failed", e),
        };
        outcome
    }

    /// Marks the passenger checked in and records the bag as received at security
    pub fn check_in(&mut self, ticket: &str) -> StoreResult<Passenger> {
        let outcome = self.try_check_in(ticket);
        match &outcome {
            Ok(p) => self.notify(
                NewNotification::success("Checked in").with_message(format!("{} is checked in.", p.full_name)),
            ),
            Err(e) => self.notify_failure("Check-in failed", e),
        };
        outcome
    }

    /// Boards a checked-in passenger at the gate of `flight_id`.
    ///
    /// The passenger's ticket must be for that same flight; a mismatch is
    /// always rejected.
    pub fn board(&mut self, ticket: &str, flight_id: &str) -> StoreResult<Passenger> {
        let outcome = self.try_board(ticket, flight_id);
        match &outcome {
            Ok(p) => self.notify(
                NewNotification::success("Boarded").with_message(format!("{} has boarded.", p.full_name)),
            ),
            Err(e) => self.notify_failure("Boarding rejected", e),
        };
        outcome
    }

    pub fn load_bag(&mut self, flight_id: &str, luggage_id: &str) -> StoreResult<BagEvent> {
        let outcome = self.try_load_bag(flight_id, luggage_id);
        match &outcome {
            Ok(_) => self.notify(NewNotification::success("Bag loaded")),
            Err(e) => self.notify_failure("Cannot load bag", e),
        };
        outcome
    }

    /// Free-form ground update; no ownership check
    pub fn update_bag_status(&mut self, luggage_id: &str, location: &str, status: BagStatus) -> StoreResult<BagEvent> {
        let outcome = self.try_update_bag_status(luggage_id, location, status);
        match &outcome {
            Ok(_) => self.notify(NewNotification::success("Bag updated")),
            Err(e) => self.notify_failure("Bag update failed", e),
        };
        outcome
    }

    /// Sends as the signed-in user, or as the admin account when nobody is signed in
    pub fn post_message(&mut self, to_role: StaffRole, body: &str) -> StoreResult<Message> {
        let from_username = self
            .current_user()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| ADMIN_USERNAME.to_string());

        let outcome = self
            .send_message(NewMessage {
                from_username,
                to_role,
                body: body.to_string(),
            })
            .cloned();
        match &outcome {
            Ok(_) => self.notify(NewNotification::success("Message sent")),
            Err(e) => self.notify_failure("Message not sent", e),
        };
        outcome
    }

    /// Tracking history for a bag, newest first
    pub fn track_bag(&mut self, luggage_id: &str) -> StoreResult<Vec<BagEvent>> {
        if let Err(e) = check_luggage_id(luggage_id) {
            self.notify_failure("Invalid luggage ID", &e);
            return Err(e);
        }

        let events: Vec<BagEvent> = self.bag_history(luggage_id).into_iter().cloned().collect();
        if events.is_empty() {
            self.notify(
                NewNotification::info("No events").with_message("No tracking events found for this luggage ID."),
            );
        }
        debug!("Tracked bag {}: {} events", luggage_id.trim(), events.len());
        Ok(events)
    }

    pub fn gate_info(&mut self, ticket: &str) -> StoreResult<GateInfo> {
        let outcome = self.try_gate_info(ticket);
        match &outcome {
            Ok(_) => self.notify(NewNotification::success("Gate info loaded")),
            Err(e) => self.notify_failure("Gate info unavailable", e),
        };
        outcome
    }

    fn notify_failure(&mut self, title: &str, err: &StoreError) -> String {
        self.notify(NewNotification::error(title).with_message(err.to_string()))
    }

    fn try_sign_in(&mut self, username: &str, password: &str) -> StoreResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::validation("username", "Username is required."));
        }
        if password.is_empty() {
            return Err(StoreError::validation("password", "Password is required."));
        }
        if !is_admin_username(username) && !is_username_valid(username) {
            return Err(StoreError::validation(
                "username",
                "Username format: lastname + 2 digits (example: smith01).",
            ));
        }
        if !is_password_valid(password) {
            return Err(StoreError::validation(
                "password",
                "Password must be at least 6 characters and include letters and digits.",
            ));
        }
        self.authenticate(username, password).cloned()
    }

    fn try_change_password(&mut self, username: &str, new_password: &str, confirm: &str) -> StoreResult<()> {
        if username.trim().is_empty() {
            return Err(StoreError::validation("username", "Username is required."));
        }
        if new_password != confirm {
            return Err(StoreError::validation("confirm", "Passwords do not match."));
        }
        self.reset_password(username, new_password)
    }

    fn try_check_in(&mut self, ticket: &str) -> StoreResult<Passenger> {
        self.authorize(Permission::CheckIn)?;
        let ticket = ticket.trim();
        check_ticket(ticket)?;
        let idx = self.passenger_index_by_ticket(ticket)?;

        let passenger = self.passenger_mut(idx);
        passenger.checked_in = true;
        let checked_in = passenger.clone();

        self.push_bag_event(NewBagEvent {
            luggage_id: checked_in.luggage_id.clone(),
            location: "Check-in counter".to_string(),
            status: BagStatus::ReceivedSecurity,
            gate: None,
        });
        self.persist();
        Ok(checked_in)
    }

    fn try_board(&mut self, ticket: &str, flight_id: &str) -> StoreResult<Passenger> {
        self.authorize(Permission::Board)?;
        let ticket = ticket.trim();
        check_ticket(ticket)?;
        let flight_id = flight_id.trim();
        if flight_id.is_empty() {
            return Err(StoreError::validation("flightId", "Select the gate flight."));
        }
        let gate = self.require_flight(flight_id)?.gate.clone();
        let idx = self.passenger_index_by_ticket(ticket)?;

        let passenger = &self.passengers()[idx];
        if !passenger.checked_in {
            return Err(StoreError::Consistency(
                "Passenger must be checked in before boarding.".to_string(),
            ));
        }
        if passenger.flight_id != flight_id {
            return Err(StoreError::Consistency(
                "Passenger flight information does not match the selected gate flight.".to_string(),
            ));
        }

        let passenger = self.passenger_mut(idx);
        passenger.boarded = true;
        let boarded = passenger.clone();

        self.push_bag_event(NewBagEvent {
            luggage_id: boarded.luggage_id.clone(),
            location: format!("Gate {}", gate),
            status: BagStatus::AtGate,
            gate: Some(gate),
        });
        self.persist();
        Ok(boarded)
    }

    fn try_load_bag(&mut self, flight_id: &str, luggage_id: &str) -> StoreResult<BagEvent> {
        self.authorize(Permission::HandleBags)?;
        let flight_id = flight_id.trim();
        if flight_id.is_empty() {
            return Err(StoreError::validation("flightId", "Select a flight."));
        }
        let gate = self.require_flight(flight_id)?.gate.clone();
        let luggage_id = luggage_id.trim();
        check_luggage_id(luggage_id)?;

        let owner = self
            .passenger_by_luggage(luggage_id)
            .ok_or_else(|| StoreError::NotFound("No passenger matches this luggage ID.".to_string()))?;
        if owner.flight_id != flight_id {
            return Err(StoreError::Consistency(
                "Luggage does not belong to the selected flight.".to_string(),
            ));
        }

        let event = self
            .push_bag_event(NewBagEvent {
                luggage_id: luggage_id.to_string(),
                location: format!("Ramp for Gate {}", gate),
                status: BagStatus::LoadedPlane,
                gate: Some(gate),
            })
            .clone();
        self.persist();
        Ok(event)
    }

    fn try_update_bag_status(&mut self, luggage_id: &str, location: &str, status: BagStatus) -> StoreResult<BagEvent> {
        self.authorize(Permission::HandleBags)?;
        let luggage_id = luggage_id.trim();
        check_luggage_id(luggage_id)?;
        if !status.is_ground_updatable() {
            return Err(StoreError::validation(
                "status",
                "Ground updates may only record received_security, cleared_security or at_gate.",
            ));
        }

        let gate = self
            .passenger_by_luggage(luggage_id)
            .and_then(|p| self.flight_of(p).found())
            .map(|f| f.gate.clone());

        let location = match location.trim() {
            "" => "Unknown".to_string(),
            loc => loc.to_string(),
        };

        let event = self
            .push_bag_event(NewBagEvent {
                luggage_id: luggage_id.to_string(),
                location,
                status,
                gate,
            })
            .clone();
        self.persist();
        Ok(event)
    }

    fn try_gate_info(&self, ticket: &str) -> StoreResult<GateInfo> {
        let ticket = ticket.trim();
        check_ticket(ticket)?;

        let not_found = || StoreError::NotFound("No passenger/flight found for this ticket.".to_string());
        let passenger = self.passenger_by_ticket(ticket).ok_or_else(not_found)?;
        let flight = self.flight_of(passenger).found().ok_or_else(not_found)?;
        Ok(GateInfo {
            passenger: passenger.clone(),
            flight: flight.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Severity;
    use crate::store::StoreOptions;
    use apron_core::models::NewPassenger;
    use apron_core::{ManualClock, SequentialIdentityGenerator};
    use apron_store::MemorySnapshotRepository;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn seeded() -> GroundOpsStore {
        GroundOpsStore::open(
            Box::new(MemorySnapshotRepository::new()),
            Arc::new(SequentialIdentityGenerator::new()),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 12, 25, 8, 0, 0).unwrap())),
            StoreOptions::default(),
        )
    }

    fn flight_id(store: &GroundOpsStore, number: &str) -> String {
        store.flight_by_number(number).unwrap().id.clone()
    }

    fn latest(store: &GroundOpsStore) -> (Severity, String, Option<String>) {
        let n = store.notifications().next().unwrap();
        (n.severity, n.title.clone(), n.message.clone())
    }

    #[test]
    fn test_sign_in_checks_format_before_credentials() {
        let mut store = seeded();

        assert!(matches!(store.sign_in("smith", "Pass1234"), Err(StoreError::Validation { .. })));
        assert_eq!(latest(&store).1, "Login failed");

        assert_eq!(store.sign_in("smith01", "Wrong123"), Err(StoreError::InvalidCredentials));
        assert!(store.current_user().is_none());

        let user = store.sign_in("ADMIN", "Admin123").unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(latest(&store).0, Severity::Success);
        assert_eq!(store.notifications().count(), 3);

        store.sign_out();
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_change_password_requires_matching_confirmation() {
        let mut store = seeded();

        let err = store.change_password("lee04", "Newpass1", "Newpass2").unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
        assert_eq!(latest(&store).1, "Reset failed");

        store.change_password("lee04", "Newpass1", "Newpass1").unwrap();
        assert!(store.sign_in("lee04", "Newpass1").is_ok());
    }

    #[test]
    fn test_check_in_records_security_event() {
        let mut store = seeded();

        assert!(matches!(store.check_in("12345"), Err(StoreError::Validation { .. })));
        assert!(matches!(store.check_in("9999999999"), Err(StoreError::NotFound(_))));

        let passenger = store.check_in(" 1234567890 ").unwrap();
        assert!(passenger.checked_in);
        let newest = store.bag_history("654321")[0].clone();
        assert_eq!(newest.status, BagStatus::ReceivedSecurity);
        assert_eq!(newest.location, "Check-in counter");
        assert_eq!(latest(&store).1, "Checked in");
    }

    #[test]
    fn test_board_requires_check_in_and_matching_flight() {
        let mut store = seeded();
        let aa = flight_id(&store, "AA1234");
        let dl = flight_id(&store, "DL5678");

        let err = store.board("1234567890", &aa).unwrap_err();
        assert_eq!(err.to_string(), "Passenger must be checked in before boarding.");

        store.check_in("1234567890").unwrap();
        let events_before = store.bag_events().count();

        let err = store.board("1234567890", &dl).unwrap_err();
        assert_eq!(err.kind(), apron_core::ErrorKind::Consistency);
        assert_eq!(latest(&store).1, "Boarding rejected");
        assert!(!store.passenger_by_ticket("1234567890").unwrap().boarded);
        assert_eq!(store.bag_events().count(), events_before);

        assert!(matches!(store.board("1234567890", ""), Err(StoreError::Validation { .. })));

        let boarded = store.board("1234567890", &aa).unwrap();
        assert!(boarded.boarded);
        let newest = store.bag_history("654321")[0].clone();
        assert_eq!(newest.status, BagStatus::AtGate);
        assert_eq!(newest.location, "Gate A12");
        assert_eq!(newest.gate.as_deref(), Some("A12"));
    }

    #[test]
    fn test_load_bag_checks_ownership() {
        let mut store = seeded();
        let aa = flight_id(&store, "AA1234");
        let dl = flight_id(&store, "DL5678");

        assert_eq!(
            store.load_bag(&dl, "654321").unwrap_err(),
            StoreError::Consistency("Luggage does not belong to the selected flight.".to_string())
        );
        assert!(matches!(store.load_bag(&aa, "000000"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.load_bag("f_gone", "654321"), Err(StoreError::NotFound(_))));

        let event = store.load_bag(&aa, "654321").unwrap();
        assert_eq!(event.status, BagStatus::LoadedPlane);
        assert_eq!(event.location, "Ramp for Gate A12");
        assert_eq!(latest(&store).1, "Bag loaded");
    }

    #[test]
    fn test_update_bag_status_is_limited_to_ground_statuses() {
        let mut store = seeded();

        assert!(store.update_bag_status("654321", "Ramp", BagStatus::LoadedPlane).is_err());
        assert!(store.update_bag_status("654321", "Desk", BagStatus::Created).is_err());

        let event = store.update_bag_status("654321", "Security lane 3", BagStatus::ClearedSecurity).unwrap();
        assert_eq!(event.gate.as_deref(), Some("A12"));

        let stray = store.update_bag_status("777777", "  ", BagStatus::AtGate).unwrap();
        assert_eq!(stray.location, "Unknown");
        assert!(stray.gate.is_none());

        let manual = store
            .record_bag_event(NewBagEvent {
                luggage_id: "777777".to_string(),
                location: String::new(),
                status: BagStatus::Created,
                gate: None,
            })
            .unwrap()
            .clone();
        assert_eq!(manual.location, "");
    }

    #[test]
    fn test_post_message_uses_session_sender() {
        let mut store = seeded();

        let anonymous = store.post_message(StaffRole::Ground, "Belt 4 jammed").unwrap();
        assert_eq!(anonymous.from_username, "admin");

        store.sign_in("johnson02", "Pass1234").unwrap();
        let signed = store.post_message(StaffRole::Ground, "Gate A12 closing").unwrap();
        assert_eq!(signed.from_username, "johnson02");

        assert!(store.post_message(StaffRole::Gate, "  ").is_err());
        assert_eq!(latest(&store).1, "Message not sent");
        assert_eq!(store.inbox(StaffRole::Ground).len(), 2);
    }

    #[test]
    fn test_track_bag() {
        let mut store = seeded();

        assert!(store.track_bag("abc").is_err());
        assert_eq!(latest(&store).1, "Invalid luggage ID");

        let history = store.track_bag("654321").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, BagStatus::Created);
        assert_eq!(store.notifications().count(), 1);

        assert!(store.track_bag("123123").unwrap().is_empty());
        assert_eq!(latest(&store).0, Severity::Info);
    }

    #[test]
    fn test_gate_info_for_orphaned_passenger() {
        let mut store = seeded();
        let aa = flight_id(&store, "AA1234");

        let info = store.gate_info("1234567890").unwrap();
        assert_eq!(info.flight.gate, "A12");
        assert_eq!(info.passenger.full_name, "Rahim Latreche");

        store
            .create_passenger(NewPassenger {
                full_name: "Ana Ortiz".to_string(),
                email: "ana@smu.edu".to_string(),
                phone: "2145551111".to_string(),
                ticket_number: "2222222222".to_string(),
                flight_id: aa.clone(),
                luggage_id: "222222".to_string(),
            })
            .unwrap();
        store.remove_flight(&aa).unwrap();

        assert_eq!(
            store.gate_info("2222222222").unwrap_err(),
            StoreError::NotFound("No passenger/flight found for this ticket.".to_string())
        );
        assert_eq!(latest(&store).1, "Gate info unavailable");
    }
}
