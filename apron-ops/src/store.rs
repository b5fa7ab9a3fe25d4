use crate::notifications::{NewNotification, Notification, NotificationChannel};
use crate::policy::Permission;
use apron_core::models::{
    BagEvent, Flight, Message, NewBagEvent, NewFlight, NewMessage, NewPassenger, NewUser,
    Passenger, PassengerPatch, StaffRole, User,
};
use apron_core::validation::{
    is_admin_username, is_email_valid, is_flight_number_valid, is_luggage_id_valid,
    is_password_valid, is_phone_valid, is_ticket_valid, is_username_valid,
};
use apron_core::{
    Clock, EntityKind, IdentityGenerator, Snapshot, SnapshotRepository, StoreError, StoreResult,
};
use apron_store::demo_snapshot;
use chrono::Duration;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub notification_ttl: Duration,
    /// Require a signed-in session whose role allows each mutation
    pub enforce_roles: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::seconds(5),
            enforce_roles: false,
        }
    }
}

/// Result of resolving a passenger's flight reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightLookup<'a> {
    Found(&'a Flight),
    /// The referenced flight was removed; the passenger is orphaned
    Missing,
}

impl<'a> FlightLookup<'a> {
    pub fn found(self) -> Option<&'a Flight> {
        match self {
            FlightLookup::Found(flight) => Some(flight),
            FlightLookup::Missing => None,
        }
    }
}

/// The single authority over ground-operations state.
///
/// Every mutation validates first and only then touches state, so a failed
/// call leaves everything as it was. Successful mutations are written through
/// to the repository immediately.
pub struct GroundOpsStore {
    repository: Box<dyn SnapshotRepository>,
    ids: Arc<dyn IdentityGenerator>,
    clock: Arc<dyn Clock>,
    options: StoreOptions,
    users: Vec<User>,
    flights: Vec<Flight>,
    passengers: Vec<Passenger>,
    bag_events: VecDeque<BagEvent>,
    messages: VecDeque<Message>,
    current_user_id: Option<String>,
    notifications: NotificationChannel,
    last_persistence_error: Option<String>,
}

impl GroundOpsStore {
    /// Load the stored snapshot, or seed demo data when it is absent or unreadable
    pub fn open(
        repository: Box<dyn SnapshotRepository>,
        ids: Arc<dyn IdentityGenerator>,
        clock: Arc<dyn Clock>,
        options: StoreOptions,
    ) -> Self {
        let (snapshot, seeded) = match repository.load() {
            Ok(Some(snapshot)) => {
                info!("Loaded snapshot from {}", repository.describe());
                (snapshot, false)
            }
            Ok(None) => {
                info!("No snapshot in {}, seeding demo data", repository.describe());
                (demo_snapshot(ids.as_ref(), clock.now()), true)
            }
            Err(e) => {
                warn!("Snapshot in {} unusable ({}), seeding demo data", repository.describe(), e);
                (demo_snapshot(ids.as_ref(), clock.now()), true)
            }
        };

        let current_user_id = snapshot.current_user.as_ref().and_then(|session| {
            let known = snapshot.users.iter().any(|u| u.id == session.id);
            if !known {
                warn!("Stored session refers to unknown user {}, dropping it", session.id);
            }
            known.then(|| session.id.clone())
        });

        let mut store = Self {
            repository,
            ids,
            clock,
            notifications: NotificationChannel::new(options.notification_ttl),
            options,
            users: snapshot.users,
            flights: snapshot.flights,
            passengers: snapshot.passengers,
            bag_events: snapshot.bag_events.into(),
            messages: snapshot.messages.into(),
            current_user_id,
            last_persistence_error: None,
        };

        if seeded {
            store.persist();
        }
        store
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Case-insensitive username, exact password. Sets the session on success.
    pub fn authenticate(&mut self, username: &str, password: &str) -> StoreResult<&User> {
        let idx = self
            .users
            .iter()
            .position(|u| u.has_username(username) && u.verify_password(password))
            .ok_or(StoreError::InvalidCredentials)?;

        self.current_user_id = Some(self.users[idx].id.clone());
        info!("User {} signed in", self.users[idx].username);
        self.persist();
        Ok(&self.users[idx])
    }

    pub fn end_session(&mut self) {
        if let Some(id) = self.current_user_id.take() {
            info!("Session for {} ended", id);
            self.persist();
        }
    }

    pub fn reset_password(&mut self, username: &str, new_password: &str) -> StoreResult<()> {
        if !is_password_valid(new_password) {
            return Err(StoreError::validation(
                "password",
                "Password must be at least 6 characters and include letters and digits.",
            ));
        }
        let user = self
            .users
            .iter_mut()
            .find(|u| u.has_username(username.trim()))
            .ok_or_else(|| StoreError::NotFound("User not found.".to_string()))?;

        user.set_password(new_password.to_string());
        info!("Password reset for {}", user.username);
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn create_user(&mut self, new_user: NewUser) -> StoreResult<&User> {
        self.authorize(Permission::ManageStaff)?;

        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(StoreError::validation("username", "Username is required."));
        }
        if !is_admin_username(&username) && !is_username_valid(&username) {
            return Err(StoreError::validation(
                "username",
                "Username format: lastname + 2 digits (example: smith01).",
            ));
        }
        if self.find_user(&username).is_some() {
            return Err(StoreError::Conflict("Username must be unique.".to_string()));
        }
        if !is_password_valid(&new_user.password) {
            return Err(StoreError::validation(
                "password",
                "Password must be at least 6 characters and include letters and digits.",
            ));
        }
        let email = non_blank(new_user.email);
        if email.as_deref().is_some_and(|e| !is_email_valid(e)) {
            return Err(StoreError::validation("email", "Email format example: user@aa.com"));
        }
        let phone = non_blank(new_user.phone);
        if phone.as_deref().is_some_and(|p| !is_phone_valid(p)) {
            return Err(StoreError::validation("phone", "Phone must be 10 digits."));
        }

        let user = User::new(
            self.ids.next_id(EntityKind::User),
            NewUser {
                username,
                password: new_user.password,
                role: new_user.role,
                email,
                phone,
            },
        );
        info!("Created {} account {}", user.role, user.username);
        self.users.push(user);
        self.persist();
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn create_flight(&mut self, new_flight: NewFlight) -> StoreResult<&Flight> {
        self.authorize(Permission::ManageFlights)?;

        let airline_flight_no = new_flight.airline_flight_no.trim().to_uppercase();
        if airline_flight_no.is_empty() {
            return Err(StoreError::validation("airlineFlightNo", "Flight number is required."));
        }
        if !is_flight_number_valid(&airline_flight_no) {
            return Err(StoreError::validation(
                "airlineFlightNo",
                "Format: 2 letters + 4 digits (example: AA1234).",
            ));
        }
        let origin = required_upper(&new_flight.origin, "origin", "Origin is required.")?;
        let destination =
            required_upper(&new_flight.destination, "destination", "Destination is required.")?;
        let gate = required_upper(&new_flight.gate, "gate", "Gate is required.")?;

        let flight = Flight {
            id: self.ids.next_id(EntityKind::Flight),
            airline_flight_no,
            origin,
            destination,
            departure_time: new_flight.departure_time,
            gate,
        };
        info!("Created flight {} ({} -> {})", flight.airline_flight_no, flight.origin, flight.destination);
        self.flights.push(flight);
        self.persist();
        Ok(&self.flights[self.flights.len() - 1])
    }

    /// Passengers of the removed flight are kept and become orphaned
    pub fn remove_flight(&mut self, flight_id: &str) -> StoreResult<bool> {
        self.authorize(Permission::ManageFlights)?;

        let Some(idx) = self.flights.iter().position(|f| f.id == flight_id) else {
            return Ok(false);
        };
        let flight = self.flights.remove(idx);
        let orphaned = self.passengers.iter().filter(|p| p.flight_id == flight.id).count();
        info!("Removed flight {} ({} passengers orphaned)", flight.airline_flight_no, orphaned);
        self.persist();
        Ok(true)
    }

    pub fn create_passenger(&mut self, new_passenger: NewPassenger) -> StoreResult<&Passenger> {
        self.authorize(Permission::ManagePassengers)?;

        let new_passenger = NewPassenger {
            full_name: new_passenger.full_name.trim().to_string(),
            email: new_passenger.email.trim().to_string(),
            phone: new_passenger.phone.trim().to_string(),
            ticket_number: new_passenger.ticket_number.trim().to_string(),
            flight_id: new_passenger.flight_id.trim().to_string(),
            luggage_id: new_passenger.luggage_id.trim().to_string(),
        };
        if new_passenger.full_name.is_empty() {
            return Err(StoreError::validation("fullName", "Name is required."));
        }
        check_email(&new_passenger.email)?;
        check_phone(&new_passenger.phone)?;
        check_ticket(&new_passenger.ticket_number)?;
        check_luggage_id(&new_passenger.luggage_id)?;
        if new_passenger.flight_id.is_empty() {
            return Err(StoreError::validation("flightId", "Flight is required."));
        }
        self.require_flight(&new_passenger.flight_id)?;
        self.check_passenger_uniqueness(None, &new_passenger.ticket_number, &new_passenger.luggage_id)?;

        let passenger = Passenger::new(self.ids.next_id(EntityKind::Passenger), new_passenger);
        info!("Added passenger {} with ticket {}", passenger.id, passenger.ticket_number);
        self.passengers.push(passenger);
        self.persist();
        Ok(&self.passengers[self.passengers.len() - 1])
    }

    /// Merge `patch` into the passenger. `Ok(false)` when no such passenger exists.
    pub fn update_passenger(&mut self, passenger_id: &str, patch: PassengerPatch) -> StoreResult<bool> {
        self.authorize(Permission::ManagePassengers)?;

        let Some(idx) = self.passengers.iter().position(|p| p.id == passenger_id) else {
            return Ok(false);
        };
        let patch = patch.trimmed();

        if let Some(name) = &patch.full_name {
            if name.is_empty() {
                return Err(StoreError::validation("fullName", "Name is required."));
            }
        }
        if let Some(email) = &patch.email {
            check_email(email)?;
        }
        if let Some(phone) = &patch.phone {
            check_phone(phone)?;
        }
        if let Some(ticket) = &patch.ticket_number {
            check_ticket(ticket)?;
        }
        if let Some(luggage_id) = &patch.luggage_id {
            check_luggage_id(luggage_id)?;
        }
        if let Some(flight_id) = &patch.flight_id {
            self.require_flight(flight_id)?;
        }

        let mut candidate = self.passengers[idx].clone();
        candidate.apply(patch);
        if candidate.boarded && !candidate.checked_in {
            return Err(StoreError::Consistency(
                "Passenger must be checked in before boarding.".to_string(),
            ));
        }
        self.check_passenger_uniqueness(Some(passenger_id), &candidate.ticket_number, &candidate.luggage_id)?;

        self.passengers[idx] = candidate;
        info!("Updated passenger {}", passenger_id);
        self.persist();
        Ok(true)
    }

    /// Append to the bag log. Events are never edited or removed.
    pub fn record_bag_event(&mut self, new_event: NewBagEvent) -> StoreResult<&BagEvent> {
        self.authorize(Permission::HandleBags)?;
        check_luggage_id(new_event.luggage_id.trim())?;

        self.push_bag_event(new_event);
        self.persist();
        Ok(&self.bag_events[0])
    }

    pub fn send_message(&mut self, new_message: NewMessage) -> StoreResult<&Message> {
        self.authorize(Permission::SendMessage)?;

        let body = new_message.body.trim();
        if body.is_empty() {
            return Err(StoreError::validation("body", "Message required."));
        }
        let message = Message {
            id: self.ids.next_id(EntityKind::Message),
            from_username: new_message.from_username,
            to_role: new_message.to_role,
            body: body.to_string(),
            timestamp: self.clock.now(),
        };
        info!("Message {} from {} to {:?}", message.id, message.from_username, message.to_role);
        self.messages.push_front(message);
        self.persist();
        Ok(&self.messages[0])
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn notify(&mut self, new: NewNotification) -> String {
        let id = self.ids.next_id(EntityKind::Notification);
        let now = self.clock.now();
        self.notifications.push(id.clone(), new, now);
        id
    }

    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        self.notifications.dismiss(id)
    }

    /// Remove every notification whose time is up
    pub fn sweep_notifications(&mut self) -> usize {
        let now = self.clock.now();
        self.notifications.sweep(now)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    /// Newest first
    pub fn bag_events(&self) -> impl Iterator<Item = &BagEvent> {
        self.bag_events.iter()
    }

    /// Newest first
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Newest first
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.current_user_id.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.has_username(username))
    }

    pub fn flight(&self, flight_id: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.id == flight_id)
    }

    pub fn flight_by_number(&self, flight_no: &str) -> Option<&Flight> {
        self.flights
            .iter()
            .find(|f| f.airline_flight_no.eq_ignore_ascii_case(flight_no.trim()))
    }

    pub fn passenger(&self, passenger_id: &str) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.id == passenger_id)
    }

    pub fn passenger_by_ticket(&self, ticket: &str) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.ticket_number == ticket.trim())
    }

    pub fn passenger_by_luggage(&self, luggage_id: &str) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.luggage_id == luggage_id.trim())
    }

    pub fn flight_of(&self, passenger: &Passenger) -> FlightLookup<'_> {
        match self.flight(&passenger.flight_id) {
            Some(flight) => FlightLookup::Found(flight),
            None => FlightLookup::Missing,
        }
    }

    pub fn passengers_on<'a>(&'a self, flight_id: &'a str) -> impl Iterator<Item = &'a Passenger> + 'a {
        self.passengers.iter().filter(move |p| p.flight_id == flight_id)
    }

    /// Every event ever recorded for the luggage id, newest first
    pub fn bag_history(&self, luggage_id: &str) -> Vec<&BagEvent> {
        let luggage_id = luggage_id.trim();
        self.bag_events.iter().filter(|e| e.luggage_id == luggage_id).collect()
    }

    /// Messages addressed to a role, newest first
    pub fn inbox(&self, role: StaffRole) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.to_role == role).collect()
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.clone(),
            flights: self.flights.clone(),
            passengers: self.passengers.clone(),
            bag_events: self.bag_events.iter().cloned().collect(),
            messages: self.messages.iter().cloned().collect(),
            current_user: self.current_user().cloned(),
        }
    }

    // ------------------------------------------------------------------
    // Internals shared with the workflows
    // ------------------------------------------------------------------

    pub(crate) fn authorize(&self, permission: Permission) -> StoreResult<()> {
        if !self.options.enforce_roles {
            return Ok(());
        }
        match self.current_user() {
            None => Err(StoreError::Forbidden("Sign in required.".to_string())),
            Some(user) if permission.allowed_for(user.role) => Ok(()),
            Some(user) => Err(StoreError::Forbidden(format!(
                "Role {} may not {}.",
                user.role, permission
            ))),
        }
    }

    pub(crate) fn require_flight(&self, flight_id: &str) -> StoreResult<&Flight> {
        self.flight(flight_id)
            .ok_or_else(|| StoreError::NotFound("Flight not found.".to_string()))
    }

    pub(crate) fn passenger_index_by_ticket(&self, ticket: &str) -> StoreResult<usize> {
        self.passengers
            .iter()
            .position(|p| p.ticket_number == ticket)
            .ok_or_else(|| StoreError::NotFound("No passenger matches that ticket number.".to_string()))
    }

    pub(crate) fn passenger_mut(&mut self, idx: usize) -> &mut Passenger {
        &mut self.passengers[idx]
    }

    /// Prepend without persisting; the caller persists once its whole change is applied
    pub(crate) fn push_bag_event(&mut self, new_event: NewBagEvent) -> &BagEvent {
        let event = BagEvent {
            id: self.ids.next_id(EntityKind::BagEvent),
            luggage_id: new_event.luggage_id.trim().to_string(),
            timestamp: self.clock.now(),
            location: new_event.location,
            status: new_event.status,
            gate: new_event.gate,
        };
        info!("Bag {} -> {} at {}", event.luggage_id, event.status, event.location);
        self.bag_events.push_front(event);
        &self.bag_events[0]
    }

    /// Write-through. A failed write is logged and remembered, never rolled back.
    pub(crate) fn persist(&mut self) {
        match self.repository.save(&self.snapshot()) {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => {
                warn!("Failed to persist snapshot to {}: {}", self.repository.describe(), e);
                self.last_persistence_error = Some(e.to_string());
            }
        }
    }

    fn check_passenger_uniqueness(
        &self,
        except_id: Option<&str>,
        ticket: &str,
        luggage_id: &str,
    ) -> StoreResult<()> {
        let others = || self.passengers.iter().filter(move |p| Some(p.id.as_str()) != except_id);
        if others().any(|p| p.ticket_number == ticket) {
            return Err(StoreError::Conflict("Ticket number already exists.".to_string()));
        }
        if others().any(|p| p.luggage_id == luggage_id) {
            return Err(StoreError::Conflict("Luggage ID already exists.".to_string()));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required_upper(value: &str, field: &'static str, message: &str) -> StoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::validation(field, message));
    }
    Ok(value.to_uppercase())
}

fn check_email(email: &str) -> StoreResult<()> {
    match email.trim() {
        "" => Err(StoreError::validation("email", "Email is required.")),
        e if !is_email_valid(e) => Err(StoreError::validation("email", "Email format example: user@aa.com")),
        _ => Ok(()),
    }
}

fn check_phone(phone: &str) -> StoreResult<()> {
    match phone.trim() {
        "" => Err(StoreError::validation("phone", "Phone is required.")),
        p if !is_phone_valid(p) => Err(StoreError::validation("phone", "Phone must be 10 digits.")),
        _ => Ok(()),
    }
}

pub(crate) fn check_ticket(ticket: &str) -> StoreResult<()> {
    match ticket.trim() {
        "" => Err(StoreError::validation("ticketNumber", "Ticket number is required.")),
        t if !is_ticket_valid(t) => Err(StoreError::validation("ticketNumber", "Ticket number must be 10 digits.")),
        _ => Ok(()),
    }
}

pub(crate) fn check_luggage_id(luggage_id: &str) -> StoreResult<()> {
    match luggage_id.trim() {
        "" => Err(StoreError::validation("luggageId", "Luggage ID is required.")),
        l if !is_luggage_id_valid(l) => Err(StoreError::validation("luggageId", "Luggage ID must be 6 digits.")),
        _ => Ok(()),
    }
}
