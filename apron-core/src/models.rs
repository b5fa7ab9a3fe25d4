use apron_shared::Masked;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff and passenger account roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Airline,
    Gate,
    Ground,
    Passenger,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Airline => "airline",
            Role::Gate => "gate",
            Role::Ground => "ground",
            Role::Passenger => "passenger",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "airline" => Ok(Role::Airline),
            "gate" => Ok(Role::Gate),
            "ground" => Ok(Role::Ground),
            "passenger" => Ok(Role::Passenger),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Roles that can receive inter-role messages (passengers have no inbox)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Airline,
    Gate,
    Ground,
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Admin => Role::Admin,
            StaffRole::Airline => Role::Airline,
            StaffRole::Gate => Role::Gate,
            StaffRole::Ground => Role::Ground,
        }
    }
}

impl TryFrom<Role> for StaffRole {
    type Error = Role;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::Admin => Ok(StaffRole::Admin),
            Role::Airline => Ok(StaffRole::Airline),
            Role::Gate => Ok(StaffRole::Gate),
            Role::Ground => Ok(StaffRole::Ground),
            Role::Passenger => Err(role),
        }
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role: Role = s.parse()?;
        StaffRole::try_from(role).map_err(|r| format!("{} has no inbox", r))
    }
}

/// A staff or passenger account.
///
/// The password is only reachable through [`User::verify_password`]; it is
/// masked in Debug output and never returned by the query surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    password: Masked<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    pub fn new(id: String, new_user: NewUser) -> Self {
        Self {
            id,
            username: new_user.username,
            password: Masked::new(new_user.password),
            role: new_user.role,
            email: new_user.email,
            phone: new_user.phone,
        }
    }

    /// Case-insensitive username comparison
    pub fn has_username(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }

    /// Exact password comparison
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.expose() == candidate
    }

    pub fn set_password(&mut self, password: String) {
        self.password = Masked::new(password);
    }

    /// Public projection without the password
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// What callers outside the store may see of an account.
///
/// `User` serializes its password for the snapshot; anything printed or
/// handed to a presentation layer goes through this instead.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Fields for a new account
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline_flight_no: String, // e.g. AA1234
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub gate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub airline_flight_no: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub gate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub ticket_number: String, // 10 digits
    pub flight_id: String,
    pub luggage_id: String, // 6 digits
    pub checked_in: bool,
    pub boarded: bool,
}

impl Passenger {
    /// A new passenger always starts neither checked in nor boarded
    pub fn new(id: String, new_passenger: NewPassenger) -> Self {
        Self {
            id,
            full_name: new_passenger.full_name,
            email: new_passenger.email,
            phone: new_passenger.phone,
            ticket_number: new_passenger.ticket_number,
            flight_id: new_passenger.flight_id,
            luggage_id: new_passenger.luggage_id,
            checked_in: false,
            boarded: false,
        }
    }

    /// Merge the present fields of a patch into this record
    pub fn apply(&mut self, patch: PassengerPatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(ticket_number) = patch.ticket_number {
            self.ticket_number = ticket_number;
        }
        if let Some(flight_id) = patch.flight_id {
            self.flight_id = flight_id;
        }
        if let Some(luggage_id) = patch.luggage_id {
            self.luggage_id = luggage_id;
        }
        if let Some(checked_in) = patch.checked_in {
            self.checked_in = checked_in;
        }
        if let Some(boarded) = patch.boarded {
            self.boarded = boarded;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPassenger {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub ticket_number: String,
    pub flight_id: String,
    pub luggage_id: String,
}

/// Partial update of a passenger record; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ticket_number: Option<String>,
    pub flight_id: Option<String>,
    pub luggage_id: Option<String>,
    pub checked_in: Option<bool>,
    pub boarded: Option<bool>,
}

impl PassengerPatch {
    /// Surrounding whitespace stripped from every text field
    pub fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            full_name: trim(self.full_name),
            email: trim(self.email),
            phone: trim(self.phone),
            ticket_number: trim(self.ticket_number),
            flight_id: trim(self.flight_id),
            luggage_id: trim(self.luggage_id),
            checked_in: self.checked_in,
            boarded: self.boarded,
        }
    }
}

/// Bag tracking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BagStatus {
    Created,
    ReceivedSecurity,
    ClearedSecurity,
    AtGate,
    LoadedPlane,
}

impl BagStatus {
    /// Statuses ground staff may record by hand
    pub fn is_ground_updatable(&self) -> bool {
        matches!(
            self,
            BagStatus::ReceivedSecurity | BagStatus::ClearedSecurity | BagStatus::AtGate
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BagStatus::Created => "created",
            BagStatus::ReceivedSecurity => "received_security",
            BagStatus::ClearedSecurity => "cleared_security",
            BagStatus::AtGate => "at_gate",
            BagStatus::LoadedPlane => "loaded_plane",
        }
    }
}

impl fmt::Display for BagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BagStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "created" => Ok(BagStatus::Created),
            "received_security" => Ok(BagStatus::ReceivedSecurity),
            "cleared_security" => Ok(BagStatus::ClearedSecurity),
            "at_gate" => Ok(BagStatus::AtGate),
            "loaded_plane" => Ok(BagStatus::LoadedPlane),
            other => Err(format!("unknown bag status: {}", other)),
        }
    }
}

/// One immutable record in the per-luggage tracking log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BagEvent {
    pub id: String,
    pub luggage_id: String,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub status: BagStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBagEvent {
    pub luggage_id: String,
    pub location: String,
    pub status: BagStatus,
    pub gate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from_username: String,
    pub to_role: StaffRole,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub from_username: String,
    pub to_role: StaffRole,
    pub body: String,
}
