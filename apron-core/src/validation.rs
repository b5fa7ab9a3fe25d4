//! Field format rules.
//!
//! Every check is a pure, total predicate: invalid input returns `false` and
//! the caller attaches the user-facing message.

use regex::Regex;
use std::sync::LazyLock;

/// The administrative account is exempt from the username format
pub const ADMIN_USERNAME: &str = "admin";

// lastname + 2 digits
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+[0-9]{2}$").expect("valid username regex"));
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone regex"));
static FLIGHT_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}[0-9]{4}$").expect("valid flight number regex"));
static TICKET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid ticket regex"));
static LUGGAGE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("valid luggage id regex"));

pub fn is_username_valid(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

pub fn is_admin_username(username: &str) -> bool {
    username.eq_ignore_ascii_case(ADMIN_USERNAME)
}

/// At least 6 characters with at least one letter and one digit
pub fn is_password_valid(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn is_email_valid(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_phone_valid(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// Two letters followed by four digits, e.g. AA1234
pub fn is_flight_number_valid(flight_no: &str) -> bool {
    FLIGHT_NUMBER_REGEX.is_match(flight_no)
}

pub fn is_ticket_valid(ticket: &str) -> bool {
    TICKET_REGEX.is_match(ticket)
}

pub fn is_luggage_id_valid(luggage_id: &str) -> bool {
    LUGGAGE_ID_REGEX.is_match(luggage_id)
}
