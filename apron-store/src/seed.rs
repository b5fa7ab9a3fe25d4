use apron_core::models::{
    BagEvent, BagStatus, Flight, NewPassenger, NewUser, Passenger, Role, User,
};
use apron_core::{EntityKind, IdentityGenerator, Snapshot};
use chrono::{DateTime, Duration, Utc};

/// Demo data used when no usable snapshot exists, so a fresh install works out of the box
pub fn demo_snapshot(ids: &dyn IdentityGenerator, now: DateTime<Utc>) -> Snapshot {
    let users = [
        ("admin", "Admin123", Role::Admin, "admin@aa.com", "2145551234"),
        ("smith01", "Pass1234", Role::Airline, "smith@aa.com", "2145551111"),
        ("johnson02", "Pass1234", Role::Gate, "johnson@aa.com", "2145552222"),
        ("brown03", "Pass1234", Role::Ground, "brown@aa.com", "2145553333"),
        ("lee04", "Pass1234", Role::Passenger, "lee@aa.com", "2145554444"),
    ]
    .into_iter()
    .map(|(username, password, role, email, phone)| {
        User::new(
            ids.next_id(EntityKind::User),
            NewUser {
                username: username.to_string(),
                password: password.to_string(),
                role,
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
            },
        )
    })
    .collect();

    let flights = vec![
        Flight {
            id: ids.next_id(EntityKind::Flight),
            airline_flight_no: "AA1234".to_string(),
            origin: "DFW".to_string(),
            destination: "LAX".to_string(),
            departure_time: now + Duration::hours(2),
            gate: "A12".to_string(),
        },
        Flight {
            id: ids.next_id(EntityKind::Flight),
            airline_flight_no: "DL5678".to_string(),
            origin: "DFW".to_string(),
            destination: "JFK".to_string(),
            departure_time: now + Duration::hours(4),
            gate: "B05".to_string(),
        },
    ];

    let passengers = vec![Passenger::new(
        ids.next_id(EntityKind::Passenger),
        NewPassenger {
            full_name: "Rahim Latreche".to_string(),
            email: "rahim@smu.edu".to_string(),
            phone: "2145557777".to_string(),
            ticket_number: "1234567890".to_string(),
            flight_id: flights[0].id.clone(),
            luggage_id: "654321".to_string(),
        },
    )];

    let bag_events = vec![BagEvent {
        id: ids.next_id(EntityKind::BagEvent),
        luggage_id: "654321".to_string(),
        timestamp: now,
        location: "Baggage Drop".to_string(),
        status: BagStatus::Created,
        gate: None,
    }];

    Snapshot {
        users,
        flights,
        passengers,
        bag_events,
        messages: Vec::new(),
        current_user: None,
    }
}
