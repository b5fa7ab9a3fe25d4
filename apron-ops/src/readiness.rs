use crate::store::GroundOpsStore;
use apron_core::models::{BagStatus, Flight, Passenger};
use serde::Serialize;
use std::collections::HashSet;

/// Derived, recomputed on every read; never stored
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlightReadiness {
    pub flight_id: String,
    pub airline_flight_no: String,
    pub passenger_count: usize,
    pub boarded_count: usize,
    pub loaded_count: usize,
    pub ready: bool,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub users: usize,
    pub flights: usize,
    pub passengers: usize,
    pub messages: usize,
    pub orphaned_passengers: usize,
}

/// A flight and everyone booked on it, for the gate departure view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureManifest<'a> {
    pub flight: &'a Flight,
    pub passengers: Vec<&'a Passenger>,
}

impl GroundOpsStore {
    /// Ready iff the flight has at least one passenger and every one of them
    /// is boarded with a `loaded_plane` event for their luggage. `None` if the
    /// flight does not exist.
    pub fn flight_readiness(&self, flight_id: &str) -> Option<FlightReadiness> {
        let flight = self.flight(flight_id)?;
        Some(self.readiness_of(flight, &self.loaded_luggage()))
    }

    /// One entry per flight, in flight order
    pub fn readiness_board(&self) -> Vec<FlightReadiness> {
        let loaded = self.loaded_luggage();
        self.flights().iter().map(|f| self.readiness_of(f, &loaded)).collect()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            users: self.users().len(),
            flights: self.flights().len(),
            passengers: self.passengers().len(),
            messages: self.messages().count(),
            orphaned_passengers: self
                .passengers()
                .iter()
                .filter(|p| self.flight(&p.flight_id).is_none())
                .count(),
        }
    }

    pub fn departure_manifest(&self, flight_id: &str) -> Option<DepartureManifest<'_>> {
        let flight = self.flight(flight_id)?;
        Some(DepartureManifest {
            flight,
            passengers: self.passengers().iter().filter(|p| p.flight_id == flight.id).collect(),
        })
    }

    fn loaded_luggage(&self) -> HashSet<&str> {
        self.bag_events()
            .filter(|e| e.status == BagStatus::LoadedPlane)
            .map(|e| e.luggage_id.as_str())
            .collect()
    }

    fn readiness_of(&self, flight: &Flight, loaded: &HashSet<&str>) -> FlightReadiness {
        let mut passenger_count = 0;
        let mut boarded_count = 0;
        let mut loaded_count = 0;
        let mut all_done = true;

        for passenger in self.passengers_on(&flight.id) {
            passenger_count += 1;
            let is_loaded = loaded.contains(passenger.luggage_id.as_str());
            if passenger.boarded {
                boarded_count += 1;
            }
            if is_loaded {
                loaded_count += 1;
            }
            all_done &= passenger.boarded && is_loaded;
        }

        FlightReadiness {
            flight_id: flight.id.clone(),
            airline_flight_no: flight.airline_flight_no.clone(),
            passenger_count,
            boarded_count,
            loaded_count,
            ready: passenger_count > 0 && all_done,
        }
    }
}
