use apron_core::models::Role;
use std::fmt;

/// Operations that can be gated by the signed-in role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageStaff,
    ManageFlights,
    ManagePassengers,
    CheckIn,
    Board,
    HandleBags,
    SendMessage,
}

impl Permission {
    pub fn allowed_for(&self, role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::Airline => matches!(self, Permission::CheckIn | Permission::SendMessage),
            Role::Gate => matches!(self, Permission::Board | Permission::SendMessage),
            Role::Ground => matches!(self, Permission::HandleBags | Permission::SendMessage),
            Role::Passenger => false,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::ManageStaff => "manage staff",
            Permission::ManageFlights => "manage flights",
            Permission::ManagePassengers => "manage passengers",
            Permission::CheckIn => "check in passengers",
            Permission::Board => "board passengers",
            Permission::HandleBags => "handle bags",
            Permission::SendMessage => "send messages",
        };
        f.write_str(s)
    }
}
