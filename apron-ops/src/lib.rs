pub mod notifications;
pub mod policy;
pub mod readiness;
pub mod store;
pub mod sweeper;
pub mod workflows;

pub use notifications::{NewNotification, Notification, NotificationChannel, Severity};
pub use policy::Permission;
pub use readiness::{Dashboard, DepartureManifest, FlightReadiness};
pub use store::{FlightLookup, GroundOpsStore, StoreOptions};
pub use sweeper::{spawn_expiry_sweeper, SharedStore};
pub use workflows::GateInfo;
