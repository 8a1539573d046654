//! Typed records for the Laadjefiets REST API.
//!
//! Payloads are decoded at the client boundary; a payload that does not fit
//! its record fails with `ApiError::Decode` instead of leaking half-filled
//! values into the console.
//!
//! - `User`, `Role`: accounts and admin roles
//! - `Socket`, `SocketOwner`: charging sockets and who they belong to
//! - `Location`: sites with a tariff per kWh
//! - `ChargingSession`: start/stop records with energy readings
//! - `CreditBalance`: prepaid balance
//! - `HealthReport`, `ServiceState`: health endpoint results

mod de;

pub mod ack;
pub mod credit;
pub mod health;
pub mod location;
pub mod session;
pub mod socket;
pub mod user;

pub use ack::Ack;
pub use credit::{CreditBalance, TopUp, TOP_UP_AMOUNTS};
pub use health::{HealthReport, ServiceState};
pub use location::{Location, LocationEnvelope, LocationList, NewLocation};
pub use session::{ChargingSession, SessionCommand, SessionInfo};
pub use socket::{NewSocket, Socket, SocketList, SocketOwner, SocketOwnerList};
pub use user::{AdminCheck, Credentials, LoginResponse, Registration, Role, User, UserList, UserUpdate};
