//! Per-tab content rendering.

pub mod credits;
pub mod locations;
pub mod sockets;
pub mod status;
pub mod users;
