//! Application layer - Use cases over the world model
//!
//! Services orchestrate the domain and talk to the outside world only
//! through the outbound ports.

pub mod ports;
pub mod services;
