// handlers/mod.rs - Two-tier handler layout
//
// public    - no authentication (/auth/*)
// protected - guard chain must resolve a customer (/api/*)
// system    - liveness and service description

pub mod protected;
pub mod public;
pub mod system;
