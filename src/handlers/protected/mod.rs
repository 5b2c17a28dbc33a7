// handlers/protected/mod.rs - Protected handlers (authenticated customer required)
//
// Every route here sits behind middleware::authenticate, so handlers can
// rely on an AuthUser extension being present.

pub mod user;

pub use user::user_get;
