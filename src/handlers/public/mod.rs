// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Entry points a customer can reach before holding any credential. Inputs
// come from anonymous callers and are validated here.

pub mod magic_link;

pub use magic_link::{magic_link_post, validate_email_format};
