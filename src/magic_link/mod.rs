// magic_link/mod.rs - Passwordless sign-in links
//
// codec      - stateless signed token format (encode / decode / validate)
// generator  - issues tokens only for emails with an active customer account
// validation - rejection reasons surfaced to clients as numeric codes

pub mod codec;
pub mod generator;
pub mod validation;

pub use codec::{MagicLinkCodec, TokenPayload};
pub use generator::{MagicLink, MagicLinkError, MagicLinkGenerator};
pub use validation::ValidationError;
