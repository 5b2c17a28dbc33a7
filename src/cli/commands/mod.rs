pub mod jwt;
pub mod token;
