pub mod b64;
pub mod jwt;
