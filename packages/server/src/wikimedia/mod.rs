pub mod commons;
pub mod fetch;
pub mod url;
