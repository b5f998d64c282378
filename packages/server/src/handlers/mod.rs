pub mod admin;
pub mod climb;
pub mod image;
pub mod mountain;
pub mod review;
