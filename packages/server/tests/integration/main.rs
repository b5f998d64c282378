mod common;

mod admin_photos;
mod auth;
mod image;
mod mountain;
