pub mod clean;
pub mod config;
pub mod discover;
pub mod load;
pub mod panel;
pub mod store;
pub mod surface;
