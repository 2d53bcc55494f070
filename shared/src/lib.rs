pub mod api;
pub mod models;
pub mod utils;
pub mod view;
