pub mod api;
pub mod config;
pub mod error;
pub mod insights;
pub mod lookup;
pub mod providers;
pub mod route_map;
pub mod state;
pub mod survey;
