pub mod auth;
pub mod config;
pub mod handlers;
pub mod kits;
pub mod router;
pub mod sheets;
pub mod state;
pub mod utils;

pub use router::build_router;
