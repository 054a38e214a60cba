pub mod health;
pub mod kits;
