pub mod export;
pub mod inventory;
