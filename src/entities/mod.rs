pub mod activity_log;
pub mod inventory_item;
