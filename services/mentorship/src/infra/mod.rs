pub mod cache;
pub mod db;
pub mod lookup;
pub mod memory;
pub mod notify;
pub mod templates;
