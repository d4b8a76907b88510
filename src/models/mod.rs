pub mod account;
pub mod attribute;
pub mod recipe;
