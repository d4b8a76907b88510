pub mod attribute;
pub mod recipe;
pub mod token;
pub mod user;
