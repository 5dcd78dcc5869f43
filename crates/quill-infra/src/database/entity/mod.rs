//! SeaORM entities and their conversions to and from the domain types.

pub mod category;
pub mod comment;
pub mod post;
pub mod post_category;
pub mod user;
