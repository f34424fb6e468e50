//! Readers and writers for the tables a run consumes and produces.

pub mod price_list;
pub mod recipe_loader;
pub mod writer;
