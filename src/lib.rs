pub mod catalog;
pub mod cli;
pub mod config;
pub mod cost_aggregator;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod quantity_parser;
pub mod recipe_mapper;
pub mod reconciliation;
pub mod units;
