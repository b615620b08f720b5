//! Terminal presentation

pub mod sink;
