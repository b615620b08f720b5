//! Small shared helpers

pub mod logging;
pub mod paths;
