pub mod sanitize;
pub mod tags;
