//! Helper functions for dates and HTML

pub mod date;
pub mod html;
