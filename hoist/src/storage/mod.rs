//! Object storage access

pub mod marker;
