//! Image registry access and build listing

pub mod builds;
pub mod image;
