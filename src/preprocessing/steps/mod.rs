//! Individual preprocessing steps

pub mod decode;
pub mod orientation;
pub mod resize;
