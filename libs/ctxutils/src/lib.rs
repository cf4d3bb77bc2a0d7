//! Miscellaneous utility functions and structures shared by the property set codec
#![warn(missing_docs)]

pub mod io;
#[cfg(feature = "win32")]
pub mod win32;
