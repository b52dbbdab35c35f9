//! # Codec Configuration
//!
//! Byte-level constants for every supported header generation live in
//! [`constants`]. Runtime switches for a single read or write call are in
//! `codec::options`.

pub mod constants;
pub use constants::*;
