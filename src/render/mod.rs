//! Text dumps of captured images.
//!
//! Both formats are plain formatting over an [`Image`](crate::image::Image)
//! and never touch the chip.

mod ascii;
mod matlab;

pub use ascii::{to_ascii, write_ascii, AsciiRange, PALETTE};
pub use matlab::{to_matlab, write_matlab};
