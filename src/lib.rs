//! Turn a spreadsheet of dreams into song lyrics and a generated song.
//!
//! The dreams are read from the `dream` column of a shared Google Sheet,
//! woven into lyrics by a chat completion model and handed to Suno for rendering.

pub mod auth;
pub mod config;
pub mod dreams;
pub mod error;
pub mod lyrics;
pub mod pipeline;
pub mod song;

pub use error::{Error, Result};
