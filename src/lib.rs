//! Daily Poster - post one date-stamped message to X
//!
//! Reads credentials and a message template from the environment, stamps the
//! template with today's date, and sends it through an OAuth1-signed request.

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod message;
pub mod oauth;
pub mod poster;

pub use error::{Error, Result};
