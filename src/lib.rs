// Bitwire - client library for the Bitwire remittance API

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod output;
pub mod profile;

pub use client::{Authed, BitwireClient, ClientOptions, Mode};
pub use error::{BitwireError, Result};
