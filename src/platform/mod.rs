//! The external league platform: an opaque REST collaborator.

pub mod client;
pub mod models;

pub use client::{LeaguePlatform, PlatformClient};
