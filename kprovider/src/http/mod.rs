mod client;
mod serde_api;
mod tests;

pub use client::{HttpClientFactory, HttpProviderClient};
