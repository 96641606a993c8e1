pub mod client;

pub use client::{OverseerrClient, RequestPayload};
