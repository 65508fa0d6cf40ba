pub mod api;
pub mod client;

pub use client::{AddonClient, create_addon_client};
