//! # puzzlebot Tracker
//!
//! Client side of the challenge server: the HTTP [`HttpTaskSource`] and the
//! on-disk [`CredentialStore`] holding the registered agent identity.

pub mod client;
pub mod credentials;

pub use client::HttpTaskSource;
pub use credentials::CredentialStore;
