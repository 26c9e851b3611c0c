//! Credential verification

pub mod demo;

pub use demo::DemoCredentialVerifier;
