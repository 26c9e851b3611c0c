//! Storage for issued one-time codes

pub mod otp_store;

pub use otp_store::{digest_code, OtpCheck, OtpStore};
