//! Tests for the verification challenge engine

mod lockout_tests;
mod mocks;
mod selector_tests;
