//! End-to-end tests across the warden crates.

mod helpers;

mod auth_test;
mod gate_test;
mod reset_test;
mod throttle_test;
