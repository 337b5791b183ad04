//! End-to-end tests over the public swa-lib API.

mod common;
mod flow_tests;
