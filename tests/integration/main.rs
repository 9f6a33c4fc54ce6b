//! Integration tests for Shutter-Sweep
//!
//! Full runs against temp-dir datasets and stores, driven either by scripted
//! capabilities or by the HTTP capabilities against wiremock servers.

mod run_tests;
