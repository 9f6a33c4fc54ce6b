//! URL handling module for Shutter-Sweep
//!
//! This module provides per-item page addressing and the rules that decide
//! which intercepted request is an item's photo and what its full-size
//! variant would be called.

mod locator;
mod template;

pub use locator::LocatorRules;
pub use template::PageTemplate;
