//! Crawler module for resolving photo locators
//!
//! This module contains the core enrichment logic, including:
//! - Rendering and probing capabilities, with HTTP implementations
//! - Image request extraction from item pages
//! - Per-item resolution (discovery plus full-size upgrade)
//! - Bounded-concurrency scheduling and overall run coordination

mod capability;
mod coordinator;
mod fetcher;
mod parser;
mod resolver;
mod scheduler;

pub use capability::{
    Emission, ExistenceProbe, InterceptedRequest, RenderSession, Renderer, RequestEmitter,
    RequestStream, Verdict,
};
pub use coordinator::{run_crawl, Coordinator, RunPlan, RunReport};
pub use fetcher::{build_http_client, HttpProbe, HttpRenderer, HttpSession};
pub use parser::extract_image_requests;
pub use resolver::Resolver;
pub use scheduler::{RunSummary, Scheduler};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete enrichment
///
/// This is the main entry point for starting a run. It will:
/// 1. Load the source dataset
/// 2. Seed the record store from cleaned output if it does not exist
/// 3. Skip items already resolved by earlier runs
/// 4. Resolve the rest with bounded concurrency
/// 5. Flush results to the store in batches
///
/// # Returns
///
/// * `Ok(RunReport)` - Run completed
/// * `Err(SweepError)` - Dataset could not be loaded or store could not be written
pub async fn crawl(config: Config) -> Result<RunReport, SweepError> {
    run_crawl(config).await
}
