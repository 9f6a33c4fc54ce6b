//! Resource resolution: discover an item's photo, then try to upgrade it
//!
//! Discovery renders the item page in a fresh session and captures the
//! first request that looks like the item's photo, aborting it so the render
//! stops there. The upgrade step probes the full-size variant of a small
//! rendition and keeps whichever locator is known to exist.

use crate::config::{CrawlerConfig, ResolverConfig};
use crate::crawler::capability::{ExistenceProbe, RenderSession, Renderer};
use crate::state::WorkItem;
use crate::url::{LocatorRules, PageTemplate};
use crate::{CapabilityError, ConfigError, ResolutionError};
use std::time::Duration;
use url::Url;

/// Resolves work items to photo locators
#[derive(Debug)]
pub struct Resolver<R, P> {
    renderer: R,
    probe: P,
    template: PageTemplate,
    rules: LocatorRules,
    timeout: Option<Duration>,
}

impl<R: Renderer, P: ExistenceProbe> Resolver<R, P> {
    pub fn new(renderer: R, probe: P, template: PageTemplate, rules: LocatorRules) -> Self {
        Self {
            renderer,
            probe,
            template,
            rules,
            timeout: None,
        }
    }

    /// Builds a resolver from the `[resolver]` and `[crawler]` sections
    pub fn from_config(
        renderer: R,
        probe: P,
        resolver: &ResolverConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, ConfigError> {
        let template = PageTemplate::parse(&resolver.page_template)?;
        let timeout = match crawler.item_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self::new(renderer, probe, template, LocatorRules::from_config(resolver))
            .with_timeout(timeout))
    }

    /// Bounds each resolution; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves one item to its best known locator
    ///
    /// Returns `Ok(None)` when the page never requested a matching photo.
    ///
    /// # Errors
    ///
    /// Any capability failure, or exceeding the configured timeout, yields a
    /// `ResolutionError` for this item. The render session is released
    /// either way.
    #[tracing::instrument(skip_all, fields(item = %item))]
    pub async fn resolve(&self, item: &WorkItem) -> Result<Option<String>, ResolutionError> {
        let work = self.discover_and_upgrade(item);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or(Err(CapabilityError::Timeout(limit))),
            None => work.await,
        };

        result.map_err(|source| ResolutionError {
            owner_id: item.owner_id.clone(),
            item_id: item.item_id,
            source,
        })
    }

    async fn discover_and_upgrade(
        &self,
        item: &WorkItem,
    ) -> Result<Option<String>, CapabilityError> {
        match self.discover(item).await? {
            Some(discovered) => self.upgrade(discovered).await.map(Some),
            None => Ok(None),
        }
    }

    /// Renders the item page and captures the first matching image request
    pub async fn discover(&self, item: &WorkItem) -> Result<Option<String>, CapabilityError> {
        let address = self.template.render(&item.owner_id, item.item_id)?;
        tracing::debug!("Fetching photo from URL: {}", address);

        let mut session = self.renderer.open_session().await?;
        let captured = capture_candidate(&mut session, &address, item.item_id, &self.rules).await;
        session.close().await;

        captured
    }

    /// Swaps a small rendition for its full-size variant if the probe finds it
    pub async fn upgrade(&self, discovered: String) -> Result<String, CapabilityError> {
        let Some(full_size) = self.rules.full_size_variant(&discovered) else {
            return Ok(discovered);
        };

        if self.probe.exists(&full_size).await? {
            tracing::debug!("Upgraded {} -> {}", discovered, full_size);
            Ok(full_size)
        } else {
            tracing::debug!("No full-size variant at {}, keeping {}", full_size, discovered);
            Ok(discovered)
        }
    }
}

/// Watches a render's requests until one matches, aborting that request
async fn capture_candidate<S: RenderSession>(
    session: &mut S,
    address: &Url,
    item_id: u64,
    rules: &LocatorRules,
) -> Result<Option<String>, CapabilityError> {
    let mut requests = session.render(address).await?;

    while let Some(request) = requests.next().await {
        if rules.is_candidate(request.url(), item_id) {
            let locator = request.url().to_string();
            request.abort();
            return Ok(Some(locator));
        }
        request.proceed();
    }

    Ok(None)
}
