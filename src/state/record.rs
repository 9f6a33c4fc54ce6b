use std::fmt;

/// One (owner, item) pair pending resolution
///
/// Identity is the item id; ids are unique across owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub owner_id: String,
    pub item_id: u64,
}

impl WorkItem {
    pub fn new(owner_id: impl Into<String>, item_id: u64) -> Self {
        Self {
            owner_id: owner_id.into(),
            item_id,
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.item_id)
    }
}

/// Result of resolving one work item
///
/// `resource_url` is `None` when discovery found nothing or resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub owner_id: String,
    pub item_id: u64,
    pub resource_url: Option<String>,
}

impl ResolvedRecord {
    pub fn new(item: WorkItem, resource_url: Option<String>) -> Self {
        Self {
            owner_id: item.owner_id,
            item_id: item.item_id,
            resource_url,
        }
    }
}

/// How a single item's resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    /// A locator was found (possibly upgraded)
    Resolved,

    /// The page rendered but never requested a matching photo
    Unresolved,

    /// The capability failed or timed out; recorded with an empty locator
    Failed,

    /// The task died before producing a result; nothing was recorded
    Lost,
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolved => "resolved",
            Self::Unresolved => "unresolved",
            Self::Failed => "failed",
            Self::Lost => "lost",
        };
        write!(f, "{}", s)
    }
}
