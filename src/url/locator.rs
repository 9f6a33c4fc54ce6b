use crate::config::ResolverConfig;
use url::Url;

/// Rules for recognising an item's photo among intercepted requests and for
/// deriving its full-size variant
#[derive(Debug, Clone)]
pub struct LocatorRules {
    /// Lowercase extensions including the leading dot
    extensions: Vec<String>,
    small_suffix: String,
}

impl LocatorRules {
    /// Creates rules from bare extensions (`"jpg"`) and a small-variant suffix (`"_s"`)
    pub fn new(extensions: &[String], small_suffix: &str) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.').to_lowercase()))
                .collect(),
            small_suffix: small_suffix.to_string(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.image_extensions, &config.small_suffix)
    }

    /// Returns true if `request_url` is the photo for `item_id`
    ///
    /// The URL must contain the decimal item id and its path must end in one
    /// of the configured raster extensions. Query strings are ignored when
    /// checking the extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use shutter_sweep::url::LocatorRules;
    ///
    /// let rules = LocatorRules::new(&["jpg".to_string(), "png".to_string()], "_s");
    /// assert!(rules.is_candidate("https://live.staticflickr.com/65535/101_ab12_s.jpg", 101));
    /// assert!(!rules.is_candidate("https://live.staticflickr.com/65535/202_ab12_s.jpg", 101));
    /// assert!(!rules.is_candidate("https://www.flickr.com/photos/alice/101", 101));
    /// ```
    pub fn is_candidate(&self, request_url: &str, item_id: u64) -> bool {
        if !request_url.contains(&item_id.to_string()) {
            return false;
        }

        let target = match Url::parse(request_url) {
            Ok(url) => url.path().to_lowercase(),
            Err(_) => request_url.to_lowercase(),
        };

        self.extensions.iter().any(|ext| target.ends_with(ext.as_str()))
    }

    /// Returns the full-size variant of a small-rendition locator
    ///
    /// Only the filename is inspected: `.../101_ab12_s.jpg` becomes
    /// `.../101_ab12.jpg`. Returns `None` when the filename carries no
    /// small-variant marker, so no upgrade should be attempted.
    pub fn full_size_variant(&self, locator: &str) -> Option<String> {
        let mut url = Url::parse(locator).ok()?;

        let path = url.path().to_string();
        let (dir, filename) = path.rsplit_once('/')?;
        let (stem, extension) = filename.rsplit_once('.')?;
        let base = stem.strip_suffix(self.small_suffix.as_str())?;
        if base.is_empty() {
            return None;
        }

        url.set_path(&format!("{}/{}.{}", dir, base, extension));
        Some(url.to_string())
    }

    /// Returns true if the locator still names a small rendition
    pub fn is_small_variant(&self, locator: &str) -> bool {
        self.full_size_variant(locator).is_some()
    }
}
