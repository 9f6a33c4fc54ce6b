use crate::{ConfigError, UrlError, UrlResult};
use url::Url;

const OWNER_PLACEHOLDER: &str = "{owner}";
const ITEM_PLACEHOLDER: &str = "{item}";

/// Canonical per-item page address, e.g. `https://www.flickr.com/photos/{owner}/{item}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    raw: String,
}

impl PageTemplate {
    /// Parses a template, checking both placeholders and that it renders to
    /// an HTTP(S) URL
    ///
    /// # Examples
    ///
    /// ```
    /// use shutter_sweep::url::PageTemplate;
    ///
    /// let template = PageTemplate::parse("https://www.flickr.com/photos/{owner}/{item}").unwrap();
    /// let address = template.render("48600090482@N01", 101).unwrap();
    /// assert_eq!(address.as_str(), "https://www.flickr.com/photos/48600090482@N01/101");
    ///
    /// assert!(PageTemplate::parse("https://www.flickr.com/photos/{item}").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        for placeholder in [OWNER_PLACEHOLDER, ITEM_PLACEHOLDER] {
            if !raw.contains(placeholder) {
                return Err(ConfigError::InvalidTemplate(format!(
                    "'{}' is missing the {} placeholder",
                    raw, placeholder
                )));
            }
        }

        let template = Self {
            raw: raw.to_string(),
        };
        template
            .render("owner", 0)
            .map_err(|e| ConfigError::InvalidTemplate(format!("'{}': {}", raw, e)))?;

        Ok(template)
    }

    /// Renders the page address for one item
    ///
    /// Owners containing path, query, or fragment delimiters are rejected
    /// rather than escaped, since they would address a different page.
    pub fn render(&self, owner_id: &str, item_id: u64) -> UrlResult<Url> {
        if owner_id.is_empty() || owner_id.contains(|c: char| matches!(c, '/' | '?' | '#')) {
            return Err(UrlError::Parse(format!(
                "owner id '{}' cannot be placed in a page address",
                owner_id
            )));
        }

        let address = self
            .raw
            .replace(OWNER_PLACEHOLDER, owner_id)
            .replace(ITEM_PLACEHOLDER, &item_id.to_string());

        let url = Url::parse(&address).map_err(|e| UrlError::Parse(format!("{}: {}", address, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(UrlError::InvalidScheme(other.to_string())),
        }
    }
}
