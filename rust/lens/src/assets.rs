//! Display URL resolution for indexed assets.

use url::Url;

use super::error::{Error, Result};

/// Path under which the search server exposes asset images.
pub const ASSETS_PATH: &str = "assets";

/// Turns an asset file name or identifier into an image URL.
///
/// Resolution is pure and synchronous.
pub trait UrlResolver {
    fn resolve(&self, name: &str) -> String;
}

impl<F> UrlResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, name: &str) -> String {
        self(name)
    }
}

/// Resolves names to `{base_url}/assets/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    base: Url,
}

impl AssetUrls {
    /// Creates a resolver rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid asset base url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "asset base url {base_url:?} cannot have path segments"
            )));
        }
        Ok(Self { base })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }
}

impl UrlResolver for AssetUrls {
    fn resolve(&self, name: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ASSETS_PATH).push(name);
        }
        url.to_string()
    }
}
