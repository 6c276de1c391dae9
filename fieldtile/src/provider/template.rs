//! Tile URL templates.
//!
//! A template is a URL containing `{z}`, `{x}` and `{y}` placeholders and
//! optionally `{s}`, which is replaced by a subdomain picked at random per
//! request to spread load across the server's mirrors.

use rand::Rng;

use super::types::ProviderError;
use crate::coord::TileKey;

/// OpenStreetMap standard tile layer.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Mirrors of the default tile layer.
pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// A validated tile URL template with its subdomain set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
    subdomains: Vec<String>,
}

impl TileUrlTemplate {
    /// Creates a template.
    ///
    /// # Errors
    ///
    /// Fails if any of `{z}`, `{x}`, `{y}` is missing, or if the template
    /// uses `{s}` but no subdomains are given.
    pub fn new(
        template: impl Into<String>,
        subdomains: Vec<String>,
    ) -> Result<Self, ProviderError> {
        let template = template.into();

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(ProviderError::InvalidTemplate(format!(
                    "'{}' has no {} placeholder",
                    template, placeholder
                )));
            }
        }
        if template.contains("{s}") && subdomains.is_empty() {
            return Err(ProviderError::InvalidTemplate(format!(
                "'{}' uses {{s}} but no subdomains are configured",
                template
            )));
        }

        Ok(Self {
            template,
            subdomains,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    /// URL for `key` on a randomly chosen subdomain.
    pub fn url_for(&self, key: &TileKey) -> String {
        self.url_for_parts(key.zoom, key.x, key.y)
    }

    /// URL for raw coordinates, which need not form a valid key.
    pub fn url_for_parts(&self, zoom: u8, x: u32, y: u32) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let index = rand::rng().random_range(0..self.subdomains.len());
            self.subdomains[index].as_str()
        };
        self.render(subdomain, zoom, x, y)
    }

    /// URL for `key` on a specific subdomain.
    pub fn url_with_subdomain(&self, key: &TileKey, subdomain: &str) -> String {
        self.render(subdomain, key.zoom, key.x, key.y)
    }

    fn render(&self, subdomain: &str, zoom: u8, x: u32, y: u32) -> String {
        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl Default for TileUrlTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_URL_TEMPLATE.to_string(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
