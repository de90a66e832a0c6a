/// Turns a resource id into a caller-facing URL.
pub trait LinkBuilder: Send + Sync {
    fn item_url(&self, resource_id: &str) -> String;
}

/// Links to the public item page, `<base>/item/<resource_id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLinkBuilder {
    base: String,
}

impl ItemLinkBuilder {
    /// `base` is the site prefix, e.g. `/omeka` or `https://example.org/s/site`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl LinkBuilder for ItemLinkBuilder {
    fn item_url(&self, resource_id: &str) -> String {
        format!("{}/item/{}", self.base, resource_id)
    }
}
