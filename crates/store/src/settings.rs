//! Which content types annotations are enabled for.
//!
//! The list lives in a host option so site admins can change it without a
//! redeploy; the stock install covers `post` and `page`. The deployment's
//! `active_types` chain gets the final word either way.

use std::sync::Arc;

use marginalia_core::annotation::{ACTIVE_TYPES_OPTION, DEFAULT_ACTIVE_TYPES};
use marginalia_core::filters::Filters;
use marginalia_core::CoreError;

use crate::host::ContentHost;

/// Reader for the active content-type setting.
#[derive(Clone)]
pub struct Settings {
    host: Arc<dyn ContentHost>,
    filters: Arc<Filters>,
}

impl Settings {
    pub fn new(host: Arc<dyn ContentHost>, filters: Arc<Filters>) -> Self {
        Self { host, filters }
    }

    /// The content types annotations are currently enabled for.
    ///
    /// A stored option that is not a string list counts as absent; the
    /// stock defaults apply instead.
    pub async fn active_types(&self) -> Result<Vec<String>, CoreError> {
        let types = match self.host.read_option(ACTIVE_TYPES_OPTION).await? {
            Some(value) => match serde_json::from_value::<Vec<String>>(value) {
                Ok(list) => list,
                Err(_) => {
                    tracing::warn!(
                        option = ACTIVE_TYPES_OPTION,
                        "stored active-types option is not a string list, using defaults"
                    );
                    default_active_types()
                }
            },
            None => default_active_types(),
        };
        Ok(self.filters.active_types.apply(types))
    }

    /// Whether annotations are enabled for one content type.
    pub async fn is_active(&self, content_type: &str) -> Result<bool, CoreError> {
        Ok(self
            .active_types()
            .await?
            .iter()
            .any(|t| t == content_type))
    }
}

/// The stock active-type list.
pub fn default_active_types() -> Vec<String> {
    DEFAULT_ACTIVE_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Remove this service's options from every site of the host.
///
/// Stored annotations are left in place; only configuration goes.
pub async fn uninstall(host: &dyn ContentHost) -> Result<(), CoreError> {
    for site_id in host.site_ids().await? {
        host.delete_option(site_id, ACTIVE_TYPES_OPTION).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use marginalia_core::filters::Filters;

    fn settings_on(host: Arc<MemoryHost>, filters: Filters) -> Settings {
        Settings::new(host, Arc::new(filters))
    }

    #[tokio::test]
    async fn defaults_when_no_option_stored() {
        let host = Arc::new(MemoryHost::new());
        let settings = settings_on(host, Filters::new());
        assert_eq!(settings.active_types().await.unwrap(), vec!["post", "page"]);
        assert!(settings.is_active("post").await.unwrap());
        assert!(!settings.is_active("product").await.unwrap());
    }

    #[tokio::test]
    async fn stored_option_replaces_defaults() {
        let host = Arc::new(MemoryHost::new());
        host.write_option_for_site(1, ACTIVE_TYPES_OPTION, serde_json::json!(["product"]));
        let settings = settings_on(host, Filters::new());
        assert_eq!(settings.active_types().await.unwrap(), vec!["product"]);
        assert!(!settings.is_active("post").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_option_falls_back_to_defaults() {
        let host = Arc::new(MemoryHost::new());
        host.write_option_for_site(1, ACTIVE_TYPES_OPTION, serde_json::json!({"nope": true}));
        let settings = settings_on(host, Filters::new());
        assert_eq!(settings.active_types().await.unwrap(), vec!["post", "page"]);
    }

    #[tokio::test]
    async fn chain_rewrites_final_list() {
        let host = Arc::new(MemoryHost::new());
        let mut filters = Filters::new();
        filters.active_types.push(|mut types: Vec<String>| {
            types.push("event".to_string());
            types
        });
        let settings = settings_on(host, filters);
        assert!(settings.is_active("event").await.unwrap());
        assert!(settings.is_active("post").await.unwrap());
    }

    #[tokio::test]
    async fn uninstall_clears_options_on_every_site() {
        let host = Arc::new(MemoryHost::new());
        host.add_site(2);
        host.write_option_for_site(1, ACTIVE_TYPES_OPTION, serde_json::json!(["post"]));
        host.write_option_for_site(2, ACTIVE_TYPES_OPTION, serde_json::json!(["page"]));

        uninstall(host.as_ref()).await.unwrap();

        assert!(host.option_for_site(1, ACTIVE_TYPES_OPTION).is_none());
        assert!(host.option_for_site(2, ACTIVE_TYPES_OPTION).is_none());
    }
}
