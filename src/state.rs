use std::sync::Arc;

use crate::catalog::chroma::ChromaCatalog;
use crate::catalog::GarmentCatalog;
use crate::config::Config;
use crate::llm::client::build_client;
use crate::recommend::{dataset_image_resolver, Stylist};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn GarmentCatalog>,
    pub stylist: Arc<Stylist>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let catalog: Arc<dyn GarmentCatalog> = Arc::new(ChromaCatalog::new(
            http_client.clone(),
            &config.catalog,
            &config.llm,
        ));
        let llm = build_client(http_client, &config.llm)?;

        let mut stylist = Stylist::new(catalog.clone(), llm);
        if let Some(base_url) = &config.catalog.image_base_url {
            stylist = stylist.with_image_resolver(dataset_image_resolver(
                config.catalog.dataset_root.clone(),
                base_url.clone(),
            ));
        }

        Ok(Self {
            config,
            catalog,
            stylist: Arc::new(stylist),
        })
    }
}
