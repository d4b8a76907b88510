use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::domain::AttributeKind;
use crate::services::{
    AccountService, AttributeService, AuthService, ImageStore, RecipeService,
    SeaOrmAccountService, SeaOrmAttributeService, SeaOrmAuthService, SeaOrmRecipeService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub account_service: Arc<dyn AccountService>,

    pub auth_service: Arc<dyn AuthService>,

    pub tag_service: Arc<dyn AttributeService>,

    pub ingredient_service: Arc<dyn AttributeService>,

    pub recipe_service: Arc<dyn RecipeService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let images = ImageStore::new(&config.general.media_path, config.uploads.max_image_bytes);

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let tag_service = Arc::new(SeaOrmAttributeService::new(store.clone(), AttributeKind::Tag))
            as Arc<dyn AttributeService + Send + Sync + 'static>;

        let ingredient_service = Arc::new(SeaOrmAttributeService::new(
            store.clone(),
            AttributeKind::Ingredient,
        )) as Arc<dyn AttributeService + Send + Sync + 'static>;

        let recipe_service = Arc::new(SeaOrmRecipeService::new(store.clone(), images))
            as Arc<dyn RecipeService + Send + Sync + 'static>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            account_service,
            auth_service,
            tag_service,
            ingredient_service,
            recipe_service,
        }
    }

    #[must_use]
    pub fn attributes(&self, kind: AttributeKind) -> &Arc<dyn AttributeService> {
        match kind {
            AttributeKind::Tag => &self.tag_service,
            AttributeKind::Ingredient => &self.ingredient_service,
        }
    }
}
