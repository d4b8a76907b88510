//! `SeaORM` implementation of the `AttributeService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{AttributeKind, UserId};
use crate::models::attribute::Attribute;
use crate::services::attribute_service::{AttributeError, AttributeService, validate_name};

pub struct SeaOrmAttributeService {
    store: Store,
    kind: AttributeKind,
}

impl SeaOrmAttributeService {
    #[must_use]
    pub const fn new(store: Store, kind: AttributeKind) -> Self {
        Self { store, kind }
    }
}

#[async_trait]
impl AttributeService for SeaOrmAttributeService {
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeError> {
        Ok(self
            .store
            .list_attributes(self.kind, owner, assigned_only)
            .await?)
    }

    async fn create(&self, owner: UserId, name: &str) -> Result<Attribute, AttributeError> {
        let name = validate_name(name)?;
        let created = self.store.create_attribute(self.kind, owner, &name).await?;
        info!(kind = %self.kind, id = created.id, owner = %owner, "Created");
        Ok(created)
    }
}
