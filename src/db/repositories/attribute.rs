//! Tags and ingredients share one shape (`id`, `name`, `user_id`), so a
//! single repository serves both, keyed by [`AttributeKind`].

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Query,
};

use crate::domain::{AttributeKind, UserId};
use crate::entities::{ingredients, prelude::*, recipe_ingredients, recipe_tags, tags};
use crate::models::attribute::Attribute;

impl From<tags::Model> for Attribute {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<ingredients::Model> for Attribute {
    fn from(model: ingredients::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

pub struct AttributeRepository {
    conn: DatabaseConnection,
    kind: AttributeKind,
}

impl AttributeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, kind: AttributeKind) -> Self {
        Self { conn, kind }
    }

    /// Owner's records, reverse name order. With `assigned_only`, only those
    /// attached to at least one recipe.
    pub async fn list(&self, owner: UserId, assigned_only: bool) -> Result<Vec<Attribute>> {
        let rows = match self.kind {
            AttributeKind::Tag => {
                let mut query = Tags::find().filter(tags::Column::UserId.eq(owner.value()));
                if assigned_only {
                    query = query.filter(
                        tags::Column::Id.in_subquery(
                            Query::select()
                                .column(recipe_tags::Column::TagId)
                                .from(RecipeTags)
                                .to_owned(),
                        ),
                    );
                }
                query
                    .order_by_desc(tags::Column::Name)
                    .order_by_desc(tags::Column::Id)
                    .all(&self.conn)
                    .await
                    .context("Failed to list tags")?
                    .into_iter()
                    .map(Attribute::from)
                    .collect()
            }
            AttributeKind::Ingredient => {
                let mut query =
                    Ingredients::find().filter(ingredients::Column::UserId.eq(owner.value()));
                if assigned_only {
                    query = query.filter(
                        ingredients::Column::Id.in_subquery(
                            Query::select()
                                .column(recipe_ingredients::Column::IngredientId)
                                .from(RecipeIngredients)
                                .to_owned(),
                        ),
                    );
                }
                query
                    .order_by_desc(ingredients::Column::Name)
                    .order_by_desc(ingredients::Column::Id)
                    .all(&self.conn)
                    .await
                    .context("Failed to list ingredients")?
                    .into_iter()
                    .map(Attribute::from)
                    .collect()
            }
        };

        Ok(rows)
    }

    pub async fn create(&self, owner: UserId, name: &str) -> Result<Attribute> {
        let created = match self.kind {
            AttributeKind::Tag => tags::ActiveModel {
                name: Set(name.to_string()),
                user_id: Set(owner.value()),
                ..Default::default()
            }
            .insert(&self.conn)
            .await
            .context("Failed to insert tag")?
            .into(),
            AttributeKind::Ingredient => ingredients::ActiveModel {
                name: Set(name.to_string()),
                user_id: Set(owner.value()),
                ..Default::default()
            }
            .insert(&self.conn)
            .await
            .context("Failed to insert ingredient")?
            .into(),
        };

        Ok(created)
    }

    /// Ids from `ids` that exist and belong to `owner`.
    pub async fn owned_ids(&self, owner: UserId, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = match self.kind {
            AttributeKind::Tag => Tags::find()
                .select_only()
                .column(tags::Column::Id)
                .filter(tags::Column::UserId.eq(owner.value()))
                .filter(tags::Column::Id.is_in(ids.iter().copied()))
                .into_tuple::<i32>()
                .all(&self.conn)
                .await
                .context("Failed to resolve tag ids")?,
            AttributeKind::Ingredient => Ingredients::find()
                .select_only()
                .column(ingredients::Column::Id)
                .filter(ingredients::Column::UserId.eq(owner.value()))
                .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
                .into_tuple::<i32>()
                .all(&self.conn)
                .await
                .context("Failed to resolve ingredient ids")?,
        };

        Ok(found)
    }
}
