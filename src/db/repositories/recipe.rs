use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Query,
};
use tracing::info;

use crate::domain::{Price, RecipeId, UserId};
use crate::entities::{
    ingredients, prelude::*, recipe_ingredients, recipe_tags, recipes, tags,
};
use crate::models::attribute::Attribute;
use crate::models::recipe::{Recipe, RecipeFields, RecipeFilter, RecipePatch};

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_recipe(
        model: recipes::Model,
        tag_models: Vec<tags::Model>,
        ingredient_models: Vec<ingredients::Model>,
    ) -> Recipe {
        let mut tags: Vec<Attribute> = tag_models.into_iter().map(Attribute::from).collect();
        let mut ingredients: Vec<Attribute> =
            ingredient_models.into_iter().map(Attribute::from).collect();
        tags.sort_by_key(|a| a.id);
        ingredients.sort_by_key(|a| a.id);

        Recipe {
            id: RecipeId::new(model.id),
            owner: UserId::new(model.user_id),
            title: model.title,
            time_minutes: model.time_minutes,
            price: Price::from_cents(model.price_cents),
            link: model.link,
            image: model.image,
            tags,
            ingredients,
        }
    }

    async fn hydrate<C: ConnectionTrait>(
        conn: &C,
        models: Vec<recipes::Model>,
    ) -> Result<Vec<Recipe>> {
        let tag_sets = models
            .load_many_to_many(Tags, RecipeTags, conn)
            .await
            .context("Failed to load recipe tags")?;
        let ingredient_sets = models
            .load_many_to_many(Ingredients, RecipeIngredients, conn)
            .await
            .context("Failed to load recipe ingredients")?;

        Ok(models
            .into_iter()
            .zip(tag_sets)
            .zip(ingredient_sets)
            .map(|((model, tags), ingredients)| Self::map_model_to_recipe(model, tags, ingredients))
            .collect())
    }

    async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<recipes::Model>> {
        Recipes::find_by_id(id.value())
            .filter(recipes::Column::UserId.eq(owner.value()))
            .one(conn)
            .await
            .context("Failed to query recipe")
    }

    async fn load_one<C: ConnectionTrait>(conn: &C, model: recipes::Model) -> Result<Recipe> {
        Self::hydrate(conn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Recipe disappeared while loading associations"))
    }

    /// Owner's recipes, newest first.
    pub async fn list(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let mut query = Recipes::find().filter(recipes::Column::UserId.eq(owner.value()));

        if !filter.tags.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tags::Column::RecipeId)
                        .from(RecipeTags)
                        .and_where(recipe_tags::Column::TagId.is_in(filter.tags.iter().copied()))
                        .to_owned(),
                ),
            );
        }

        if !filter.ingredients.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredients::Column::RecipeId)
                        .from(RecipeIngredients)
                        .and_where(
                            recipe_ingredients::Column::IngredientId
                                .is_in(filter.ingredients.iter().copied()),
                        )
                        .to_owned(),
                ),
            );
        }

        let models = query
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list recipes")?;

        Self::hydrate(&self.conn, models).await
    }

    pub async fn get(&self, owner: UserId, id: RecipeId) -> Result<Option<Recipe>> {
        match Self::find_owned(&self.conn, owner, id).await? {
            Some(model) => Ok(Some(Self::load_one(&self.conn, model).await?)),
            None => Ok(None),
        }
    }

    /// Inserts the recipe and its association rows in one transaction.
    /// Association ids must already be checked against the owner.
    pub async fn create(&self, owner: UserId, fields: &RecipeFields) -> Result<Recipe> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let model = recipes::ActiveModel {
            user_id: Set(owner.value()),
            title: Set(fields.title.clone()),
            time_minutes: Set(fields.time_minutes),
            price_cents: Set(fields.price.cents()),
            link: Set(fields.link.clone()),
            image: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert recipe")?;

        Self::replace_tags(&txn, model.id, &fields.tags).await?;
        Self::replace_ingredients(&txn, model.id, &fields.ingredients).await?;

        let recipe = Self::load_one(&txn, model).await?;
        txn.commit().await?;

        info!(recipe_id = %recipe.id, owner = %owner, "Recipe created");
        Ok(recipe)
    }

    /// Applies the supplied fields and association replacements atomically.
    /// Returns `None` when the recipe does not exist or is not `owner`'s.
    pub async fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: &RecipePatch,
    ) -> Result<Option<Recipe>> {
        let txn = self.conn.begin().await?;

        let Some(model) = Self::find_owned(&txn, owner, id).await? else {
            return Ok(None);
        };

        let mut active: recipes::ActiveModel = model.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.clone());
        }
        if let Some(minutes) = patch.time_minutes {
            active.time_minutes = Set(minutes);
        }
        if let Some(price) = patch.price {
            active.price_cents = Set(price.cents());
        }
        if let Some(link) = &patch.link {
            active.link = Set((!link.is_empty()).then(|| link.clone()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&txn)
            .await
            .context("Failed to update recipe")?;

        if let Some(tag_ids) = &patch.tags {
            Self::replace_tags(&txn, model.id, tag_ids).await?;
        }
        if let Some(ingredient_ids) = &patch.ingredients {
            Self::replace_ingredients(&txn, model.id, ingredient_ids).await?;
        }

        let recipe = Self::load_one(&txn, model).await?;
        txn.commit().await?;

        Ok(Some(recipe))
    }

    pub async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<Recipe>> {
        let Some(model) = Self::find_owned(&self.conn, owner, id).await? else {
            return Ok(None);
        };

        let mut active: recipes::ActiveModel = model.into();
        active.image = Set(Some(image.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to store recipe image")?;

        Ok(Some(Self::load_one(&self.conn, model).await?))
    }

    pub async fn delete(&self, owner: UserId, id: RecipeId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        if Self::find_owned(&txn, owner, id).await?.is_none() {
            return Ok(false);
        }

        RecipeTags::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(id.value()))
            .exec(&txn)
            .await?;
        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(id.value()))
            .exec(&txn)
            .await?;
        let result = Recipes::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn replace_tags<C: ConnectionTrait>(conn: &C, recipe_id: i32, ids: &[i32]) -> Result<()> {
        RecipeTags::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
            .exec(conn)
            .await
            .context("Failed to clear recipe tags")?;

        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }

        let rows = ids.into_iter().map(|tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        });
        RecipeTags::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .context("Failed to link recipe tags")?;

        Ok(())
    }

    async fn replace_ingredients<C: ConnectionTrait>(
        conn: &C,
        recipe_id: i32,
        ids: &[i32],
    ) -> Result<()> {
        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .exec(conn)
            .await
            .context("Failed to clear recipe ingredients")?;

        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(());
        }

        let rows = ids
            .into_iter()
            .map(|ingredient_id| recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(ingredient_id),
            });
        RecipeIngredients::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .context("Failed to link recipe ingredients")?;

        Ok(())
    }
}
