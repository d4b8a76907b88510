//! `SeaORM` implementation of the `RecipeService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::{AttributeKind, Price, RecipeId, UserId};
use crate::models::recipe::{Recipe, RecipeFields, RecipeFilter, RecipePatch};
use crate::services::image::ImageStore;
use crate::services::recipe_service::{RecipeError, RecipeService};

const MAX_TITLE_LEN: usize = 255;
const MAX_LINK_LEN: usize = 255;
const MAX_PRICE_CENTS: i64 = 99_999;

fn validate_title(title: &str) -> Result<String, RecipeError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RecipeError::Validation(
            "title: This field may not be blank.".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(RecipeError::Validation(format!(
            "title: Ensure this field has no more than {MAX_TITLE_LEN} characters."
        )));
    }
    Ok(title.to_string())
}

fn validate_time(minutes: i32) -> Result<i32, RecipeError> {
    if minutes < 0 {
        return Err(RecipeError::Validation(
            "time_minutes: Ensure this value is greater than or equal to 0.".to_string(),
        ));
    }
    Ok(minutes)
}

fn validate_price(price: Price) -> Result<Price, RecipeError> {
    if !(0..=MAX_PRICE_CENTS).contains(&price.cents()) {
        return Err(RecipeError::Validation(
            "price: Ensure that there are no more than 5 digits in total.".to_string(),
        ));
    }
    Ok(price)
}

fn validate_link(link: &str) -> Result<String, RecipeError> {
    let link = link.trim();
    if link.chars().count() > MAX_LINK_LEN {
        return Err(RecipeError::Validation(format!(
            "link: Ensure this field has no more than {MAX_LINK_LEN} characters."
        )));
    }
    Ok(link.to_string())
}

pub struct SeaOrmRecipeService {
    store: Store,
    images: ImageStore,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store, images: ImageStore) -> Self {
        Self { store, images }
    }

    /// Fails on the first id that is not one of `owner`'s records of `kind`.
    async fn ensure_owned(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &[i32],
    ) -> Result<(), RecipeError> {
        let found = self.store.owned_attribute_ids(kind, owner, ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
            let field = match kind {
                AttributeKind::Tag => "tags",
                AttributeKind::Ingredient => "ingredients",
            };
            return Err(RecipeError::Validation(format!(
                "{field}: Invalid pk \"{missing}\" - object does not exist."
            )));
        }
        Ok(())
    }

    async fn validate_patch(
        &self,
        owner: UserId,
        patch: RecipePatch,
    ) -> Result<RecipePatch, RecipeError> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let time_minutes = patch.time_minutes.map(validate_time).transpose()?;
        let price = patch.price.map(validate_price).transpose()?;
        let link = patch.link.as_deref().map(validate_link).transpose()?;

        if let Some(tags) = &patch.tags {
            self.ensure_owned(owner, AttributeKind::Tag, tags).await?;
        }
        if let Some(ingredients) = &patch.ingredients {
            self.ensure_owned(owner, AttributeKind::Ingredient, ingredients)
                .await?;
        }

        Ok(RecipePatch {
            title,
            time_minutes,
            price,
            link,
            tags: patch.tags,
            ingredients: patch.ingredients,
        })
    }

    async fn apply(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeError> {
        if self.store.get_recipe(owner, id).await?.is_none() {
            return Err(RecipeError::NotFound);
        }

        let patch = self.validate_patch(owner, patch).await?;
        let recipe = self
            .store
            .update_recipe(owner, id, &patch)
            .await?
            .ok_or(RecipeError::NotFound)?;

        info!(recipe_id = %id, owner = %owner, "Recipe updated");
        Ok(recipe)
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn list(
        &self,
        owner: UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.store.list_recipes(owner, filter).await?)
    }

    async fn get(&self, owner: UserId, id: RecipeId) -> Result<Recipe, RecipeError> {
        self.store
            .get_recipe(owner, id)
            .await?
            .ok_or(RecipeError::NotFound)
    }

    async fn create(&self, owner: UserId, fields: RecipeFields) -> Result<Recipe, RecipeError> {
        let fields = RecipeFields {
            title: validate_title(&fields.title)?,
            time_minutes: validate_time(fields.time_minutes)?,
            price: validate_price(fields.price)?,
            link: fields
                .link
                .as_deref()
                .map(validate_link)
                .transpose()?
                .filter(|l| !l.is_empty()),
            tags: fields.tags,
            ingredients: fields.ingredients,
        };
        self.ensure_owned(owner, AttributeKind::Tag, &fields.tags)
            .await?;
        self.ensure_owned(owner, AttributeKind::Ingredient, &fields.ingredients)
            .await?;

        Ok(self.store.create_recipe(owner, &fields).await?)
    }

    async fn partial_update(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, RecipeError> {
        self.apply(owner, id, patch).await
    }

    async fn full_update(
        &self,
        owner: UserId,
        id: RecipeId,
        fields: RecipeFields,
    ) -> Result<Recipe, RecipeError> {
        self.apply(owner, id, RecipePatch::from(fields)).await
    }

    async fn delete(&self, owner: UserId, id: RecipeId) -> Result<(), RecipeError> {
        let Some(recipe) = self.store.get_recipe(owner, id).await? else {
            return Err(RecipeError::NotFound);
        };

        if !self.store.delete_recipe(owner, id).await? {
            return Err(RecipeError::NotFound);
        }

        if let Some(image) = &recipe.image
            && let Err(e) = self.images.remove(image).await
        {
            warn!(recipe_id = %id, error = %e, "Failed to remove image of deleted recipe");
        }

        info!(recipe_id = %id, owner = %owner, "Recipe deleted");
        Ok(())
    }

    async fn attach_image(
        &self,
        owner: UserId,
        id: RecipeId,
        bytes: &[u8],
    ) -> Result<Recipe, RecipeError> {
        let Some(previous) = self.store.get_recipe(owner, id).await? else {
            return Err(RecipeError::NotFound);
        };

        let reference = self.images.save_recipe_image(bytes).await?;

        let Some(recipe) = self.store.set_recipe_image(owner, id, &reference).await? else {
            self.images.remove(&reference).await.ok();
            return Err(RecipeError::NotFound);
        };

        if let Some(old) = previous.image.as_deref()
            && old != reference
            && let Err(e) = self.images.remove(old).await
        {
            warn!(recipe_id = %id, error = %e, "Failed to remove replaced image");
        }

        info!(recipe_id = %id, image = %reference, "Image attached");
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Cheesecake ").unwrap(), "Cheesecake");
        assert!(validate_title(" ").is_err());
        assert!(validate_title(&"t".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_time_rejects_negative() {
        assert_eq!(validate_time(0).unwrap(), 0);
        assert!(validate_time(-1).is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(Price::from_cents(99_999)).is_ok());
        assert!(validate_price(Price::from_cents(100_000)).is_err());
        assert!(validate_price(Price::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_link_length() {
        assert_eq!(validate_link(" https://x.io ").unwrap(), "https://x.io");
        assert!(validate_link(&"l".repeat(256)).is_err());
    }
}
