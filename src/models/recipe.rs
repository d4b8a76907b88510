use serde::Serialize;

use crate::domain::{Price, RecipeId, UserId};
use crate::models::attribute::Attribute;

/// A recipe with its associations loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub owner: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
}

/// List shape: associations as bare ids.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// Detail shape: associations expanded to `{id, name}`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
    pub image: Option<String>,
}

/// Response of an image upload.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImage {
    pub id: RecipeId,
    pub image: Option<String>,
}

impl Recipe {
    #[must_use]
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title.clone(),
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link.clone().unwrap_or_default(),
            tags: self.tags.iter().map(|t| t.id).collect(),
            ingredients: self.ingredients.iter().map(|i| i.id).collect(),
        }
    }

    #[must_use]
    pub fn detail(&self) -> RecipeDetail {
        RecipeDetail {
            id: self.id,
            title: self.title.clone(),
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link.clone().unwrap_or_default(),
            tags: self.tags.clone(),
            ingredients: self.ingredients.clone(),
            image: self.image.clone(),
        }
    }

    #[must_use]
    pub fn image_ref(&self) -> RecipeImage {
        RecipeImage {
            id: self.id,
            image: self.image.clone(),
        }
    }
}

/// Complete set of writable fields.
///
/// Used for creation and for full replacement: anything not supplied by the
/// caller is reset (`link` to none, associations to empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: Option<String>,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

/// Partial update. `None` leaves a field as stored; `Some(vec![])` on an
/// association clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

impl From<RecipeFields> for RecipePatch {
    /// Full replacement expressed as a patch: every field is set, so an
    /// absent link or association list ends up cleared.
    fn from(fields: RecipeFields) -> Self {
        Self {
            title: Some(fields.title),
            time_minutes: Some(fields.time_minutes),
            price: Some(fields.price),
            link: Some(fields.link.unwrap_or_default()),
            tags: Some(fields.tags),
            ingredients: Some(fields.ingredients),
        }
    }
}

/// Narrowing applied to a recipe listing. Empty lists mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: RecipeId::new(3),
            owner: UserId::new(1),
            title: "Cheesecake".to_string(),
            time_minutes: 20,
            price: Price::from_cents(1200),
            link: None,
            image: None,
            tags: vec![Attribute {
                id: 9,
                name: "Dessert".to_string(),
            }],
            ingredients: vec![],
        }
    }

    #[test]
    fn test_summary_uses_bare_ids() {
        let json = serde_json::to_value(sample().summary()).unwrap();
        assert_eq!(json["tags"], serde_json::json!([9]));
        assert_eq!(json["price"], "12.00");
        assert_eq!(json["link"], "");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_full_fields_become_clearing_patch() {
        let patch = RecipePatch::from(RecipeFields {
            title: "Soup".to_string(),
            time_minutes: 5,
            price: Price::from_cents(250),
            link: None,
            tags: vec![],
            ingredients: vec![],
        });
        assert_eq!(patch.link.as_deref(), Some(""));
        assert_eq!(patch.tags, Some(vec![]));
        assert_eq!(patch.ingredients, Some(vec![]));
    }

    #[test]
    fn test_detail_expands_associations() {
        let json = serde_json::to_value(sample().detail()).unwrap();
        assert_eq!(json["tags"][0]["name"], "Dessert");
        assert_eq!(json["ingredients"], serde_json::json!([]));
        assert!(json["image"].is_null());
    }
}
