use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Every listing is filtered by owner.
        manager
            .create_index(
                Index::create()
                    .name("idx_tags_user_id")
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ingredients_user_id")
                    .table(Ingredients::Table)
                    .col(Ingredients::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipes_user_id")
                    .table(Recipes::Table)
                    .col(Recipes::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_recipes_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ingredients_user_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_tags_user_id").to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Ingredients {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    UserId,
}
