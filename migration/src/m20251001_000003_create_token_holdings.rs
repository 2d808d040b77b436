use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TokenHoldings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TokenHoldings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TokenHoldings::UserId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TokenHoldings::CreatorId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TokenHoldings::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(TokenHoldings::PurchasePrice)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TokenHoldings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_token_holdings_creator_id")
                    .from(TokenHoldings::Table, TokenHoldings::CreatorId)
                    .to(Creators::Table, Creators::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // At most one holding per (user, creator)
        manager
            .create_index(
                Index::create()
                    .name("idx_token_holdings_user_creator")
                    .table(TokenHoldings::Table)
                    .col(TokenHoldings::UserId)
                    .col(TokenHoldings::CreatorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TokenHoldings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TokenHoldings {
    Table,
    Id,
    UserId,
    CreatorId,
    Amount,
    PurchasePrice,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Creators {
    Table,
    Id,
}
