use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Creators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Creators::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Creators::Handle).string_len(64))
                    .col(ColumnDef::new(Creators::DisplayName).string())
                    .col(
                        ColumnDef::new(Creators::TokenSymbol)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Creators::TokenName).string().not_null())
                    .col(ColumnDef::new(Creators::Bio).text())
                    .col(ColumnDef::new(Creators::AvatarUrl).string())
                    .col(ColumnDef::new(Creators::BannerUrl).string())
                    .col(
                        ColumnDef::new(Creators::CurrentPrice)
                            .decimal() // numeric in PostgreSQL
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Creators::PriceChange24h)
                            .decimal()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Creators::MarketCap)
                            .decimal()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Creators::HolderCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Creators::PostCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Creators::TotalSupply).decimal())
                    .col(
                        ColumnDef::new(Creators::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Creators::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Discover page orders by market cap
        manager
            .create_index(
                Index::create()
                    .name("idx_creators_market_cap")
                    .table(Creators::Table)
                    .col(Creators::MarketCap)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Creators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Creators {
    Table,
    Id,
    Handle,
    DisplayName,
    TokenSymbol,
    TokenName,
    Bio,
    AvatarUrl,
    BannerUrl,
    CurrentPrice,
    #[sea_orm(iden = "price_change_24h")]
    PriceChange24h,
    MarketCap,
    HolderCount,
    PostCount,
    Verified,
    TotalSupply,
    CreatedAt,
}
