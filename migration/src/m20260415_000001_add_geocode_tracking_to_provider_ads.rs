use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ProviderAds {
    Table,
    GeocodeAttempts,
    GeocodeNextAttemptAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Failed enrichment attempts since the last success.
        manager
            .alter_table(
                Table::alter()
                    .table(ProviderAds::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(ProviderAds::GeocodeAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. Backoff deadline; NULL means "due now".
        manager
            .alter_table(
                Table::alter()
                    .table(ProviderAds::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(ProviderAds::GeocodeNextAttemptAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. The enrichment worker only ever scans rows without coordinates.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_provider_ads_missing_coords ON provider_ads (geocode_next_attempt_at, id) WHERE latitude IS NULL OR longitude IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_provider_ads_missing_coords")
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(ProviderAds::Table)
                    .drop_column(ProviderAds::GeocodeNextAttemptAt)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(ProviderAds::Table)
                    .drop_column(ProviderAds::GeocodeAttempts)
                    .to_owned(),
            )
            .await
    }
}
