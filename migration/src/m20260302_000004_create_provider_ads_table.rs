use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ProviderAds {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    ServiceFunction,
    Status,
    RejectionReason,
    City,
    State,
    Neighborhood,
    Cep,
    Latitude,
    Longitude,
    ServiceRadiusKm,
    PaymentMethods,
    HasWarranty,
    #[sea_orm(iden = "attends_24h")]
    Attends24h,
    OwnEquipment,
    SpecializedTeam,
    Photos,
    Views,
    RatingsCount,
    RatingsAvg,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderAds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderAds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderAds::UserId).integer().not_null())
                    .col(ColumnDef::new(ProviderAds::Title).string_len(80).not_null())
                    .col(ColumnDef::new(ProviderAds::Description).text().not_null())
                    .col(ColumnDef::new(ProviderAds::Category).string().not_null())
                    .col(ColumnDef::new(ProviderAds::ServiceFunction).string().not_null())
                    .col(
                        ColumnDef::new(ProviderAds::Status)
                            .string()
                            .not_null()
                            .default("Em Analise"),
                    )
                    .col(ColumnDef::new(ProviderAds::RejectionReason).text().null())
                    .col(ColumnDef::new(ProviderAds::City).string().null())
                    .col(ColumnDef::new(ProviderAds::State).string_len(2).null())
                    .col(ColumnDef::new(ProviderAds::Neighborhood).string().null())
                    .col(ColumnDef::new(ProviderAds::Cep).string_len(9).null())
                    .col(ColumnDef::new(ProviderAds::Latitude).double().null())
                    .col(ColumnDef::new(ProviderAds::Longitude).double().null())
                    .col(ColumnDef::new(ProviderAds::ServiceRadiusKm).integer().null())
                    .col(
                        ColumnDef::new(ProviderAds::PaymentMethods)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::HasWarranty)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::Attends24h)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::OwnEquipment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::SpecializedTeam)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::Photos)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::Views)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::RatingsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::RatingsAvg)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderAds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_ads_user_id")
                            .from(ProviderAds::Table, ProviderAds::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE provider_ads ADD CONSTRAINT chk_provider_ads_status_valid CHECK (status IN ('Em Analise', 'Postado', 'Reprovado'))",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_ads_user_id")
                    .table(ProviderAds::Table)
                    .col(ProviderAds::UserId)
                    .to_owned(),
            )
            .await?;

        // Public listing query: approved rows, newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_provider_ads_status_created_at")
                    .table(ProviderAds::Table)
                    .col(ProviderAds::Status)
                    .col(ProviderAds::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderAds::Table).to_owned())
            .await
    }
}
