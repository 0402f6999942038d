use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ProviderProfiles {
    Table,
    UserId,
    Address,
    AddressNumber,
    Complement,
    Neighborhood,
    Cep,
    City,
    State,
    Category,
    Phone,
    Whatsapp,
    Cpf,
    ServiceType,
    ServiceRadiusKm,
    IssuesInvoice,
    HasCnpj,
    Cnpj,
    Availability,
    Bio,
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
                    .table(ProviderProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderProfiles::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderProfiles::Address).string().null())
                    .col(ColumnDef::new(ProviderProfiles::AddressNumber).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Complement).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Neighborhood).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Cep).string_len(9).null())
                    .col(ColumnDef::new(ProviderProfiles::City).string().null())
                    .col(ColumnDef::new(ProviderProfiles::State).string_len(2).null())
                    .col(ColumnDef::new(ProviderProfiles::Category).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Phone).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Whatsapp).string().null())
                    .col(ColumnDef::new(ProviderProfiles::Cpf).string_len(14).null())
                    .col(ColumnDef::new(ProviderProfiles::ServiceType).string().null())
                    .col(ColumnDef::new(ProviderProfiles::ServiceRadiusKm).integer().null())
                    .col(
                        ColumnDef::new(ProviderProfiles::IssuesInvoice)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderProfiles::HasCnpj)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ProviderProfiles::Cnpj).string_len(18).null())
                    .col(
                        ColumnDef::new(ProviderProfiles::Availability)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(ProviderProfiles::Bio).text().null())
                    .col(
                        ColumnDef::new(ProviderProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_profiles_user_id")
                            .from(ProviderProfiles::Table, ProviderProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderProfiles::Table).to_owned())
            .await
    }
}
