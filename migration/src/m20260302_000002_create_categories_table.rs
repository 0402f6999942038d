use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    GroupLabel,
    ProviderCount,
}

/// Seed rows: (name, group label).
const SEED: &[(&str, &str)] = &[
    ("Eletricista", "Reformas e Reparos"),
    ("Encanador", "Reformas e Reparos"),
    ("Pedreiro", "Reformas e Reparos"),
    ("Pintor", "Reformas e Reparos"),
    ("Marceneiro", "Reformas e Reparos"),
    ("Serralheiro", "Reformas e Reparos"),
    ("Vidraceiro", "Reformas e Reparos"),
    ("Gesseiro", "Reformas e Reparos"),
    ("Chaveiro", "Serviços Gerais"),
    ("Montador de Móveis", "Serviços Gerais"),
    ("Técnico de Ar-Condicionado", "Assistência Técnica"),
    ("Técnico de Eletrodomésticos", "Assistência Técnica"),
    ("Técnico de Informática", "Assistência Técnica"),
    ("Diarista", "Serviços Domésticos"),
    ("Jardineiro", "Serviços Domésticos"),
    ("Piscineiro", "Serviços Domésticos"),
    ("Dedetizador", "Serviços Domésticos"),
    ("Fretes e Mudanças", "Transporte"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Categories::GroupLabel).string().null())
                    .col(
                        ColumnDef::new(Categories::ProviderCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert()
            .into_table(Categories::Table)
            .columns([Categories::Name, Categories::GroupLabel])
            .to_owned();
        for (name, group) in SEED {
            insert.values_panic([(*name).into(), (*group).into()]);
        }
        insert.on_conflict(OnConflict::column(Categories::Name).do_nothing().to_owned());

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
