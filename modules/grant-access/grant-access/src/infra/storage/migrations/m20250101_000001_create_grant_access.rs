use sea_orm_migration::prelude as mig;

const TABLE: &str = "grant_access";

pub struct Migration;

impl mig::MigrationName for Migration {
    fn name(&self) -> &'static str {
        "m20250101_000001_create_grant_access"
    }
}

fn col(name: &str) -> mig::ColumnDef {
    mig::ColumnDef::new(mig::Alias::new(name))
}

#[async_trait::async_trait]
impl mig::MigrationTrait for Migration {
    async fn up(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .create_table(
                mig::Table::create()
                    .table(mig::Alias::new(TABLE))
                    .if_not_exists()
                    .col(
                        col("id")
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(col("resource_id").big_integer().not_null())
                    .col(col("resource_parent_id").big_integer().not_null())
                    .col(col("resource_type").string().not_null())
                    .col(col("service_id").string().not_null())
                    .col(col("path").string().null())
                    .col(col("status").small_integer().not_null())
                    .col(col("authority").string().not_null())
                    .col(col("authority_owner").string().not_null())
                    .col(col("authority_prefix").string().not_null())
                    .col(col("resource_info").text().not_null())
                    .to_owned(),
            )
            .await?;

        // Replace-by-owner and the effective-permission queries.
        manager
            .create_index(
                mig::Index::create()
                    .if_not_exists()
                    .name("idx_grant_access_owner")
                    .table(mig::Alias::new(TABLE))
                    .col(mig::Alias::new("authority_owner"))
                    .col(mig::Alias::new("authority_prefix"))
                    .col(mig::Alias::new("resource_type"))
                    .to_owned(),
            )
            .await?;

        // Resource sync and the deletion guard.
        manager
            .create_index(
                mig::Index::create()
                    .if_not_exists()
                    .name("idx_grant_access_resource")
                    .table(mig::Alias::new(TABLE))
                    .col(mig::Alias::new("resource_id"))
                    .col(mig::Alias::new("resource_type"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .drop_table(mig::Table::drop().table(mig::Alias::new(TABLE)).to_owned())
            .await
    }
}
