//! Create `service` table.
//! A catalog entry with its ordered account records stored as JSON.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 256).not_null())
                    .col(string_len(Service::IconClass, 128).not_null())
                    .col(string_len(Service::Color, 64).not_null())
                    .col(string_len_null(Service::IconUrl, 512))
                    .col(string_len(Service::AccountType, 16).not_null())
                    .col(json_binary(Service::Accounts).not_null())
                    .col(text(Service::Comments).not_null())
                    .col(boolean(Service::HasNewAccounts).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    Name,
    IconClass,
    Color,
    IconUrl,
    AccountType,
    Accounts,
    Comments,
    HasNewAccounts,
    CreatedAt,
    UpdatedAt,
}
