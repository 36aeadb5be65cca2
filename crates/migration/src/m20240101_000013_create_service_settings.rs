//! Create `service_settings` table.
//! Per-service display settings; one row per service, removed with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceSettings::Table)
                    .if_not_exists()
                    .col(uuid(ServiceSettings::ServiceId).primary_key())
                    .col(json_binary(ServiceSettings::Settings).not_null())
                    .col(timestamp_with_time_zone(ServiceSettings::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceSettings::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_settings_service")
                            .from(ServiceSettings::Table, ServiceSettings::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceSettings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceSettings {
    Table,
    ServiceId,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Service { Table, Id }
