use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShortLink::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLink::ShortId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortLink::LongUrl).text().not_null())
                    .col(ColumnDef::new(ShortLink::Owner).string().not_null())
                    .col(ColumnDef::new(ShortLink::Title).string().null())
                    .col(
                        ColumnDef::new(ShortLink::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShortLink::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShortLink::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按属主分页查询链接列表
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_owner_created_at")
                    .table(ShortLink::Table)
                    .col(ShortLink::Owner)
                    .col(ShortLink::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_owner_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    ShortId,
    LongUrl,
    Owner,
    Title,
    ClickCount,
    CreatedAt,
    UpdatedAt,
}
