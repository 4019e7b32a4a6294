use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ContactSubmissions {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Company,
    Service,
    Message,
    Ip,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PrivacyRequests {
    Table,
    Id,
    Name,
    Email,
    RequestType,
    Details,
    Ip,
    CreatedAt,
}

#[derive(DeriveIden)]
enum NewsletterSubscribers {
    Table,
    Id,
    Email,
    Ip,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContactSubmissions::Name).string().not_null())
                    .col(ColumnDef::new(ContactSubmissions::Email).string().not_null())
                    .col(ColumnDef::new(ContactSubmissions::Phone).string().null())
                    .col(ColumnDef::new(ContactSubmissions::Company).string().null())
                    .col(ColumnDef::new(ContactSubmissions::Service).string().null())
                    .col(ColumnDef::new(ContactSubmissions::Message).text().not_null())
                    .col(ColumnDef::new(ContactSubmissions::Ip).string().not_null())
                    .col(
                        ColumnDef::new(ContactSubmissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrivacyRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrivacyRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PrivacyRequests::Name).string().not_null())
                    .col(ColumnDef::new(PrivacyRequests::Email).string().not_null())
                    .col(
                        ColumnDef::new(PrivacyRequests::RequestType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrivacyRequests::Details).text().null())
                    .col(ColumnDef::new(PrivacyRequests::Ip).string().not_null())
                    .col(
                        ColumnDef::new(PrivacyRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NewsletterSubscribers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsletterSubscribers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NewsletterSubscribers::Email).string().not_null())
                    .col(ColumnDef::new(NewsletterSubscribers::Ip).string().not_null())
                    .col(
                        ColumnDef::new(NewsletterSubscribers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_newsletter_subscribers_email")
                    .table(NewsletterSubscribers::Table)
                    .col(NewsletterSubscribers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(NewsletterSubscribers::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PrivacyRequests::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ContactSubmissions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
