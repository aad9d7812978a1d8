use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(string_len(Movies::MovieId, 50).primary_key())
                    .col(string_len(Movies::Title, 200))
                    .col(text(Movies::Overview))
                    .col(string_len(Movies::ReleaseDate, 50))
                    .col(double(Movies::VoteAverage))
                    .col(string_len_null(Movies::PosterPath, 255))
                    .col(big_integer(Movies::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(string_len(Genres::GenreId, 50).primary_key())
                    .col(string_len(Genres::Name, 100))
                    .col(big_integer(Genres::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    MovieId,
    Title,
    Overview,
    ReleaseDate,
    VoteAverage,
    PosterPath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    GenreId,
    Name,
    CreatedAt,
}
