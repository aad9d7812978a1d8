use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

const MOVIE_COLUMNS: &str =
    "movie_id, title, overview, release_date, vote_average, poster_path, created_at";
const GENRE_COLUMNS: &str = "genre_id, name, created_at";

/// Rebuilds `movies` and `genres` around an auto-increment `seq` key so that
/// listing can follow insertion order. The external ids keep their uniqueness
/// through a unique index.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(staging("movies"))
                    .col(pk_auto(Movies::Seq))
                    .col(string_len(Movies::MovieId, 50))
                    .col(string_len(Movies::Title, 200))
                    .col(text(Movies::Overview))
                    .col(string_len(Movies::ReleaseDate, 50))
                    .col(double(Movies::VoteAverage))
                    .col(string_len_null(Movies::PosterPath, 255))
                    .col(big_integer(Movies::CreatedAt))
                    .to_owned(),
            )
            .await?;
        copy_and_swap(manager, "movies", MOVIE_COLUMNS, "created_at, movie_id").await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_movie_id")
                    .table(Movies::Table)
                    .col(Movies::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(staging("genres"))
                    .col(pk_auto(Genres::Seq))
                    .col(string_len(Genres::GenreId, 50))
                    .col(string_len(Genres::Name, 100))
                    .col(big_integer(Genres::CreatedAt))
                    .to_owned(),
            )
            .await?;
        copy_and_swap(manager, "genres", GENRE_COLUMNS, "created_at, genre_id").await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_genres_genre_id")
                    .table(Genres::Table)
                    .col(Genres::GenreId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(staging("genres"))
                    .col(string_len(Genres::GenreId, 50).primary_key())
                    .col(string_len(Genres::Name, 100))
                    .col(big_integer(Genres::CreatedAt))
                    .to_owned(),
            )
            .await?;
        copy_and_swap(manager, "genres", GENRE_COLUMNS, "seq").await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_genres_created_at")
                    .table(Genres::Table)
                    .col(Genres::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(staging("movies"))
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
        copy_and_swap(manager, "movies", MOVIE_COLUMNS, "seq").await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_created_at")
                    .table(Movies::Table)
                    .col(Movies::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

fn staging(table: &str) -> Alias {
    Alias::new(format!("{table}_staging"))
}

/// Copies every row of `table` into its staging table in `order`, then
/// replaces `table` with the staging table. Indexes on the old table go with it.
async fn copy_and_swap(
    manager: &SchemaManager<'_>,
    table: &str,
    columns: &str,
    order: &str,
) -> Result<(), DbErr> {
    let staged = format!("{table}_staging");
    manager
        .get_connection()
        .execute_unprepared(&format!(
            "INSERT INTO {staged} ({columns}) SELECT {columns} FROM {table} ORDER BY {order}"
        ))
        .await?;

    manager.drop_table(Table::drop().table(Alias::new(table)).to_owned()).await?;
    manager
        .rename_table(Table::rename().table(staging(table), Alias::new(table)).to_owned())
        .await?;

    Ok(())
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Seq,
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
    Seq,
    GenreId,
    Name,
    CreatedAt,
}
