use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Director::Table)
                    .if_not_exists()
                    .col(pk_auto(Director::Id))
                    .col(ColumnDef::new(Director::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Director::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Director::Email).string_len(254).not_null())
                    .col(string(Director::Slug).default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_director_slug")
                    .table(Director::Table)
                    .col(Director::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DressingRoom::Table)
                    .if_not_exists()
                    .col(pk_auto(DressingRoom::Id))
                    .col(integer(DressingRoom::Floor))
                    .col(integer(DressingRoom::Number))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(ColumnDef::new(Actor::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Actor::LastName).string_len(100).not_null())
                    .col(integer_null(Actor::DressingRoomId).unique_key())
                    .col(ColumnDef::new(Actor::Gender).string_len(1).not_null().default("M"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actor_dressing_room")
                            .from(Actor::Table, Actor::DressingRoomId)
                            .to(DressingRoom::Table, DressingRoom::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(ColumnDef::new(Movie::Name).string_len(40).not_null())
                    .col(
                        integer(Movie::Rating)
                            .check(Expr::col(Movie::Rating).between(1, 100)),
                    )
                    .col(integer_null(Movie::Year))
                    .col(
                        integer(Movie::Budget)
                            .default(1_000_000)
                            .check(Expr::col(Movie::Budget).gte(1)),
                    )
                    .col(ColumnDef::new(Movie::Currency).string_len(3).not_null().default("RUB"))
                    .col(string(Movie::Slug).default(""))
                    .col(integer_null(Movie::DirectorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director")
                            .from(Movie::Table, Movie::DirectorId)
                            .to(Director::Table, Director::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_slug")
                    .table(Movie::Table)
                    .col(Movie::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActor::Table)
                    .if_not_exists()
                    .col(integer(MovieActor::MovieId))
                    .col(integer(MovieActor::ActorId))
                    .primary_key(
                        Index::create()
                            .name("pk_movie_actor")
                            .col(MovieActor::MovieId)
                            .col(MovieActor::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_movie")
                            .from(MovieActor::Table, MovieActor::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_actor")
                            .from(MovieActor::Table, MovieActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieActor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(DressingRoom::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Director::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Director {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Slug,
}

#[derive(DeriveIden)]
enum DressingRoom {
    Table,
    Id,
    Floor,
    Number,
}

#[derive(DeriveIden)]
enum Actor {
    Table,
    Id,
    FirstName,
    LastName,
    DressingRoomId,
    Gender,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Name,
    Rating,
    Year,
    Budget,
    Currency,
    Slug,
    DirectorId,
}

#[derive(DeriveIden)]
enum MovieActor {
    Table,
    MovieId,
    ActorId,
}
