use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::{
    entities::{actor, director, dressing_room, movie},
    error::AppResult,
    models::{ActorDetail, Aggregates, DirectorDetail, MovieDetail, MovieRow},
};

/// Read-only queries behind the public pages.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// All movies by year (missing years last), then rating.
    pub async fn movies(&self) -> AppResult<Vec<MovieRow>> {
        let movies = movie::Entity::find()
            .order_by_asc(Expr::col((movie::Entity, movie::Column::Year)).is_null())
            .order_by_asc(movie::Column::Year)
            .order_by_asc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;

        Ok(movies.into_iter().map(MovieRow::from).collect())
    }

    pub async fn aggregates(&self) -> AppResult<Aggregates> {
        let budget_avg: SimpleExpr = Func::avg(Expr::col(movie::Column::Budget)).into();
        let rating_max: SimpleExpr = Func::max(Expr::col(movie::Column::Rating)).into();
        let rating_min: SimpleExpr = Func::min(Expr::col(movie::Column::Rating)).into();

        let agg = movie::Entity::find()
            .select_only()
            .column_as(budget_avg, "budget_avg")
            .column_as(rating_max, "rating_max")
            .column_as(rating_min, "rating_min")
            .into_model::<Aggregates>()
            .one(&self.db)
            .await?;

        Ok(agg.unwrap_or_default())
    }

    /// First movie carrying `slug`; slugs are unique so there is at most one.
    pub async fn movie_by_slug(&self, slug: &str) -> AppResult<Option<MovieDetail>> {
        let movie = movie::Entity::find()
            .filter(movie::Column::Slug.eq(slug))
            .order_by_asc(movie::Column::Id)
            .one(&self.db)
            .await?;

        let Some(movie) = movie else {
            return Ok(None);
        };

        let director = movie.find_related(director::Entity).one(&self.db).await?;
        let actors = movie
            .find_related(actor::Entity)
            .order_by_asc(actor::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(MovieDetail { movie, director, actors }))
    }

    pub async fn directors(&self) -> AppResult<Vec<director::Model>> {
        Ok(director::Entity::find().order_by_asc(director::Column::Id).all(&self.db).await?)
    }

    pub async fn director_by_id(&self, id: i32) -> AppResult<Option<DirectorDetail>> {
        let Some(director) = director::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let movies = director
            .find_related(movie::Entity)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(DirectorDetail { director, movies }))
    }

    pub async fn actors(&self) -> AppResult<Vec<actor::Model>> {
        Ok(actor::Entity::find().order_by_asc(actor::Column::Id).all(&self.db).await?)
    }

    pub async fn actor_by_id(&self, id: i32) -> AppResult<Option<ActorDetail>> {
        let Some(actor) = actor::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let dressing_room = actor.find_related(dressing_room::Entity).one(&self.db).await?;
        let movies = actor
            .find_related(movie::Entity)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(ActorDetail { actor, dressing_room, movies }))
    }
}
