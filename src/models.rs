use sea_orm::FromQueryResult;

use crate::entities::{actor, director, dressing_room, movie};

/// Constant and arithmetic values computed for every movie on the list page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotations {
    pub new_bool: bool,
    pub false_bool: bool,
    pub str_field: &'static str,
    pub int_field: i32,
    pub new_budget: i64,
    pub rating_year: Option<i64>,
}

impl Annotations {
    pub fn for_movie(movie: &movie::Model) -> Self {
        Self {
            new_bool: true,
            false_bool: false,
            str_field: "Hello!",
            int_field: 123,
            new_budget: i64::from(movie.budget) + 100,
            rating_year: movie.year.map(|year| i64::from(movie.rating) + i64::from(year)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MovieRow {
    pub movie: movie::Model,
    pub annotations: Annotations,
}

impl From<movie::Model> for MovieRow {
    fn from(movie: movie::Model) -> Self {
        let annotations = Annotations::for_movie(&movie);
        Self { movie, annotations }
    }
}

/// Catalog-wide aggregates; every field is `None` on an empty catalog.
#[derive(Clone, Debug, Default, PartialEq, FromQueryResult)]
pub struct Aggregates {
    pub budget_avg: Option<f64>,
    pub rating_max: Option<i32>,
    pub rating_min: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub director: Option<director::Model>,
    pub actors: Vec<actor::Model>,
}

#[derive(Clone, Debug)]
pub struct DirectorDetail {
    pub director: director::Model,
    pub movies: Vec<movie::Model>,
}

#[derive(Clone, Debug)]
pub struct ActorDetail {
    pub actor: actor::Model,
    pub dressing_room: Option<dressing_room::Model>,
    pub movies: Vec<movie::Model>,
}
