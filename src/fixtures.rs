use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::{
    entities::{actor, director, dressing_room, movie, movie_actor},
    slug::slugify,
};

pub async fn director(db: &DatabaseConnection, first: &str, last: &str) -> director::Model {
    director::ActiveModel {
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        email: Set(format!("{}@example.com", first.to_lowercase())),
        slug: Set(slugify(&format!("{first} {last}"))),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn room(db: &DatabaseConnection, floor: i32, number: i32) -> dressing_room::Model {
    dressing_room::ActiveModel { floor: Set(floor), number: Set(number), ..Default::default() }
        .insert(db)
        .await
        .unwrap()
}

pub async fn actor(
    db: &DatabaseConnection,
    first: &str,
    last: &str,
    dressing_room_id: Option<i32>,
) -> actor::Model {
    actor::ActiveModel {
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        dressing_room_id: Set(dressing_room_id),
        gender: Set(actor::Gender::Male),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn movie(
    db: &DatabaseConnection,
    name: &str,
    rating: i32,
    year: Option<i32>,
    director_id: Option<i32>,
) -> movie::Model {
    movie::ActiveModel {
        name: Set(name.to_string()),
        rating: Set(rating),
        year: Set(year),
        budget: Set(movie::DEFAULT_BUDGET),
        currency: Set(movie::Currency::Rub),
        slug: Set(slugify(name)),
        director_id: Set(director_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn movie_with_budget(
    db: &DatabaseConnection,
    name: &str,
    rating: i32,
    budget: i32,
) -> movie::Model {
    let movie = movie(db, name, rating, None, None).await;
    let mut active: movie::ActiveModel = movie.into();
    active.budget = Set(budget);
    active.update(db).await.unwrap()
}

pub async fn cast(db: &DatabaseConnection, movie_id: i32, actor_id: i32) {
    movie_actor::Entity::insert(movie_actor::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}
