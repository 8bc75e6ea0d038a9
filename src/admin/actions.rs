//! Bulk actions run against the rows ticked on a changelist.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr,
};

use super::{ActionKind, EntityKind, Level, Message, ModelAdmin};
use crate::{
    entities::{actor, director, dressing_room, movie},
    error::AppResult,
};

pub const ACTION_FIELD: &str = "action";
pub const SELECTED_FIELD: &str = "_selected_action";

/// Runs `action_name` over `ids` and returns the notice to show, if any.
pub async fn run(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    action_name: &str,
    ids: &[i32],
) -> AppResult<Option<Message>> {
    let Some(action) = admin.action(action_name) else {
        return Ok(Some(Message::new(Level::Warning, "No action selected.")));
    };
    if ids.is_empty() {
        return Ok(Some(Message::new(
            Level::Warning,
            "Items must be selected in order to perform actions on them. No items have been changed.",
        )));
    }

    let affected = match action.kind {
        ActionKind::DeleteSelected => delete_many(db, admin.entity, ids).await?,
        ActionKind::SetCurrency(currency) => {
            if admin.entity != EntityKind::Movie {
                return Ok(Some(Message::new(Level::Warning, "No action selected.")));
            }
            movie::Entity::update_many()
                .col_expr(movie::Column::Currency, Expr::value(currency.code()))
                .filter(movie::Column::Id.is_in(ids.iter().copied()))
                .exec(db)
                .await?
                .rows_affected
        }
    };

    tracing::info!(
        entity = admin.entity.slug(),
        action = action.name,
        affected,
        "bulk action applied"
    );

    let message = action.notify.map(|level| {
        let text = match action.kind {
            ActionKind::DeleteSelected => {
                let noun = if affected == 1 {
                    admin.entity.verbose_name()
                } else {
                    admin.entity.verbose_name_plural()
                };
                format!("Successfully deleted {affected} {noun}.")
            }
            ActionKind::SetCurrency(_) => format!("{affected} notes was updated"),
        };
        Message::new(level, text)
    });
    Ok(message)
}

async fn delete_many(db: &DatabaseConnection, kind: EntityKind, ids: &[i32]) -> AppResult<u64> {
    let ids = ids.iter().copied();
    let result = match kind {
        EntityKind::Director => {
            director::Entity::delete_many().filter(director::Column::Id.is_in(ids)).exec(db).await?
        }
        EntityKind::Actor => {
            actor::Entity::delete_many().filter(actor::Column::Id.is_in(ids)).exec(db).await?
        }
        EntityKind::DressingRoom => {
            dressing_room::Entity::delete_many()
                .filter(dressing_room::Column::Id.is_in(ids))
                .exec(db)
                .await?
        }
        EntityKind::Movie => {
            movie::Entity::delete_many().filter(movie::Column::Id.is_in(ids)).exec(db).await?
        }
    };
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::movie::movie_admin, db::test_db, entities::movie::Currency, fixtures,
    };

    async fn currencies(db: &DatabaseConnection) -> Vec<Currency> {
        let mut movies = movie::Entity::find().all(db).await.unwrap();
        movies.sort_by_key(|m| m.id);
        movies.into_iter().map(|m| m.currency).collect()
    }

    #[tokio::test]
    async fn euro_action_reports_count_at_error_level() {
        let db = test_db().await;
        let admin = movie_admin();
        let a = fixtures::movie(&db, "Alien", 85, None, None).await;
        let b = fixtures::movie(&db, "Brazil", 70, None, None).await;
        fixtures::movie(&db, "Cube", 39, None, None).await;

        let message = run(&db, &admin, "set_euro", &[a.id, b.id]).await.unwrap();
        assert_eq!(message, Some(Message::new(Level::Error, "2 notes was updated")));
        assert_eq!(currencies(&db).await, [Currency::Eur, Currency::Eur, Currency::Rub]);
    }

    #[tokio::test]
    async fn dollar_action_is_silent() {
        let db = test_db().await;
        let admin = movie_admin();
        let a = fixtures::movie(&db, "Alien", 85, None, None).await;

        assert_eq!(run(&db, &admin, "set_dollars", &[a.id]).await.unwrap(), None);
        assert_eq!(currencies(&db).await, [Currency::Usd]);
    }

    #[tokio::test]
    async fn empty_selection_changes_nothing() {
        let db = test_db().await;
        let admin = movie_admin();
        fixtures::movie(&db, "Alien", 85, None, None).await;

        let message = run(&db, &admin, "set_euro", &[]).await.unwrap().unwrap();
        assert_eq!(message.level, Level::Warning);
        assert_eq!(currencies(&db).await, [Currency::Rub]);
    }

    #[tokio::test]
    async fn delete_selected_removes_rows() {
        let db = test_db().await;
        let admin = ModelAdmin::new(EntityKind::Director);
        let a = fixtures::director(&db, "Ridley", "Scott").await;
        let b = fixtures::director(&db, "Tony", "Scott").await;
        let keep = fixtures::director(&db, "Terry", "Gilliam").await;

        let message = run(&db, &admin, "delete_selected", &[a.id, b.id]).await.unwrap();
        assert_eq!(message.unwrap().text, "Successfully deleted 2 directors.");
        let left: Vec<_> =
            director::Entity::find().all(&db).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(left, [keep.id]);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let db = test_db().await;
        let admin = ModelAdmin::new(EntityKind::Actor);
        let message = run(&db, &admin, "set_euro", &[1]).await.unwrap().unwrap();
        assert_eq!(message.text, "No action selected.");
    }
}
