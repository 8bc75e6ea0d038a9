use std::{cmp::Ordering, collections::HashMap};

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use super::EntityKind;
use crate::{
    entities::{actor, director, dressing_room, movie},
    error::AppResult,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
}

impl Value {
    /// Form of the value used in query parameters and inputs.
    pub fn as_param(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }

    /// Nulls sort first, then numbers, then text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Int(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<Option<i32>> for Value {
    fn from(n: Option<i32>) -> Self {
        n.map_or(Value::Null, Value::from)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub value: Value,
    pub display: String,
}

/// One row of a changelist, keyed by field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: i32,
    pub label: String,
    cells: HashMap<&'static str, Cell>,
}

impl Record {
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        let mut cells = HashMap::new();
        cells.insert("id", Cell { value: Value::from(id), display: id.to_string() });
        Self { id, label: label.into(), cells }
    }

    /// Adds a field displayed as its own value.
    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let display = value.as_param().unwrap_or_default();
        self.cells.insert(field, Cell { value, display });
        self
    }

    /// Adds a field whose display differs from its stored value.
    pub fn with_display(
        mut self,
        field: &'static str,
        value: impl Into<Value>,
        display: impl Into<String>,
    ) -> Self {
        self.cells.insert(field, Cell { value: value.into(), display: display.into() });
        self
    }

    pub fn value(&self, field: &str) -> &Value {
        self.cells.get(field).map_or(&Value::Null, |c| &c.value)
    }

    pub fn display(&self, field: &str) -> &str {
        self.cells.get(field).map_or("", |c| c.display.as_str())
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.value(field) {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Loads every row of `kind` with related labels resolved.
pub async fn load(db: &DatabaseConnection, kind: EntityKind) -> AppResult<Vec<Record>> {
    let records = match kind {
        EntityKind::Director => director::Entity::find()
            .order_by_asc(director::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(director_record)
            .collect(),
        EntityKind::Actor => {
            let rooms: HashMap<i32, String> = dressing_room::Entity::find()
                .all(db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.label()))
                .collect();
            actor::Entity::find()
                .order_by_asc(actor::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|a| actor_record(a, &rooms))
                .collect()
        }
        EntityKind::DressingRoom => {
            let occupants: HashMap<i32, actor::Model> = actor::Entity::find()
                .all(db)
                .await?
                .into_iter()
                .filter_map(|a| a.dressing_room_id.map(|room| (room, a)))
                .collect();
            dressing_room::Entity::find()
                .order_by_asc(dressing_room::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|r| room_record(r, &occupants))
                .collect()
        }
        EntityKind::Movie => {
            let directors: HashMap<i32, String> = director::Entity::find()
                .all(db)
                .await?
                .into_iter()
                .map(|d| (d.id, d.label()))
                .collect();
            movie::Entity::find()
                .order_by_asc(movie::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|m| movie_record(m, &directors))
                .collect()
        }
    };
    Ok(records)
}

pub fn director_record(d: director::Model) -> Record {
    Record::new(d.id, d.label())
        .with("first_name", d.first_name)
        .with("last_name", d.last_name)
        .with("email", d.email)
        .with("slug", d.slug)
}

pub fn actor_record(a: actor::Model, rooms: &HashMap<i32, String>) -> Record {
    let room = a.dressing_room_id.and_then(|id| rooms.get(&id)).cloned().unwrap_or_default();
    Record::new(a.id, a.label())
        .with("first_name", a.first_name.clone())
        .with("last_name", a.last_name.clone())
        .with_display("gender", a.gender.code().to_string(), a.gender.display_name())
        .with_display("dressing_room", a.dressing_room_id, room)
}

pub fn room_record(r: dressing_room::Model, occupants: &HashMap<i32, actor::Model>) -> Record {
    let occupant = occupants.get(&r.id);
    Record::new(r.id, r.label())
        .with("floor", r.floor)
        .with("number", r.number)
        .with_display(
            "actor",
            occupant.map(|a| a.id),
            occupant.map(|a| a.label()).unwrap_or_default(),
        )
}

pub fn movie_record(m: movie::Model, directors: &HashMap<i32, String>) -> Record {
    let director = m.director_id.and_then(|id| directors.get(&id)).cloned().unwrap_or_default();
    Record::new(m.id, m.label())
        .with("name", m.name.clone())
        .with("rating", m.rating)
        .with("year", m.year)
        .with("budget", m.budget)
        .with_display("currency", m.currency.code().to_string(), m.currency.display_name())
        .with("slug", m.slug.clone())
        .with_display("director", m.director_id, director)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_db, fixtures};

    #[test]
    fn nulls_sort_before_values() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), Ordering::Less);
        assert_eq!(Value::Int(2).compare(&Value::Int(10)), Ordering::Less);
        assert_eq!(Value::Text("b".into()).compare(&Value::Text("a".into())), Ordering::Greater);
    }

    #[tokio::test]
    async fn dressing_rooms_show_their_occupant() {
        let db = test_db().await;
        let taken = fixtures::room(&db, 1, 7).await;
        let free = fixtures::room(&db, 1, 8).await;
        let actor = fixtures::actor(&db, "Robert", "De Niro", Some(taken.id)).await;

        let records = load(&db, EntityKind::DressingRoom).await.unwrap();
        let by_id = |id| records.iter().find(|r| r.id == id).unwrap();
        assert_eq!(by_id(taken.id).display("actor"), "Actor Robert De Niro");
        assert_eq!(by_id(taken.id).int("actor"), Some(actor.id.into()));
        assert_eq!(by_id(free.id).display("actor"), "");
        assert_eq!(by_id(free.id).value("actor"), &Value::Null);
    }

    #[tokio::test]
    async fn movies_carry_director_label_and_currency_name() {
        let db = test_db().await;
        let director = fixtures::director(&db, "Michael", "Mann").await;
        fixtures::movie(&db, "Heat", 83, Some(1995), Some(director.id)).await;

        let records = load(&db, EntityKind::Movie).await.unwrap();
        assert_eq!(records[0].display("director"), "Michael Mann");
        assert_eq!(records[0].display("currency"), "Rubbles");
        assert_eq!(records[0].value("currency"), &Value::Text("RUB".into()));
        assert_eq!(records[0].label, "Heat - 83%");
    }
}
