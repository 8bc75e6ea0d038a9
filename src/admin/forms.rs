//! Add/change forms and in-list editing.
//!
//! Submitted forms arrive as raw `(name, value)` pairs. Each entity has a
//! `clean_*` function that turns them into typed input or field errors; the
//! checks that need the database (references, uniqueness) run in [`save`]
//! before anything is written.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::LazyLock,
};

use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, Unchanged,
};

use super::{EntityKind, ModelAdmin, movie::CURRENCY_CHOICES};
use crate::{
    entities::{
        actor::{self, Gender},
        director, dressing_room,
        movie::{self, Currency},
        movie_actor,
    },
    error::AppResult,
    slug::{is_valid_slug, slugify},
};

pub const TOTAL_FORMS: &str = "form-TOTAL_FORMS";
const SLUG_MAX_LEN: usize = 50;
const NAME_MAX_LEN: usize = 100;
const EMAIL_MAX_LEN: usize = 254;

pub type FormErrors = BTreeMap<&'static str, Vec<String>>;

/// Raw submitted form, in submission order. Repeated names are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, name: &str) -> &str {
        self.0.iter().find(|(k, _)| k == name).map_or("", |(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.retain(|(k, _)| k != name);
        self.0.push((name.to_string(), value.into()));
    }

    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_string(), value.into()));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    Text { max_length: usize },
    Email,
    Number,
    Select { choices: Vec<(String, String)>, blank: bool },
    /// Many-to-many picker; `dual` renders available and chosen side by side.
    Multiple { choices: Vec<(String, String)>, dual: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    pub values: Vec<String>,
    pub errors: Vec<String>,
}

/// Result of a successful add or change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Saved {
    pub id: i32,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub slug: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomInput {
    pub floor: i32,
    pub number: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorInput {
    pub first_name: String,
    pub last_name: String,
    pub dressing_room_id: Option<i32>,
    pub gender: Gender,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieInput {
    pub name: String,
    pub rating: i32,
    pub year: Option<i32>,
    pub budget: i32,
    pub currency: Currency,
    pub slug: String,
    pub director_id: Option<i32>,
    pub actor_ids: Vec<i32>,
}

fn add_error(errors: &mut FormErrors, field: &'static str, message: impl Into<String>) {
    errors.entry(field).or_default().push(message.into());
}

fn text(
    data: &FormData,
    field: &'static str,
    max_length: usize,
    errors: &mut FormErrors,
) -> String {
    let value = data.get(field).trim().to_string();
    if value.is_empty() {
        add_error(errors, field, "This field is required.");
    } else if value.chars().count() > max_length {
        add_error(
            errors,
            field,
            format!(
                "Ensure this value has at most {max_length} characters (it has {}).",
                value.chars().count()
            ),
        );
    }
    value
}

fn slug(data: &FormData, field: &'static str, errors: &mut FormErrors) -> String {
    let value = text(data, field, SLUG_MAX_LEN, errors);
    if !value.is_empty() && !is_valid_slug(&value) {
        add_error(
            errors,
            field,
            "Enter a valid “slug” consisting of letters, numbers, underscores or hyphens.",
        );
    }
    value
}

fn integer(data: &FormData, field: &'static str, errors: &mut FormErrors) -> Option<i32> {
    let raw = data.get(field).trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            add_error(errors, field, "Enter a whole number.");
            None
        }
    }
}

fn required_integer(data: &FormData, field: &'static str, errors: &mut FormErrors) -> i32 {
    if data.get(field).trim().is_empty() {
        add_error(errors, field, "This field is required.");
        return 0;
    }
    integer(data, field, errors).unwrap_or_default()
}

fn reference(data: &FormData, field: &'static str, errors: &mut FormErrors) -> Option<i32> {
    let raw = data.get(field).trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            add_error(errors, field, INVALID_CHOICE);
            None
        }
    }
}

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Dot-atom local part, then dot-separated hostname labels and an alphabetic TLD.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[-!#$%&'*+/=?^_`{|}~0-9A-Za-z]+(?:\.[-!#$%&'*+/=?^_`{|}~0-9A-Za-z]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    ))
    .expect("valid regex")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn rating_bounds(rating: i32, field: &'static str, errors: &mut FormErrors) {
    if rating < movie::RATING_MIN {
        add_error(
            errors,
            field,
            format!("Ensure this value is greater than or equal to {}.", movie::RATING_MIN),
        );
    } else if rating > movie::RATING_MAX {
        add_error(
            errors,
            field,
            format!("Ensure this value is less than or equal to {}.", movie::RATING_MAX),
        );
    }
}

/// Blank budget falls back to the default.
fn budget(data: &FormData, field: &'static str, errors: &mut FormErrors) -> i32 {
    let budget = integer(data, field, errors).unwrap_or(movie::DEFAULT_BUDGET);
    if budget < movie::BUDGET_MIN {
        add_error(
            errors,
            field,
            format!("Ensure this value is greater than or equal to {}.", movie::BUDGET_MIN),
        );
    }
    budget
}

fn finish<T>(value: T, errors: FormErrors) -> Result<T, FormErrors> {
    if errors.is_empty() { Ok(value) } else { Err(errors) }
}

pub fn clean_director(data: &FormData) -> Result<DirectorInput, FormErrors> {
    let mut errors = FormErrors::new();
    let input = DirectorInput {
        first_name: text(data, "first_name", NAME_MAX_LEN, &mut errors),
        last_name: text(data, "last_name", NAME_MAX_LEN, &mut errors),
        email: text(data, "email", EMAIL_MAX_LEN, &mut errors),
        slug: slug(data, "slug", &mut errors),
    };
    if !input.email.is_empty() && !is_valid_email(&input.email) {
        add_error(&mut errors, "email", "Enter a valid email address.");
    }
    finish(input, errors)
}

pub fn clean_room(data: &FormData) -> Result<RoomInput, FormErrors> {
    let mut errors = FormErrors::new();
    let input = RoomInput {
        floor: required_integer(data, "floor", &mut errors),
        number: required_integer(data, "number", &mut errors),
    };
    finish(input, errors)
}

pub fn clean_actor(data: &FormData) -> Result<ActorInput, FormErrors> {
    let mut errors = FormErrors::new();
    let gender = Gender::from_code(data.get("gender").trim()).unwrap_or_else(|| {
        add_error(&mut errors, "gender", INVALID_CHOICE);
        Gender::default()
    });
    let input = ActorInput {
        first_name: text(data, "first_name", NAME_MAX_LEN, &mut errors),
        last_name: text(data, "last_name", NAME_MAX_LEN, &mut errors),
        dressing_room_id: reference(data, "dressing_room", &mut errors),
        gender,
    };
    finish(input, errors)
}

pub fn clean_movie(data: &FormData) -> Result<MovieInput, FormErrors> {
    let mut errors = FormErrors::new();
    let rating = required_integer(data, "rating", &mut errors);
    if !errors.contains_key("rating") {
        rating_bounds(rating, "rating", &mut errors);
    }
    let currency = Currency::from_code(data.get("currency").trim()).unwrap_or_else(|| {
        add_error(&mut errors, "currency", INVALID_CHOICE);
        Currency::default()
    });
    let mut actor_ids = Vec::new();
    for raw in data.get_all("actors") {
        match raw.trim().parse() {
            Ok(id) => actor_ids.push(id),
            Err(_) => add_error(&mut errors, "actors", INVALID_CHOICE),
        }
    }
    actor_ids.sort_unstable();
    actor_ids.dedup();

    let input = MovieInput {
        name: text(data, "name", movie::NAME_MAX_LEN, &mut errors),
        rating,
        year: integer(data, "year", &mut errors),
        budget: budget(data, "budget", &mut errors),
        currency,
        slug: slug(data, "slug", &mut errors),
        director_id: reference(data, "director", &mut errors),
        actor_ids,
    };
    finish(input, errors)
}

/// Fills blank prepopulated targets from their source field.
pub fn apply_prepopulated(admin: &ModelAdmin, data: &mut FormData) {
    for (target, source) in &admin.prepopulated_fields {
        if data.get(target).trim().is_empty() {
            let suggested = slugify(data.get(source));
            data.set(target, suggested);
        }
    }
}

/// Values a blank add form starts with.
pub fn defaults(kind: EntityKind) -> FormData {
    let mut data = FormData::default();
    match kind {
        EntityKind::Actor => data.set("gender", Gender::default().code()),
        EntityKind::Movie => {
            data.set("budget", movie::DEFAULT_BUDGET.to_string());
            data.set("currency", Currency::default().code());
        }
        EntityKind::Director | EntityKind::DressingRoom => {}
    }
    data
}

/// Current values of a stored record as form data, `None` if it does not exist.
pub async fn initial(
    db: &DatabaseConnection,
    kind: EntityKind,
    id: i32,
) -> AppResult<Option<FormData>> {
    let mut data = FormData::default();
    match kind {
        EntityKind::Director => {
            let Some(d) = director::Entity::find_by_id(id).one(db).await? else {
                return Ok(None);
            };
            data.set("first_name", d.first_name);
            data.set("last_name", d.last_name);
            data.set("email", d.email);
            data.set("slug", d.slug);
        }
        EntityKind::DressingRoom => {
            let Some(r) = dressing_room::Entity::find_by_id(id).one(db).await? else {
                return Ok(None);
            };
            data.set("floor", r.floor.to_string());
            data.set("number", r.number.to_string());
        }
        EntityKind::Actor => {
            let Some(a) = actor::Entity::find_by_id(id).one(db).await? else {
                return Ok(None);
            };
            data.set("first_name", a.first_name);
            data.set("last_name", a.last_name);
            let room = a.dressing_room_id.map(|i| i.to_string()).unwrap_or_default();
            data.set("dressing_room", room);
            data.set("gender", a.gender.code());
        }
        EntityKind::Movie => {
            let Some(m) = movie::Entity::find_by_id(id).one(db).await? else {
                return Ok(None);
            };
            data.set("name", m.name);
            data.set("rating", m.rating.to_string());
            data.set("year", m.year.map(|y| y.to_string()).unwrap_or_default());
            data.set("budget", m.budget.to_string());
            data.set("currency", m.currency.code());
            data.set("slug", m.slug);
            data.set("director", m.director_id.map(|i| i.to_string()).unwrap_or_default());
            let cast = movie_actor::Entity::find()
                .filter(movie_actor::Column::MovieId.eq(id))
                .order_by_asc(movie_actor::Column::ActorId)
                .all(db)
                .await?;
            for row in cast {
                data.push("actors", row.actor_id.to_string());
            }
        }
    }
    Ok(Some(data))
}

pub async fn label_of(
    db: &DatabaseConnection,
    kind: EntityKind,
    id: i32,
) -> AppResult<Option<String>> {
    let label = match kind {
        EntityKind::Director => director::Entity::find_by_id(id).one(db).await?.map(|m| m.label()),
        EntityKind::Actor => actor::Entity::find_by_id(id).one(db).await?.map(|m| m.label()),
        EntityKind::DressingRoom => {
            dressing_room::Entity::find_by_id(id).one(db).await?.map(|m| m.label())
        }
        EntityKind::Movie => movie::Entity::find_by_id(id).one(db).await?.map(|m| m.label()),
    };
    Ok(label)
}

async fn director_choices(db: &DatabaseConnection) -> AppResult<Vec<(String, String)>> {
    Ok(director::Entity::find()
        .order_by_asc(director::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id.to_string(), d.label()))
        .collect())
}

async fn room_choices(db: &DatabaseConnection) -> AppResult<Vec<(String, String)>> {
    Ok(dressing_room::Entity::find()
        .order_by_asc(dressing_room::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|r| (r.id.to_string(), r.label()))
        .collect())
}

async fn actor_choices(db: &DatabaseConnection) -> AppResult<Vec<(String, String)>> {
    Ok(actor::Entity::find()
        .order_by_asc(actor::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id.to_string(), a.label()))
        .collect())
}

fn static_choices<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<(String, String)> {
    pairs.into_iter().map(|(v, l)| (v.to_string(), l.to_string())).collect()
}

/// Form layout for `admin.entity`, filled from `data` with `errors` attached.
pub async fn fields(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    data: &FormData,
    errors: &FormErrors,
) -> AppResult<Vec<FormField>> {
    let text = |max_length| Widget::Text { max_length };
    let specs: Vec<(&'static str, &'static str, Widget, bool)> = match admin.entity {
        EntityKind::Director => vec![
            ("first_name", "First name", text(NAME_MAX_LEN), true),
            ("last_name", "Last name", text(NAME_MAX_LEN), true),
            ("email", "Email", Widget::Email, true),
            ("slug", "Slug", text(SLUG_MAX_LEN), true),
        ],
        EntityKind::DressingRoom => vec![
            ("floor", "Floor", Widget::Number, true),
            ("number", "Number", Widget::Number, true),
        ],
        EntityKind::Actor => vec![
            ("first_name", "First name", text(NAME_MAX_LEN), true),
            ("last_name", "Last name", text(NAME_MAX_LEN), true),
            (
                "dressing_room",
                "Dressing",
                Widget::Select { choices: room_choices(db).await?, blank: true },
                false,
            ),
            (
                "gender",
                "Gender",
                Widget::Select {
                    choices: static_choices(Gender::ALL.map(|g| (g.code(), g.display_name()))),
                    blank: false,
                },
                true,
            ),
        ],
        EntityKind::Movie => vec![
            ("name", "Name", text(movie::NAME_MAX_LEN), true),
            ("rating", "Rating", Widget::Number, true),
            ("year", "Year", Widget::Number, false),
            ("budget", "Budget", Widget::Number, false),
            (
                "currency",
                "Currency",
                Widget::Select {
                    choices: static_choices(CURRENCY_CHOICES.iter().copied()),
                    blank: false,
                },
                true,
            ),
            ("slug", "Slug", text(SLUG_MAX_LEN), true),
            (
                "director",
                "Director",
                Widget::Select { choices: director_choices(db).await?, blank: true },
                false,
            ),
            (
                "actors",
                "Actors",
                Widget::Multiple {
                    choices: actor_choices(db).await?,
                    dual: admin.filter_horizontal.contains(&"actors"),
                },
                false,
            ),
        ],
    };

    Ok(specs
        .into_iter()
        .map(|(name, label, widget, required)| FormField {
            name,
            label,
            widget,
            required,
            values: data.get_all(name).into_iter().map(str::to_string).collect(),
            errors: errors.get(name).cloned().unwrap_or_default(),
        })
        .collect())
}

/// Validates and writes an add (`id == None`) or change.
pub async fn save(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
) -> AppResult<Result<Saved, FormErrors>> {
    let mut data = data.clone();
    apply_prepopulated(admin, &mut data);

    match admin.entity {
        EntityKind::Director => {
            let input = match clean_director(&data) {
                Ok(input) => input,
                Err(errors) => return Ok(Err(errors)),
            };
            let fields = director::ActiveModel {
                first_name: Set(input.first_name),
                last_name: Set(input.last_name),
                email: Set(input.email),
                slug: Set(input.slug),
                ..Default::default()
            };
            let model = match id {
                Some(id) => director::ActiveModel { id: Unchanged(id), ..fields }.update(db).await?,
                None => fields.insert(db).await?,
            };
            Ok(Ok(Saved { id: model.id, label: model.label() }))
        }
        EntityKind::DressingRoom => {
            let input = match clean_room(&data) {
                Ok(input) => input,
                Err(errors) => return Ok(Err(errors)),
            };
            let fields = dressing_room::ActiveModel {
                floor: Set(input.floor),
                number: Set(input.number),
                ..Default::default()
            };
            let model = match id {
                Some(id) => {
                    dressing_room::ActiveModel { id: Unchanged(id), ..fields }.update(db).await?
                }
                None => fields.insert(db).await?,
            };
            Ok(Ok(Saved { id: model.id, label: model.label() }))
        }
        EntityKind::Actor => {
            let input = match clean_actor(&data) {
                Ok(input) => input,
                Err(errors) => return Ok(Err(errors)),
            };
            if let Some(room_id) = input.dressing_room_id {
                let mut errors = FormErrors::new();
                if dressing_room::Entity::find_by_id(room_id).one(db).await?.is_none() {
                    add_error(&mut errors, "dressing_room", INVALID_CHOICE);
                } else {
                    let holder = actor::Entity::find()
                        .filter(actor::Column::DressingRoomId.eq(room_id))
                        .one(db)
                        .await?;
                    if holder.is_some_and(|holder| Some(holder.id) != id) {
                        add_error(
                            &mut errors,
                            "dressing_room",
                            "Actor with this Dressing already exists.",
                        );
                    }
                }
                if !errors.is_empty() {
                    return Ok(Err(errors));
                }
            }
            let fields = actor::ActiveModel {
                first_name: Set(input.first_name),
                last_name: Set(input.last_name),
                dressing_room_id: Set(input.dressing_room_id),
                gender: Set(input.gender),
                ..Default::default()
            };
            let model = match id {
                Some(id) => actor::ActiveModel { id: Unchanged(id), ..fields }.update(db).await?,
                None => fields.insert(db).await?,
            };
            Ok(Ok(Saved { id: model.id, label: model.label() }))
        }
        EntityKind::Movie => {
            let input = match clean_movie(&data) {
                Ok(input) => input,
                Err(errors) => return Ok(Err(errors)),
            };
            let errors = check_movie_references(db, id, &input).await?;
            if !errors.is_empty() {
                return Ok(Err(errors));
            }

            let fields = movie::ActiveModel {
                name: Set(input.name),
                rating: Set(input.rating),
                year: Set(input.year),
                budget: Set(input.budget),
                currency: Set(input.currency),
                slug: Set(input.slug),
                director_id: Set(input.director_id),
                ..Default::default()
            };

            let txn = db.begin().await?;
            let model = match id {
                Some(id) => movie::ActiveModel { id: Unchanged(id), ..fields }.update(&txn).await?,
                None => fields.insert(&txn).await?,
            };
            movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::MovieId.eq(model.id))
                .exec(&txn)
                .await?;
            if !input.actor_ids.is_empty() {
                movie_actor::Entity::insert_many(input.actor_ids.iter().map(|actor_id| {
                    movie_actor::ActiveModel { movie_id: Set(model.id), actor_id: Set(*actor_id) }
                }))
                .exec_without_returning(&txn)
                .await?;
            }
            txn.commit().await?;

            Ok(Ok(Saved { id: model.id, label: model.label() }))
        }
    }
}

async fn check_movie_references(
    db: &DatabaseConnection,
    id: Option<i32>,
    input: &MovieInput,
) -> AppResult<FormErrors> {
    let mut errors = FormErrors::new();

    let clash = movie::Entity::find()
        .filter(movie::Column::Slug.eq(input.slug.as_str()))
        .one(db)
        .await?;
    if clash.is_some_and(|clash| Some(clash.id) != id) {
        add_error(&mut errors, "slug", "Movie with this Slug already exists.");
    }

    if let Some(director_id) = input.director_id {
        if director::Entity::find_by_id(director_id).one(db).await?.is_none() {
            add_error(&mut errors, "director", INVALID_CHOICE);
        }
    }

    if !input.actor_ids.is_empty() {
        let found: HashSet<i32> = actor::Entity::find()
            .filter(actor::Column::Id.is_in(input.actor_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        if let Some(missing) = input.actor_ids.iter().find(|id| !found.contains(*id)) {
            add_error(
                &mut errors,
                "actors",
                format!("Select a valid choice. {missing} is not one of the available choices."),
            );
        }
    }

    Ok(errors)
}

/// Deletes one record; related rows follow the schema's delete rules.
pub async fn delete(db: &DatabaseConnection, kind: EntityKind, id: i32) -> AppResult<u64> {
    let result = match kind {
        EntityKind::Director => director::Entity::delete_by_id(id).exec(db).await?,
        EntityKind::Actor => actor::Entity::delete_by_id(id).exec(db).await?,
        EntityKind::DressingRoom => dressing_room::Entity::delete_by_id(id).exec(db).await?,
        EntityKind::Movie => movie::Entity::delete_by_id(id).exec(db).await?,
    };
    Ok(result.rows_affected)
}

/// Input widgets for the columns editable in place.
pub async fn inline_widgets(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
) -> AppResult<HashMap<&'static str, Widget>> {
    let mut widgets = HashMap::new();
    for field in admin.list_editable.iter().copied() {
        let widget = match (admin.entity, field) {
            (EntityKind::Movie, "director") => {
                Widget::Select { choices: director_choices(db).await?, blank: true }
            }
            _ => Widget::Number,
        };
        widgets.insert(field, widget);
    }
    Ok(widgets)
}

pub fn row_field(index: usize, field: &str) -> String {
    format!("form-{index}-{field}")
}

/// Applies in-list edits. Returns the number of rows changed, or one message
/// per invalid cell, in which case nothing is written.
pub async fn save_inline(
    db: &DatabaseConnection,
    admin: &ModelAdmin,
    data: &FormData,
) -> AppResult<Result<usize, Vec<String>>> {
    if admin.list_editable.is_empty() || admin.entity != EntityKind::Movie {
        return Ok(Ok(0));
    }

    // A changelist page never holds more rows than this.
    let total: usize = data.get(TOTAL_FORMS).trim().parse().unwrap_or(0);
    let total = total.min(admin.list_per_page);
    let current: HashMap<i32, movie::Model> =
        movie::Entity::find().all(db).await?.into_iter().map(|m| (m.id, m)).collect();
    let directors: HashSet<i32> =
        director::Entity::find().all(db).await?.into_iter().map(|d| d.id).collect();

    let mut problems = Vec::new();
    let mut updates = Vec::new();

    for index in 0..total {
        let Some(existing) = data
            .get(&row_field(index, "id"))
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|id| current.get(&id))
        else {
            continue;
        };

        let mut row = FormData::default();
        for field in admin.list_editable.iter().copied() {
            row.set(field, data.get(&row_field(index, field)));
        }

        let mut errors = FormErrors::new();
        let mut next = existing.clone();
        for field in admin.list_editable.iter().copied() {
            match field {
                "rating" => {
                    let rating = required_integer(&row, "rating", &mut errors);
                    if !errors.contains_key("rating") {
                        rating_bounds(rating, "rating", &mut errors);
                    }
                    next.rating = rating;
                }
                "budget" => next.budget = budget(&row, "budget", &mut errors),
                "director" => {
                    let director_id = reference(&row, "director", &mut errors);
                    if director_id.is_some_and(|id| !directors.contains(&id)) {
                        add_error(&mut errors, "director", INVALID_CHOICE);
                    }
                    next.director_id = director_id;
                }
                _ => {}
            }
        }

        if errors.is_empty() {
            if next != *existing {
                updates.push(next);
            }
        } else {
            for (field, messages) in errors {
                for message in messages {
                    problems.push(format!("{}: {field}: {message}", existing.name));
                }
            }
        }
    }

    if !problems.is_empty() {
        return Ok(Err(problems));
    }

    let changed = updates.len();
    let txn = db.begin().await?;
    for m in updates {
        movie::ActiveModel {
            id: Unchanged(m.id),
            rating: Set(m.rating),
            budget: Set(m.budget),
            director_id: Set(m.director_id),
            ..Default::default()
        }
        .update(&txn)
        .await?;
    }
    txn.commit().await?;

    Ok(Ok(changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{admin::movie::movie_admin, db::test_db, fixtures};

    fn form(items: &[(&str, &str)]) -> FormData {
        FormData::new(items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn movie_form(rating: &str, budget: &str) -> FormData {
        form(&[
            ("name", "Heat"),
            ("rating", rating),
            ("year", "1995"),
            ("budget", budget),
            ("currency", "USD"),
            ("slug", "heat"),
            ("director", ""),
        ])
    }

    #[test]
    fn rating_must_stay_within_range() {
        let errors = clean_movie(&movie_form("0", "5")).unwrap_err();
        assert_eq!(errors["rating"], ["Ensure this value is greater than or equal to 1."]);

        let errors = clean_movie(&movie_form("101", "5")).unwrap_err();
        assert_eq!(errors["rating"], ["Ensure this value is less than or equal to 100."]);

        assert_eq!(clean_movie(&movie_form("100", "5")).unwrap().rating, 100);
        assert_eq!(clean_movie(&movie_form("1", "5")).unwrap().rating, 1);
    }

    #[test]
    fn budget_must_be_positive_and_defaults_when_blank() {
        let errors = clean_movie(&movie_form("50", "0")).unwrap_err();
        assert_eq!(errors["budget"], ["Ensure this value is greater than or equal to 1."]);
        assert_eq!(clean_movie(&movie_form("50", "")).unwrap().budget, movie::DEFAULT_BUDGET);
    }

    #[test]
    fn movie_name_is_limited_to_forty_characters() {
        let mut data = movie_form("50", "5");
        data.set("name", "x".repeat(41));
        let errors = clean_movie(&data).unwrap_err();
        assert_eq!(errors["name"], ["Ensure this value has at most 40 characters (it has 41)."]);
    }

    #[test]
    fn director_requires_valid_email_and_slug() {
        let errors = clean_director(&form(&[
            ("first_name", "Ridley"),
            ("last_name", "Scott"),
            ("email", "ridley-at-example"),
            ("slug", "ridley scott"),
        ]))
        .unwrap_err();
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("slug"));
        assert!(!errors.contains_key("first_name"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.io"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("a@b..c"));
        assert!(!is_valid_email("a.@b.io"));
        assert!(!is_valid_email("a@-b.io"));
        assert!(is_valid_email("first.last+tag@mail.example.co"));
    }

    #[test]
    fn slug_is_prepopulated_from_name() {
        let admin = movie_admin();
        let mut data = form(&[("name", "No Country for Old Men"), ("slug", " ")]);
        apply_prepopulated(&admin, &mut data);
        assert_eq!(data.get("slug"), "no-country-for-old-men");

        let mut data = form(&[("name", "Fargo"), ("slug", "custom")]);
        apply_prepopulated(&admin, &mut data);
        assert_eq!(data.get("slug"), "custom");
    }

    #[tokio::test]
    async fn movie_save_writes_cast_and_rejects_duplicate_slug() {
        let db = test_db().await;
        let admin = movie_admin();
        let director = fixtures::director(&db, "Michael", "Mann").await;
        let pacino = fixtures::actor(&db, "Al", "Pacino", None).await;
        let de_niro = fixtures::actor(&db, "Robert", "De Niro", None).await;

        let mut data =
            form(&[("name", "Heat"), ("rating", "83"), ("currency", "USD"), ("slug", "")]);
        data.set("director", director.id.to_string());
        data.push("actors", pacino.id.to_string());
        data.push("actors", de_niro.id.to_string());

        let saved = save(&db, &admin, None, &data).await.unwrap().unwrap();
        assert_eq!(saved.label, "Heat - 83%");

        let stored = initial(&db, EntityKind::Movie, saved.id).await.unwrap().unwrap();
        assert_eq!(stored.get("slug"), "heat");
        assert_eq!(stored.get("budget"), "1000000");
        assert_eq!(stored.get_all("actors").len(), 2);

        let errors = save(&db, &admin, None, &data).await.unwrap().unwrap_err();
        assert_eq!(errors["slug"], ["Movie with this Slug already exists."]);

        // re-saving the same movie keeps its own slug
        data.set("rating", "90");
        assert!(save(&db, &admin, Some(saved.id), &data).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn dressing_room_holds_one_actor() {
        let db = test_db().await;
        let admin = ModelAdmin::new(EntityKind::Actor);
        let room = fixtures::room(&db, 3, 301).await;
        fixtures::actor(&db, "Val", "Kilmer", Some(room.id)).await;

        let data = form(&[
            ("first_name", "Tom"),
            ("last_name", "Sizemore"),
            ("gender", "M"),
            ("dressing_room", &room.id.to_string()),
        ]);
        let errors = save(&db, &admin, None, &data).await.unwrap().unwrap_err();
        assert!(errors.contains_key("dressing_room"));
    }

    #[tokio::test]
    async fn inline_edits_apply_only_when_every_row_is_valid() {
        let db = test_db().await;
        let admin = movie_admin();
        let a = fixtures::movie(&db, "Alien", 85, Some(1979), None).await;
        let b = fixtures::movie(&db, "Brazil", 70, Some(1985), None).await;
        let director = fixtures::director(&db, "Terry", "Gilliam").await;

        let edits = |rating_b: &str| {
            let mut data = form(&[(TOTAL_FORMS, "2")]);
            data.set(&row_field(0, "id"), a.id.to_string());
            data.set(&row_field(0, "rating"), "85");
            data.set(&row_field(0, "budget"), a.budget.to_string());
            data.set(&row_field(0, "director"), "");
            data.set(&row_field(1, "id"), b.id.to_string());
            data.set(&row_field(1, "rating"), rating_b);
            data.set(&row_field(1, "budget"), "2000");
            data.set(&row_field(1, "director"), director.id.to_string());
            data
        };

        let problems = save_inline(&db, &admin, &edits("150")).await.unwrap().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("Brazil: rating:"));

        let changed = save_inline(&db, &admin, &edits("72")).await.unwrap().unwrap();
        assert_eq!(changed, 1);
        let stored = movie::Entity::find_by_id(b.id).one(&db).await.unwrap().unwrap();
        assert_eq!(
            (stored.rating, stored.budget, stored.director_id),
            (72, 2000, Some(director.id))
        );
    }

    #[tokio::test]
    async fn inline_rows_past_one_page_are_ignored() {
        let db = test_db().await;
        let admin = movie_admin();
        let alien = fixtures::movie(&db, "Alien", 85, Some(1979), None).await;

        let mut data = form(&[(TOTAL_FORMS, "5000000")]);
        data.set(&row_field(0, "id"), alien.id.to_string());
        data.set(&row_field(0, "rating"), "90");
        data.set(&row_field(0, "budget"), alien.budget.to_string());
        data.set(&row_field(0, "director"), "");
        let beyond = admin.list_per_page;
        data.set(&row_field(beyond, "id"), alien.id.to_string());
        data.set(&row_field(beyond, "rating"), "500");

        assert_eq!(save_inline(&db, &admin, &data).await.unwrap(), Ok(1));
        let stored = movie::Entity::find_by_id(alien.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.rating, 90);
    }

    #[tokio::test]
    async fn deleting_director_removes_movies_and_room_release_actor() {
        let db = test_db().await;
        let director = fixtures::director(&db, "Michael", "Mann").await;
        fixtures::movie(&db, "Heat", 83, Some(1995), Some(director.id)).await;
        fixtures::movie(&db, "Collateral", 75, Some(2004), Some(director.id)).await;
        let other = fixtures::movie(&db, "Fargo", 81, Some(1996), None).await;
        let room = fixtures::room(&db, 1, 12).await;
        let actor = fixtures::actor(&db, "Jamie", "Foxx", Some(room.id)).await;

        assert_eq!(delete(&db, EntityKind::Director, director.id).await.unwrap(), 1);
        let left: Vec<_> =
            movie::Entity::find().all(&db).await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(left, [other.id]);

        assert_eq!(delete(&db, EntityKind::DressingRoom, room.id).await.unwrap(), 1);
        let actor = actor::Entity::find_by_id(actor.id).one(&db).await.unwrap().unwrap();
        assert_eq!(actor.dressing_room_id, None);
    }
}
