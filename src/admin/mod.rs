//! Back-office for managing the catalog.
//!
//! Every entity is described by a [`ModelAdmin`] value: which columns the
//! changelist shows, which of them are editable in place, what can be searched
//! and filtered, and which bulk actions apply. [`registry`] builds the full set
//! once at startup; [`changelist`] interprets a configuration against the
//! loaded rows.

pub mod actions;
pub mod auth;
pub mod changelist;
pub mod flash;
pub mod forms;
pub mod movie;
pub mod records;
pub mod routes;
pub mod templates;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::movie::Currency;

pub use routes::router;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Director,
    Actor,
    DressingRoom,
    Movie,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] =
        [EntityKind::Director, EntityKind::Actor, EntityKind::DressingRoom, EntityKind::Movie];

    /// Path segment under `/admin/`.
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Director => "director",
            EntityKind::Actor => "actor",
            EntityKind::DressingRoom => "dressingroom",
            EntityKind::Movie => "movie",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    pub fn verbose_name(self) -> &'static str {
        match self {
            EntityKind::Director => "director",
            EntityKind::Actor => "actor",
            EntityKind::DressingRoom => "dressing room",
            EntityKind::Movie => "movie",
        }
    }

    pub fn verbose_name_plural(self) -> &'static str {
        match self {
            EntityKind::Director => "directors",
            EntityKind::Actor => "actors",
            EntityKind::DressingRoom => "dressing rooms",
            EntityKind::Movie => "movies",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verbose_name())
    }
}

/// A changelist column.
#[derive(Clone, Debug)]
pub enum Column {
    /// The record's label.
    Label,
    Field { name: &'static str, header: &'static str },
    /// Read-only value derived from the record. Sorting uses `order_field`.
    Computed {
        name: &'static str,
        header: &'static str,
        order_field: Option<&'static str>,
        compute: fn(&records::Record) -> String,
    },
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Label => "__str__",
            Column::Field { name, .. } | Column::Computed { name, .. } => name,
        }
    }

    pub fn header(&self, kind: EntityKind) -> String {
        match self {
            Column::Label => kind.verbose_name().to_uppercase(),
            Column::Field { header, .. } | Column::Computed { header, .. } => header.to_string(),
        }
    }

    /// Record field the column sorts by, if sortable.
    pub fn order_field(&self) -> Option<&'static str> {
        match self {
            Column::Label => None,
            Column::Field { name, .. } => Some(name),
            Column::Computed { order_field, .. } => *order_field,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: &'static str) -> Self {
        Self { field, descending: false }
    }

    pub fn desc(field: &'static str) -> Self {
        Self { field, descending: true }
    }
}

/// Half-open numeric bucket: `min` inclusive, `max` exclusive, either may be open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub value: &'static str,
    pub label: &'static str,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Band {
    pub fn contains(&self, n: i64) -> bool {
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n < max)
    }
}

#[derive(Clone, Debug)]
pub enum ListFilter {
    /// Distinct values present in the data.
    Field { field: &'static str, title: &'static str },
    /// Fixed set of `(value, label)` choices.
    Choices {
        field: &'static str,
        title: &'static str,
        choices: &'static [(&'static str, &'static str)],
    },
    /// Numeric bands over `field`, selected through `parameter`.
    Bands {
        title: &'static str,
        parameter: &'static str,
        field: &'static str,
        bands: &'static [Band],
    },
}

impl ListFilter {
    pub fn parameter(&self) -> &'static str {
        match self {
            ListFilter::Field { field, .. } | ListFilter::Choices { field, .. } => field,
            ListFilter::Bands { parameter, .. } => parameter,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ListFilter::Field { title, .. }
            | ListFilter::Choices { title, .. }
            | ListFilter::Bands { title, .. } => title,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// One-shot notice shown to the operator on the next page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    DeleteSelected,
    SetCurrency(Currency),
}

#[derive(Clone, Debug)]
pub struct BulkAction {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ActionKind,
    /// Level of the update-count notice; `None` runs silently.
    pub notify: Option<Level>,
}

impl BulkAction {
    pub fn delete_selected(kind: EntityKind) -> Self {
        let description = match kind {
            EntityKind::Director => "Delete selected directors",
            EntityKind::Actor => "Delete selected actors",
            EntityKind::DressingRoom => "Delete selected dressing rooms",
            EntityKind::Movie => "Delete selected movies",
        };
        Self {
            name: "delete_selected",
            description,
            kind: ActionKind::DeleteSelected,
            notify: Some(Level::Success),
        }
    }
}

/// Declarative admin configuration for one entity.
#[derive(Clone, Debug)]
pub struct ModelAdmin {
    pub entity: EntityKind,
    /// The first column links to the change form.
    pub list_display: Vec<Column>,
    pub list_editable: Vec<&'static str>,
    pub search_fields: Vec<&'static str>,
    pub list_filter: Vec<ListFilter>,
    pub ordering: Vec<OrderBy>,
    pub list_per_page: usize,
    pub actions: Vec<BulkAction>,
    /// `(target, source)`: target is suggested from source while typing.
    pub prepopulated_fields: Vec<(&'static str, &'static str)>,
    pub filter_horizontal: Vec<&'static str>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{entity}: link column `{field}` cannot be editable in the list")]
    EditableLink { entity: EntityKind, field: &'static str },
    #[error("{entity}: editable field `{field}` is not a displayed column")]
    EditableNotDisplayed { entity: EntityKind, field: &'static str },
    #[error("{entity}: list_per_page must be positive")]
    EmptyPage { entity: EntityKind },
}

impl ModelAdmin {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            list_display: vec![Column::Label],
            list_editable: Vec::new(),
            search_fields: Vec::new(),
            list_filter: Vec::new(),
            ordering: vec![OrderBy::desc("id")],
            list_per_page: 100,
            actions: vec![BulkAction::delete_selected(entity)],
            prepopulated_fields: Vec::new(),
            filter_horizontal: Vec::new(),
        }
    }

    pub fn list_display(mut self, columns: Vec<Column>) -> Self {
        self.list_display = columns;
        self
    }

    pub fn list_editable(mut self, fields: Vec<&'static str>) -> Self {
        self.list_editable = fields;
        self
    }

    pub fn search_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.search_fields = fields;
        self
    }

    pub fn list_filter(mut self, filters: Vec<ListFilter>) -> Self {
        self.list_filter = filters;
        self
    }

    pub fn ordering(mut self, ordering: Vec<OrderBy>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn list_per_page(mut self, n: usize) -> Self {
        self.list_per_page = n;
        self
    }

    /// Appends to the built-in delete action.
    pub fn actions(mut self, actions: Vec<BulkAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn prepopulated_fields(mut self, fields: Vec<(&'static str, &'static str)>) -> Self {
        self.prepopulated_fields = fields;
        self
    }

    pub fn filter_horizontal(mut self, fields: Vec<&'static str>) -> Self {
        self.filter_horizontal = fields;
        self
    }

    pub fn link_column(&self) -> Option<&Column> {
        self.list_display.first()
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.list_editable.iter().any(|f| *f == field)
    }

    pub fn action(&self, name: &str) -> Option<&BulkAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list_per_page == 0 {
            return Err(ConfigError::EmptyPage { entity: self.entity });
        }
        for field in self.list_editable.iter().copied() {
            if self.link_column().is_some_and(|c| c.name() == field) {
                return Err(ConfigError::EditableLink { entity: self.entity, field });
            }
            let displayed = self
                .list_display
                .iter()
                .any(|c| matches!(c, Column::Field { name, .. } if *name == field));
            if !displayed {
                return Err(ConfigError::EditableNotDisplayed { entity: self.entity, field });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AdminRegistry {
    admins: Vec<ModelAdmin>,
}

impl AdminRegistry {
    pub fn get(&self, kind: EntityKind) -> Option<&ModelAdmin> {
        self.admins.iter().find(|a| a.entity == kind)
    }

    pub fn by_slug(&self, slug: &str) -> Option<&ModelAdmin> {
        EntityKind::from_slug(slug).and_then(|kind| self.get(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.admins.iter()
    }
}

/// Builds the admin configuration for every entity. Called once at startup.
pub fn registry() -> Result<AdminRegistry, ConfigError> {
    let admins = vec![
        ModelAdmin::new(EntityKind::Director),
        ModelAdmin::new(EntityKind::Actor),
        ModelAdmin::new(EntityKind::DressingRoom).list_display(vec![
            Column::Field { name: "floor", header: "FLOOR" },
            Column::Field { name: "number", header: "NUMBER" },
            Column::Field { name: "actor", header: "ACTOR" },
        ]),
        movie::movie_admin(),
    ];

    for admin in &admins {
        admin.validate()?;
    }

    Ok(AdminRegistry { admins })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_entity() {
        let registry = registry().unwrap();
        for kind in EntityKind::ALL {
            assert_eq!(registry.by_slug(kind.slug()).map(|a| a.entity), Some(kind));
        }
        assert!(registry.by_slug("user").is_none());
    }

    #[test]
    fn link_column_cannot_be_editable() {
        let admin = ModelAdmin::new(EntityKind::Movie)
            .list_display(vec![Column::Field { name: "name", header: "NAME" }])
            .list_editable(vec!["name"]);
        assert_eq!(
            admin.validate(),
            Err(ConfigError::EditableLink { entity: EntityKind::Movie, field: "name" })
        );
    }

    #[test]
    fn editable_fields_must_be_displayed() {
        let admin = ModelAdmin::new(EntityKind::Movie)
            .list_display(vec![Column::Field { name: "name", header: "NAME" }])
            .list_editable(vec!["budget"]);
        assert!(matches!(admin.validate(), Err(ConfigError::EditableNotDisplayed { .. })));
    }

    #[test]
    fn default_admin_offers_only_delete() {
        let admin = ModelAdmin::new(EntityKind::Actor);
        assert_eq!(admin.actions.len(), 1);
        assert_eq!(admin.actions[0].kind, ActionKind::DeleteSelected);
        assert!(admin.validate().is_ok());
    }
}
