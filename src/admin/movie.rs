use super::{
    Band, BulkAction, Column, EntityKind, Level, ListFilter, ModelAdmin, OrderBy, records::Record,
};
use crate::entities::movie::Currency;

pub const RATING_BANDS: &[Band] = &[
    Band { value: "<40", label: "Low", min: None, max: Some(40) },
    Band { value: "from 40 to 59", label: "Middle", min: Some(40), max: Some(60) },
    Band { value: "from 60 to 79", label: "High", min: Some(60), max: Some(80) },
    Band { value: ">=80", label: "Magnificent!", min: Some(80), max: None },
];

pub const CURRENCY_CHOICES: &[(&str, &str)] =
    &[("EUR", "Euro"), ("USD", "Dollar"), ("RUB", "Rubbles")];

pub fn rating_status(rating: i64) -> &'static str {
    if rating < 50 {
        return "Did u really wanna watch it?";
    }
    if rating < 70 {
        return "One time u can watch it";
    }
    if rating <= 85 {
        return "Nice";
    }
    "The best!"
}

fn status_column(record: &Record) -> String {
    record.int("rating").map(rating_status).unwrap_or_default().to_string()
}

pub fn movie_admin() -> ModelAdmin {
    ModelAdmin::new(EntityKind::Movie)
        .list_display(vec![
            Column::Field { name: "name", header: "NAME" },
            Column::Field { name: "rating", header: "RATING" },
            Column::Field { name: "director", header: "DIRECTOR" },
            Column::Field { name: "budget", header: "BUDGET" },
            Column::Computed {
                name: "rating_status",
                header: "STATUS",
                order_field: Some("rating"),
                compute: status_column,
            },
        ])
        .list_editable(vec!["rating", "director", "budget"])
        .ordering(vec![OrderBy::desc("rating"), OrderBy::asc("name")])
        .list_per_page(10)
        .search_fields(vec!["name", "rating"])
        .list_filter(vec![
            ListFilter::Field { field: "name", title: "name" },
            ListFilter::Choices { field: "currency", title: "currency", choices: CURRENCY_CHOICES },
            ListFilter::Bands {
                title: "Filter by rating",
                parameter: "rating",
                field: "rating",
                bands: RATING_BANDS,
            },
        ])
        .actions(vec![
            BulkAction {
                name: "set_dollars",
                description: "Set currency in USD",
                kind: super::ActionKind::SetCurrency(Currency::Usd),
                notify: None,
            },
            BulkAction {
                name: "set_euro",
                description: "Set currency in EUR",
                kind: super::ActionKind::SetCurrency(Currency::Eur),
                notify: Some(Level::Error),
            },
        ])
        .prepopulated_fields(vec![("slug", "name")])
        .filter_horizontal(vec!["actors"])
}
