use std::collections::HashMap;

use maud::{Markup, PreEscaped, html};

use super::{
    AdminRegistry, Column, EntityKind, Level, Message, ModelAdmin,
    actions::{ACTION_FIELD, SELECTED_FIELD},
    changelist::{ChangeList, SEARCH_PARAM},
    forms::{FormField, TOTAL_FORMS, Widget, row_field},
    records::Record,
};
use crate::templates::page;

const BUTTON: &str = "rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700";
const INPUT: &str = "rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";

const SLUGIFY_JS: &str = r#"
function slugify(s) {
  return s.normalize('NFKD').replace(/[\u0300-\u036f]/g, '').toLowerCase()
    .replace(/[^\w\s-]/g, '').trim().replace(/[-\s]+/g, '-');
}
document.querySelectorAll('[data-prepopulate]').forEach(function (target) {
  var source = document.getElementById(target.dataset.prepopulate);
  var touched = target.value !== '';
  target.addEventListener('input', function () { touched = target.value !== ''; });
  source.addEventListener('input', function () { if (!touched) target.value = slugify(source.value); });
});
"#;

const DUAL_LIST_JS: &str = r#"
document.querySelectorAll('[data-dual]').forEach(function (box) {
  var from = box.querySelector('[data-from]'), to = box.querySelector('[data-to]');
  function move(a, b) { Array.from(a.selectedOptions).forEach(function (o) { o.selected = false; b.appendChild(o); }); }
  box.querySelector('[data-add]').addEventListener('click', function () { move(from, to); });
  box.querySelector('[data-remove]').addEventListener('click', function () { move(to, from); });
  box.querySelector('[data-filter]').addEventListener('input', function (e) {
    var q = e.target.value.toLowerCase();
    Array.from(from.options).forEach(function (o) { o.hidden = !o.text.toLowerCase().includes(q); });
  });
  box.closest('form').addEventListener('submit', function () { Array.from(to.options).forEach(function (o) { o.selected = true; }); });
});
"#;

fn admin_page(title: &str, messages: &[Message], body: Markup) -> String {
    page(
        title,
        html! {
            div class="min-h-screen bg-gray-50" {
                header class="bg-slate-800 text-white" {
                    div class="max-w-6xl mx-auto px-6 py-4 flex items-center justify-between" {
                        a class="text-lg font-semibold" href="/admin/" { "Catalog administration" }
                        div class="flex items-center gap-4 text-sm" {
                            a class="hover:underline" href="/" { "View site" }
                            form method="post" action="/admin/logout" {
                                button class="hover:underline" type="submit" { "Log out" }
                            }
                        }
                    }
                }
                main class="max-w-6xl mx-auto px-6 py-8" {
                    @for message in messages {
                        (notice(message))
                    }
                    (body)
                }
            }
        },
    )
}

fn notice(message: &Message) -> Markup {
    let tone = match message.level {
        Level::Success => "border-green-500 bg-green-50 text-green-800",
        Level::Warning => "border-yellow-500 bg-yellow-50 text-yellow-800",
        Level::Error => "border-red-500 bg-red-50 text-red-800",
    };
    html! {
        div class=(format!("mb-4 border-l-4 px-4 py-3 {tone}")) data-level=(message.level.as_str()) {
            (message.text)
        }
    }
}

fn changelist_url(admin: &ModelAdmin) -> String {
    format!("/admin/{}/", admin.entity.slug())
}

fn change_url(admin: &ModelAdmin, id: i32) -> String {
    format!("/admin/{}/{id}/change/", admin.entity.slug())
}

pub fn index_page(registry: &AdminRegistry, messages: &[Message]) -> String {
    admin_page(
        "Site administration",
        messages,
        html! {
            h1 class="text-2xl font-bold text-gray-900" { "Site administration" }
            div class="mt-6 bg-white shadow rounded-lg divide-y" {
                @for admin in registry.iter() {
                    div class="flex items-center justify-between px-6 py-4" {
                        a class="font-medium text-blue-600 hover:text-blue-800" href=(changelist_url(admin)) {
                            (capitalize(admin.entity.verbose_name_plural()))
                        }
                        a class="text-sm text-gray-500 hover:text-gray-700" href=(format!("{}add/", changelist_url(admin))) { "Add" }
                    }
                }
            }
        },
    )
}

pub fn login_page(next: &str, error: Option<&str>) -> String {
    page(
        "Log in",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-sm w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Catalog administration" }
                        @if let Some(error) = error {
                            p class="mt-4 text-sm text-red-700" { (error) }
                        }
                        form class="mt-6 space-y-4" method="post" action="/admin/login" {
                            input type="hidden" name="next" value=(next);
                            label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                            input class=(format!("w-full {INPUT}")) type="password" name="password" id="password" required autofocus;
                            button class=(format!("w-full {BUTTON}")) type="submit" { "Log in" }
                        }
                    }
                }
            }
        },
    )
}

fn cell_text(column: &Column, record: &Record) -> String {
    match column {
        Column::Label => record.label.clone(),
        Column::Field { name, .. } => record.display(name).to_string(),
        Column::Computed { compute, .. } => compute(record),
    }
}

fn editable_cell(widget: Option<&Widget>, index: usize, field: &str, record: &Record) -> Markup {
    let name = row_field(index, field);
    let current = record.value(field).as_param().unwrap_or_default();
    html! {
        @match widget {
            Some(Widget::Select { choices, blank }) => {
                select class=(INPUT) name=(name) {
                    @if *blank { option value="" { "---------" } }
                    @for (value, label) in choices {
                        option value=(value) selected[*value == current] { (label) }
                    }
                }
            }
            _ => {
                input class=(format!("w-28 {INPUT}")) type="number" name=(name) value=(current);
            }
        }
    }
}

pub fn changelist_page(
    cl: &ChangeList<'_>,
    widgets: &HashMap<&'static str, Widget>,
    messages: &[Message],
) -> String {
    let admin = cl.admin;
    let plural = admin.entity.verbose_name_plural();
    let title = format!("Select {} to change", admin.entity.verbose_name());
    let editable = !admin.list_editable.is_empty();

    admin_page(
        &title,
        messages,
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-2xl font-bold text-gray-900" { (title) }
                a class=(BUTTON) href=(format!("{}add/", changelist_url(admin))) {
                    "Add " (admin.entity.verbose_name())
                }
            }

            div class="mt-6 flex gap-6" {
                div class="flex-1 min-w-0" {
                    @if !admin.search_fields.is_empty() {
                        form class="mb-4 flex gap-2" method="get" {
                            input class=(format!("flex-1 {INPUT}")) type="search" name=(SEARCH_PARAM) value=(cl.query.search);
                            @for (param, value) in &cl.query.filters {
                                input type="hidden" name=(param) value=(value);
                            }
                            button class=(BUTTON) type="submit" { "Search" }
                        }
                        @if !cl.query.search.is_empty() || !cl.query.filters.is_empty() {
                            p class="mb-4 text-sm text-gray-600" {
                                (cl.matched) " results (" a class="text-blue-600" href="?" { (cl.total) " total" } ")"
                            }
                        }
                    }

                    form method="post" {
                        div class="mb-3 flex items-center gap-2 text-sm" {
                            label for=(ACTION_FIELD) { "Action:" }
                            select class=(INPUT) name=(ACTION_FIELD) id=(ACTION_FIELD) {
                                option value="" { "---------" }
                                @for action in &admin.actions {
                                    option value=(action.name) { (action.description) }
                                }
                            }
                            button class=(BUTTON) type="submit" name="index" value="0" { "Go" }
                        }

                        input type="hidden" name=(TOTAL_FORMS) value=(cl.rows.len());
                        table class="w-full bg-white shadow rounded-lg text-sm" {
                            thead class="bg-gray-100 text-left text-xs text-gray-600" {
                                tr {
                                    th class="px-3 py-2" {}
                                    @for header in &cl.headers {
                                        th class="px-3 py-2" {
                                            @match &header.href {
                                                Some(href) => a class="hover:underline" href=(href) {
                                                    (header.text)
                                                    @match header.sorted {
                                                        Some(true) => { " ▼" }
                                                        Some(false) => { " ▲" }
                                                        None => {}
                                                    }
                                                },
                                                None => { (header.text) }
                                            }
                                        }
                                    }
                                }
                            }
                            tbody class="divide-y" {
                                @for (index, record) in cl.rows.iter().enumerate() {
                                    tr {
                                        td class="px-3 py-2" {
                                            input type="checkbox" name=(SELECTED_FIELD) value=(record.id);
                                            @if editable {
                                                input type="hidden" name=(row_field(index, "id")) value=(record.id);
                                            }
                                        }
                                        @for (position, column) in admin.list_display.iter().enumerate() {
                                            td class="px-3 py-2" {
                                                @if position == 0 {
                                                    a class="font-medium text-blue-600 hover:text-blue-800" href=(change_url(admin, record.id)) {
                                                        (cell_text(column, record))
                                                    }
                                                } @else if admin.is_editable(column.name()) {
                                                    (editable_cell(widgets.get(column.name()), index, column.name(), record))
                                                } @else {
                                                    (cell_text(column, record))
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        div class="mt-4 flex items-center justify-between text-sm text-gray-600" {
                            div class="flex items-center gap-2" {
                                @if cl.pages > 1 {
                                    @for page in 1..=cl.pages {
                                        @if page == cl.page {
                                            span class="font-semibold" { (page) }
                                        } @else {
                                            a class="text-blue-600 hover:text-blue-800" href=(cl.page_href(page)) { (page) }
                                        }
                                    }
                                }
                                span { (cl.matched) " " (plural) }
                            }
                            @if editable {
                                button class=(BUTTON) type="submit" name="_save" value="1" { "Save" }
                            }
                        }
                    }
                }

                @if !cl.filters.is_empty() {
                    aside class="w-56 shrink-0 bg-white shadow rounded-lg p-4 text-sm" {
                        h2 class="font-semibold text-gray-900" { "Filter" }
                        @for filter in &cl.filters {
                            h3 class="mt-4 text-xs font-semibold uppercase text-gray-500" { "By " (filter.title) }
                            ul class="mt-1 space-y-1" {
                                @for choice in &filter.choices {
                                    li {
                                        @if choice.selected {
                                            span class="font-semibold text-blue-700" { (choice.label) }
                                        } @else {
                                            a class="text-gray-700 hover:text-blue-600" href=(choice.href) { (choice.label) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn field_input(admin: &ModelAdmin, field: &FormField) -> Markup {
    let value = field.values.first().map(String::as_str).unwrap_or_default();
    let prepopulate = admin
        .prepopulated_fields
        .iter()
        .find(|(target, _)| *target == field.name)
        .map(|(_, source)| format!("id_{source}"));

    html! {
        @match &field.widget {
            Widget::Text { max_length } => {
                input class=(format!("w-full {INPUT}")) type="text" id=(format!("id_{}", field.name))
                    name=(field.name) value=(value) maxlength=(max_length) required[field.required]
                    data-prepopulate=[prepopulate];
            }
            Widget::Email => {
                input class=(format!("w-full {INPUT}")) type="email" id=(format!("id_{}", field.name))
                    name=(field.name) value=(value) required[field.required];
            }
            Widget::Number => {
                input class=(format!("w-40 {INPUT}")) type="number" id=(format!("id_{}", field.name))
                    name=(field.name) value=(value) required[field.required];
            }
            Widget::Select { choices, blank } => {
                select class=(INPUT) id=(format!("id_{}", field.name)) name=(field.name) {
                    @if *blank { option value="" { "---------" } }
                    @for (choice, label) in choices {
                        option value=(choice) selected[choice == value] { (label) }
                    }
                }
            }
            Widget::Multiple { choices, dual: true } => {
                div class="flex items-start gap-3" data-dual {
                    div {
                        p class="text-xs text-gray-500" { "Available " (field.label.to_lowercase()) }
                        input class=(format!("mt-1 w-full {INPUT}")) type="search" placeholder="Filter" data-filter;
                        select class=(format!("mt-1 w-56 h-48 {INPUT}")) multiple data-from {
                            @for (choice, label) in choices.iter().filter(|(c, _)| !field.values.contains(c)) {
                                option value=(choice) { (label) }
                            }
                        }
                    }
                    div class="flex flex-col gap-2 pt-16" {
                        button class="rounded border px-2" type="button" data-add { "→" }
                        button class="rounded border px-2" type="button" data-remove { "←" }
                    }
                    div {
                        p class="text-xs text-gray-500" { "Chosen " (field.label.to_lowercase()) }
                        select class=(format!("mt-10 w-56 h-48 {INPUT}")) multiple name=(field.name) id=(format!("id_{}", field.name)) data-to {
                            @for (choice, label) in choices.iter().filter(|(c, _)| field.values.contains(c)) {
                                option value=(choice) selected { (label) }
                            }
                        }
                    }
                }
            }
            Widget::Multiple { choices, dual: false } => {
                select class=(format!("w-56 h-48 {INPUT}")) multiple id=(format!("id_{}", field.name)) name=(field.name) {
                    @for (choice, label) in choices {
                        option value=(choice) selected[field.values.contains(choice)] { (label) }
                    }
                }
            }
        }
    }
}

pub fn change_form_page(
    admin: &ModelAdmin,
    id: Option<i32>,
    fields: &[FormField],
    messages: &[Message],
) -> String {
    let verb = if id.is_some() { "Change" } else { "Add" };
    let title = format!("{verb} {}", admin.entity.verbose_name());
    let has_errors = fields.iter().any(|f| !f.errors.is_empty());

    admin_page(
        &title,
        messages,
        html! {
            h1 class="text-2xl font-bold text-gray-900" { (title) }
            @if has_errors {
                p class="mt-4 border-l-4 border-red-500 bg-red-50 px-4 py-3 text-red-800" {
                    "Please correct the errors below."
                }
            }
            form class="mt-6 bg-white shadow rounded-lg p-6 space-y-5" method="post" {
                @for field in fields {
                    div {
                        label class=(if field.required { "block text-sm font-semibold text-gray-800" } else { "block text-sm text-gray-700" })
                            for=(format!("id_{}", field.name)) {
                            (field.label) ":"
                        }
                        div class="mt-1" { (field_input(admin, field)) }
                        @for error in &field.errors {
                            p class="mt-1 text-sm text-red-700" { (error) }
                        }
                    }
                }
                div class="flex items-center justify-between border-t pt-4" {
                    @match id {
                        Some(id) => a class="text-sm text-red-600 hover:text-red-800" href=(format!("/admin/{}/{id}/delete/", admin.entity.slug())) { "Delete" },
                        None => span {},
                    }
                    div class="flex gap-2" {
                        button class="rounded-md border px-4 py-2 text-sm" type="submit" name="_addanother" value="1" { "Save and add another" }
                        button class="rounded-md border px-4 py-2 text-sm" type="submit" name="_continue" value="1" { "Save and continue editing" }
                        button class=(BUTTON) type="submit" name="_save" value="1" { "Save" }
                    }
                }
            }
            script { (PreEscaped(SLUGIFY_JS)) }
            script { (PreEscaped(DUAL_LIST_JS)) }
        },
    )
}

/// What else goes away, following the foreign keys.
fn delete_consequence(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Director => "Every movie by this director will be deleted as well.",
        EntityKind::Actor => "The actor will be removed from every movie cast.",
        EntityKind::DressingRoom => "Its actor keeps their record and loses the room.",
        EntityKind::Movie => "Its cast list will be removed as well.",
    }
}

pub fn delete_page(admin: &ModelAdmin, id: i32, label: &str) -> String {
    let title = "Are you sure?";
    admin_page(
        title,
        &[],
        html! {
            h1 class="text-2xl font-bold text-gray-900" { (title) }
            p class="mt-4 text-gray-700" {
                "Are you sure you want to delete the " (admin.entity.verbose_name()) " “" (label) "”? "
                (delete_consequence(admin.entity))
            }
            form class="mt-6 flex gap-3" method="post" {
                button class="rounded-md bg-red-600 px-4 py-2 text-sm font-semibold text-white hover:bg-red-700" type="submit" {
                    "Yes, I’m sure"
                }
                a class="rounded-md border px-4 py-2 text-sm" href=(change_url(admin, id)) { "No, take me back" }
            }
        },
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{
        changelist::{self, ChangeListQuery},
        movie::movie_admin,
    };

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("dressing rooms"), "Dressing rooms");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn delete_page_names_what_follows() {
        let room = ModelAdmin::new(EntityKind::DressingRoom);
        let html = delete_page(&room, 3, "3 301");
        assert!(html.contains("keeps their record"));
        assert!(!html.contains("will be deleted as well"));

        let director = ModelAdmin::new(EntityKind::Director);
        assert!(delete_page(&director, 1, "Director Michael Mann").contains("Every movie"));
    }

    #[test]
    fn changelist_renders_inline_inputs_and_link_column() {
        let admin = movie_admin();
        let records = vec![
            Record::new(7, "Heat - 83%")
                .with("name", "Heat".to_string())
                .with("rating", 83)
                .with("budget", 1_000)
                .with("currency", "USD".to_string())
                .with("director", None::<i32>),
        ];
        let cl = changelist::build(&admin, records, ChangeListQuery::from_pairs(&admin, &[]));
        let messages = [Message::new(Level::Error, "1 notes was updated")];
        let html = changelist_page(&cl, &HashMap::new(), &messages);

        assert!(html.contains(r#"href="/admin/movie/7/change/""#));
        assert!(html.contains(r#"name="form-0-rating" value="83""#));
        assert!(html.contains(r#"name="form-0-budget" value="1000""#));
        assert!(html.contains("Nice"));
        assert!(html.contains(r#"data-level="error""#));
        assert!(html.contains("Magnificent!"));
    }
}
