//! Interprets a [`ModelAdmin`] over materialized records: filters, search,
//! ordering and pagination, plus the links the changelist page renders.

use std::collections::BTreeMap;

use super::{ListFilter, ModelAdmin, OrderBy, records::Record};

pub const SEARCH_PARAM: &str = "q";
pub const ORDER_PARAM: &str = "o";
pub const PAGE_PARAM: &str = "p";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeListQuery {
    pub search: String,
    pub order: Option<String>,
    pub page: usize,
    pub filters: BTreeMap<&'static str, String>,
}

impl ChangeListQuery {
    /// Keeps only parameters the admin understands; blanks are dropped.
    pub fn from_pairs(admin: &ModelAdmin, pairs: &[(String, String)]) -> Self {
        let mut query = Self { page: 1, ..Self::default() };
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                SEARCH_PARAM => query.search = value.to_string(),
                ORDER_PARAM => query.order = Some(value.to_string()),
                PAGE_PARAM => query.page = value.parse().unwrap_or(1).max(1),
                other => {
                    let filter = admin.list_filter.iter().find(|f| f.parameter() == other);
                    if let Some(filter) = filter {
                        query.filters.insert(filter.parameter(), value.to_string());
                    }
                }
            }
        }
        query
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("{SEARCH_PARAM}={}", urlencoding::encode(&self.search)));
        }
        if let Some(order) = &self.order {
            parts.push(format!("{ORDER_PARAM}={}", urlencoding::encode(order)));
        }
        for (param, value) in &self.filters {
            parts.push(format!("{param}={}", urlencoding::encode(value)));
        }
        if self.page > 1 {
            parts.push(format!("{PAGE_PARAM}={}", self.page));
        }
        if parts.is_empty() { "?".to_string() } else { format!("?{}", parts.join("&")) }
    }

    pub fn with_filter(&self, parameter: &'static str, value: Option<&str>) -> Self {
        let mut next = self.clone();
        match value {
            Some(value) => next.filters.insert(parameter, value.to_string()),
            None => next.filters.remove(parameter),
        };
        next.page = 1;
        next
    }

    pub fn with_order(&self, order: String) -> Self {
        Self { order: Some(order), page: 1, ..self.clone() }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self { page, ..self.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterChoice {
    pub label: String,
    pub selected: bool,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub title: &'static str,
    pub choices: Vec<FilterChoice>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub text: String,
    /// `Some(descending)` when this column drives the current sort.
    pub sorted: Option<bool>,
    pub href: Option<String>,
}

#[derive(Debug)]
pub struct ChangeList<'a> {
    pub admin: &'a ModelAdmin,
    pub query: ChangeListQuery,
    pub rows: Vec<Record>,
    pub total: usize,
    pub matched: usize,
    pub page: usize,
    pub pages: usize,
    pub headers: Vec<Header>,
    pub filters: Vec<FilterSpec>,
}

impl ChangeList<'_> {
    pub fn page_href(&self, page: usize) -> String {
        self.query.with_page(page).to_query_string()
    }
}

pub fn build<'a>(
    admin: &'a ModelAdmin,
    records: Vec<Record>,
    query: ChangeListQuery,
) -> ChangeList<'a> {
    let total = records.len();
    let filters = admin.list_filter.iter().map(|f| filter_spec(f, &records, &query)).collect();

    let mut matched: Vec<Record> = records
        .into_iter()
        .filter(|r| {
            admin.list_filter.iter().all(|f| match query.filters.get(f.parameter()) {
                Some(selected) => matches_filter(f, r, selected),
                None => true,
            })
        })
        .filter(|r| matches_search(&admin.search_fields, r, &query.search))
        .collect();

    let ordering = effective_ordering(admin, query.order.as_deref());
    sort_records(&mut matched, &ordering);

    let per_page = admin.list_per_page.max(1);
    let pages = matched.len().div_ceil(per_page).max(1);
    let page = query.page.clamp(1, pages);
    let count = matched.len();
    let rows = matched.into_iter().skip((page - 1) * per_page).take(per_page).collect();

    let headers = headers(admin, &query, &ordering);

    ChangeList { admin, query, rows, total, matched: count, page, pages, headers, filters }
}

pub fn matches_filter(filter: &ListFilter, record: &Record, selected: &str) -> bool {
    match filter {
        ListFilter::Field { field, .. } | ListFilter::Choices { field, .. } => {
            record.value(field).as_param().as_deref() == Some(selected)
        }
        ListFilter::Bands { field, bands, .. } => match bands.iter().find(|b| b.value == selected) {
            Some(band) => record.int(field).is_some_and(|n| band.contains(n)),
            None => true,
        },
    }
}

/// Every whitespace-separated term must appear in at least one search field.
pub fn matches_search(fields: &[&'static str], record: &Record, search: &str) -> bool {
    if fields.is_empty() {
        return true;
    }
    search.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        fields.iter().any(|f| record.display(f).to_lowercase().contains(&term))
    })
}

/// Requested column first, then the admin's default ordering, then id.
pub fn effective_ordering(admin: &ModelAdmin, requested: Option<&str>) -> Vec<OrderBy> {
    let mut ordering = Vec::new();

    if let Some(requested) = requested {
        let (descending, name) = match requested.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, requested),
        };
        let field = admin
            .list_display
            .iter()
            .find(|c| c.name() == name)
            .and_then(|c| c.order_field());
        if let Some(field) = field {
            ordering.push(OrderBy { field, descending });
        }
    }

    for order in &admin.ordering {
        if !ordering.iter().any(|o| o.field == order.field) {
            ordering.push(*order);
        }
    }
    if !ordering.iter().any(|o| o.field == "id") {
        ordering.push(OrderBy::asc("id"));
    }
    ordering
}

pub fn sort_records(records: &mut [Record], ordering: &[OrderBy]) {
    records.sort_by(|a, b| {
        ordering
            .iter()
            .map(|o| {
                let ord = a.value(o.field).compare(b.value(o.field));
                if o.descending { ord.reverse() } else { ord }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn headers(admin: &ModelAdmin, query: &ChangeListQuery, ordering: &[OrderBy]) -> Vec<Header> {
    let primary = ordering.first();
    admin
        .list_display
        .iter()
        .map(|column| {
            let sorted = match (column.order_field(), primary) {
                (Some(field), Some(primary)) if primary.field == field => Some(primary.descending),
                _ => None,
            };
            let href = column.order_field().map(|_| {
                let next = match sorted {
                    Some(false) => format!("-{}", column.name()),
                    _ => column.name().to_string(),
                };
                query.with_order(next).to_query_string()
            });
            Header { text: column.header(admin.entity), sorted, href }
        })
        .collect()
}

fn filter_spec(filter: &ListFilter, records: &[Record], query: &ChangeListQuery) -> FilterSpec {
    let parameter = filter.parameter();
    let current = query.filters.get(parameter).map(String::as_str);

    let options: Vec<(String, String)> = match filter {
        ListFilter::Field { field, .. } => {
            let mut distinct: BTreeMap<String, String> = BTreeMap::new();
            for record in records {
                if let Some(value) = record.value(field).as_param() {
                    distinct.entry(value).or_insert_with(|| record.display(field).to_string());
                }
            }
            distinct.into_iter().collect()
        }
        ListFilter::Choices { choices, .. } => {
            choices.iter().map(|(v, l)| (v.to_string(), l.to_string())).collect()
        }
        ListFilter::Bands { bands, .. } => {
            bands.iter().map(|b| (b.value.to_string(), b.label.to_string())).collect()
        }
    };

    let mut choices = vec![FilterChoice {
        label: "All".to_string(),
        selected: current.is_none(),
        href: query.with_filter(parameter, None).to_query_string(),
    }];
    choices.extend(options.into_iter().map(|(value, label)| FilterChoice {
        selected: current == Some(value.as_str()),
        href: query.with_filter(parameter, Some(&value)).to_query_string(),
        label,
    }));

    FilterSpec { title: filter.title(), choices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::movie::movie_admin;

    fn movie(id: i32, name: &str, rating: i32, currency: &str) -> Record {
        Record::new(id, format!("{name} - {rating}%"))
            .with("name", name.to_string())
            .with("rating", rating)
            .with("budget", 1_000_000)
            .with("currency", currency.to_string())
            .with("director", None::<i32>)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn names(cl: &ChangeList<'_>) -> Vec<String> {
        cl.rows.iter().map(|r| r.display("name").to_string()).collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            movie(1, "Alien", 85, "USD"),
            movie(2, "Brazil", 70, "EUR"),
            movie(3, "Cube", 39, "RUB"),
            movie(4, "Aliens", 85, "RUB"),
            movie(5, "Dune", 40, "USD"),
        ]
    }

    #[test]
    fn default_ordering_is_rating_desc_then_name() {
        let admin = movie_admin();
        let cl = build(&admin, sample(), ChangeListQuery::from_pairs(&admin, &[]));
        assert_eq!(names(&cl), ["Alien", "Aliens", "Brazil", "Dune", "Cube"]);
        assert_eq!(cl.total, 5);
    }

    #[test]
    fn band_filter_narrows_to_half_open_range() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("rating", "<40")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Cube"]);

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("rating", "from 40 to 59")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Dune"]);

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("rating", ">=80")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Alien", "Aliens"]);
    }

    #[test]
    fn unknown_band_leaves_rows_unfiltered() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("rating", "bogus")]));
        assert_eq!(build(&admin, sample(), query).matched, 5);
    }

    #[test]
    fn field_filters_combine() {
        let admin = movie_admin();
        let query =
            ChangeListQuery::from_pairs(&admin, &pairs(&[("currency", "RUB"), ("rating", ">=80")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Aliens"]);
    }

    #[test]
    fn search_matches_name_or_rating_per_term() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("q", "alien")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Alien", "Aliens"]);

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("q", "70")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Brazil"]);

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("q", "ALIENS 85")]));
        assert_eq!(names(&build(&admin, sample(), query)), ["Aliens"]);
    }

    #[test]
    fn status_column_sorts_by_rating() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("o", "rating_status")]));
        let cl = build(&admin, sample(), query);
        assert_eq!(names(&cl), ["Cube", "Dune", "Brazil", "Alien", "Aliens"]);
        let status = cl.headers.iter().find(|h| h.text == "STATUS").unwrap();
        assert_eq!(status.sorted, Some(false));
        assert_eq!(status.href.as_deref(), Some("?o=-rating_status"));
    }

    #[test]
    fn pages_hold_ten_rows() {
        let admin = movie_admin();
        let records: Vec<_> = (1..=23).map(|i| movie(i, &format!("M{i:02}"), 50, "RUB")).collect();

        let first = build(&admin, records.clone(), ChangeListQuery::from_pairs(&admin, &[]));
        assert_eq!((first.rows.len(), first.pages, first.page), (10, 3, 1));

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("p", "3")]));
        let last = build(&admin, records.clone(), query);
        assert_eq!(last.rows.len(), 3);

        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("p", "99")]));
        assert_eq!(build(&admin, records, query).page, 3);
    }

    #[test]
    fn filter_choices_start_with_all_and_mark_selection() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("currency", "EUR")]));
        let cl = build(&admin, sample(), query);

        let currency = cl.filters.iter().find(|f| f.title == "currency").unwrap();
        let labels: Vec<_> = currency.choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["All", "Euro", "Dollar", "Rubbles"]);
        assert!(currency.choices[1].selected);
        assert_eq!(currency.choices[0].href, "?");

        let names = cl.filters.iter().find(|f| f.title == "name").unwrap();
        assert_eq!(names.choices.len(), 6);
    }

    #[test]
    fn undeclared_parameters_are_ignored() {
        let admin = movie_admin();
        let query = ChangeListQuery::from_pairs(&admin, &pairs(&[("year", "1999"), ("q", " ")]));
        assert!(query.filters.is_empty());
        assert!(query.search.is_empty());
    }
}
