use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{actor, director, movie},
    models::{ActorDetail, Aggregates, DirectorDetail, MovieDetail, MovieRow},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

pub fn movies_page(movies: &[MovieRow], agg: &Aggregates, total: usize) -> String {
    site_page(
        "Movies",
        html! {
            div class="flex items-end justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                p class="text-sm text-gray-500" { "Total: " span id="total" { (total) } }
            }

            dl class="mt-6 grid grid-cols-3 gap-4" {
                (stat("Average budget", agg.budget_avg.map(|avg| format!("{avg:.2}"))))
                (stat("Max rating", agg.rating_max.map(|r| r.to_string())))
                (stat("Min rating", agg.rating_min.map(|r| r.to_string())))
            }

            @if movies.is_empty() {
                div class="mt-10 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "No movies yet." }
                }
            } @else {
                ul class="mt-8 space-y-4" {
                    @for row in movies {
                        (movie_card(row))
                    }
                }
            }
        },
    )
}

fn stat(label: &str, value: Option<String>) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-4" {
            dt class="text-xs uppercase text-gray-500" { (label) }
            dd class="mt-1 text-xl font-semibold text-gray-900" { (value.unwrap_or_else(|| "—".to_string())) }
        }
    }
}

fn movie_card(row: &MovieRow) -> Markup {
    let m = &row.movie;
    let a = &row.annotations;
    html! {
        li class="bg-white shadow rounded-lg p-6" {
            div class="flex items-start justify-between gap-4" {
                h2 class="text-xl font-semibold text-gray-900" {
                    a class="hover:text-blue-700" href=(m.url()) { (m.name) }
                    @if let Some(year) = m.year {
                        span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                    }
                }
                span class="text-lg font-semibold text-blue-700" { (m.rating) "%" }
            }
            p class="mt-2 text-sm text-gray-600" {
                "Budget: " (m.budget) " " (m.currency.code())
                " · budget + 100: " (a.new_budget)
                @if let Some(rating_year) = a.rating_year {
                    " · rating + year: " (rating_year)
                }
            }
            p class="mt-1 text-xs text-gray-400" {
                (a.str_field) " " (a.int_field) " " (a.new_bool.to_string()) " " (a.false_bool.to_string())
            }
        }
    }
}

pub fn movie_page(detail: &MovieDetail) -> String {
    let m = &detail.movie;
    site_page(
        &m.name,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { (m.name) }
                dl class="mt-6 grid grid-cols-2 gap-x-6 gap-y-3 text-sm" {
                    dt class="text-gray-500" { "Rating" } dd { (m.rating) "%" }
                    dt class="text-gray-500" { "Year" } dd { (m.year.map(|y| y.to_string()).unwrap_or_else(|| "—".to_string())) }
                    dt class="text-gray-500" { "Budget" } dd { (m.budget) " " (m.currency.display_name()) }
                    dt class="text-gray-500" { "Director" }
                    dd {
                        @match &detail.director {
                            Some(d) => a class="text-blue-600 hover:text-blue-800" href=(d.url()) { (d.label()) },
                            None => { "—" }
                        }
                    }
                }
                h2 class="mt-8 text-lg font-semibold text-gray-900" { "Cast" }
                @if detail.actors.is_empty() {
                    p class="mt-2 text-sm text-gray-500" { "No actors listed." }
                } @else {
                    ul class="mt-2 space-y-1" {
                        @for actor in &detail.actors {
                            li { a class="text-blue-600 hover:text-blue-800" href=(actor.url()) { (actor.label()) } }
                        }
                    }
                }
            }
        },
    )
}

pub fn directors_page(directors: &[director::Model]) -> String {
    site_page(
        "Directors",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Directors" }
            ul class="mt-8 bg-white shadow rounded-lg divide-y" {
                @for d in directors {
                    li class="px-6 py-3" {
                        a class="text-blue-600 hover:text-blue-800" href=(d.url()) { (d.label()) }
                    }
                }
            }
        },
    )
}

pub fn director_page(detail: &DirectorDetail) -> String {
    let d = &detail.director;
    site_page(
        &d.label(),
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { (d.label()) }
                p class="mt-2 text-gray-600" { a href=(format!("mailto:{}", d.email)) { (d.email) } }
                (movie_links(&detail.movies))
            }
        },
    )
}

pub fn actors_page(actors: &[actor::Model]) -> String {
    site_page(
        "Actors",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Actors" }
            ul class="mt-8 bg-white shadow rounded-lg divide-y" {
                @for a in actors {
                    li class="px-6 py-3" {
                        a class="text-blue-600 hover:text-blue-800" href=(a.url()) { (a.label()) }
                    }
                }
            }
        },
    )
}

pub fn actor_page(detail: &ActorDetail) -> String {
    let a = &detail.actor;
    site_page(
        &a.label(),
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { (a.label()) }
                @if let Some(room) = &detail.dressing_room {
                    p class="mt-2 text-gray-600" { "Dressing room " (room.label()) }
                }
                (movie_links(&detail.movies))
            }
        },
    )
}

fn movie_links(movies: &[movie::Model]) -> Markup {
    html! {
        h2 class="mt-8 text-lg font-semibold text-gray-900" { "Movies" }
        @if movies.is_empty() {
            p class="mt-2 text-sm text-gray-500" { "None yet." }
        } @else {
            ul class="mt-2 space-y-1" {
                @for m in movies {
                    li { a class="text-blue-600 hover:text-blue-800" href=(m.url()) { (m.label()) } }
                }
            }
        }
    }
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Not found" }
                        p class="mt-4 text-gray-700" { "The requested page does not exist." }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn site_page(title: &str, body: Markup) -> String {
    page(
        title,
        html! {
            div class="min-h-screen bg-gray-50" {
                nav class="bg-white shadow" {
                    div class="max-w-4xl mx-auto px-6 py-4 flex gap-6 text-sm font-medium" {
                        a class="text-gray-700 hover:text-blue-700" href="/" { "Movies" }
                        a class="text-gray-700 hover:text-blue-700" href="/directors" { "Directors" }
                        a class="text-gray-700 hover:text-blue-700" href="/actors" { "Actors" }
                        a class="ml-auto text-gray-400 hover:text-gray-700" href="/admin/" { "Admin" }
                    }
                }
                div class="max-w-4xl mx-auto px-6 py-10" { (body) }
            }
        },
    )
}

pub fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}
