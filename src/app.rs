use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{AppState, admin, routes};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::movies))
        .route("/movie/{slug}", get(routes::movie))
        .route("/directors", get(routes::directors))
        .route("/actors", get(routes::actors))
        .route("/director/{id}", get(routes::director))
        .route("/actors/{id}", get(routes::actor))
        .merge(admin::router(state.clone()))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use axum_extra::extract::cookie::Key;
    use sea_orm::{DatabaseConnection, EntityTrait};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        catalog::Catalog,
        config::Config,
        db::test_db,
        entities::movie::{self, Currency},
        fixtures,
    };

    fn state(db: DatabaseConnection, admin_password: &str) -> AppState {
        AppState {
            config: Arc::new(Config {
                addr: "127.0.0.1:0".parse().unwrap(),
                database_url: "sqlite::memory:".into(),
                admin_password: admin_password.into(),
                admin_session_hours: 12,
            }),
            catalog: Catalog::new(db),
            admin: Arc::new(admin::registry().unwrap()),
            cookie_key: Key::generate(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get_page(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_with_cookie(app: &Router, uri: &str, cookie: String) -> String {
        let request = Request::get(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap();
        let response = send(app, request).await;
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn cookie_named(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{name}=")))
            .map(str::to_string)
    }

    #[tokio::test]
    async fn unknown_records_are_not_found() {
        let app = build_router(state(test_db().await, ""));

        for uri in ["/movie/missing", "/director/42", "/director/abc", "/actors/42", "/nowhere"] {
            let (status, body) = get_page(&app, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.contains("Not found"));
        }
        assert_eq!(get_page(&app, "/admin/user/").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get_page(&app, "/admin/movie/abc/change/").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn public_pages_render_records() {
        let db = test_db().await;
        let director = fixtures::director(&db, "Michael", "Mann").await;
        let heat = fixtures::movie(&db, "Heat", 83, Some(1995), Some(director.id)).await;
        fixtures::movie(&db, "Thief", 70, Some(1981), Some(director.id)).await;
        let actor = fixtures::actor(&db, "Al", "Pacino", None).await;
        fixtures::cast(&db, heat.id, actor.id).await;
        let app = build_router(state(db, ""));

        let (status, body) = get_page(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<span id="total">2</span>"#));
        assert!(body.find("Thief").unwrap() < body.find("Heat").unwrap());

        let (status, body) = get_page(&app, "/movie/heat").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Actor Al Pacino"));
        assert!(body.contains(r#"href="/director/1""#));

        let (_, body) = get_page(&app, &format!("/director/{}", director.id)).await;
        assert!(body.contains("Thief - 70%"));
        assert_eq!(get_page(&app, "/directors").await.0, StatusCode::OK);
        assert_eq!(get_page(&app, &format!("/actors/{}", actor.id)).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn euro_action_updates_selection_and_flashes_count() {
        let db = test_db().await;
        let a = fixtures::movie(&db, "Alien", 85, None, None).await;
        let b = fixtures::movie(&db, "Brazil", 70, None, None).await;
        let c = fixtures::movie(&db, "Cube", 39, None, None).await;
        let app = build_router(state(db.clone(), ""));

        let body = format!("action=set_euro&_selected_action={}&_selected_action={}", a.id, b.id);
        let response = send(&app, form_post("/admin/movie/?o=name", body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/movie/?o=name");
        let flash = cookie_named(&response, "admin_flash").unwrap();

        let body = get_with_cookie(&app, "/admin/movie/", flash).await;
        assert!(body.contains("2 notes was updated"));
        assert!(body.contains(r#"data-level="error""#));

        let currency = |id| {
            let db = db.clone();
            async move { movie::Entity::find_by_id(id).one(&db).await.unwrap().unwrap().currency }
        };
        assert_eq!(currency(a.id).await, Currency::Eur);
        assert_eq!(currency(b.id).await, Currency::Eur);
        assert_eq!(currency(c.id).await, Currency::Rub);
    }

    #[tokio::test]
    async fn rejected_inline_save_flashes_one_summary() {
        let db = test_db().await;
        let mut body = String::from("_save=1&form-TOTAL_FORMS=10");
        for i in 0..10 {
            let name = format!("Брат и сестра, серия {i}");
            let m = fixtures::movie(&db, &name, 50, None, None).await;
            body.push_str(&format!(
                "&form-{i}-id={}&form-{i}-rating=500&form-{i}-budget=0&form-{i}-director=",
                m.id
            ));
        }
        let app = build_router(state(db.clone(), ""));

        let response = send(&app, form_post("/admin/movie/", body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let flash = cookie_named(&response, "admin_flash").unwrap();
        assert!(flash.len() <= 4096);

        let page = get_with_cookie(&app, "/admin/movie/", flash).await;
        assert_eq!(page.matches(r#"data-level="error""#).count(), 1);
        assert!(page.contains("Nothing was saved, 20 errors."));
        assert!(page.contains("(and 19 more)"));

        let ratings: Vec<i32> =
            movie::Entity::find().all(&db).await.unwrap().iter().map(|m| m.rating).collect();
        assert!(ratings.iter().all(|r| *r == 50));
    }

    #[tokio::test]
    async fn add_form_rejects_bad_rating_and_accepts_good_one() {
        let db = test_db().await;
        let app = build_router(state(db.clone(), ""));

        let bad = "name=Heat&rating=150&currency=RUB&slug=";
        let response = send(&app, form_post("/admin/movie/add/", bad.into())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("Ensure this value is less than or equal to 100."));

        let good = "name=Heat&rating=83&currency=RUB&slug=";
        let response = send(&app, form_post("/admin/movie/add/", good.into())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/movie/");

        let stored = movie::Entity::find().all(&db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!((stored[0].slug.as_str(), stored[0].budget), ("heat", movie::DEFAULT_BUDGET));
    }

    #[tokio::test]
    async fn admin_requires_login_when_password_is_set() {
        let app = build_router(state(test_db().await, "hunter2"));

        let response = send(&app, Request::get("/admin/movie/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/login?next=%2Fadmin%2Fmovie%2F");

        let login = |password: &str| {
            form_post("/admin/login", format!("password={password}&next=/admin/movie/"))
        };
        let wrong = send(&app, login("nope")).await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let right = send(&app, login("hunter2")).await;
        assert_eq!(right.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&right), "/admin/movie/");
        let session = cookie_named(&right, "admin_session").unwrap();

        let request = Request::get("/admin/movie/")
            .header(header::COOKIE, session)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::OK);
    }
}
