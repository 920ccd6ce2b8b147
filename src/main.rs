use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::race_search::RaceSearchClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub race_search: RaceSearchClient,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runfree_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await;
    db::run_migrations(&db)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let race_search =
        RaceSearchClient::new(&config).expect("Failed to build race search HTTP client");

    let rate_limiter = RateLimitState::default();
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter,
        race_search,
    };

    let app = app(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    // Client IP is needed by the auth rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins: Vec<axum::http::HeaderValue> = Vec::new();
    match config.frontend_url.parse() {
        Ok(origin) => origins.push(origin),
        Err(_) => tracing::warn!(url = %config.frontend_url, "FRONTEND_URL is not a valid origin"),
    }
    // Extra origins, e.g. testing the frontend from another device on the LAN
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/questions", get(handlers::runs::list_questions))
        // Runs
        .route(
            "/api/runs",
            post(handlers::runs::create_run).get(handlers::runs::list_runs),
        )
        .route("/api/runs/latest", get(handlers::runs::latest_run))
        .route("/api/runs/:id", get(handlers::runs::get_run))
        .route("/api/runs/:id/score", get(handlers::runs::get_run_score))
        // Stats
        .route("/api/stats/mood", get(handlers::stats::mood_trend))
        .route("/api/stats/runs", get(handlers::stats::run_collection))
        .route("/api/stats/locations", get(handlers::stats::location_history))
        // Goals
        .route("/api/goals/plan", get(handlers::goals::plan_goal))
        .route(
            "/api/goals",
            post(handlers::goals::create_goal).get(handlers::goals::list_goals),
        )
        .route("/api/goals/latest", get(handlers::goals::latest_goal))
        .route("/api/goals/:id", get(handlers::goals::get_goal))
        .route("/api/goals/:id/complete", post(handlers::goals::complete_goal))
        .route(
            "/api/subgoals/outstanding",
            get(handlers::goals::outstanding_subgoals),
        )
        .route("/api/subgoals/:id", put(handlers::goals::schedule_subgoal))
        .route(
            "/api/subgoals/:id/complete",
            post(handlers::goals::complete_subgoal),
        )
        .route("/api/races/search", get(handlers::races::search_races))
        // Routes
        .route(
            "/api/routes",
            post(handlers::routes::create_route).get(handlers::routes::list_routes),
        )
        .route("/api/routes/:id", get(handlers::routes::get_route))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let config = Config::for_tests();
        let state = AppState {
            db: db::test_pool().await,
            race_search: RaceSearchClient::new(&config).unwrap(),
            config: Arc::new(config),
            rate_limiter: RateLimitState::default(),
        };
        app(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let mut req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "long-enough-password",
                "password_check": "long-enough-password",
                "first_name": "Pat",
                "last_name": "Runner",
                "zipcode": "94110",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    fn run_body(date: &str, during: i32) -> Value {
        json!({
            "date_run": date,
            "approx_dist": 3.1,
            "approx_time": 30,
            "ratings": {
                "before_mood": 5,
                "during_mood": during,
                "after_mood": 6,
                "energy": 7,
                "feeling": "strong",
                "location": "park",
                "terrain": "hills",
                "route_type": "out_and_back",
                "thoughts": null,
            },
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "runfree-api");
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = test_app().await;
        register(&app, "pat@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "pat@example.com", "password": "long-enough-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, me) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "pat@example.com");
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_and_duplicate_email() {
        let app = test_app().await;
        register(&app, "pat@example.com").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "pat@example.com", "password": "not-the-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "pat@example.com",
                "password": "long-enough-password",
                "password_check": "long-enough-password",
                "first_name": "Pat",
                "last_name": "Again",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/api/runs", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_object());
    }

    #[tokio::test]
    async fn test_log_run_and_score() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, run) = send(
            &app,
            Method::POST,
            "/api/runs",
            Some(&token),
            Some(run_body("2024-05-01", 8)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", run);
        assert_eq!(run["ratings"].as_array().unwrap().len(), 9);

        let uri = format!("/api/runs/{}/score", run["id"].as_str().unwrap());
        let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let score = body["score"].as_f64().unwrap();
        assert!((score - 7.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_rejected() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/runs",
            Some(&token),
            Some(run_body("2024-05-01", 11)),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, runs) = send(&app, Method::GET, "/api/runs", Some(&token), None).await;
        assert_eq!(runs.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_mood_trend_with_fewer_runs_than_requested() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        for (date, during) in [("2024-05-01", 4), ("2024-05-03", 6), ("2024-05-05", 9)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/runs",
                Some(&token),
                Some(run_body(date, during)),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/stats/mood?moment=during&count=5",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0]["date_run"], "2024-05-05");
        assert_eq!(points[0]["rating"], 9);

        let (_, locations) =
            send(&app, Method::GET, "/api/stats/locations", Some(&token), None).await;
        assert_eq!(locations[0]["label"], "Park");
    }

    #[tokio::test]
    async fn test_runs_are_private_to_their_owner() {
        let app = test_app().await;
        let owner = register(&app, "owner@example.com").await;
        let other = register(&app, "other@example.com").await;

        let (_, run) = send(
            &app,
            Method::POST,
            "/api/runs",
            Some(&owner),
            Some(run_body("2024-05-01", 8)),
        )
        .await;

        let uri = format!("/api/runs/{}", run["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_goal_with_subgoals() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, goal) = send(
            &app,
            Method::POST,
            "/api/goals",
            Some(&token),
            Some(json!({
                "goal_kind": "run_5k",
                "fitness_level": 1,
                "run_length_history": 1,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", goal);
        assert_eq!(goal["goal_kind"], "run_5k");
        assert!(!goal["subgoals"].as_array().unwrap().is_empty());

        let (status, outstanding) = send(
            &app,
            Method::GET,
            "/api/subgoals/outstanding",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outstanding, goal["subgoals"]);
    }

    #[tokio::test]
    async fn test_goal_event_date_must_fall_in_window() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;
        let today = chrono::Utc::now().date_naive();

        let goal = |event_date: chrono::NaiveDate| {
            json!({
                "goal_kind": "run_half",
                "fitness_level": 1,
                "run_length_history": 1,
                "race_url": "http://example.com/bay-half",
                "event_date": event_date.to_string(),
            })
        };

        // run_half at levels 1/1 searches 14 to 26 weeks out
        let too_soon = today + chrono::Duration::weeks(2);
        let (status, _) =
            send(&app, Method::POST, "/api/goals", Some(&token), Some(goal(too_soon))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let in_window = today + chrono::Duration::weeks(20);
        let (status, created) =
            send(&app, Method::POST, "/api/goals", Some(&token), Some(goal(in_window))).await;
        assert_eq!(status, StatusCode::OK, "{}", created);
        assert_eq!(created["event_date"], in_window.to_string());

        let (_, goals) = send(&app, Method::GET, "/api/goals", Some(&token), None).await;
        assert_eq!(goals.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_goal_kind_is_bad_request() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/goals",
            Some(&token),
            Some(json!({
                "goal_kind": "ultramarathon",
                "fitness_level": 2,
                "run_length_history": 2,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/goals/plan?goal_kind=ultramarathon&fitness_level=1&run_length_history=1",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plan_preview() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, plan) = send(
            &app,
            Method::GET,
            "/api/goals/plan?goal_kind=run_half&fitness_level=1&run_length_history=1",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["min_weeks"], 14);
        assert_eq!(plan["max_weeks"], 26);
    }

    #[tokio::test]
    async fn test_training_goal_cannot_search_races() {
        let app = test_app().await;
        let token = register(&app, "pat@example.com").await;

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/races/search?goal_kind=run_2_miles&fitness_level=1&run_length_history=1",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
