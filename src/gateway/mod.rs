//! HTTP gateway: router assembly and server startup.

pub mod handlers;
pub mod middleware;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use state::AppState;
pub use types::ApiResponse;

/// Build the application router.
///
/// User routes resolve a profile identity from the `profile_id` header;
/// admin routes are gated on the `admin: 1` header instead and carry no
/// profile identity.
pub fn router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/contracts/{id}", get(handlers::get_contract))
        .route("/contracts", get(handlers::list_contracts))
        .route("/jobs/unpaid", get(handlers::list_unpaid_jobs))
        .route("/jobs/{job_id}/pay", post(handlers::pay_job))
        .route("/balances/deposit/{user_id}", post(handlers::deposit))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::profile_auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/best-profession", post(handlers::best_profession))
        .route("/best-clients", post(handlers::best_clients))
        .layer(from_fn(middleware::admin_auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(user_routes)
        .nest("/admin", admin_routes)
        .with_state(state)
}

/// Start the HTTP gateway server. Never returns on success.
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📄 Contracts API: /contracts, /jobs/unpaid (profile_id header)");
    println!("💰 Payments API:  /jobs/{{job_id}}/pay, /balances/deposit/{{user_id}}");
    println!("🔒 Admin API:     /admin/* (admin header)");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
