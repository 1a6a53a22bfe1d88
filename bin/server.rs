// NIFTY Fundamental Valuation Screener - Web Server
// REST API over the snapshot cache with Axum

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use nifty_valuation::{
    get_all_snapshots, run_screener, run_screener_for_index, NseIndex, ScoredStock,
    ScoringConfig, ScreenerReport, Valuation, ValuationCounts,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<ScoringConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Stats response: KPI counts + distribution for the dashboard header
#[derive(Serialize)]
struct StatsResponse {
    total_stocks: usize,
    counts: ValuationCounts,
    distribution: Vec<DistributionSlice>,
}

#[derive(Serialize)]
struct DistributionSlice {
    valuation: Valuation,
    count: usize,
    percentage: f64,
}

fn empty_stats() -> StatsResponse {
    StatsResponse {
        total_stocks: 0,
        counts: ValuationCounts::default(),
        distribution: vec![],
    }
}

fn load_screener(state: &AppState, index: Option<NseIndex>) -> anyhow::Result<ScreenerReport> {
    let conn = state.db.lock().unwrap();
    let records = get_all_snapshots(&conn)?;

    Ok(match index {
        Some(index) => run_screener_for_index(records, index, &state.config),
        None => run_screener(records, &state.config),
    })
}

/// Query string for the screener endpoints, e.g. ?index=NIFTY%2050
#[derive(Deserialize)]
struct ScreenerQuery {
    index: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/screener?index=<name> - Ranked screener table, optionally scoped
/// to one index
async fn get_screener(
    State(state): State<AppState>,
    Query(query): Query<ScreenerQuery>,
) -> impl IntoResponse {
    let index = match query.index.as_deref() {
        Some(name) => match NseIndex::from_name(name) {
            Some(index) => Some(index),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<Vec<ScoredStock>> {
                        success: false,
                        data: vec![],
                        error: Some(format!("Unknown index: {}", name)),
                    }),
                )
                    .into_response()
            }
        },
        None => None,
    };

    match load_screener(&state, index) {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report.rows))).into_response(),
        Err(e) => {
            eprintln!("Error building screener: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<ScoredStock>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/screener/:valuation - Rows in one valuation bucket
async fn filter_screener(
    State(state): State<AppState>,
    Path(valuation): Path<String>,
) -> impl IntoResponse {
    match load_screener(&state, None) {
        Ok(report) => {
            let filtered: Vec<ScoredStock> = match Valuation::from_name(&valuation) {
                Some(v) => report.filter(v).into_iter().cloned().collect(),
                None if valuation == "all" => report.rows,
                None => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ApiResponse::ok(Vec::<ScoredStock>::new())),
                    )
                        .into_response()
                }
            };

            (StatusCode::OK, Json(ApiResponse::ok(filtered))).into_response()
        }
        Err(e) => {
            eprintln!("Error filtering screener: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<ScoredStock>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/stock/:symbol - One scored stock
async fn get_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    // NSE symbols contain '&' and '-' and arrive URL-encoded
    let decoded_symbol = urlencoding::decode(&symbol)
        .unwrap_or_else(|_| symbol.clone().into())
        .into_owned();

    match load_screener(&state, None) {
        Ok(report) => match report.find(&decoded_symbol) {
            Some(stock) => (StatusCode::OK, Json(ApiResponse::ok(stock.clone()))).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Option<ScoredStock>> {
                    success: false,
                    data: None,
                    error: Some(format!("No snapshot for symbol: {}", decoded_symbol)),
                }),
            )
                .into_response(),
        },
        Err(e) => {
            eprintln!("Error getting stock {}: {}", decoded_symbol, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Option::<ScoredStock>::None)),
            )
                .into_response()
        }
    }
}

/// GET /api/stats - KPI counts + distribution
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    match load_screener(&state, None) {
        Ok(report) => {
            let counts = report.counts();
            let distribution = report
                .distribution()
                .into_iter()
                .map(|(valuation, count, percentage)| DistributionSlice {
                    valuation,
                    count,
                    percentage,
                })
                .collect();

            let stats = StatsResponse {
                total_stocks: report.len(),
                counts,
                distribution,
            };

            (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
        }
        Err(e) => {
            eprintln!("Error getting stats: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(empty_stats())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 NIFTY Valuation Screener - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Open database
    let db_path_arg = std::env::args().nth(1).unwrap_or_else(|| "fundamentals.db".to_string());
    let db_path = std::path::Path::new(&db_path_arg);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run --release import <fundamentals.csv>");
        eprintln!("   to load a snapshot first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        config: Arc::new(ScoringConfig::default()),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/screener", get(get_screener))
        .route("/screener/:valuation", get(filter_screener))
        .route("/stock/:symbol", get(get_stock))
        .route("/stats", get(get_stats))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/screener");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
