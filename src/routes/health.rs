// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and readiness endpoints for load balancers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes() -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({
                "status": "healthy",
                "service": "huddle",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        async fn ready_handler() -> Json<Value> {
            Json(json!({
                "status": "ready",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
    }
}
