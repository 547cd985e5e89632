use axum::{
    Router,
    routing::{delete, get, post},
};

use campus_core::health::healthz;
use campus_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    attendance::{list_my_attendance, list_session_attendance},
    health::readyz,
    session_code::{issue_session_code, revoke_session_code},
    verification::{issue_otp, scan, verify_otp},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Presenter
        .route("/sessions/{session_id}/codes", post(issue_session_code))
        .route(
            "/sessions/{session_id}/codes/{code_id}",
            delete(revoke_session_code),
        )
        .route(
            "/sessions/{session_id}/attendance",
            get(list_session_attendance),
        )
        // Claimant
        .route("/attendance/scan", post(scan))
        .route("/attendance/otp", post(issue_otp))
        .route("/attendance/otp/verify", post(verify_otp))
        .route("/attendance/@me", get(list_my_attendance))
        .with_state(state)
        // Outermost first on the way in: assign the id, then trace with it, then echo it back.
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
