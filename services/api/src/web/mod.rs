pub mod auth;
pub mod middleware;
pub mod search;
pub mod shelf;
pub mod state;

pub use middleware::require_auth;

use axum::http::StatusCode;
use estante_core::ports::PortError;
use utoipa::OpenApi;

/// Master definition for the OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        search::search_handler,
        shelf::list_shelf_handler,
        shelf::add_to_shelf_handler,
        shelf::update_shelf_handler,
        shelf::remove_from_shelf_handler,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        search::SearchResponse,
        search::BookDraftView,
        shelf::AddToShelfRequest,
        shelf::UpdateShelfRequest,
        shelf::ShelfEntryView,
        shelf::BookView,
    )),
    tags(
        (name = "Estante API", description = "Personal bookshelf: account, search, and shelf endpoints.")
    )
)]
pub struct ApiDoc;

/// Maps a core port error onto the HTTP status and message a handler
/// should return. Handlers log before calling this; the mapping itself
/// stays mechanical.
pub fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
        PortError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Conflict(_) | PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}
