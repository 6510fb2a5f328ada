//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assignments, health, resources};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventrack API",
        version = "1.0.0",
        description = "IT equipment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Resources
        resources::create_resource,
        resources::get_resource,
        resources::list_resources,
        resources::search_resources,
        resources::update_resource,
        resources::delete_resource,
        // Assignments
        assignments::create_assignment,
        assignments::get_assignment,
        assignments::list_assignments,
        assignments::search_assignments,
        assignments::update_assignment,
        assignments::delete_assignment,
        assignments::return_resource,
    ),
    components(
        schemas(
            // Resources
            crate::models::resource::Resource,
            crate::models::resource::CreateResource,
            crate::models::resource::UpdateResource,
            crate::models::resource::ResourceSearch,
            crate::models::enums::ResourceType,
            crate::models::enums::ResourceStatus,
            crate::models::enums::SortDirection,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::CreateAssignment,
            crate::models::assignment::UpdateAssignment,
            crate::models::enums::AssignmentStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "resources", description = "Equipment management"),
        (name = "assignments", description = "Hand-out and return of equipment")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
