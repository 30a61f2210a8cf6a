//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Generation
        crate::routes::generate::generate_diagram,
        // Diagrams
        crate::routes::diagrams::list_diagrams,
        crate::routes::diagrams::create_diagram,
        crate::routes::diagrams::get_diagram,
        crate::routes::diagrams::delete_diagram,
        crate::routes::diagrams::update_sharing,
        // Sharing
        crate::routes::shared::get_shared_diagram,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::DiagramStyle,
        crate::models::DiagramRecord,
        crate::models::NewDiagram,
        crate::models::SharingUpdate,
        crate::models::SharedDiagramView,
        crate::models::GenerateDiagramRequest,
        crate::models::GenerateDiagramResponse,
        crate::routes::diagrams::DiagramListResponse,
        crate::routes::diagrams::ShareResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Generation", description = "Natural-language to Mermaid diagram generation"),
        (name = "Diagrams", description = "Diagram history and sharing"),
        (name = "Sharing", description = "Public share links"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Diagram Generation API",
        description = "REST API that turns architecture descriptions into Mermaid diagrams",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep the documented version in step with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new)
            .add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
    }
}
