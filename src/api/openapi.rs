use super::handlers::{health, pages};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(description = "Request gate and hosted sign-up front"),
    paths(health::health, pages::sign_up, pages::sign_in),
    components(schemas(health::Health)),
    tags(
        (name = "health", description = "Service health"),
        (name = "pages", description = "Hosted identity widget pages")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
