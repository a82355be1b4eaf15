//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image Upscaler API",
        version = "0.1.0",
        description = "Upload a PNG, JPEG or WebP image, get it back enlarged (Lanczos resampling plus unsharp mask). Stored files expire after the retention window."
    ),
    paths(
        handlers::upload::upload_image,
        handlers::download::download_upscaled,
        handlers::download::serve_asset,
        handlers::root::root,
        handlers::root::health,
    ),
    components(
        schemas(handlers::upload::UpscaleResponse, ErrorResponse)
    ),
    tags(
        (name = "upscale", description = "Upload, upscale and download images"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/upload", "/download/{filename}", "/static/uploads/{filename}", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
