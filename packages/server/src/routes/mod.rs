use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{health, image};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health::health))
        .routes(routes!(image::list_images, image::upload_image))
        .routes(routes!(image::delete_image))
        .routes(routes!(image::download_image))
}
