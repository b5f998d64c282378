use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/image", image_routes())
        .nest("/mountains", mountain_routes())
        .nest("/me", me_routes())
        .nest("/admin", admin_routes())
}

fn image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::image::proxy_image))
        .routes(routes!(handlers::image::image_meta))
}

fn mountain_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::mountain::list_mountains,
            handlers::mountain::create_mountain
        ))
        .routes(routes!(
            handlers::mountain::get_mountain,
            handlers::mountain::update_mountain
        ))
        .routes(routes!(
            handlers::review::list_mountain_reviews,
            handlers::review::create_review
        ))
        .routes(routes!(
            handlers::climb::list_mountain_climbs,
            handlers::climb::create_climb
        ))
}

fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::climb::list_my_climbs))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::admin::refresh_mountain_photos))
}
