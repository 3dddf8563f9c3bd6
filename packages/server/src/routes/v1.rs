use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{handicraft, kegiatan};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/handicrafts", handicraft_routes())
        .nest("/kegiatan", kegiatan_routes())
}

fn handicraft_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handicraft::list_handicrafts,
            handicraft::create_handicraft
        ))
        .routes(routes!(
            handicraft::get_handicraft,
            handicraft::update_handicraft,
            handicraft::delete_handicraft
        ))
}

fn kegiatan_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(kegiatan::list_kegiatan, kegiatan::create_kegiatan))
        .routes(routes!(kegiatan::get_kegiatan, kegiatan::delete_kegiatan))
}
