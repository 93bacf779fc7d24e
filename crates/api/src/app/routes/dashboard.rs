use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bizdash_auth::RouteGuard;
use bizdash_table::{query_string, Entity, QueryPatch, SortDir, TableQuery};

use crate::app::errors;

/// Table state as it appears in a dashboard page URL.
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortDir>,
}

impl From<TableParams> for QueryPatch {
    fn from(params: TableParams) -> Self {
        QueryPatch {
            page: params.page,
            page_size: params.limit,
            sort_field: params.sort,
            sort_dir: params.order,
            search: params.search,
            filters: None,
        }
    }
}

pub async fn index(Extension(guard): Extension<Arc<RouteGuard>>) -> impl IntoResponse {
    let prefix = guard.protected_prefix.trim_end_matches('/');
    let entities: Vec<_> = Entity::all()
        .iter()
        .map(|e| {
            serde_json::json!({
                "entity": e,
                "href": format!("{prefix}/{}", e.slug()),
                "api": e.base_path(),
                "report": e.is_report(),
            })
        })
        .collect();

    Json(serde_json::json!({ "entities": entities }))
}

/// Descriptor of one table plus the collection request its current state maps to.
pub async fn entity(
    Path(slug): Path<String>,
    Query(params): Query<TableParams>,
) -> axum::response::Response {
    let Some(entity) = Entity::from_slug(&slug) else {
        return errors::unknown_entity(&slug);
    };

    let descriptor = entity.descriptor();
    let query = TableQuery::default().merged(&params.into());
    let request = format!("{}?{}", descriptor.base_path, query_string(&descriptor, &query));

    Json(serde_json::json!({
        "descriptor": descriptor,
        "query": query,
        "request": request,
    }))
    .into_response()
}
