//! OpenAPI documentation definition.

use hostdash_core::collector::CollectFailure;
use hostdash_core::history::MetricPoint;
use utoipa::OpenApi;

use crate::handlers::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::handle_health,
        crate::handlers::handle_status,
        crate::handlers::handle_history,
        crate::handlers::handle_metric,
        crate::handlers::handle_domain,
    ),
    components(schemas(MetricPoint, CollectFailure, ErrorBody)),
    info(
        title = "hostdash API",
        version = "1.0",
        description = "Host metrics dashboard API: live snapshots, per-domain readings, and in-memory history"
    )
)]
pub(crate) struct ApiDoc;
