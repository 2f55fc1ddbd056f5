use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::AnalysisResponse;
use crate::models::{AnalysisRequest, Booking, Lesson};
use crate::popular_classes::ClassPopularity;
use crate::popular_times::{PopularTimeReport, TimeCount};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::popular_times,
        crate::handlers::popular_classes,
        crate::handlers::analysis
    ),
    components(schemas(
        AnalysisRequest,
        Lesson,
        Booking,
        PopularTimeReport,
        TimeCount,
        ClassPopularity,
        AnalysisResponse
    )),
    tags(
        (name = "analysis", description = "Class and start time popularity analytics")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
