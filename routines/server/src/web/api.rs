use std::sync::Arc;

use crate::{
    auth::{self, AuthState},
    routine::RoutineState,
    user::UserState,
};

use axum::middleware::{from_fn, from_fn_with_state};
use tower::ServiceBuilder;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub mod v1;

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::user::api::v1::register_handler,
        crate::user::api::v1::check_email_handler,
        crate::user::api::v1::verify_handler,
        crate::user::api::v1::token_handler,
        crate::routine::api::v1::list_routines_handler,
        crate::routine::api::v1::add_routine_handler,
        crate::routine::api::v1::edit_routine_handler,
        crate::routine::api::v1::delete_routine_handler,
        crate::routine::api::v1::list_tasks_handler,
        crate::routine::api::v1::add_task_handler,
        crate::routine::api::v1::get_task_handler,
        crate::routine::api::v1::edit_task_handler,
        crate::routine::api::v1::delete_task_handler,
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Routines", description = "Routines of the authenticated user"),
        (name = "Tasks", description = "Tasks nested under a routine")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Creates the API routes for JSON API endpoints.
/// `/auth` routes are public; `/routines` routes require a bearer token.
pub fn create_api_router(
    auth_state: Arc<AuthState>,
    user_state: Arc<UserState>,
    routine_state: Arc<RoutineState>,
) -> axum::Router {
    let public_routes = crate::user::api::v1::create_api_router(user_state);
    let protected_routes = crate::routine::api::v1::create_api_router(routine_state)
        .route_layer(from_fn(auth::api::v1::require_auth_middleware));
    public_routes
        .merge(protected_routes)
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
