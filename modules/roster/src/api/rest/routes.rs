use std::sync::Arc;

use axum::{
    routing::get,
    Extension, Json, Router,
};
use utoipa::OpenApi;

use crate::api::problem::Problem;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    info(title = "Roster API", description = "Groups and their members"),
    paths(
        handlers::create_group,
        handlers::get_group,
        handlers::list_groups,
        handlers::update_group,
        handlers::delete_group,
        handlers::create_member,
        handlers::get_member,
        handlers::list_members,
        handlers::update_member,
        handlers::delete_member,
    ),
    components(schemas(
        dto::GroupDto,
        dto::GroupWithMembersDto,
        dto::CreateGroupReq,
        dto::UpdateGroupReq,
        dto::MemberDto,
        dto::MemberWithGroupDto,
        dto::CreateMemberReq,
        dto::UpdateMemberReq,
        Problem,
    )),
    tags(
        (name = "groups", description = "Group records"),
        (name = "members", description = "Member records"),
    )
)]
pub struct ApiDoc;

/// Mount the roster routes onto `router`.
///
/// Collection routes answer with and without the trailing slash.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let groups = get(handlers::list_groups).post(handlers::create_group);
    let members = get(handlers::list_members).post(handlers::create_member);

    let api = Router::new()
        .route("/groups", groups.clone())
        .route("/groups/", groups)
        .route(
            "/groups/{id}",
            get(handlers::get_group)
                .patch(handlers::update_group)
                .delete(handlers::delete_group),
        )
        .route("/members", members.clone())
        .route("/members/", members)
        .route(
            "/members/{id}",
            get(handlers::get_member)
                .patch(handlers::update_member)
                .delete(handlers::delete_member),
        )
        .layer(Extension(service));

    router
        .merge(api)
        .route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
