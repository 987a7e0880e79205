use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::problem::{Problem, ProblemResponse};
use crate::api::rest::dto::{
    CreateGroupReq, CreateMemberReq, GroupDto, GroupWithMembersDto, ListQuery, MemberDto,
    MemberWithGroupDto, UpdateGroupReq, UpdateMemberReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{ValidJson, ValidPath, ValidQuery};
use crate::domain::service::Service;

// --- groups ---

/// Create a new group
#[utoipa::path(
    post,
    path = "/groups/",
    tag = "groups",
    operation_id = "roster.create_group",
    request_body = CreateGroupReq,
    responses(
        (status = 201, description = "Created group", body = GroupDto),
        (status = 422, description = "Validation error", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_group(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidJson(req_body): ValidJson<CreateGroupReq>,
) -> Result<(StatusCode, Json<GroupDto>), ProblemResponse> {
    info!("Creating group: {:?}", req_body);

    match svc.create_group(req_body.into()).await {
        Ok(group) => Ok((StatusCode::CREATED, Json(GroupDto::from(group)))),
        Err(e) => {
            error!("Failed to create group: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a group together with its members
#[utoipa::path(
    get,
    path = "/groups/{id}",
    tag = "groups",
    operation_id = "roster.get_group",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group with members", body = GroupWithMembersDto),
        (status = 404, description = "Group not found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid id", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_group(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    uri: Uri,
) -> Result<Json<GroupWithMembersDto>, ProblemResponse> {
    info!("Getting group with id: {}", id);

    match svc.get_group(id).await {
        Ok(group) => Ok(Json(GroupWithMembersDto::from(group))),
        Err(e) => {
            error!("Failed to get group {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List groups in insertion order
#[utoipa::path(
    get,
    path = "/groups/",
    tag = "groups",
    operation_id = "roster.list_groups",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of groups", body = [GroupDto]),
        (status = 422, description = "Invalid query", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_groups(
    Extension(svc): Extension<Arc<Service>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> Result<Json<Vec<GroupDto>>, ProblemResponse> {
    info!("Listing groups with query: {:?}", query);

    match svc.list_groups(query.offset, query.limit).await {
        Ok(groups) => Ok(Json(groups.into_iter().map(GroupDto::from).collect())),
        Err(e) => {
            error!("Failed to list groups: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update a group (partial)
#[utoipa::path(
    patch,
    path = "/groups/{id}",
    tag = "groups",
    operation_id = "roster.update_group",
    params(("id" = i32, Path, description = "Group id")),
    request_body = UpdateGroupReq,
    responses(
        (status = 200, description = "Updated group", body = GroupDto),
        (status = 404, description = "Group not found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_group(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(req_body): ValidJson<UpdateGroupReq>,
) -> Result<Json<GroupDto>, ProblemResponse> {
    info!("Updating group {} with: {:?}", id, req_body);

    match svc.update_group(id, req_body.into()).await {
        Ok(group) => Ok(Json(GroupDto::from(group))),
        Err(e) => {
            error!("Failed to update group {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a group; its members are kept and detached
#[utoipa::path(
    delete,
    path = "/groups/{id}",
    tag = "groups",
    operation_id = "roster.delete_group",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_group(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting group: {}", id);

    match svc.delete_group(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete group {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// --- members ---

/// Create a new member; the secret is stored only as a salted hash
#[utoipa::path(
    post,
    path = "/members/",
    tag = "members",
    operation_id = "roster.create_member",
    request_body = CreateMemberReq,
    responses(
        (status = 201, description = "Created member", body = MemberDto),
        (status = 422, description = "Validation error", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_member(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidJson(req_body): ValidJson<CreateMemberReq>,
) -> Result<(StatusCode, Json<MemberDto>), ProblemResponse> {
    info!("Creating member: {:?}", req_body);

    match svc.create_member(req_body.into()).await {
        Ok(member) => Ok((StatusCode::CREATED, Json(MemberDto::from(member)))),
        Err(e) => {
            error!("Failed to create member: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a member together with its group
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    operation_id = "roster.get_member",
    params(("id" = i32, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member with group", body = MemberWithGroupDto),
        (status = 404, description = "Member not found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid id", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_member(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    uri: Uri,
) -> Result<Json<MemberWithGroupDto>, ProblemResponse> {
    info!("Getting member with id: {}", id);

    match svc.get_member(id).await {
        Ok(member) => Ok(Json(MemberWithGroupDto::from(member))),
        Err(e) => {
            error!("Failed to get member {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List members in insertion order
#[utoipa::path(
    get,
    path = "/members/",
    tag = "members",
    operation_id = "roster.list_members",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of members", body = [MemberDto]),
        (status = 422, description = "Invalid query", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_members(
    Extension(svc): Extension<Arc<Service>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> Result<Json<Vec<MemberDto>>, ProblemResponse> {
    info!("Listing members with query: {:?}", query);

    match svc.list_members(query.offset, query.limit).await {
        Ok(members) => Ok(Json(members.into_iter().map(MemberDto::from).collect())),
        Err(e) => {
            error!("Failed to list members: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update a member (partial); a new secret is re-hashed
#[utoipa::path(
    patch,
    path = "/members/{id}",
    tag = "members",
    operation_id = "roster.update_member",
    params(("id" = i32, Path, description = "Member id")),
    request_body = UpdateMemberReq,
    responses(
        (status = 200, description = "Updated member", body = MemberDto),
        (status = 404, description = "Member not found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_member(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(req_body): ValidJson<UpdateMemberReq>,
) -> Result<Json<MemberDto>, ProblemResponse> {
    info!("Updating member {} with: {:?}", id, req_body);

    match svc.update_member(id, req_body.into()).await {
        Ok(member) => Ok(Json(MemberDto::from(member))),
        Err(e) => {
            error!("Failed to update member {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a member
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    operation_id = "roster.delete_member",
    params(("id" = i32, Path, description = "Member id")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_member(
    Extension(svc): Extension<Arc<Service>>,
    ValidPath(id): ValidPath<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting member: {}", id);

    match svc.delete_member(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete member {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
