use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use genoshare_application::StorageRemovalStatus;
use genoshare_core::{AppError, RequestContext};
use genoshare_domain::INVALID_TITLE_MESSAGE;
use tracing::info;

use crate::dto::{
    AssetDetailResponse, AssetDownloadResponse, AssetListParams, AssetPageResponse,
    MutationOutcomeResponse, RenameAssetRequest, UpdateAssetRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

const ASSETS_PATH: &str = "/assets";
const UPDATE_FAILED_MESSAGE: &str = "Error: Could not update the asset. Please try again.";

fn asset_path(dxid: &str) -> String {
    format!("{ASSETS_PATH}/{dxid}")
}

fn edit_asset_path(dxid: &str) -> String {
    format!("{ASSETS_PATH}/{dxid}/edit")
}

type MutationReply = (StatusCode, Json<MutationOutcomeResponse>);

fn reply(status: StatusCode, outcome: MutationOutcomeResponse) -> MutationReply {
    (status, Json(outcome))
}

pub async fn list_assets_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<AssetListParams>,
) -> ApiResult<Json<AssetPageResponse>> {
    let (filter, page) = params.into_query()?;
    let assets = state.asset_service.list_index(&context, filter, page).await?;

    Ok(Json(AssetPageResponse::from(assets)))
}

pub async fn list_featured_assets_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<AssetListParams>,
) -> ApiResult<Json<AssetPageResponse>> {
    let (filter, page) = params.into_query()?;
    let assets = state
        .asset_service
        .list_featured(&context, filter, page)
        .await?;

    Ok(Json(AssetPageResponse::from(assets)))
}

pub async fn explore_assets_handler(
    State(state): State<AppState>,
    Query(params): Query<AssetListParams>,
) -> ApiResult<Json<AssetPageResponse>> {
    let (filter, page) = params.into_query()?;
    let assets = state.asset_service.list_public(filter, page).await?;

    Ok(Json(AssetPageResponse::from(assets)))
}

pub async fn show_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
) -> ApiResult<Json<AssetDetailResponse>> {
    let listing = state.asset_service.get_readable(&context, &dxid).await?;

    Ok(Json(AssetDetailResponse::from(listing)))
}

pub async fn edit_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
) -> ApiResult<Json<AssetDetailResponse>> {
    let listing = state.asset_service.get_editable(&context, &dxid).await?;

    Ok(Json(AssetDetailResponse::from(listing)))
}

pub async fn rename_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
    Json(payload): Json<RenameAssetRequest>,
) -> ApiResult<MutationReply> {
    match state
        .asset_service
        .rename(&context, &dxid, payload.into())
        .await
    {
        Ok(asset) => Ok(reply(
            StatusCode::OK,
            MutationOutcomeResponse::success(
                format!("Asset renamed to \"{}\"", asset.name().as_str()),
                asset_path(&dxid),
            ),
        )),
        Err(AppError::Validation(message)) if message == INVALID_TITLE_MESSAGE => Ok(reply(
            StatusCode::BAD_REQUEST,
            MutationOutcomeResponse::error(INVALID_TITLE_MESSAGE, asset_path(&dxid)),
        )),
        Err(error) => Err(error.into()),
    }
}

pub async fn update_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
    Json(payload): Json<UpdateAssetRequest>,
) -> ApiResult<MutationReply> {
    match state
        .asset_service
        .update(&context, &dxid, payload.into())
        .await
    {
        Ok(_) => Ok(reply(
            StatusCode::OK,
            MutationOutcomeResponse::success("Asset updated", asset_path(&dxid)),
        )),
        Err(AppError::Validation(_)) => Ok(reply(
            StatusCode::BAD_REQUEST,
            MutationOutcomeResponse::error(UPDATE_FAILED_MESSAGE, edit_asset_path(&dxid)),
        )),
        Err(error) => Err(error.into()),
    }
}

pub async fn destroy_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
) -> ApiResult<MutationReply> {
    match state.asset_service.destroy(&context, &dxid).await {
        Ok(destroyed) => {
            if destroyed.storage_removal == StorageRemovalStatus::Deferred {
                info!(dxid = %dxid, "asset deleted, platform removal deferred");
            }
            Ok(reply(
                StatusCode::OK,
                MutationOutcomeResponse::success(
                    format!(
                        "Asset \"{}\" has been successfully deleted",
                        destroyed.asset.name().prefix()
                    ),
                    ASSETS_PATH,
                ),
            ))
        }
        Err(AppError::Conflict(message)) => Ok(reply(
            StatusCode::CONFLICT,
            MutationOutcomeResponse::error(message, asset_path(&dxid)),
        )),
        Err(error) => Err(error.into()),
    }
}

pub async fn download_asset_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(dxid): Path<String>,
) -> ApiResult<Json<AssetDownloadResponse>> {
    let download = state.asset_service.download(&context, &dxid).await?;

    Ok(Json(AssetDownloadResponse::from(download)))
}

#[cfg(test)]
mod tests;
