use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use genoshare_core::{AppError, RequestContext};
use genoshare_domain::AssetState;
use serde_json::json;

use super::{
    destroy_asset_handler, download_asset_handler, explore_assets_handler,
    list_assets_handler, list_featured_assets_handler, rename_asset_handler,
    show_asset_handler,
};
use crate::dto::{AssetListParams, EventListParams, RenameAssetRequest};
use crate::error::ApiError;
use crate::handlers::events::list_events_handler;
use crate::test_support::{AssetSeed, TestApp, signed_in};

fn rename_payload(title: serde_json::Value) -> Json<RenameAssetRequest> {
    Json(RenameAssetRequest { title })
}

fn dxids(page: &crate::dto::AssetPageResponse) -> Vec<&str> {
    page.items.iter().map(|item| item.dxid.as_str()).collect()
}

#[tokio::test]
async fn explore_lists_public_assets_only() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::public("file-pub", "shared.tar"))
        .await;
    app.add_asset(&owner, AssetSeed::private("file-priv", "mine.tar"))
        .await;

    let Json(page) = explore_assets_handler(
        State(app.state.clone()),
        Query(AssetListParams::default()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(dxids(&page), vec!["file-pub"]);
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].owner.dxuser, "owner");
}

#[tokio::test]
async fn index_refreshes_remote_state_before_listing() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::private("file-1", "reads.tar").open())
        .await;
    app.platform
        .remote_states
        .lock()
        .await
        .insert("file-1".to_owned(), AssetState::Closed);

    let Json(page) = list_assets_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Query(AssetListParams::default()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(dxids(&page), vec!["file-1"]);
    assert_eq!(page.items[0].state, "closed");
}

#[tokio::test]
async fn index_rejects_unknown_order_with_bad_request() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;

    let result = list_assets_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Query(AssetListParams {
            order: Some("size".to_owned()),
            ..AssetListParams::default()
        }),
    )
    .await;

    let Err(error) = result else {
        unreachable!();
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn featured_lists_members_of_the_featured_organization() {
    let app = TestApp::builder().featured_org("curators").build();
    let curators = app.add_organization("curators").await;
    let others = app.add_organization("others").await;
    let curator = app.add_member("curator", Some(&curators)).await;
    let outsider = app.add_member("outsider", Some(&others)).await;
    app.add_asset(&curator, AssetSeed::public("file-c", "curated.tar"))
        .await;
    app.add_asset(&outsider, AssetSeed::public("file-o", "other.tar"))
        .await;

    let Json(page) = list_featured_assets_handler(
        State(app.state.clone()),
        Extension(RequestContext::guest()),
        Query(AssetListParams::default()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(dxids(&page), vec!["file-c"]);
    assert_eq!(
        page.items[0]
            .organization
            .as_ref()
            .map(|organization| organization.handle.as_str()),
        Some("curators")
    );
}

#[tokio::test]
async fn hidden_and_missing_assets_answer_identically() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    let stranger = app.add_member("stranger", None).await;
    app.add_asset(&owner, AssetSeed::private("file-secret", "secret.tar"))
        .await;

    let hidden = show_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&stranger)),
        Path("file-secret".to_owned()),
    )
    .await;
    let missing = show_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&stranger)),
        Path("file-nothing".to_owned()),
    )
    .await;

    assert!(matches!(hidden, Err(ApiError(AppError::Forbidden(_)))));
    assert!(matches!(missing, Err(ApiError(AppError::NotFound(_)))));
    let (Err(hidden), Err(missing)) = (hidden, missing) else {
        unreachable!();
    };
    let hidden = hidden.into_response();
    let missing = missing.into_response();
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
    assert_eq!(hidden.status(), missing.status());
}

#[tokio::test]
async fn show_includes_license_for_readers() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::public("file-l", "licensed.tar").licensed())
        .await;

    let Json(detail) = show_asset_handler(
        State(app.state.clone()),
        Extension(RequestContext::guest()),
        Path("file-l".to_owned()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert!(detail.asset.has_license);
    assert_eq!(
        detail.license.map(|license| license.uid),
        Some("license-1".to_owned())
    );
}

#[tokio::test]
async fn rename_reports_invalid_titles_without_changes() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::private("file-1", "reads.tar"))
        .await;

    let (status, Json(outcome)) = rename_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
        rename_payload(json!(17)),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(outcome.message, "The new name is not a valid string");
    assert_eq!(outcome.redirect_to, "/assets/file-1");

    let Json(detail) = show_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(detail.asset.name, "reads.tar");
}

#[tokio::test]
async fn rename_of_hidden_asset_with_bad_title_is_not_found() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    let stranger = app.add_member("stranger", None).await;
    app.add_asset(&owner, AssetSeed::private("file-1", "reads.tar"))
        .await;

    let result = rename_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&stranger)),
        Path("file-1".to_owned()),
        rename_payload(json!("")),
    )
    .await;

    let Err(error) = result else {
        unreachable!();
    };
    assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_keeps_archive_suffix() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::private("file-1", "reads.tar.gz"))
        .await;

    let (status, Json(outcome)) = rename_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
        rename_payload(json!("genome")),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome.message, "Asset renamed to \"genome.tar.gz\"");
}

#[tokio::test]
async fn destroy_of_licensed_dependency_is_a_conflict() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    let asset = app
        .add_asset(&owner, AssetSeed::private("file-1", "reads.tar").licensed())
        .await;
    app.assets.add_dependent_app(asset.id()).await;

    let (status, Json(outcome)) = destroy_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(outcome.message.starts_with("This asset contains a license"));
    assert_eq!(outcome.redirect_to, "/assets/file-1");
    assert!(app.platform.removals.lock().await.is_empty());
}

#[tokio::test]
async fn destroy_succeeds_when_platform_removal_fails() {
    let app = TestApp::builder().failing_removals().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::private("file-1", "reads.tar"))
        .await;

    let (status, Json(outcome)) = destroy_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome.message, "Asset \"reads\" has been successfully deleted");
    assert_eq!(outcome.redirect_to, "/assets");
    assert_eq!(app.platform.removals.lock().await.len(), 1);
    assert_eq!(app.removal_queue.pending_count().await, 1);
}

#[tokio::test]
async fn download_is_logged_for_admins_to_review() {
    let app = TestApp::builder().admin("root").build();
    let owner = app.add_member("owner", None).await;
    let admin = app.add_member("root", None).await;
    app.add_asset(&owner, AssetSeed::public("file-1", "reads.tar"))
        .await;

    let Json(download) = download_asset_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Path("file-1".to_owned()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        download.url,
        "https://download.test/project-handler-tests/file-1"
    );

    let admin_context = RequestContext::authenticated(admin, true, None);
    let Json(events) = list_events_handler(
        State(app.state.clone()),
        Extension(admin_context),
        Query(EventListParams::default()),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "file_downloaded");
    assert_eq!(events[0].dxid.as_deref(), Some("file-1"));
    assert_eq!(events[0].dxuser, "owner");
}

#[tokio::test]
async fn guests_cannot_download_or_read_events() {
    let app = TestApp::builder().build();
    let owner = app.add_member("owner", None).await;
    app.add_asset(&owner, AssetSeed::public("file-1", "reads.tar"))
        .await;

    let download = download_asset_handler(
        State(app.state.clone()),
        Extension(RequestContext::guest()),
        Path("file-1".to_owned()),
    )
    .await;
    let events = list_events_handler(
        State(app.state.clone()),
        Extension(signed_in(&owner)),
        Query(EventListParams::default()),
    )
    .await;

    assert!(matches!(download, Err(ApiError(AppError::Unauthorized(_)))));
    assert!(matches!(events, Err(ApiError(AppError::Forbidden(_)))));
}
