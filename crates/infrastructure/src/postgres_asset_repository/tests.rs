use genoshare_application::{AssetListQuery, AssetMutation, AssetRepository};
use genoshare_core::{AssetId, ContextUser, OrganizationId, RequestContext, UserId};
use genoshare_domain::{AssetFilter, PageRequest, VisibilityFilter};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresAssetRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres asset repository tests: {error}");
    }

    Some(pool)
}

async fn insert_user(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, dxuser, first_name, last_name)
            VALUES ($1, $2, 'Test', 'User')
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("user-{}", user_id.as_uuid().simple()))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    user_id
}

async fn insert_asset(pool: &PgPool, owner: UserId, name: &str, scope: &str) -> (AssetId, String) {
    let asset_id = AssetId::new();
    let dxid = format!("file-{}", Uuid::new_v4().simple());
    let insert = sqlx::query(
        r#"
            INSERT INTO assets (id, dxid, project, name, user_id, scope, state, file_size)
            VALUES ($1, $2, 'project-test', $3, $4, $5, 'closed', 10)
            "#,
    )
    .bind(asset_id.as_uuid())
    .bind(dxid.as_str())
    .bind(name)
    .bind(owner.as_uuid())
    .bind(scope)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    (asset_id, dxid)
}

async fn insert_organization(pool: &PgPool) -> OrganizationId {
    let organization_id = OrganizationId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO organizations (id, handle, name)
            VALUES ($1, $2, 'Test Lab')
            "#,
    )
    .bind(organization_id.as_uuid())
    .bind(format!("org-{}", organization_id.as_uuid().simple()))
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    organization_id
}

fn signed_in(user_id: UserId) -> RequestContext {
    RequestContext::authenticated(ContextUser::new(user_id, "tester", None, None), false, None)
}

#[tokio::test]
async fn editable_listing_only_returns_owned_or_edit_granted_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAssetRepository::new(pool.clone());
    let caller = insert_user(&pool).await;
    let other = insert_user(&pool).await;
    let marker = Uuid::new_v4().simple().to_string();
    let (_, own_dxid) = insert_asset(&pool, caller, &format!("{marker}-own.tar"), "private").await;
    let (granted_id, granted_dxid) =
        insert_asset(&pool, other, &format!("{marker}-granted.tar"), "private").await;
    let _ = insert_asset(&pool, other, &format!("{marker}-public.tar"), "public").await;

    let grant = sqlx::query(
        r#"
            INSERT INTO asset_access_grants (asset_id, user_id, level)
            VALUES ($1, $2, 'edit')
            "#,
    )
    .bind(granted_id.as_uuid())
    .bind(caller.as_uuid())
    .execute(&pool)
    .await;
    assert!(grant.is_ok());

    let page = repository
        .list_assets(
            &signed_in(caller),
            AssetListQuery {
                visibility: VisibilityFilter::Editable,
                filter: AssetFilter {
                    name_contains: Some(marker),
                    ..AssetFilter::default()
                },
                page: PageRequest::first(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let dxids: Vec<&str> = page
        .items
        .iter()
        .map(|row| row.listing.asset().dxid())
        .collect();
    assert_eq!(dxids, vec![granted_dxid.as_str(), own_dxid.as_str()]);
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn guest_public_listing_skips_private_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAssetRepository::new(pool.clone());
    let owner = insert_user(&pool).await;
    let marker = Uuid::new_v4().simple().to_string();
    let _ = insert_asset(&pool, owner, &format!("{marker}-hidden.tar"), "private").await;

    let page = repository
        .list_assets(
            &RequestContext::guest(),
            AssetListQuery {
                visibility: VisibilityFilter::Public,
                filter: AssetFilter {
                    name_contains: Some(marker),
                    ..AssetFilter::default()
                },
                page: PageRequest::first(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn dropped_mutation_rolls_back_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAssetRepository::new(pool.clone());
    let owner = insert_user(&pool).await;
    let (asset_id, dxid) = insert_asset(&pool, owner, "rollback.tar", "private").await;

    {
        let mut mutation = repository
            .begin_mutation()
            .await
            .unwrap_or_else(|_| unreachable!());
        let locked = mutation
            .reload_for_update(asset_id)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(locked.is_some());
        assert!(mutation.delete_asset(asset_id).await.is_ok());
    }

    let still_there = repository
        .find_asset(dxid.as_str())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(still_there.is_some());
}

#[tokio::test]
async fn organization_filter_uses_owner_current_membership() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAssetRepository::new(pool.clone());
    let former = insert_organization(&pool).await;
    let current = insert_organization(&pool).await;
    let owner = insert_user(&pool).await;
    let marker = Uuid::new_v4().simple().to_string();
    let (asset_id, dxid) = insert_asset(&pool, owner, &format!("{marker}-moved.tar"), "public").await;

    let recorded = sqlx::query("UPDATE assets SET organization_id = $2 WHERE id = $1")
        .bind(asset_id.as_uuid())
        .bind(former.as_uuid())
        .execute(&pool)
        .await;
    assert!(recorded.is_ok());
    let moved = sqlx::query("UPDATE users SET organization_id = $2 WHERE id = $1")
        .bind(owner.as_uuid())
        .bind(current.as_uuid())
        .execute(&pool)
        .await;
    assert!(moved.is_ok());

    let list_within = |organization_id: OrganizationId| {
        let repository = repository.clone();
        let marker = marker.clone();
        async move {
            repository
                .list_assets(
                    &RequestContext::guest(),
                    AssetListQuery {
                        visibility: VisibilityFilter::Public,
                        filter: AssetFilter {
                            name_contains: Some(marker),
                            ..AssetFilter::default()
                        }
                        .within_organization(organization_id),
                        page: PageRequest::first(),
                    },
                )
                .await
                .unwrap_or_else(|_| unreachable!())
        }
    };

    let in_current = list_within(current).await;
    let in_former = list_within(former).await;

    assert_eq!(in_current.items.len(), 1);
    assert_eq!(in_current.items[0].listing.asset().dxid(), dxid.as_str());
    assert_eq!(
        in_current.items[0]
            .listing
            .organization()
            .map(|organization| organization.id()),
        Some(current)
    );
    assert!(in_former.items.is_empty());
}
