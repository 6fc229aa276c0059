use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use genoshare_application::{
    AssetService, AssetServiceSettings, AssetSyncService, EventService, RemoteObjectState,
    StoragePlatform,
};
use genoshare_core::{AppError, AppResult, AssetId, ContextUser, OrganizationId, RequestContext, UserId};
use genoshare_domain::{
    Asset, AssetAttributes, AssetScope, AssetState, LicenseRef, Organization, UserSummary,
};
use genoshare_infrastructure::{
    InMemoryAssetRepository, InMemoryEventRepository, InMemoryStorageRemovalQueue,
    InMemoryUserDirectory, PlatformBackend, PlatformConfig, PlatformSettings,
};
use tokio::sync::Mutex;

use crate::state::AppState;

pub const BOOTSTRAP_TOKEN: &str = "bootstrap-token-used-by-handler-tests";
pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const USER_PLATFORM_TOKEN: &str = "user-platform-token";

/// Platform double that records removals and serves canned object states.
#[derive(Default)]
pub struct FakeStoragePlatform {
    fail_removals: bool,
    pub removals: Mutex<Vec<(String, Vec<String>)>>,
    pub remote_states: Mutex<HashMap<String, AssetState>>,
}

#[async_trait]
impl StoragePlatform for FakeStoragePlatform {
    async fn remove_objects(&self, _token: &str, project: &str, dxids: &[String]) -> AppResult<()> {
        self.removals
            .lock()
            .await
            .push((project.to_owned(), dxids.to_vec()));
        if self.fail_removals {
            return Err(AppError::ExternalService("platform unavailable".to_owned()));
        }
        Ok(())
    }

    async fn describe_object_states(
        &self,
        _token: &str,
        dxids: &[String],
    ) -> AppResult<Vec<RemoteObjectState>> {
        let states = self.remote_states.lock().await;
        Ok(dxids
            .iter()
            .filter_map(|dxid| {
                states.get(dxid).map(|state| RemoteObjectState {
                    dxid: dxid.clone(),
                    state: *state,
                })
            })
            .collect())
    }

    async fn download_url(&self, _token: &str, project: &str, dxid: &str) -> AppResult<String> {
        Ok(format!("https://download.test/{project}/{dxid}"))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub assets: InMemoryAssetRepository,
    pub users: Arc<InMemoryUserDirectory>,
    pub removal_queue: Arc<InMemoryStorageRemovalQueue>,
    pub platform: Arc<FakeStoragePlatform>,
}

#[derive(Default)]
pub struct TestAppBuilder {
    featured_org_handle: Option<String>,
    admin_dxusers: HashSet<String>,
    fail_removals: bool,
}

impl TestAppBuilder {
    pub fn featured_org(mut self, handle: &str) -> Self {
        self.featured_org_handle = Some(handle.to_owned());
        self
    }

    pub fn admin(mut self, dxuser: &str) -> Self {
        self.admin_dxusers.insert(dxuser.to_owned());
        self
    }

    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn build(self) -> TestApp {
        let assets = InMemoryAssetRepository::new();
        let users = Arc::new(InMemoryUserDirectory::new());
        let removal_queue = Arc::new(InMemoryStorageRemovalQueue::new());
        let platform = Arc::new(FakeStoragePlatform {
            fail_removals: self.fail_removals,
            ..FakeStoragePlatform::default()
        });
        let event_service = EventService::new(Arc::new(InMemoryEventRepository::new()));
        let platform_config = PlatformConfig::from_settings(&PlatformSettings {
            backend: PlatformBackend::Staging,
            dev_host: None,
            local_development: true,
        })
        .unwrap_or_else(|_| unreachable!());

        let asset_service = AssetService::new(
            Arc::new(assets.clone()),
            Arc::new(AssetSyncService::new(
                Arc::new(assets.clone()),
                platform.clone(),
            )),
            platform.clone(),
            removal_queue.clone(),
            event_service.clone(),
            AssetServiceSettings {
                featured_organization_handle: self.featured_org_handle,
                platform_admin_token: None,
            },
        );

        TestApp {
            state: AppState {
                asset_service,
                event_service,
                user_directory: users.clone(),
                platform_config: Arc::new(platform_config),
                admin_dxusers: Arc::new(self.admin_dxusers),
                frontend_url: FRONTEND_URL.to_owned(),
                bootstrap_token: BOOTSTRAP_TOKEN.to_owned(),
            },
            assets,
            users,
            removal_queue,
            platform,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub async fn add_organization(&self, handle: &str) -> Organization {
        let organization = Organization::new(OrganizationId::new(), handle, handle)
            .unwrap_or_else(|_| unreachable!());
        self.assets.add_organization(organization.clone()).await;
        organization
    }

    pub async fn add_member(&self, dxuser: &str, organization: Option<&Organization>) -> ContextUser {
        let user_id = UserId::new();
        self.assets
            .add_user(UserSummary::new(user_id, dxuser, dxuser).unwrap_or_else(|_| unreachable!()))
            .await;
        if let Some(organization) = organization {
            self.assets
                .assign_organization(user_id, organization.id())
                .await;
        }

        let user = ContextUser::new(
            user_id,
            dxuser,
            organization.map(Organization::id),
            organization.map(|organization| organization.handle().to_owned()),
        );
        self.users.add_user(user.clone()).await;
        user
    }

    pub async fn add_asset(&self, owner: &ContextUser, seed: AssetSeed<'_>) -> Asset {
        let now = Utc::now();
        let license = seed.licensed.then(|| {
            LicenseRef::new("license-1", "Research only", "Do not redistribute.")
                .unwrap_or_else(|_| unreachable!())
        });
        let asset = Asset::from_attributes(AssetAttributes {
            id: AssetId::new(),
            dxid: seed.dxid.to_owned(),
            project: "project-handler-tests".to_owned(),
            name: seed.name.to_owned(),
            description: None,
            owner_user_id: owner.user_id(),
            owner_organization_id: owner.organization_id(),
            scope: seed.scope,
            state: seed.state,
            license,
            file_size: 2048,
            created_at: now,
            updated_at: now,
        })
        .unwrap_or_else(|_| unreachable!());

        self.assets
            .add_asset(asset.clone(), Vec::new())
            .await
            .unwrap_or_else(|_| unreachable!());
        asset
    }
}

/// Minimal description of a seeded asset.
#[derive(Debug, Clone, Copy)]
pub struct AssetSeed<'a> {
    pub dxid: &'a str,
    pub name: &'a str,
    pub scope: AssetScope,
    pub state: AssetState,
    pub licensed: bool,
}

impl<'a> AssetSeed<'a> {
    pub fn private(dxid: &'a str, name: &'a str) -> Self {
        Self {
            dxid,
            name,
            scope: AssetScope::Private,
            state: AssetState::Closed,
            licensed: false,
        }
    }

    pub fn public(dxid: &'a str, name: &'a str) -> Self {
        Self {
            scope: AssetScope::Public,
            ..Self::private(dxid, name)
        }
    }

    pub fn open(self) -> Self {
        Self {
            state: AssetState::Open,
            ..self
        }
    }

    pub fn licensed(self) -> Self {
        Self {
            licensed: true,
            ..self
        }
    }
}

pub fn signed_in(user: &ContextUser) -> RequestContext {
    RequestContext::authenticated(user.clone(), false, Some(USER_PLATFORM_TOKEN.to_owned()))
}
