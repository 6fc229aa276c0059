use chrono::{DateTime, Utc};
use genoshare_domain::INVALID_TITLE_MESSAGE;

use super::*;

impl AssetService {
    /// Renames an asset to `title` followed by its archive extension.
    pub async fn rename(
        &self,
        context: &RequestContext,
        dxid: &str,
        input: RenameAssetInput,
    ) -> AppResult<Asset> {
        let current = self.get_editable(context, dxid).await?;
        let title = validate_title(input.title)?;

        self.mutate(context, current.asset(), |asset, now| {
            let name = asset.name().with_title(title.as_str())?;
            asset.rename(name, now);
            Ok(())
        })
        .await
    }

    /// Updates the writable fields of an asset inside one transaction.
    pub async fn update(
        &self,
        context: &RequestContext,
        dxid: &str,
        input: UpdateAssetInput,
    ) -> AppResult<Asset> {
        let current = self.get_editable(context, dxid).await?;
        let title = input.title.map(|title| validate_title(Some(title))).transpose()?;

        self.mutate(context, current.asset(), |asset, now| {
            if let Some(title) = title.as_deref() {
                let name = asset.name().with_title(title)?;
                asset.rename(name, now);
            }
            if let Some(description) = input.description {
                asset.describe(Some(description), now);
            }
            Ok(())
        })
        .await
    }

    /// Deletes an asset, then removes its platform object.
    ///
    /// The platform call happens after the local commit; its failure queues
    /// a retry and does not fail the destroy.
    pub async fn destroy(&self, context: &RequestContext, dxid: &str) -> AppResult<DestroyedAsset> {
        let current = self.get_editable(context, dxid).await?;

        let mut mutation = self.repository.begin_mutation().await?;
        let asset = mutation
            .reload_for_update(current.asset().id())
            .await?
            .ok_or_else(|| missing(dxid))?;
        Self::ensure_editable_within(mutation.as_mut(), context, &asset).await?;

        if asset.license().is_some() && mutation.count_dependent_apps(asset.id()).await? > 0 {
            return Err(AppError::Conflict(LICENSE_DEPENDENCY_MESSAGE.to_owned()));
        }

        mutation.delete_asset(asset.id()).await?;
        mutation.commit().await?;
        info!(dxid, user_id = ?context.user_id(), "asset deleted");

        let storage_removal = self.remove_platform_object(context, &asset).await;
        Ok(DestroyedAsset {
            asset,
            storage_removal,
        })
    }

    async fn mutate<F>(&self, context: &RequestContext, target: &Asset, change: F) -> AppResult<Asset>
    where
        F: FnOnce(&mut Asset, DateTime<Utc>) -> AppResult<()> + Send,
    {
        let mut mutation = self.repository.begin_mutation().await?;
        let mut asset = mutation
            .reload_for_update(target.id())
            .await?
            .ok_or_else(|| missing(target.dxid()))?;
        Self::ensure_editable_within(mutation.as_mut(), context, &asset).await?;

        change(&mut asset, Utc::now())?;
        mutation.save_asset(&asset).await?;
        mutation.commit().await?;

        Ok(asset)
    }

    async fn remove_platform_object(
        &self,
        context: &RequestContext,
        asset: &Asset,
    ) -> StorageRemovalStatus {
        let dxids = vec![asset.dxid().to_owned()];
        let token = context
            .platform_token()
            .or(self.settings.platform_admin_token.as_deref());
        let result = match token {
            Some(token) => {
                self.storage_platform
                    .remove_objects(token, asset.project(), &dxids)
                    .await
            }
            None => Err(AppError::ExternalService(
                "no platform token available for object removal".to_owned(),
            )),
        };

        let Err(error) = result else {
            return StorageRemovalStatus::Completed;
        };

        warn!(
            error = %error,
            dxid = asset.dxid(),
            project = asset.project(),
            "platform object removal failed, queueing retry"
        );

        if let Err(queue_error) = self
            .removal_queue
            .enqueue(StorageRemovalRequest {
                project: asset.project().to_owned(),
                dxids,
                last_error: error.to_string(),
            })
            .await
        {
            tracing::error!(
                error = %queue_error,
                dxid = asset.dxid(),
                "failed to queue platform object removal"
            );
        }

        StorageRemovalStatus::Deferred
    }
}

fn validate_title(title: Option<String>) -> AppResult<String> {
    match title {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(AppError::Validation(INVALID_TITLE_MESSAGE.to_owned())),
    }
}
