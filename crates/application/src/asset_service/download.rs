use super::*;

impl AssetService {
    /// Hands out a download link for a readable asset and logs the download.
    pub async fn download(&self, context: &RequestContext, dxid: &str) -> AppResult<AssetDownload> {
        let token = context
            .platform_token()
            .filter(|_| !context.is_guest())
            .ok_or_else(|| AppError::Unauthorized("downloads require a signed-in user".to_owned()))?;

        let asset = self.load_readable(context, dxid).await?.into_asset();
        let url = self
            .storage_platform
            .download_url(token, asset.project(), asset.dxid())
            .await?;

        self.event_service
            .record_file_downloaded(context, &asset)
            .await?;

        Ok(AssetDownload { asset, url })
    }
}
