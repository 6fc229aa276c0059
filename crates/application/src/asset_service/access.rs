use super::*;

impl AssetService {
    /// Returns a readable asset, refreshing its remote state first when not closed.
    pub async fn get_readable(
        &self,
        context: &RequestContext,
        dxid: &str,
    ) -> AppResult<AssetListing> {
        let listing = self.load_readable(context, dxid).await?;
        if listing.asset().state().is_closed() {
            return Ok(listing);
        }

        if let Err(error) = self.state_sync.sync_asset(context, listing.asset()).await {
            warn!(error = %error, dxid, "asset state refresh failed, serving stored state");
            return Ok(listing);
        }

        self.load_readable(context, dxid).await
    }

    /// Returns an asset the caller may edit.
    pub async fn get_editable(
        &self,
        context: &RequestContext,
        dxid: &str,
    ) -> AppResult<AssetListing> {
        let listing = self.load_listing(dxid).await?;
        let grant = self.grant_for(context, listing.asset()).await?;
        if !is_editable(context, &listing, grant) {
            return Err(not_permitted(dxid));
        }

        Ok(listing)
    }

    pub(super) async fn load_readable(
        &self,
        context: &RequestContext,
        dxid: &str,
    ) -> AppResult<AssetListing> {
        let listing = self.load_listing(dxid).await?;
        let grant = self.grant_for(context, listing.asset()).await?;
        if !is_readable(context, &listing, grant) {
            return Err(not_permitted(dxid));
        }

        Ok(listing)
    }

    async fn load_listing(&self, dxid: &str) -> AppResult<AssetListing> {
        self.repository
            .find_asset(dxid)
            .await?
            .ok_or_else(|| missing(dxid))
    }

    async fn grant_for(
        &self,
        context: &RequestContext,
        asset: &Asset,
    ) -> AppResult<Option<AccessGrantLevel>> {
        match context.user_id() {
            Some(user_id) => self.repository.find_access_grant(asset.id(), user_id).await,
            None => Ok(None),
        }
    }

    pub(super) async fn ensure_editable_within(
        mutation: &mut dyn AssetMutation,
        context: &RequestContext,
        asset: &Asset,
    ) -> AppResult<()> {
        let grant = match context.user_id() {
            Some(user_id) => mutation.find_access_grant(asset.id(), user_id).await?,
            None => None,
        };

        if !is_editable(context, asset, grant) {
            return Err(not_permitted(asset.dxid()));
        }

        Ok(())
    }
}
