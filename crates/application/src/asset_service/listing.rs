use super::*;

impl AssetService {
    /// Lists assets the caller may edit.
    pub async fn list_editable(
        &self,
        context: &RequestContext,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        self.list_visible(context, VisibilityFilter::Editable, filter, page)
            .await
    }

    /// Lists assets the caller may read.
    pub async fn list_accessible(
        &self,
        context: &RequestContext,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        self.list_visible(context, VisibilityFilter::Accessible, filter, page)
            .await
    }

    /// Lists public assets with guest semantics.
    pub async fn list_public(
        &self,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        self.list_visible(&RequestContext::guest(), VisibilityFilter::Public, filter, page)
            .await
    }

    /// Lists the caller's own workspace, refreshing remote state first.
    ///
    /// Guests get the public listing instead.
    pub async fn list_index(
        &self,
        context: &RequestContext,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        if context.is_guest() {
            return self.list_public(filter, page).await;
        }

        if let Err(error) = self.state_sync.sync_assets(context).await {
            warn!(
                error = %error,
                user_id = ?context.user_id(),
                "asset state sync failed, listing stored state"
            );
        }

        self.list_editable(context, filter, page).await
    }

    /// Lists readable assets owned by members of the featured organization.
    pub async fn list_featured(
        &self,
        context: &RequestContext,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        let Some(handle) = self.settings.featured_organization_handle.as_deref() else {
            return Ok(Page::empty(page));
        };

        let Some(organization) = self.repository.find_organization_by_handle(handle).await? else {
            return Ok(Page::empty(page));
        };

        self.list_accessible(context, filter.within_organization(organization.id()), page)
            .await
    }

    async fn list_visible(
        &self,
        context: &RequestContext,
        visibility: VisibilityFilter,
        filter: AssetFilter,
        page: PageRequest,
    ) -> AppResult<Page<AssetListing>> {
        let rows = self
            .repository
            .list_assets(
                context,
                AssetListQuery {
                    visibility,
                    filter,
                    page,
                },
            )
            .await?;

        let mut items = Vec::with_capacity(rows.items.len());
        let mut dropped = 0_u64;
        for row in rows.items {
            if visibility.allows(context, &row.listing, row.grant) {
                items.push(row.listing);
            } else {
                dropped += 1;
                warn!(
                    visibility = visibility.as_str(),
                    dxid = row.listing.asset().dxid(),
                    "storage returned a row failing the visibility predicate"
                );
            }
        }

        Ok(Page {
            items,
            page: rows.page,
            page_size: rows.page_size,
            total: rows.total.saturating_sub(dropped),
        })
    }
}
