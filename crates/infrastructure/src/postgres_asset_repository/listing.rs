use genoshare_domain::{AssetSortKey, SortDirection};

use super::*;

/// Visibility predicate compiled to SQL.
///
/// `$1` is the caller's user id (NULL for guests), `$2` the filter name and
/// `$3` whether the caller is an administrator. Must stay in step with
/// `genoshare_domain::VisibilityFilter::allows`.
const VISIBILITY_PREDICATE: &str = r#"
    CASE $2::text
        WHEN 'editable' THEN
            $1::uuid IS NOT NULL
            AND ($3::boolean OR assets.user_id = $1::uuid OR grants.level = 'edit')
        WHEN 'accessible' THEN
            assets.scope = 'public'
            OR (
                $1::uuid IS NOT NULL
                AND ($3::boolean OR assets.user_id = $1::uuid OR grants.level IS NOT NULL)
            )
        ELSE assets.scope = 'public'
    END
"#;

const FILTER_PREDICATE: &str = r#"
    ($4::text IS NULL OR assets.name ILIKE '%' || $4::text || '%' ESCAPE '\')
    AND (
        $5::text IS NULL
        OR EXISTS (
            SELECT 1
            FROM taggings
            JOIN tags ON tags.id = taggings.tag_id
            WHERE taggings.asset_id = assets.id AND tags.name = $5::text
        )
    )
    AND ($6::uuid IS NULL OR owners.organization_id = $6::uuid)
"#;

const GRANT_JOIN: &str = r#"
    LEFT JOIN asset_access_grants AS grants
        ON grants.asset_id = assets.id AND grants.user_id = $1::uuid
"#;

#[derive(Debug, FromRow)]
struct ListedRow {
    #[sqlx(flatten)]
    listing: ListingRow,
    grant_level: Option<String>,
}

impl PostgresAssetRepository {
    pub(super) async fn list_assets_impl(
        &self,
        context: &RequestContext,
        query: AssetListQuery,
    ) -> AppResult<Page<AssetListingRow>> {
        let user_id = context.user_id().map(|value| value.as_uuid());
        let visibility = query.visibility.as_str();
        let name_pattern = query.filter.name_contains.as_deref().map(escape_like);
        let tag = query.filter.tag.as_deref();
        let organization_id = query.filter.organization_id.map(|value| value.as_uuid());

        let count_sql = format!(
            "SELECT COUNT(*) {LISTING_JOINS} {GRANT_JOIN} WHERE {VISIBILITY_PREDICATE} AND {FILTER_PREDICATE}"
        );
        let total = sqlx::query_scalar::<_, i64>(count_sql.as_str())
            .bind(user_id)
            .bind(visibility)
            .bind(context.is_admin())
            .bind(name_pattern.as_deref())
            .bind(tag)
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count {visibility} assets: {error}"))
            })?;

        let page_sql = format!(
            "SELECT {ASSET_COLUMNS}, {LISTING_COLUMNS}, grants.level AS grant_level \
             {LISTING_JOINS} {GRANT_JOIN} \
             WHERE {VISIBILITY_PREDICATE} AND {FILTER_PREDICATE} \
             ORDER BY {} \
             LIMIT $7 OFFSET $8",
            order_clause(query.page.sort().key, query.page.sort().direction)
        );
        let rows = sqlx::query_as::<_, ListedRow>(page_sql.as_str())
            .bind(user_id)
            .bind(visibility)
            .bind(context.is_admin())
            .bind(name_pattern.as_deref())
            .bind(tag)
            .bind(organization_id)
            .bind(i64::from(query.page.limit()))
            .bind(i64::try_from(query.page.offset()).map_err(|error| {
                AppError::Validation(format!("page offset is out of range: {error}"))
            })?)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list {visibility} assets: {error}"))
            })?;

        let asset_ids: Vec<Uuid> = rows.iter().map(|row| row.listing.asset.id).collect();
        let mut tags = self.load_tags(&asset_ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let asset_tags = tags.remove(&row.listing.asset.id).unwrap_or_default();
                Ok(AssetListingRow {
                    grant: parse_grant(row.grant_level)?,
                    listing: row.listing.into_listing(asset_tags)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            items,
            page: query.page.page(),
            page_size: query.page.limit(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

fn order_clause(key: AssetSortKey, direction: SortDirection) -> String {
    let column = match key {
        AssetSortKey::Name => "assets.name",
    };
    let direction = match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };

    format!("{column} {direction}, assets.dxid ASC")
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
