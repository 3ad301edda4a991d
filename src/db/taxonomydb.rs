use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgConnection;

use crate::db::db::DBClient;
use crate::models::taxonomymodel::{Location, LocationCategory, PropertyTypeEntry, Tag};

/// Create-if-absent taxonomy write. Existing entries are left untouched so
/// the index stays append-only.
pub async fn upsert_location(
    conn: &mut PgConnection,
    name: &str,
    category: LocationCategory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO locations (id, name, category) \
         VALUES (gen_random_uuid(), $1, $2) \
         ON CONFLICT (name, category) DO NOTHING",
    )
    .bind(name)
    .bind(category)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn upsert_property_type(conn: &mut PgConnection, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO property_types (id, name) \
         VALUES (gen_random_uuid(), $1) \
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(name)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Bulk reference-count bump: one write per property-tags set. Each tag's
/// counter grows by one, new tags start at one. Duplicates within the input
/// are collapsed first; a multi-row upsert cannot touch the same row twice.
pub async fn bump_tag_counts(conn: &mut PgConnection, tags: &[String]) -> Result<(), sqlx::Error> {
    if tags.is_empty() {
        return Ok(());
    }

    let unique: Vec<String> = tags
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    sqlx::query(
        "INSERT INTO tags (id, name, amount) \
         SELECT gen_random_uuid(), tag, 1 FROM unnest($1::text[]) AS t(tag) \
         ON CONFLICT (name) DO UPDATE SET amount = tags.amount + 1",
    )
    .bind(unique)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Autocomplete reads over the lazily-built taxonomy tables.
#[async_trait]
pub trait TaxonomyExt {
    async fn search_locations(
        &self,
        category: Option<LocationCategory>,
        prefix: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Location>, sqlx::Error>;

    async fn list_tags(&self, limit: i64) -> Result<Vec<Tag>, sqlx::Error>;

    async fn list_property_types(&self) -> Result<Vec<PropertyTypeEntry>, sqlx::Error>;
}

#[async_trait]
impl TaxonomyExt for DBClient {
    async fn search_locations(
        &self,
        category: Option<LocationCategory>,
        prefix: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Location>, sqlx::Error> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, category, created_at FROM locations \
             WHERE ($1::location_category IS NULL OR category = $1) \
               AND ($2::text IS NULL OR name ILIKE $2 || '%') \
             ORDER BY name ASC LIMIT $3",
        )
        .bind(category)
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_tags(&self, limit: i64) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, amount FROM tags ORDER BY amount DESC, name ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_property_types(&self) -> Result<Vec<PropertyTypeEntry>, sqlx::Error> {
        sqlx::query_as::<_, PropertyTypeEntry>(
            "SELECT id, name FROM property_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }
}
