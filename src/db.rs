use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Opens a pool whose connections all carry the pragmas the schema relies on.
///
/// Foreign keys are per-connection in SQLite; without them the
/// `ON DELETE SET NULL` / `ON DELETE CASCADE` rules silently do nothing.
pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        // In-memory databases live exactly as long as their connection
        .idle_timeout(None)
        .max_lifetime(None)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await?;
                let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA temp_store=MEMORY;").execute(&mut *conn).await;
                Ok(())
            })
        })
        .connect(url)
        .await?;
    Ok(pool)
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance (no-ops for in-memory databases)
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )"#,
    )
    .execute(pool)
    .await?;

    // url is meaningful for EXTERNAL links, file for UPLOAD links; the other stays ''
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS resource_links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category_id INTEGER NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            link_type TEXT NOT NULL DEFAULT 'EXTERNAL' CHECK (link_type IN ('EXTERNAL', 'UPLOAD')),
            url TEXT NOT NULL DEFAULT '',
            file TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS resource_link_tags (
            resource_link_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (resource_link_id, tag_id),
            FOREIGN KEY(resource_link_id) REFERENCES resource_links(id) ON DELETE CASCADE,
            FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS resource_sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            version TEXT NOT NULL DEFAULT '',
            published_date TEXT NOT NULL DEFAULT (date('now'))
        )"#,
    )
    .execute(pool)
    .await?;

    // sort_order carries the membership's "order"; neither unique nor contiguous per set
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS resource_set_memberships (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_set_id INTEGER NOT NULL,
            resource_link_id INTEGER NOT NULL,
            sort_order INTEGER NOT NULL CHECK (sort_order >= 0),
            UNIQUE (resource_set_id, resource_link_id),
            FOREIGN KEY(resource_set_id) REFERENCES resource_sets(id) ON DELETE CASCADE,
            FOREIGN KEY(resource_link_id) REFERENCES resource_links(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_links_created", "CREATE INDEX IF NOT EXISTS idx_links_created ON resource_links(created_at DESC, id DESC)"),
        ("idx_links_category", "CREATE INDEX IF NOT EXISTS idx_links_category ON resource_links(category_id)"),
        ("idx_link_tags_tag", "CREATE INDEX IF NOT EXISTS idx_link_tags_tag ON resource_link_tags(tag_id)"),
        ("idx_sets_published", "CREATE INDEX IF NOT EXISTS idx_sets_published ON resource_sets(published_date DESC, id DESC)"),
        ("idx_members_set_order", "CREATE INDEX IF NOT EXISTS idx_members_set_order ON resource_set_memberships(resource_set_id, sort_order, resource_link_id)"),
        ("idx_members_link", "CREATE INDEX IF NOT EXISTS idx_members_link ON resource_set_memberships(resource_link_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}
