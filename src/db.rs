//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Simple query protocol accepts the multi-statement script in one round trip
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Channel that receives one notification per inserted detection
pub const DETECTION_INSERT_CHANNEL: &str = "detections_insert";

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Users
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    name VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Detections (append-only history)
CREATE TABLE IF NOT EXISTS detections (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    type VARCHAR(10) NOT NULL,
    content TEXT,
    processed_text TEXT NOT NULL,
    label VARCHAR(20) NOT NULL,
    score DOUBLE PRECISION NOT NULL,
    reasons JSONB NOT NULL DEFAULT '[]'::jsonb,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_detections_user_created ON detections(user_id, created_at DESC);

-- Insert notifications for history subscribers
CREATE OR REPLACE FUNCTION notify_detection_insert() RETURNS trigger AS $$
BEGIN
    PERFORM pg_notify(
        'detections_insert',
        json_build_object('id', NEW.id, 'user_id', NEW.user_id)::text
    );
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

DROP TRIGGER IF EXISTS detections_insert_notify ON detections;
CREATE TRIGGER detections_insert_notify
    AFTER INSERT ON detections
    FOR EACH ROW EXECUTE FUNCTION notify_detection_insert();
"#;
