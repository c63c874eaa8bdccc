//! Schema bootstrap statement.

/// Idempotent definition of the `entries` table.
pub const CREATE_ENTRIES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS entries (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Maximum title length enforced by the `VARCHAR(255)` column.
pub const TITLE_MAX_CHARS: usize = 255;
