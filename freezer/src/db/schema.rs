//! Database schema definitions.
//!
//! One table per entity. Columns mirror the row shapes in
//! [`crate::store::rows`]; every row carries its owner in `user_id`.

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Boxes table schema.
///
/// Ids are ULIDs, so ordering by id follows creation order.
pub const BOXES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS boxes (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    layout TEXT NOT NULL CHECK (layout IN ('10x10', '9x9')),
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_boxes_user_id ON boxes(user_id);
"#;

/// Samples table schema.
///
/// No foreign key to `boxes`: deleting a box keeps its samples as `deleted`
/// rows that still name the box they were in.
pub const SAMPLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS samples (
    id TEXT PRIMARY KEY NOT NULL,
    box_id TEXT,
    position INTEGER NOT NULL,
    sample_number TEXT NOT NULL,
    name TEXT NOT NULL,
    size TEXT,
    coating TEXT NOT NULL,
    solvent TEXT NOT NULL,
    molar_conc REAL,
    mass_conc REAL,
    notes TEXT,
    status TEXT NOT NULL CHECK (status IN ('active', 'archived', 'deleted')),
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_samples_user_id ON samples(user_id);
CREATE INDEX IF NOT EXISTS idx_samples_box_status ON samples(box_id, status);
"#;

/// Get all schema creation statements.
pub fn all_schemas() -> Vec<&'static str> {
    vec![SCHEMA_VERSION_TABLE, BOXES_TABLE, SAMPLES_TABLE]
}
