//! SQLite implementation of the inventory store.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Row, params};
use ulid::Generator;

use freezer_shared::errors::{FreezerError, FreezerResult};

use super::{Database, db_err};
use crate::model::{BoxId, OwnerId, SampleId, SampleStatus};
use crate::store::{BoxRow, InventoryStore, NewBoxRow, NewSampleRow, SampleRow, SampleRowPatch};

const BOX_COLUMNS: &str = "id, name, description, layout, user_id, created_at";

const SAMPLE_COLUMNS: &str = "id, box_id, position, sample_number, name, size, coating, solvent, \
     molar_conc, mass_conc, notes, status, user_id, created_at";

/// Inventory store backed by a SQLite [`Database`].
pub struct SqliteStore {
    db: Database,
    ids: Mutex<Generator>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            ids: Mutex::new(Generator::new()),
        }
    }

    fn next_id(&self) -> FreezerResult<String> {
        self.ids
            .lock()
            .generate()
            .map(|id| id.to_string())
            .map_err(|e| FreezerError::Internal(format!("id generation failed: {}", e)))
    }
}

fn box_from_row(row: &Row<'_>) -> rusqlite::Result<BoxRow> {
    Ok(BoxRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        layout: row.get(3)?,
        user_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<SampleRow> {
    Ok(SampleRow {
        id: row.get(0)?,
        box_id: row.get(1)?,
        position: row.get(2)?,
        sample_number: row.get(3)?,
        name: row.get(4)?,
        size: row.get(5)?,
        coating: row.get(6)?,
        solvent: row.get(7)?,
        molar_conc: row.get(8)?,
        mass_conc: row.get(9)?,
        notes: row.get(10)?,
        status: row.get(11)?,
        user_id: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

fn real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

/// `(column, value)` pairs for the columns a patch sets, in table order.
fn patch_assignments(patch: SampleRowPatch) -> Vec<(&'static str, Value)> {
    let mut out = Vec::new();
    if let Some(v) = patch.box_id {
        out.push(("box_id", text(v)));
    }
    if let Some(v) = patch.position {
        out.push(("position", Value::Integer(v)));
    }
    if let Some(v) = patch.sample_number {
        out.push(("sample_number", Value::Text(v)));
    }
    if let Some(v) = patch.name {
        out.push(("name", Value::Text(v)));
    }
    if let Some(v) = patch.size {
        out.push(("size", text(v)));
    }
    if let Some(v) = patch.coating {
        out.push(("coating", Value::Text(v)));
    }
    if let Some(v) = patch.solvent {
        out.push(("solvent", Value::Text(v)));
    }
    if let Some(v) = patch.molar_conc {
        out.push(("molar_conc", real(v)));
    }
    if let Some(v) = patch.mass_conc {
        out.push(("mass_conc", real(v)));
    }
    if let Some(v) = patch.notes {
        out.push(("notes", text(v)));
    }
    if let Some(v) = patch.status {
        out.push(("status", Value::Text(v)));
    }
    out
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn list_boxes(&self, owner: &OwnerId) -> FreezerResult<Vec<BoxRow>> {
        let conn = self.db.conn();
        let mut stmt = db_err!(conn.prepare(&format!(
            "SELECT {} FROM boxes WHERE user_id = ?1 ORDER BY id",
            BOX_COLUMNS
        )))?;
        let rows = db_err!(stmt.query_map([owner.as_str()], box_from_row))?;
        db_err!(rows.collect::<rusqlite::Result<Vec<_>>>())
    }

    async fn list_samples(&self, owner: &OwnerId) -> FreezerResult<Vec<SampleRow>> {
        let conn = self.db.conn();
        let mut stmt = db_err!(conn.prepare(&format!(
            "SELECT {} FROM samples WHERE user_id = ?1 ORDER BY id",
            SAMPLE_COLUMNS
        )))?;
        let rows = db_err!(stmt.query_map([owner.as_str()], sample_from_row))?;
        db_err!(rows.collect::<rusqlite::Result<Vec<_>>>())
    }

    async fn create_box(&self, row: NewBoxRow) -> FreezerResult<BoxRow> {
        let stored = BoxRow {
            id: self.next_id()?,
            name: row.name,
            description: row.description,
            layout: row.layout,
            user_id: row.user_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.db.conn();
        db_err!(conn.execute(
            &format!("INSERT INTO boxes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", BOX_COLUMNS),
            params![
                stored.id,
                stored.name,
                stored.description,
                stored.layout,
                stored.user_id,
                stored.created_at,
            ],
        ))?;

        tracing::debug!(box_id = %stored.id, "Inserted box row");
        Ok(stored)
    }

    async fn delete_box(&self, id: &BoxId) -> FreezerResult<()> {
        let mut conn = self.db.conn();
        let tx = db_err!(conn.transaction())?;

        db_err!(tx.execute("DELETE FROM boxes WHERE id = ?1", [id.as_str()]))?;
        let cascaded = db_err!(tx.execute(
            "UPDATE samples SET status = ?1 WHERE box_id = ?2 AND status = ?3",
            params![
                SampleStatus::Deleted.as_str(),
                id.as_str(),
                SampleStatus::Active.as_str(),
            ],
        ))?;
        db_err!(tx.commit())?;

        tracing::debug!(box_id = %id, cascaded, "Deleted box row");
        Ok(())
    }

    async fn create_sample(&self, row: NewSampleRow) -> FreezerResult<SampleRow> {
        let stored = row.into_row(self.next_id()?, Utc::now().to_rfc3339());

        let conn = self.db.conn();
        db_err!(conn.execute(
            &format!(
                "INSERT INTO samples ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                SAMPLE_COLUMNS
            ),
            params![
                stored.id,
                stored.box_id,
                stored.position,
                stored.sample_number,
                stored.name,
                stored.size,
                stored.coating,
                stored.solvent,
                stored.molar_conc,
                stored.mass_conc,
                stored.notes,
                stored.status,
                stored.user_id,
                stored.created_at,
            ],
        ))?;

        tracing::debug!(sample_id = %stored.id, "Inserted sample row");
        Ok(stored)
    }

    async fn update_sample(&self, id: &SampleId, patch: SampleRowPatch) -> FreezerResult<()> {
        let assignments = patch_assignments(patch);
        if assignments.is_empty() {
            return Ok(());
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE samples SET {} WHERE id = ?{}",
            set_clause,
            assignments.len() + 1
        );

        let mut values: Vec<Value> = assignments.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Text(id.to_string()));

        let conn = self.db.conn();
        let changed = db_err!(conn.execute(&sql, rusqlite::params_from_iter(values)))?;
        if changed == 0 {
            return Err(FreezerError::NotFound(format!("sample {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::rows::NO_POSITION;

    fn store() -> SqliteStore {
        SqliteStore::new(Database::open_in_memory().unwrap())
    }

    fn new_sample(box_id: &str, position: i64) -> NewSampleRow {
        NewSampleRow {
            box_id: Some(box_id.into()),
            position,
            sample_number: "S1".into(),
            name: "NaYF4".into(),
            size: None,
            coating: "Oleic acid (OA)".into(),
            solvent: "Cyclohexane".into(),
            molar_conc: Some(0.2),
            mass_conc: None,
            notes: Some("first batch".into()),
            status: "active".into(),
            user_id: "alice".into(),
        }
    }

    async fn create_box(store: &SqliteStore, name: &str) -> BoxRow {
        store
            .create_box(NewBoxRow {
                name: name.into(),
                description: None,
                layout: "10x10".into(),
                user_id: "alice".into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_box_round_trip() {
        let store = store();
        let created = create_box(&store, "A1").await;
        let rows = store.list_boxes(&OwnerId::new("alice")).await.unwrap();
        assert_eq!(rows, vec![created]);
        assert!(store.list_boxes(&OwnerId::new("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sample_round_trip_and_patch() {
        let store = store();
        let b = create_box(&store, "A1").await;
        let s = store.create_sample(new_sample(&b.id, 4)).await.unwrap();

        store
            .update_sample(
                &SampleId::from(s.id.clone()),
                SampleRowPatch {
                    notes: Some(None),
                    molar_conc: Some(Some(0.4)),
                    ..SampleRowPatch::default()
                },
            )
            .await
            .unwrap();

        let rows = store.list_samples(&OwnerId::new("alice")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].notes, None);
        assert_eq!(rows[0].molar_conc, Some(0.4));
        assert_eq!(rows[0].position, 4);
        assert_eq!(rows[0].created_at, s.created_at);
    }

    #[tokio::test]
    async fn test_archive_patch_writes_null_box() {
        let store = store();
        let b = create_box(&store, "A1").await;
        let s = store.create_sample(new_sample(&b.id, 0)).await.unwrap();

        store
            .update_sample(&SampleId::from(s.id), SampleRowPatch::archive())
            .await
            .unwrap();

        let row = &store.list_samples(&OwnerId::new("alice")).await.unwrap()[0];
        assert_eq!(row.box_id, None);
        assert_eq!(row.position, NO_POSITION);
        assert_eq!(row.status, "archived");
    }

    #[tokio::test]
    async fn test_delete_box_cascades_to_active_samples() {
        let store = store();
        let doomed = create_box(&store, "A1").await;
        let kept = create_box(&store, "A2").await;
        store.create_sample(new_sample(&doomed.id, 0)).await.unwrap();
        store.create_sample(new_sample(&doomed.id, 1)).await.unwrap();
        store.create_sample(new_sample(&kept.id, 0)).await.unwrap();

        store.delete_box(&BoxId::from(doomed.id.clone())).await.unwrap();

        let owner = OwnerId::new("alice");
        let boxes = store.list_boxes(&owner).await.unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].id, kept.id);

        let samples = store.list_samples(&owner).await.unwrap();
        let deleted = samples.iter().filter(|r| r.status == "deleted").count();
        assert_eq!(deleted, 2);
        assert!(
            samples
                .iter()
                .filter(|r| r.box_id.as_deref() == Some(kept.id.as_str()))
                .all(|r| r.status == "active")
        );
    }

    #[tokio::test]
    async fn test_update_unknown_sample_is_not_found() {
        let store = store();
        let err = store
            .update_sample(&SampleId::new("missing"), SampleRowPatch::archive())
            .await
            .unwrap_err();
        assert!(matches!(err, FreezerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_patch_is_noop() {
        let store = store();
        assert!(
            store
                .update_sample(&SampleId::new("missing"), SampleRowPatch::default())
                .await
                .is_ok()
        );
    }
}
