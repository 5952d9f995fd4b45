use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use colab_core::error::Error;
use colab_core::traits::CollaborationStore;
use colab_core::types::{
    ActionItem, Collaboration, CollaborationId, EventMetadata, ExtractedAnswer, NewCollaboration,
};

const COLUMNS: &str = "id, title, description, participants, answers, action_items, event, \
                       transcript, created_at, updated_at";

/// Postgres-backed implementation of [`CollaborationStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new `PgStore` with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CollaborationStore for PgStore {
    async fn list_all(&self) -> Result<Vec<Collaboration>, Error> {
        let rows = sqlx::query_as::<_, CollaborationRow>(&format!(
            "SELECT {COLUMNS} FROM collaborations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: CollaborationId) -> Result<Option<Collaboration>, Error> {
        let row = sqlx::query_as::<_, CollaborationRow>(&format!(
            "SELECT {COLUMNS} FROM collaborations WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, params: NewCollaboration) -> Result<Collaboration, Error> {
        params.validate()?;

        let NewCollaboration {
            title,
            description,
            participants,
            answers,
            action_items,
            event,
            transcript,
        } = params;

        let id = uuid::Uuid::new_v4();
        let row = sqlx::query_as::<_, CollaborationRow>(&format!(
            r"
            INSERT INTO collaborations
                (id, title, description, participants, answers, action_items, event, transcript)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&title)
        .bind(&description)
        .bind(&participants)
        .bind(Json(answers))
        .bind(Json(action_items))
        .bind(event.map(Json))
        .bind(&transcript)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        tracing::debug!(collaboration_id = %id, "collaboration created");

        Ok(row.into())
    }
}

// --- Internal row types for sqlx ---

#[derive(sqlx::FromRow)]
struct CollaborationRow {
    id: uuid::Uuid,
    title: String,
    description: String,
    participants: Vec<String>,
    answers: Json<Vec<ExtractedAnswer>>,
    action_items: Json<Vec<ActionItem>>,
    event: Option<Json<EventMetadata>>,
    transcript: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CollaborationRow> for Collaboration {
    fn from(row: CollaborationRow) -> Self {
        Self {
            id: CollaborationId(row.id),
            title: row.title,
            description: row.description,
            participants: row.participants,
            answers: row.answers.0,
            action_items: row.action_items.0,
            event: row.event.map(|e| e.0),
            transcript: row.transcript,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
