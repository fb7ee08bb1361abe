use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::event::Event;
use crate::types::EventId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    /// Fails with [`StoreError::NotFound`] when the event does not exist.
    async fn update(&self, event: &Event) -> Result<(), StoreError>;

    async fn delete(&self, id: EventId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, event_name, event_date, event_time, event_location,
                                event_description, event_capacity, organizer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(&event.event_name)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(&event.event_location)
        .bind(&event.event_description)
        .bind(event.event_capacity)
        .bind(event.organizer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, event_name, event_date, event_time, event_location,
                   event_description, event_capacity, organizer_id
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn update(&self, event: &Event) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET event_name = $2, event_date = $3, event_time = $4, event_location = $5,
                event_description = $6, event_capacity = $7
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.event_name)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(&event.event_location)
        .bind(&event.event_description)
        .bind(event.event_capacity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
