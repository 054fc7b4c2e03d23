use sqlx::{types::Json, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::database::models::{OneOffSchedule, OneOffScheduleDraft, RecurringSchedule, RecurringScheduleDraft};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("schedule {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

const RECURRING_COLUMNS: &str = "id, school_name, class_name, days_of_week, start_time, end_time, expiry_date";
const ONE_OFF_COLUMNS: &str = "id, school_name, class_name, date, start_time, end_time";

/// CRUD over recurring schedules. Updates replace every field.
#[derive(Clone)]
pub struct RecurringScheduleRepository {
    pool: SqlitePool,
}

impl RecurringScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<RecurringSchedule>, ScheduleError> {
        let sql = format!("SELECT {} FROM recurring_schedules ORDER BY id", RECURRING_COLUMNS);
        Ok(sqlx::query_as::<_, RecurringSchedule>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn create(&self, draft: RecurringScheduleDraft) -> Result<RecurringSchedule, ScheduleError> {
        let fields = draft.validate().map_err(ScheduleError::MissingField)?;

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO recurring_schedules (school_name, class_name, days_of_week, start_time, end_time, expiry_date) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
            RECURRING_COLUMNS
        );
        let schedule = sqlx::query_as::<_, RecurringSchedule>(&sql)
            .bind(&fields.school_name)
            .bind(&fields.class_name)
            .bind(Json(&fields.days_of_week))
            .bind(&fields.start_time)
            .bind(&fields.end_time)
            .bind(&fields.expiry_date)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Created recurring schedule {}", schedule.id);
        Ok(schedule)
    }

    /// Replace every field of schedule `id`. The payload is validated before existence is checked.
    pub async fn update(&self, id: i64, draft: RecurringScheduleDraft) -> Result<RecurringSchedule, ScheduleError> {
        let fields = draft.validate().map_err(ScheduleError::MissingField)?;

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "UPDATE recurring_schedules SET school_name = ?, class_name = ?, days_of_week = ?, \
             start_time = ?, end_time = ?, expiry_date = ? WHERE id = ? RETURNING {}",
            RECURRING_COLUMNS
        );
        let schedule = sqlx::query_as::<_, RecurringSchedule>(&sql)
            .bind(&fields.school_name)
            .bind(&fields.class_name)
            .bind(Json(&fields.days_of_week))
            .bind(&fields.start_time)
            .bind(&fields.end_time)
            .bind(&fields.expiry_date)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ScheduleError::NotFound(id))?;
        tx.commit().await?;

        debug!("Replaced recurring schedule {}", id);
        Ok(schedule)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ScheduleError> {
        delete_row(&self.pool, "recurring_schedules", id).await
    }
}

/// CRUD over one-off schedules. Updates replace every field.
#[derive(Clone)]
pub struct OneOffScheduleRepository {
    pool: SqlitePool,
}

impl OneOffScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<OneOffSchedule>, ScheduleError> {
        let sql = format!("SELECT {} FROM one_off_schedules ORDER BY id", ONE_OFF_COLUMNS);
        Ok(sqlx::query_as::<_, OneOffSchedule>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn create(&self, draft: OneOffScheduleDraft) -> Result<OneOffSchedule, ScheduleError> {
        let fields = draft.validate().map_err(ScheduleError::MissingField)?;

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO one_off_schedules (school_name, class_name, date, start_time, end_time) \
             VALUES (?, ?, ?, ?, ?) RETURNING {}",
            ONE_OFF_COLUMNS
        );
        let schedule = sqlx::query_as::<_, OneOffSchedule>(&sql)
            .bind(&fields.school_name)
            .bind(&fields.class_name)
            .bind(&fields.date)
            .bind(&fields.start_time)
            .bind(&fields.end_time)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Created one-off schedule {}", schedule.id);
        Ok(schedule)
    }

    pub async fn update(&self, id: i64, draft: OneOffScheduleDraft) -> Result<OneOffSchedule, ScheduleError> {
        let fields = draft.validate().map_err(ScheduleError::MissingField)?;

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "UPDATE one_off_schedules SET school_name = ?, class_name = ?, date = ?, start_time = ?, end_time = ? \
             WHERE id = ? RETURNING {}",
            ONE_OFF_COLUMNS
        );
        let schedule = sqlx::query_as::<_, OneOffSchedule>(&sql)
            .bind(&fields.school_name)
            .bind(&fields.class_name)
            .bind(&fields.date)
            .bind(&fields.start_time)
            .bind(&fields.end_time)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ScheduleError::NotFound(id))?;
        tx.commit().await?;

        debug!("Replaced one-off schedule {}", id);
        Ok(schedule)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ScheduleError> {
        delete_row(&self.pool, "one_off_schedules", id).await
    }
}

async fn delete_row(pool: &SqlitePool, table: &'static str, id: i64) -> Result<(), ScheduleError> {
    let mut tx = pool.begin().await?;
    let deleted = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(ScheduleError::NotFound(id));
    }
    tx.commit().await?;

    debug!("Deleted {} row {}", table, id);
    Ok(())
}
