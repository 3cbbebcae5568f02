use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use time::{Date, OffsetDateTime, Time};

use crate::catalog;
use crate::error::{BookingError, BookingResult};
use crate::models::{
    Appointment, AppointmentCard, AppointmentDraft, ConflictWindow, Service, ACTIVE_STATUSES,
};
use crate::scheduler::AppointmentStore;

const APPOINTMENT_SELECT: &str = "
    SELECT a.id, a.client_id, a.master_id, a.service_id,
           a.appointment_date, a.appointment_time,
           s.name AS status, a.price_paid
    FROM appointments a
    LEFT JOIN appointment_statuses s ON s.id = a.status_id";

const CARD_SELECT: &str = "
    SELECT a.id, a.appointment_date, a.appointment_time,
           st.name AS status, a.price_paid,
           sv.name AS service_name, m.name AS master_name, u.name AS client_name
    FROM appointments a
    LEFT JOIN appointment_statuses st ON st.id = a.status_id
    LEFT JOIN services sv ON sv.id = a.service_id
    LEFT JOIN masters m ON m.id = a.master_id
    LEFT JOIN users u ON u.id = a.client_id";

fn active_status_names() -> Vec<String> {
    ACTIVE_STATUSES.iter().map(|name| name.to_string()).collect()
}

async fn active_conflict<'e, E: PgExecutor<'e>>(
    executor: E,
    window: ConflictWindow,
    exclude: Option<i32>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT 1
            FROM appointments a
            JOIN appointment_statuses s ON s.id = a.status_id
            WHERE a.master_id = $1
              AND a.appointment_date = $2
              AND a.appointment_time = $3
              AND s.name = ANY($4)
              AND ($5::INTEGER IS NULL OR a.id <> $5)
        )",
    )
    .bind(window.master_id)
    .bind(window.date)
    .bind(window.time)
    .bind(active_status_names())
    .bind(exclude)
    .fetch_one(executor)
    .await
}

async fn fetch_appointment<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<Option<Appointment>, sqlx::Error> {
    let sql = format!("{APPOINTMENT_SELECT} WHERE a.id = $1");
    sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Записи клиента, новые сверху.
    pub async fn client_appointments(&self, client_id: i32, limit: i64) -> Result<Vec<AppointmentCard>, sqlx::Error> {
        let sql = format!(
            "{CARD_SELECT} WHERE a.client_id = $1
             ORDER BY a.appointment_date DESC, a.appointment_time DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AppointmentCard>(&sql)
            .bind(client_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Предстоящие записи мастера начиная с `from`.
    pub async fn master_upcoming(&self, master_id: i32, from: Date) -> Result<Vec<AppointmentCard>, sqlx::Error> {
        let sql = format!(
            "{CARD_SELECT} WHERE a.master_id = $1 AND a.appointment_date >= $2
             ORDER BY a.appointment_date, a.appointment_time"
        );
        sqlx::query_as::<_, AppointmentCard>(&sql)
            .bind(master_id)
            .bind(from)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn appointment_card(&self, id: i32) -> Result<Option<AppointmentCard>, sqlx::Error> {
        let sql = format!("{CARD_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, AppointmentCard>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Telegram-чат мастера записи, если мастер привязан к аккаунту.
    pub async fn master_chat(&self, appointment_id: i32) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT u.telegram_id
             FROM appointments a
             JOIN masters m ON m.id = a.master_id
             JOIN users u ON u.id = m.user_id
             WHERE a.id = $1",
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await
        .map(Option::flatten)
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn has_active_conflict(&self, window: ConflictWindow, exclude: Option<i32>) -> BookingResult<bool> {
        Ok(active_conflict(&self.pool, window, exclude).await?)
    }

    async fn write(&self, draft: &AppointmentDraft) -> BookingResult<Appointment> {
        let date = draft.date.ok_or(BookingError::MissingField("date"))?;
        let time = draft.time.ok_or(BookingError::MissingField("time"))?;

        let mut tx = self.pool.begin().await?;

        // Блокируем строку мастера: записи к одному мастеру идут по очереди,
        // и повторная проверка ниже видит всё, что успели закоммитить до нас.
        if let Some(master_id) = draft.master_id {
            sqlx::query("SELECT id FROM masters WHERE id = $1 FOR UPDATE")
                .bind(master_id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(window) = draft.conflict_window() {
            if active_conflict(&mut *tx, window, draft.id).await? {
                return Err(BookingError::DoubleBooking);
            }
        }

        let status_id: Option<i32> = match &draft.status {
            Some(name) => Some(
                sqlx::query_scalar("SELECT id FROM appointment_statuses WHERE name = $1")
                    .bind(name)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| BookingError::UnknownStatus(name.clone()))?,
            ),
            None => None,
        };

        let id: i32 = match draft.id {
            None => {
                sqlx::query_scalar(
                    "INSERT INTO appointments
                        (client_id, master_id, service_id, appointment_date, appointment_time, status_id, price_paid)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING id",
                )
                .bind(draft.client_id)
                .bind(draft.master_id)
                .bind(draft.service_id)
                .bind(date)
                .bind(time)
                .bind(status_id)
                .bind(draft.price_paid)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(id) => sqlx::query_scalar(
                "UPDATE appointments
                 SET client_id = $2, master_id = $3, service_id = $4,
                     appointment_date = $5, appointment_time = $6,
                     status_id = $7, price_paid = $8, updated_at = now()
                 WHERE id = $1
                 RETURNING id",
            )
            .bind(id)
            .bind(draft.client_id)
            .bind(draft.master_id)
            .bind(draft.service_id)
            .bind(date)
            .bind(time)
            .bind(status_id)
            .bind(draft.price_paid)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BookingError::AppointmentNotFound(id))?,
        };

        let saved = fetch_appointment(&mut *tx, id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(id))?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_appointment(&self, id: i32) -> BookingResult<Option<Appointment>> {
        Ok(fetch_appointment(&self.pool, id).await?)
    }

    async fn find_service(&self, id: i32) -> BookingResult<Option<Service>> {
        Ok(catalog::find_service(&self.pool, id).await?)
    }

    async fn count_created_since(&self, client_id: i32, since: OffsetDateTime) -> BookingResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE client_id = $1 AND created_at >= $2")
                .bind(client_id)
                .bind(since)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn active_times(&self, master_id: i32, date: Date) -> BookingResult<Vec<Time>> {
        Ok(sqlx::query_scalar(
            "SELECT a.appointment_time
             FROM appointments a
             JOIN appointment_statuses s ON s.id = a.status_id
             WHERE a.master_id = $1 AND a.appointment_date = $2 AND s.name = ANY($3)
             ORDER BY a.appointment_time",
        )
        .bind(master_id)
        .bind(date)
        .bind(active_status_names())
        .fetch_all(&self.pool)
        .await?)
    }
}
