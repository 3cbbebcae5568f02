use sqlx::PgPool;

use crate::db::is_unique_violation;
use crate::error::{BookingError, BookingResult};
use crate::models::{Appointment, Review, StatusKind};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Отзыв оставляет только клиент записи и только после её выполнения.
pub fn check_review(appointment: &Appointment, client_id: i32, rating: i16) -> BookingResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(BookingError::InvalidRating(rating));
    }
    if appointment.client_id != Some(client_id) || appointment.status_kind() != Some(StatusKind::Completed) {
        return Err(BookingError::ReviewNotAllowed);
    }
    Ok(())
}

pub async fn leave_review(
    pool: &PgPool,
    appointment: &Appointment,
    client_id: i32,
    text: &str,
    rating: i16,
) -> BookingResult<Review> {
    check_review(appointment, client_id, rating)?;

    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (appointment_id, client_id, text, rating)
         VALUES ($1, $2, $3, $4)
         RETURNING id, rating",
    )
    .bind(appointment.id)
    .bind(client_id)
    .bind(text)
    .bind(rating)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            BookingError::AlreadyReviewed(appointment.id)
        } else {
            BookingError::Database(err)
        }
    })
}
