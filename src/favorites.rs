use sqlx::PgPool;

use crate::models::Service;

/// Возвращает `false`, если услуга уже была в избранном.
pub async fn add_favorite(pool: &PgPool, client_id: i32, service_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO favorites (client_id, service_id)
         VALUES ($1, $2)
         ON CONFLICT (client_id, service_id) DO NOTHING",
    )
    .bind(client_id)
    .bind(service_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_favorite(pool: &PgPool, client_id: i32, service_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE client_id = $1 AND service_id = $2")
        .bind(client_id)
        .bind(service_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn client_favorites(pool: &PgPool, client_id: i32) -> Result<Vec<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(
        "SELECT s.* FROM services s
         JOIN favorites f ON f.service_id = s.id
         WHERE f.client_id = $1
         ORDER BY f.created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}
