use sqlx::PgPool;

use crate::models::{Master, Persona, Role, User};

pub async fn find_user(pool: &PgPool, telegram_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
}

/// Кто пишет боту. `None`, если пользователь ещё не зарегистрирован.
pub async fn find_persona(pool: &PgPool, telegram_id: i64) -> Result<Option<Persona>, sqlx::Error> {
    let Some(user) = find_user(pool, telegram_id).await? else {
        return Ok(None);
    };

    let persona = match user.role() {
        Some(Role::MasterUser) => {
            let master = sqlx::query_as::<_, Master>("SELECT * FROM masters WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(pool)
                .await?;
            match master {
                Some(master) => Persona::Master { user, master },
                None => {
                    warn!("User {} has role master but no master profile", user.id);
                    Persona::Client(user)
                }
            }
        }
        Some(Role::Admin) => Persona::Admin(user),
        Some(Role::Client) => Persona::Client(user),
        None => {
            warn!("User {} has unknown role {:?}, treating as client", user.id, user.role);
            Persona::Client(user)
        }
    };
    Ok(Some(persona))
}

pub async fn register_client(
    pool: &PgPool,
    telegram_id: i64,
    name: &str,
    username: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (telegram_id, name, username, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (telegram_id) DO UPDATE SET name = $2, username = $3, updated_at = now()
         RETURNING *",
    )
    .bind(telegram_id)
    .bind(name)
    .bind(username)
    .bind(Role::Client.as_str())
    .fetch_one(pool)
    .await
}

pub async fn rename_user(pool: &PgPool, user_id: i32, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET name = $1, updated_at = now() WHERE id = $2")
        .bind(name)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
