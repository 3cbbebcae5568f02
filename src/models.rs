use rust_decimal::Decimal;
use sqlx::FromRow;
use time::{Date, Time};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    MasterUser,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "client" => Some(Role::Client),
            "master" => Some(Role::MasterUser),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::MasterUser => "master",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Пользователь вместе с данными, которые есть только у его роли.
#[derive(Debug, Clone)]
pub enum Persona {
    Client(User),
    Master { user: User, master: Master },
    Admin(User),
}

impl Persona {
    pub fn user(&self) -> &User {
        match self {
            Persona::Client(user) | Persona::Admin(user) => user,
            Persona::Master { user, .. } => user,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct Master {
    pub id: i32,
    pub name: String,
    pub specialization: String,
    pub photo_url: Option<String>,
}

impl Master {
    /// Ссылка на фото, если она заполнена и корректна.
    pub fn photo(&self) -> Option<Url> {
        self.photo_url.as_deref().and_then(|raw| Url::parse(raw).ok())
    }
}

/// Известные названия статусов. В базе статус хранится строкой, и логика
/// конфликтов сравнивает именно названия.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

/// Statuses that hold a master's slot.
pub const ACTIVE_STATUSES: [&str; 2] = [StatusKind::Confirmed.as_str(), StatusKind::InProgress.as_str()];

impl StatusKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Pending => "Pending",
            StatusKind::Confirmed => "Confirmed",
            StatusKind::InProgress => "In progress",
            StatusKind::Completed => "Completed",
            StatusKind::Cancelled => "Cancelled",
        }
    }

    pub fn parse(name: &str) -> Option<StatusKind> {
        [
            StatusKind::Pending,
            StatusKind::Confirmed,
            StatusKind::InProgress,
            StatusKind::Completed,
            StatusKind::Cancelled,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Pending => "🆕 Ожидает подтверждения",
            StatusKind::Confirmed => "✅ Подтверждена",
            StatusKind::InProgress => "💅 В работе",
            StatusKind::Completed => "✅ Выполнена",
            StatusKind::Cancelled => "❌ Отменена",
        }
    }

    pub fn blocks_slot(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.as_str())
    }

    /// Pending → Confirmed → In progress → Completed; Cancelled from Pending or Confirmed.
    pub fn can_become(&self, next: StatusKind) -> bool {
        matches!(
            (self, next),
            (StatusKind::Pending, StatusKind::Confirmed)
                | (StatusKind::Confirmed, StatusKind::InProgress)
                | (StatusKind::InProgress, StatusKind::Completed)
                | (StatusKind::Pending, StatusKind::Cancelled)
                | (StatusKind::Confirmed, StatusKind::Cancelled)
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Appointment {
    pub id: i32,
    pub client_id: Option<i32>,
    pub master_id: Option<i32>,
    pub service_id: Option<i32>,
    pub appointment_date: Date,
    pub appointment_time: Time,
    pub status: Option<String>,
    pub price_paid: Option<Decimal>,
}

impl Appointment {
    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.as_deref().and_then(StatusKind::parse)
    }

    pub fn to_draft(&self) -> AppointmentDraft {
        AppointmentDraft {
            id: Some(self.id),
            client_id: self.client_id,
            master_id: self.master_id,
            service_id: self.service_id,
            date: Some(self.appointment_date),
            time: Some(self.appointment_time),
            status: self.status.clone(),
            price_paid: self.price_paid,
        }
    }
}

/// Значения записи до сохранения. `id` задан только при редактировании.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentDraft {
    pub id: Option<i32>,
    pub client_id: Option<i32>,
    pub master_id: Option<i32>,
    pub service_id: Option<i32>,
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub status: Option<String>,
    pub price_paid: Option<Decimal>,
}

impl AppointmentDraft {
    pub fn conflict_window(&self) -> Option<ConflictWindow> {
        Some(ConflictWindow {
            master_id: self.master_id?,
            date: self.date?,
            time: self.time?,
        })
    }
}

/// (master, date, time): the key active bookings must not share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    pub master_id: i32,
    pub date: Date,
    pub time: Time,
}

/// Запись с именами для показа в боте.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentCard {
    pub id: i32,
    pub appointment_date: Date,
    pub appointment_time: Time,
    pub status: Option<String>,
    pub price_paid: Option<Decimal>,
    pub service_name: Option<String>,
    pub master_name: Option<String>,
    pub client_name: Option<String>,
}

impl AppointmentCard {
    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.as_deref().and_then(StatusKind::parse)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i32,
    pub rating: i16,
}

#[derive(Debug, Clone, FromRow)]
pub struct Promotion {
    pub title: String,
    pub description: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl Promotion {
    pub fn is_active(&self, today: Date) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn promotion(start_date: Date, end_date: Date) -> Promotion {
        Promotion {
            title: "Весенний маникюр".to_string(),
            description: String::new(),
            start_date,
            end_date,
        }
    }

    #[test]
    fn promotion_is_active_on_both_boundaries() {
        let promo = promotion(date!(2024 - 03 - 01), date!(2024 - 03 - 31));
        assert!(promo.is_active(date!(2024 - 03 - 01)));
        assert!(promo.is_active(date!(2024 - 03 - 15)));
        assert!(promo.is_active(date!(2024 - 03 - 31)));
        assert!(!promo.is_active(date!(2024 - 02 - 29)));
        assert!(!promo.is_active(date!(2024 - 04 - 01)));
    }

    #[test]
    fn only_confirmed_and_in_progress_block_a_slot() {
        assert!(StatusKind::Confirmed.blocks_slot());
        assert!(StatusKind::InProgress.blocks_slot());
        assert!(!StatusKind::Pending.blocks_slot());
        assert!(!StatusKind::Completed.blocks_slot());
        assert!(!StatusKind::Cancelled.blocks_slot());
    }

    #[test]
    fn status_names_round_trip_through_parse() {
        assert_eq!(StatusKind::parse("In progress"), Some(StatusKind::InProgress));
        assert_eq!(StatusKind::parse("in progress"), None);
        assert_eq!(StatusKind::parse("Cancelled"), Some(StatusKind::Cancelled));
    }

    #[test]
    fn cancel_is_only_offered_before_work_starts() {
        assert!(StatusKind::Pending.can_become(StatusKind::Cancelled));
        assert!(StatusKind::Confirmed.can_become(StatusKind::Cancelled));
        assert!(!StatusKind::InProgress.can_become(StatusKind::Cancelled));
        assert!(!StatusKind::Completed.can_become(StatusKind::Cancelled));
        assert!(!StatusKind::Pending.can_become(StatusKind::Completed));
    }

    #[test]
    fn conflict_window_needs_master_date_and_time() {
        let mut draft = AppointmentDraft {
            master_id: Some(3),
            date: Some(date!(2024 - 06 - 01)),
            ..Default::default()
        };
        assert_eq!(draft.conflict_window(), None);

        draft.time = Some(time!(10:00));
        assert_eq!(
            draft.conflict_window(),
            Some(ConflictWindow { master_id: 3, date: date!(2024 - 06 - 01), time: time!(10:00) })
        );
    }

    #[test]
    fn role_column_maps_to_closed_set() {
        assert_eq!(Role::parse("master"), Some(Role::MasterUser));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn broken_photo_url_is_ignored() {
        let mut master = Master {
            id: 1,
            name: "Анна".to_string(),
            specialization: "Маникюр".to_string(),
            photo_url: Some("not a url".to_string()),
        };
        assert!(master.photo().is_none());
        master.photo_url = Some("https://example.com/anna.jpg".to_string());
        assert_eq!(master.photo().map(|u| u.to_string()), Some("https://example.com/anna.jpg".to_string()));
    }
}
