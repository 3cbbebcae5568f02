use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use time::macros::format_description;
use time::{Date, Month, Time};

use crate::models::{AppointmentCard, Master, Service, StatusKind};

pub const BTN_BOOK: &str = "Записаться";
pub const BTN_MY_APPOINTMENTS: &str = "Мои записи";
pub const BTN_FAVORITES: &str = "Избранное";
pub const BTN_PROMOTIONS: &str = "Акции";
pub const BTN_RENAME: &str = "Изменить имя";
pub const BTN_SCHEDULE: &str = "Моё расписание";

/// Данные inline-кнопок. Telegram ограничивает их 64 байтами, поэтому коды короткие.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Service(i32),
    Favorite(i32),
    Unfavorite(i32),
    Master(i32),
    BackToServices,
    CalendarSelect(Date),
    CalendarMonth { month: Month, year: i32 },
    Slot(Time),
    BackToCalendar,
    Confirm,
    Abort,
    Cancel(i32),
    Review(i32),
    Rate { appointment_id: i32, rating: i16 },
    Status { appointment_id: i32, status: StatusKind },
    Ignore,
}

fn status_code(status: StatusKind) -> &'static str {
    match status {
        StatusKind::Pending => "p",
        StatusKind::Confirmed => "c",
        StatusKind::InProgress => "w",
        StatusKind::Completed => "d",
        StatusKind::Cancelled => "x",
    }
}

fn status_from_code(code: &str) -> Option<StatusKind> {
    match code {
        "p" => Some(StatusKind::Pending),
        "c" => Some(StatusKind::Confirmed),
        "w" => Some(StatusKind::InProgress),
        "d" => Some(StatusKind::Completed),
        "x" => Some(StatusKind::Cancelled),
        _ => None,
    }
}

impl Callback {
    pub fn parse(data: &str) -> Option<Callback> {
        let parts: Vec<&str> = data.split(':').collect();
        let callback = match parts.as_slice() {
            ["service", id] => Callback::Service(id.parse().ok()?),
            ["fav", id] => Callback::Favorite(id.parse().ok()?),
            ["unfav", id] => Callback::Unfavorite(id.parse().ok()?),
            ["master", id] => Callback::Master(id.parse().ok()?),
            ["back_to_services"] => Callback::BackToServices,
            ["calendar", "select", date] => {
                Callback::CalendarSelect(Date::parse(date, format_description!("[year]-[month]-[day]")).ok()?)
            }
            ["calendar", "month", month, year] => Callback::CalendarMonth {
                month: Month::try_from(month.parse::<u8>().ok()?).ok()?,
                year: year.parse().ok()?,
            },
            // Время содержит двоеточие, поэтому час и минута приходят отдельными частями.
            ["slot", hour, minute] => Callback::Slot(Time::from_hms(hour.parse().ok()?, minute.parse().ok()?, 0).ok()?),
            ["back_to_calendar"] => Callback::BackToCalendar,
            ["confirm"] => Callback::Confirm,
            ["abort"] => Callback::Abort,
            ["cancel", id] => Callback::Cancel(id.parse().ok()?),
            ["review", id] => Callback::Review(id.parse().ok()?),
            ["rate", id, rating] => Callback::Rate {
                appointment_id: id.parse().ok()?,
                rating: rating.parse().ok()?,
            },
            ["status", id, code] => Callback::Status {
                appointment_id: id.parse().ok()?,
                status: status_from_code(code)?,
            },
            ["ignore"] => Callback::Ignore,
            _ => return None,
        };
        Some(callback)
    }

    pub fn data(&self) -> String {
        match self {
            Callback::Service(id) => format!("service:{id}"),
            Callback::Favorite(id) => format!("fav:{id}"),
            Callback::Unfavorite(id) => format!("unfav:{id}"),
            Callback::Master(id) => format!("master:{id}"),
            Callback::BackToServices => "back_to_services".to_string(),
            Callback::CalendarSelect(date) => {
                format!("calendar:select:{}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
            }
            Callback::CalendarMonth { month, year } => format!("calendar:month:{}:{}", u8::from(*month), year),
            Callback::Slot(time) => format!("slot:{:02}:{:02}", time.hour(), time.minute()),
            Callback::BackToCalendar => "back_to_calendar".to_string(),
            Callback::Confirm => "confirm".to_string(),
            Callback::Abort => "abort".to_string(),
            Callback::Cancel(id) => format!("cancel:{id}"),
            Callback::Review(id) => format!("review:{id}"),
            Callback::Rate { appointment_id, rating } => format!("rate:{appointment_id}:{rating}"),
            Callback::Status { appointment_id, status } => format!("status:{appointment_id}:{}", status_code(*status)),
            Callback::Ignore => "ignore".to_string(),
        }
    }

    fn button(self, text: impl Into<String>) -> InlineKeyboardButton {
        InlineKeyboardButton::callback(text, self.data())
    }
}

pub fn format_date(date: Date) -> String {
    format!("{:02}.{:02}.{}", date.day(), u8::from(date.month()), date.year())
}

pub fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub fn client_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_BOOK)],
        vec![KeyboardButton::new(BTN_MY_APPOINTMENTS), KeyboardButton::new(BTN_FAVORITES)],
        vec![KeyboardButton::new(BTN_PROMOTIONS), KeyboardButton::new(BTN_RENAME)],
    ])
    .resize_keyboard()
}

pub fn master_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_SCHEDULE)],
        vec![KeyboardButton::new(BTN_RENAME)],
    ])
    .resize_keyboard()
}

pub fn services_markup(services: &[Service]) -> InlineKeyboardMarkup {
    let rows = services
        .iter()
        .map(|service| {
            vec![
                Callback::Service(service.id).button(format!("{} — {} ₽", service.name, service.price)),
                Callback::Favorite(service.id).button("⭐"),
            ]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn favorites_markup(services: &[Service]) -> InlineKeyboardMarkup {
    let rows = services
        .iter()
        .map(|service| {
            vec![
                Callback::Service(service.id).button(service.name.clone()),
                Callback::Unfavorite(service.id).button("✖️"),
            ]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn masters_markup(masters: &[Master]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for master in masters {
        let label = if master.specialization.is_empty() {
            master.name.clone()
        } else {
            format!("{} · {}", master.name, master.specialization)
        };
        let mut row = vec![Callback::Master(master.id).button(label)];
        if let Some(photo) = master.photo() {
            row.push(InlineKeyboardButton::url("📷 Фото", photo));
        }
        rows.push(row);
    }
    rows.push(vec![Callback::BackToServices.button("⟵ Назад к услугам")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Январь",
        Month::February => "Февраль",
        Month::March => "Март",
        Month::April => "Апрель",
        Month::May => "Май",
        Month::June => "Июнь",
        Month::July => "Июль",
        Month::August => "Август",
        Month::September => "Сентябрь",
        Month::October => "Октябрь",
        Month::November => "Ноябрь",
        Month::December => "Декабрь",
    }
}

/// Календарь на месяц. Прошедшие дни неактивны, в прошлые месяцы листать нельзя.
pub fn generate_calendar(month: Month, year: i32, today: Date) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    keyboard.push(vec![Callback::Ignore.button(format!("{} {}", month_name(month), year))]);
    keyboard.push(
        ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"]
            .iter()
            .map(|day| Callback::Ignore.button(*day))
            .collect(),
    );

    let Ok(first) = Date::from_calendar_date(year, month, 1) else {
        return InlineKeyboardMarkup::new(keyboard);
    };
    let offset = first.weekday().number_days_from_monday() as usize;
    let days = month.length(year);

    let mut row: Vec<InlineKeyboardButton> = (0..offset).map(|_| Callback::Ignore.button(" ")).collect();
    for day in 1..=days {
        let button = match Date::from_calendar_date(year, month, day) {
            Ok(date) if date >= today => Callback::CalendarSelect(date).button(day.to_string()),
            _ => Callback::Ignore.button("·"),
        };
        row.push(button);
        if row.len() == 7 {
            keyboard.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        while row.len() < 7 {
            row.push(Callback::Ignore.button(" "));
        }
        keyboard.push(row);
    }

    let (prev_month, prev_year) = if month == Month::January { (Month::December, year - 1) } else { (month.previous(), year) };
    let (next_month, next_year) = if month == Month::December { (Month::January, year + 1) } else { (month.next(), year) };
    let can_go_back = (prev_year, u8::from(prev_month)) >= (today.year(), u8::from(today.month()));

    let mut navigation = Vec::new();
    if can_go_back {
        navigation.push(Callback::CalendarMonth { month: prev_month, year: prev_year }.button("⬅️"));
    }
    navigation.push(Callback::CalendarMonth { month: next_month, year: next_year }.button("➡️"));
    keyboard.push(navigation);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn time_slots_markup(slots: &[Time]) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = slots
        .chunks(3)
        .map(|chunk| chunk.iter().map(|slot| Callback::Slot(*slot).button(format_time(*slot))).collect())
        .collect();
    keyboard.push(vec![Callback::BackToCalendar.button("⟵ Назад к выбору даты")]);
    InlineKeyboardMarkup::new(keyboard)
}

pub fn confirm_markup() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        Callback::Confirm.button("✅ Записаться"),
        Callback::Abort.button("❌ Отмена"),
    ]])
}

pub fn rating_markup(appointment_id: i32) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![(1..=5)
        .map(|rating| Callback::Rate { appointment_id, rating }.button("⭐".repeat(rating as usize)))
        .collect::<Vec<_>>()])
}

pub fn appointment_text(card: &AppointmentCard) -> String {
    let status = card.status_kind().map(|k| k.label()).or(card.status.as_deref()).unwrap_or("—");
    let price = card.price_paid.map(|p| format!("{p} ₽")).unwrap_or_else(|| "—".to_string());
    format!(
        "📅 {} {}\n💅 {}\n👩 Мастер: {}\n👤 Клиент: {}\n💰 {}\n{}",
        format_date(card.appointment_date),
        format_time(card.appointment_time),
        card.service_name.as_deref().unwrap_or("услуга удалена"),
        card.master_name.as_deref().unwrap_or("—"),
        card.client_name.as_deref().unwrap_or("—"),
        price,
        status
    )
}

/// Кнопки клиента под записью: отмена до начала работы, отзыв после выполнения.
pub fn client_actions(card: &AppointmentCard) -> Option<InlineKeyboardMarkup> {
    let kind = card.status_kind()?;
    let mut row = Vec::new();
    if kind.can_become(StatusKind::Cancelled) {
        row.push(Callback::Cancel(card.id).button("❌ Отменить"));
    }
    if kind == StatusKind::Completed {
        row.push(Callback::Review(card.id).button("✍️ Оставить отзыв"));
    }
    (!row.is_empty()).then(|| InlineKeyboardMarkup::new(vec![row]))
}

/// Кнопки мастера: следующие допустимые статусы.
pub fn master_actions(card: &AppointmentCard) -> Option<InlineKeyboardMarkup> {
    let kind = card.status_kind()?;
    let row: Vec<InlineKeyboardButton> = [
        (StatusKind::Confirmed, "✅ Подтвердить"),
        (StatusKind::InProgress, "💅 Начать"),
        (StatusKind::Completed, "🏁 Завершить"),
        (StatusKind::Cancelled, "❌ Отменить"),
    ]
    .into_iter()
    .filter(|(next, _)| kind.can_become(*next))
    .map(|(next, text)| Callback::Status { appointment_id: card.id, status: next }.button(text))
    .collect();
    (!row.is_empty()).then(|| InlineKeyboardMarkup::new(vec![row]))
}
