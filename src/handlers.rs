use std::{collections::HashMap, error::Error};

use chrono::{Datelike, Local, Timelike};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, MaybeInaccessibleMessage, Message, MessageId, ReplyMarkup},
};
use time::{Date, Month, OffsetDateTime, Time};
use tokio::sync::Mutex;

use crate::accounts::{find_persona, register_client, rename_user};
use crate::catalog::{active_promotions, find_master, find_service, get_masters_by_service, get_services};
use crate::error::BookingError;
use crate::favorites::{add_favorite, client_favorites, remove_favorite};
use crate::keyboards::{
    self, appointment_text, client_actions, confirm_markup, favorites_markup, format_date, format_time,
    generate_calendar, master_actions, masters_markup, rating_markup, services_markup, time_slots_markup, Callback,
};
use crate::models::{AppointmentDraft, Persona, StatusKind};
use crate::reviews::leave_review;
use crate::scheduler::{AppointmentStore, Scheduler};
use crate::store::PgStore;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

const CLIENT_HISTORY_LIMIT: i64 = 10;
const MASTER_SCHEDULE_LIMIT: usize = 20;

// Шаги диалога
#[derive(Debug, Clone, Copy, PartialEq)]
enum UserStep {
    Registration,
    MainMenu,
    ChangeName,
    SelectingService,
    SelectingMaster,
    SelectingDate,
    SelectingTime,
    ConfirmingBooking,
    WritingReview,
    MasterMenu,
}

// Сессия пользователя
pub struct UserSession {
    step: UserStep,
    persona: Option<Persona>,
    service_id: Option<i32>,
    master_id: Option<i32>,
    selected_date: Option<Date>,
    selected_time: Option<Time>,
    review: Option<(i32, i16)>,
}

impl UserSession {
    fn new() -> Self {
        UserSession {
            step: UserStep::MainMenu,
            persona: None,
            service_id: None,
            master_id: None,
            selected_date: None,
            selected_time: None,
            review: None,
        }
    }

    fn reset_booking(&mut self) {
        self.service_id = None;
        self.master_id = None;
        self.selected_date = None;
        self.selected_time = None;
    }

    fn user_id(&self) -> Option<i32> {
        self.persona.as_ref().map(|p| p.user().id)
    }

    fn draft(&self) -> AppointmentDraft {
        AppointmentDraft {
            master_id: self.master_id,
            service_id: self.service_id,
            date: self.selected_date,
            time: self.selected_time,
            ..Default::default()
        }
    }
}

pub struct BotState {
    pub scheduler: Scheduler<PgStore>,
    sessions: Mutex<HashMap<i64, UserSession>>,
}

impl BotState {
    pub fn new(scheduler: Scheduler<PgStore>) -> Self {
        BotState {
            scheduler,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn store(&self) -> &PgStore {
        self.scheduler.store()
    }
}

/// Сегодняшняя дата по местному времени салона.
fn today() -> Date {
    let now = Local::now();
    Month::try_from(now.month() as u8)
        .ok()
        .and_then(|month| Date::from_calendar_date(now.year(), month, now.day() as u8).ok())
        .unwrap_or_else(|| OffsetDateTime::now_utc().date())
}

pub async fn handle_message(bot: Bot, msg: Message, state: &BotState) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let mut sessions = state.sessions.lock().await;
    let session = sessions.entry(chat_id.0).or_insert_with(UserSession::new);

    // Новая сессия (в том числе после перезапуска бота) начинается с /start.
    if text == "/start" || (session.persona.is_none() && session.step != UserStep::Registration) {
        return start(&bot, chat_id, state, session).await;
    }

    match text {
        keyboards::BTN_BOOK if session.persona.is_some() => {
            session.reset_booking();
            session.step = UserStep::SelectingService;
            show_services(&bot, chat_id, state).await?;
            return Ok(());
        }
        keyboards::BTN_MY_APPOINTMENTS if session.persona.is_some() => {
            show_client_appointments(&bot, chat_id, state, session).await?;
            return Ok(());
        }
        keyboards::BTN_FAVORITES if session.persona.is_some() => {
            show_favorites(&bot, chat_id, state, session).await?;
            return Ok(());
        }
        keyboards::BTN_PROMOTIONS => {
            show_promotions(&bot, chat_id, state).await?;
            return Ok(());
        }
        keyboards::BTN_RENAME if session.persona.is_some() => {
            session.step = UserStep::ChangeName;
            bot.send_message(chat_id, "Введите новое имя:").await?;
            return Ok(());
        }
        keyboards::BTN_SCHEDULE => {
            if let Some(Persona::Master { master, .. }) = &session.persona {
                show_master_schedule(&bot, chat_id, state, master.id).await?;
                return Ok(());
            }
        }
        _ => {}
    }

    match session.step {
        UserStep::Registration => {
            let name = text.trim();
            if name.is_empty() {
                bot.send_message(chat_id, "Пожалуйста, введите имя:").await?;
                return Ok(());
            }
            let user = register_client(state.store().pool(), chat_id.0, name, msg.chat.username()).await?;
            info!("Registered client {} (telegram {})", user.id, chat_id.0);
            session.persona = Some(Persona::Client(user));
            session.step = UserStep::MainMenu;
            bot.send_message(chat_id, format!("{}, добро пожаловать в салон! Чем могу помочь?", name))
                .reply_markup(ReplyMarkup::Keyboard(keyboards::client_menu()))
                .await?;
        }

        UserStep::ChangeName => {
            let name = text.trim();
            if let Some(user_id) = session.user_id() {
                if !name.is_empty() {
                    rename_user(state.store().pool(), user_id, name).await?;
                    session.persona = find_persona(state.store().pool(), chat_id.0).await?;
                    bot.send_message(chat_id, "Имя обновлено!").await?;
                }
            }
            session.step = menu_step(session);
        }

        UserStep::WritingReview => {
            let (Some((appointment_id, rating)), Some(client_id)) = (session.review.take(), session.user_id()) else {
                session.step = menu_step(session);
                return Ok(());
            };
            session.step = menu_step(session);

            let Some(appointment) = state.store().find_appointment(appointment_id).await? else {
                bot.send_message(chat_id, "Запись не найдена").await?;
                return Ok(());
            };
            match leave_review(state.store().pool(), &appointment, client_id, text.trim(), rating).await {
                Ok(review) => {
                    info!("Review {} left for appointment {}", review.id, appointment_id);
                    let stars = "⭐".repeat(review.rating.max(0) as usize);
                    bot.send_message(chat_id, format!("Спасибо за отзыв! {stars} 💖")).await?;
                }
                Err(BookingError::AlreadyReviewed(_)) => {
                    bot.send_message(chat_id, "Вы уже оставили отзыв к этой записи").await?;
                }
                Err(BookingError::ReviewNotAllowed) | Err(BookingError::InvalidRating(_)) => {
                    bot.send_message(chat_id, "Отзыв можно оставить только к выполненной записи").await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        UserStep::MasterMenu => {
            bot.send_message(chat_id, "Выберите действие в меню")
                .reply_markup(ReplyMarkup::Keyboard(keyboards::master_menu()))
                .await?;
        }

        UserStep::MainMenu
        | UserStep::SelectingService
        | UserStep::SelectingMaster
        | UserStep::SelectingDate
        | UserStep::SelectingTime
        | UserStep::ConfirmingBooking => {
            bot.send_message(chat_id, "Воспользуйтесь кнопками меню 👇")
                .reply_markup(ReplyMarkup::Keyboard(keyboards::client_menu()))
                .await?;
        }
    }

    Ok(())
}

fn menu_step(session: &UserSession) -> UserStep {
    match session.persona {
        Some(Persona::Master { .. }) => UserStep::MasterMenu,
        Some(_) => UserStep::MainMenu,
        None => UserStep::Registration,
    }
}

async fn start(bot: &Bot, chat_id: ChatId, state: &BotState, session: &mut UserSession) -> HandlerResult {
    session.reset_booking();
    session.review = None;
    session.persona = find_persona(state.store().pool(), chat_id.0).await?;
    session.step = menu_step(session);

    match &session.persona {
        Some(Persona::Master { master, .. }) => {
            debug!("Chat {} is master {}", chat_id.0, master.id);
            bot.send_message(chat_id, format!("Здравствуйте, {}! Выберите действие", master.name))
                .reply_markup(ReplyMarkup::Keyboard(keyboards::master_menu()))
                .await?;
        }
        Some(persona) => {
            bot.send_message(chat_id, format!("Привет, {}! Я бот салона. Как я могу помочь?", persona.user().name))
                .reply_markup(ReplyMarkup::Keyboard(keyboards::client_menu()))
                .await?;
        }
        None => {
            bot.send_message(chat_id, "Привет! Я бот салона. Пожалуйста, введите своё имя:")
                .await?;
        }
    }
    Ok(())
}

pub async fn handle_callback_query(bot: Bot, q: CallbackQuery, state: &BotState) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message.as_ref().and_then(MaybeInaccessibleMessage::regular_message) else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    let Some(callback) = q.data.as_deref().and_then(Callback::parse) else {
        warn!("Unknown callback data {:?} from chat {}", q.data, chat_id.0);
        return Ok(());
    };

    let mut sessions = state.sessions.lock().await;
    let session = sessions.entry(chat_id.0).or_insert_with(UserSession::new);
    if session.persona.is_none() {
        session.persona = find_persona(state.store().pool(), chat_id.0).await?;
        session.step = menu_step(session);
    }
    let Some(user_id) = session.user_id() else {
        bot.send_message(chat_id, "Сначала зарегистрируйтесь: отправьте /start").await?;
        return Ok(());
    };

    match callback {
        Callback::Ignore => {}

        Callback::Service(service_id) => {
            let Some(service) = find_service(state.store().pool(), service_id).await? else {
                bot.edit_message_text(chat_id, message.id, "Услуга больше недоступна").await?;
                return Ok(());
            };
            session.reset_booking();
            session.service_id = Some(service_id);
            session.step = UserStep::SelectingMaster;

            let masters = get_masters_by_service(state.store().pool(), service_id).await?;
            let header = format!(
                "💅 {}\n{}\n💰 {} ₽ · ⏱ {} мин",
                service.name, service.description, service.price, service.duration_minutes
            );
            if masters.is_empty() {
                bot.edit_message_text(chat_id, message.id, format!("{}\n\nНет мастеров для этой услуги 😢", header))
                    .await?;
            } else {
                bot.edit_message_text(chat_id, message.id, format!("{}\n\nВыберите мастера:", header))
                    .reply_markup(masters_markup(&masters))
                    .await?;
            }
        }

        Callback::Favorite(service_id) => {
            let text = if add_favorite(state.store().pool(), user_id, service_id).await? {
                "⭐ Услуга добавлена в избранное"
            } else {
                "Эта услуга уже в избранном"
            };
            bot.send_message(chat_id, text).await?;
        }

        Callback::Unfavorite(service_id) => {
            if !remove_favorite(state.store().pool(), user_id, service_id).await? {
                bot.send_message(chat_id, "Эта услуга уже удалена из избранного").await?;
                return Ok(());
            }
            let services = client_favorites(state.store().pool(), user_id).await?;
            if services.is_empty() {
                bot.edit_message_text(chat_id, message.id, "В избранном пусто").await?;
            } else {
                bot.edit_message_reply_markup(chat_id, message.id)
                    .reply_markup(favorites_markup(&services))
                    .await?;
            }
        }

        Callback::BackToServices => {
            session.reset_booking();
            session.step = UserStep::SelectingService;
            let services = get_services(state.store().pool()).await?;
            bot.edit_message_text(chat_id, message.id, "Выберите услугу 💅\n\n⭐ — добавить в избранное")
                .reply_markup(services_markup(&services))
                .await?;
        }

        Callback::Master(master_id) => {
            session.master_id = Some(master_id);
            session.selected_date = None;
            session.selected_time = None;
            session.step = UserStep::SelectingDate;
            let today = today();
            bot.edit_message_text(chat_id, message.id, "Выберите дату 📅")
                .reply_markup(generate_calendar(today.month(), today.year(), today))
                .await?;
        }

        Callback::CalendarMonth { month, year } => {
            bot.edit_message_reply_markup(chat_id, message.id)
                .reply_markup(generate_calendar(month, year, today()))
                .await?;
        }

        Callback::CalendarSelect(date) => {
            if date < today() {
                bot.send_message(chat_id, "Нельзя выбрать дату в прошлом. Пожалуйста, выберите другую дату.")
                    .await?;
                return Ok(());
            }
            session.selected_date = Some(date);
            session.selected_time = None;
            session.step = UserStep::SelectingTime;
            show_time_slots(&bot, chat_id, message.id, state, session).await?;
        }

        Callback::BackToCalendar => {
            session.selected_time = None;
            session.step = UserStep::SelectingDate;
            let today = today();
            let shown = session.selected_date.unwrap_or(today);
            bot.edit_message_text(chat_id, message.id, "Выберите дату 📅")
                .reply_markup(generate_calendar(shown.month(), shown.year(), today))
                .await?;
        }

        Callback::Slot(time) => {
            session.selected_time = Some(time);
            session.step = UserStep::ConfirmingBooking;
            let (Some(service_id), Some(master_id), Some(date)) =
                (session.service_id, session.master_id, session.selected_date)
            else {
                bot.edit_message_text(chat_id, message.id, "Выбор устарел, начните запись заново").await?;
                return Ok(());
            };
            let service = find_service(state.store().pool(), service_id).await?;
            let master = find_master(state.store().pool(), master_id).await?;
            let summary = format!(
                "Проверьте запись:\n\n💅 {}\n👩 Мастер: {}\n📅 {} в {}",
                service.map(|s| s.name).unwrap_or_default(),
                master.map(|m| m.name).unwrap_or_default(),
                format_date(date),
                format_time(time)
            );
            bot.edit_message_text(chat_id, message.id, summary)
                .reply_markup(confirm_markup())
                .await?;
        }

        Callback::Confirm => {
            confirm_booking(&bot, chat_id, message.id, state, session, user_id).await?;
        }

        Callback::Abort => {
            session.reset_booking();
            session.step = menu_step(session);
            bot.edit_message_text(chat_id, message.id, "Запись отменена").await?;
        }

        Callback::Cancel(appointment_id) => {
            let owned = state
                .store()
                .find_appointment(appointment_id)
                .await?
                .filter(|a| a.client_id == Some(user_id));
            let Some(appointment) = owned else {
                bot.send_message(chat_id, "Запись не найдена").await?;
                return Ok(());
            };
            if !appointment.status_kind().is_some_and(|k| k.can_become(StatusKind::Cancelled)) {
                bot.send_message(chat_id, "Эту запись уже нельзя отменить").await?;
                return Ok(());
            }
            match state.scheduler.set_status(appointment_id, StatusKind::Cancelled).await {
                Ok(_) => {
                    info!("Client {} cancelled appointment {}", user_id, appointment_id);
                    refresh_card(&bot, chat_id, message.id, state, appointment_id, false).await?;
                }
                Err(BookingError::DoubleBooking) => {
                    bot.send_message(
                        chat_id,
                        "Не удалось отменить: на это время у мастера уже есть подтверждённая запись. Обратитесь к администратору.",
                    )
                    .await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Callback::Review(appointment_id) => {
            bot.edit_message_reply_markup(chat_id, message.id)
                .reply_markup(rating_markup(appointment_id))
                .await?;
        }

        Callback::Rate { appointment_id, rating } => {
            session.review = Some((appointment_id, rating));
            session.step = UserStep::WritingReview;
            bot.send_message(chat_id, format!("Оценка {} ⭐. Напишите пару слов о визите:", rating))
                .await?;
        }

        Callback::Status { appointment_id, status } => {
            change_status(&bot, chat_id, message.id, state, session, appointment_id, status).await?;
        }
    }

    Ok(())
}

async fn confirm_booking(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    session: &mut UserSession,
    client_id: i32,
) -> HandlerResult {
    let draft = session.draft();
    if draft.conflict_window().is_none() || draft.service_id.is_none() {
        bot.edit_message_text(chat_id, message_id, "Выбор устарел, начните запись заново").await?;
        return Ok(());
    }

    match state.scheduler.book(draft, client_id, OffsetDateTime::now_utc()).await {
        Ok(appointment) => {
            info!("Client {} booked appointment {}", client_id, appointment.id);
            session.reset_booking();
            session.step = menu_step(session);
            let price = appointment
                .price_paid
                .map(|p| format!("{} ₽", p))
                .unwrap_or_default();
            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "✅ Вы записаны на {} в {}!\n💰 К оплате: {}\n\nМастер подтвердит запись, статус можно посмотреть в «{}».",
                    format_date(appointment.appointment_date),
                    format_time(appointment.appointment_time),
                    price,
                    keyboards::BTN_MY_APPOINTMENTS
                ),
            )
            .await?;

            if let Err(e) = notify_master(bot, state, appointment.id).await {
                error!("Failed to notify master about appointment {}: {}", appointment.id, e);
            }
        }
        Err(BookingError::DoubleBooking) => {
            session.selected_time = None;
            session.step = UserStep::SelectingTime;
            bot.send_message(chat_id, "😔 Это время уже занято. Выберите другое:").await?;
            show_time_slots(bot, chat_id, message_id, state, session).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn change_status(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    session: &UserSession,
    appointment_id: i32,
    status: StatusKind,
) -> HandlerResult {
    let Some(appointment) = state.store().find_appointment(appointment_id).await? else {
        bot.send_message(chat_id, "Запись не найдена").await?;
        return Ok(());
    };
    let allowed = match &session.persona {
        Some(Persona::Master { master, .. }) => appointment.master_id == Some(master.id),
        Some(Persona::Admin(_)) => true,
        _ => false,
    };
    if !allowed || !appointment.status_kind().is_some_and(|k| k.can_become(status)) {
        bot.send_message(chat_id, "Это действие недоступно").await?;
        return Ok(());
    }

    match state.scheduler.set_status(appointment_id, status).await {
        Ok(updated) => {
            info!("Appointment {} is now {:?}", updated.id, updated.status);
            refresh_card(bot, chat_id, message_id, state, appointment_id, true).await?;
        }
        Err(BookingError::DoubleBooking) => {
            bot.send_message(chat_id, "На это время у вас уже есть подтверждённая запись").await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn refresh_card(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    appointment_id: i32,
    for_master: bool,
) -> HandlerResult {
    let Some(card) = state.store().appointment_card(appointment_id).await? else {
        return Ok(());
    };
    let actions = if for_master { master_actions(&card) } else { client_actions(&card) };
    let request = bot.edit_message_text(chat_id, message_id, appointment_text(&card));
    match actions {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

async fn show_services(bot: &Bot, chat_id: ChatId, state: &BotState) -> HandlerResult {
    let services = get_services(state.store().pool()).await?;
    if services.is_empty() {
        bot.send_message(chat_id, "Список услуг пока пуст").await?;
        return Ok(());
    }
    bot.send_message(chat_id, "Выберите услугу 💅\n\n⭐ — добавить в избранное")
        .reply_markup(ReplyMarkup::InlineKeyboard(services_markup(&services)))
        .await?;
    Ok(())
}

async fn show_time_slots(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    session: &UserSession,
) -> HandlerResult {
    let (Some(service_id), Some(master_id), Some(date)) = (session.service_id, session.master_id, session.selected_date)
    else {
        bot.edit_message_text(chat_id, message_id, "Выбор устарел, начните запись заново").await?;
        return Ok(());
    };
    let Some(service) = find_service(state.store().pool(), service_id).await? else {
        bot.edit_message_text(chat_id, message_id, "Услуга больше недоступна").await?;
        return Ok(());
    };

    let mut slots = state.scheduler.free_slots(master_id, date, service.duration_minutes).await?;
    if date == today() {
        let now = Local::now();
        let now = Time::from_hms(now.hour() as u8, now.minute() as u8, 0).unwrap_or(Time::MIDNIGHT);
        slots.retain(|slot| *slot > now);
    }

    let text = if slots.is_empty() {
        format!("На {} нет свободного времени", format_date(date))
    } else {
        format!("Свободное время на {}:", format_date(date))
    };
    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(time_slots_markup(&slots))
        .await?;
    Ok(())
}

async fn show_client_appointments(bot: &Bot, chat_id: ChatId, state: &BotState, session: &UserSession) -> HandlerResult {
    let Some(client_id) = session.user_id() else {
        return Ok(());
    };
    let cards = state.store().client_appointments(client_id, CLIENT_HISTORY_LIMIT).await?;
    if cards.is_empty() {
        bot.send_message(chat_id, "У вас пока нет записей").await?;
        return Ok(());
    }
    for card in &cards {
        let request = bot.send_message(chat_id, appointment_text(card));
        match client_actions(card) {
            Some(markup) => request.reply_markup(ReplyMarkup::InlineKeyboard(markup)).await?,
            None => request.await?,
        };
    }
    Ok(())
}

async fn show_master_schedule(bot: &Bot, chat_id: ChatId, state: &BotState, master_id: i32) -> HandlerResult {
    let cards = state.store().master_upcoming(master_id, today()).await?;
    let active: Vec<_> = cards
        .iter()
        .filter(|card| card.status_kind() != Some(StatusKind::Cancelled))
        .take(MASTER_SCHEDULE_LIMIT)
        .collect();
    if active.is_empty() {
        bot.send_message(chat_id, "Предстоящих записей нет").await?;
        return Ok(());
    }
    for card in active {
        let request = bot.send_message(chat_id, appointment_text(card));
        match master_actions(card) {
            Some(markup) => request.reply_markup(ReplyMarkup::InlineKeyboard(markup)).await?,
            None => request.await?,
        };
    }
    Ok(())
}

async fn show_favorites(bot: &Bot, chat_id: ChatId, state: &BotState, session: &UserSession) -> HandlerResult {
    let Some(client_id) = session.user_id() else {
        return Ok(());
    };
    let services = client_favorites(state.store().pool(), client_id).await?;
    if services.is_empty() {
        bot.send_message(chat_id, "В избранном пусто. Добавить услугу можно кнопкой ⭐ в списке услуг.")
            .await?;
        return Ok(());
    }
    bot.send_message(chat_id, "⭐ Избранные услуги:")
        .reply_markup(ReplyMarkup::InlineKeyboard(favorites_markup(&services)))
        .await?;
    Ok(())
}

async fn show_promotions(bot: &Bot, chat_id: ChatId, state: &BotState) -> HandlerResult {
    let today = today();
    let promotions = active_promotions(state.store().pool(), today).await?;
    if promotions.is_empty() {
        bot.send_message(chat_id, "Сейчас акций нет").await?;
        return Ok(());
    }
    let text = promotions
        .iter()
        .map(|p| format!("🎁 {}\n{}\nдо {}", p.title, p.description, format_date(p.end_date)))
        .collect::<Vec<_>>()
        .join("\n\n");
    bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn notify_master(bot: &Bot, state: &BotState, appointment_id: i32) -> HandlerResult {
    let Some(telegram_id) = state.store().master_chat(appointment_id).await? else {
        debug!("Master of appointment {} has no telegram account", appointment_id);
        return Ok(());
    };
    let Some(card) = state.store().appointment_card(appointment_id).await? else {
        return Ok(());
    };

    let request = bot.send_message(ChatId(telegram_id), format!("🆕 Новая запись!\n\n{}", appointment_text(&card)));
    match master_actions(&card) {
        Some(markup) => request.reply_markup(ReplyMarkup::InlineKeyboard(markup)).await?,
        None => request.await?,
    };
    Ok(())
}
