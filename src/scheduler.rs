use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use time::{Date, Duration, OffsetDateTime, Time};

use crate::config::Config;
use crate::error::{BookingError, BookingResult};
use crate::models::{Appointment, AppointmentDraft, ConflictWindow, Service, StatusKind};

/// Скидка постоянного клиента: больше 10 записей за последние 182 дня.
pub const LOYALTY_WINDOW_DAYS: i64 = 182;
pub const LOYALTY_THRESHOLD: i64 = 10;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Is there an appointment in `window`, other than `exclude`, whose status holds the slot?
    async fn has_active_conflict(&self, window: ConflictWindow, exclude: Option<i32>) -> BookingResult<bool>;

    /// Inserts a draft without `id`, updates one with it. The conflict check is
    /// repeated atomically with the write; a hit returns `DoubleBooking` and writes nothing.
    async fn write(&self, draft: &AppointmentDraft) -> BookingResult<Appointment>;

    async fn find_appointment(&self, id: i32) -> BookingResult<Option<Appointment>>;

    async fn find_service(&self, id: i32) -> BookingResult<Option<Service>>;

    async fn count_created_since(&self, client_id: i32, since: OffsetDateTime) -> BookingResult<i64>;

    /// Start times held by active appointments of a master on a date.
    async fn active_times(&self, master_id: i32, date: Date) -> BookingResult<Vec<Time>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub open_hour: u8,
    pub close_hour: u8,
    pub slot_minutes: u16,
}

impl From<&Config> for WorkingHours {
    fn from(config: &Config) -> Self {
        WorkingHours {
            open_hour: config.open_hour,
            close_hour: config.close_hour,
            slot_minutes: config.slot_minutes,
        }
    }
}

impl WorkingHours {
    /// Начала слотов, при которых услуга заканчивается не позже закрытия.
    pub fn candidate_starts(&self, duration_minutes: i32) -> Vec<Time> {
        let open = i32::from(self.open_hour) * 60;
        let close = i32::from(self.close_hour) * 60;
        let step = i32::from(self.slot_minutes.max(1));
        let duration = duration_minutes.max(1);

        let mut starts = Vec::new();
        let mut minute = open;
        while minute + duration <= close && minute < 24 * 60 {
            if let Ok(start) = Time::from_hms((minute / 60) as u8, (minute % 60) as u8, 0) {
                starts.push(start);
            }
            minute += step;
        }
        starts
    }
}

/// Charge for a service given how many appointments the client created in the loyalty window.
pub fn price(service: &Service, client_history: i64) -> Decimal {
    let charged = if client_history > LOYALTY_THRESHOLD {
        service.price * Decimal::new(9, 1)
    } else {
        service.price
    };
    let mut charged = charged.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    charged.rescale(2);
    charged
}

fn double_booking(window: ConflictWindow) -> BookingError {
    warn!(
        "Double booking rejected: master {} on {} at {}",
        window.master_id, window.date, window.time
    );
    BookingError::DoubleBooking
}

#[derive(Clone)]
pub struct Scheduler<S> {
    store: S,
    hours: WorkingHours,
}

impl<S: AppointmentStore> Scheduler<S> {
    pub fn new(store: S, hours: WorkingHours) -> Self {
        Scheduler { store, hours }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn validate(&self, draft: &AppointmentDraft) -> BookingResult<()> {
        let Some(window) = draft.conflict_window() else {
            return Ok(());
        };
        if self.store.has_active_conflict(window, draft.id).await? {
            return Err(double_booking(window));
        }
        Ok(())
    }

    pub async fn save(&self, draft: AppointmentDraft) -> BookingResult<Appointment> {
        self.validate(&draft).await?;
        if draft.date.is_none() {
            return Err(BookingError::MissingField("date"));
        }
        if draft.time.is_none() {
            return Err(BookingError::MissingField("time"));
        }

        // write() repeats the check under a lock and may still lose the slot
        let saved = match (self.store.write(&draft).await, draft.conflict_window()) {
            (Err(BookingError::DoubleBooking), Some(window)) => return Err(double_booking(window)),
            (result, _) => result?,
        };
        info!(
            "Appointment {} saved: master {:?}, {} {}, status {:?}",
            saved.id, saved.master_id, saved.appointment_date, saved.appointment_time, saved.status
        );
        Ok(saved)
    }

    /// Новая запись от клиента: статус Pending, цена фиксируется на момент записи.
    pub async fn book(&self, mut draft: AppointmentDraft, client_id: i32, now: OffsetDateTime) -> BookingResult<Appointment> {
        draft.client_id.get_or_insert(client_id);
        if draft.status.is_none() {
            draft.status = Some(StatusKind::Pending.as_str().to_string());
        }

        let service_id = draft.service_id.ok_or(BookingError::MissingField("service"))?;
        let service = self
            .store
            .find_service(service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound(service_id))?;

        let since = now - Duration::days(LOYALTY_WINDOW_DAYS);
        let history = self.store.count_created_since(client_id, since).await?;
        let charged = price(&service, history);
        debug!("Client {} has {} appointments since {}, charging {}", client_id, history, since, charged);
        draft.price_paid = Some(charged);

        self.save(draft).await
    }

    pub async fn set_status(&self, appointment_id: i32, status: StatusKind) -> BookingResult<Appointment> {
        let appointment = self
            .store
            .find_appointment(appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(appointment_id))?;

        let mut draft = appointment.to_draft();
        draft.status = Some(status.as_str().to_string());
        self.save(draft).await
    }

    pub async fn free_slots(&self, master_id: i32, date: Date, duration_minutes: i32) -> BookingResult<Vec<Time>> {
        let taken = self.store.active_times(master_id, date).await?;
        Ok(self
            .hours
            .candidate_starts(duration_minutes)
            .into_iter()
            .filter(|start| !taken.contains(start))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::sync::Arc;
    use time::macros::{date, datetime, time};
    use tokio::sync::Mutex;

    use crate::models::ACTIVE_STATUSES;

    #[derive(Default)]
    struct Tables {
        appointments: Vec<Appointment>,
        services: HashMap<i32, Service>,
        created_at: HashMap<i32, OffsetDateTime>,
        next_id: i32,
        // has_active_conflict answers as if the slot were still free
        stale_reads: bool,
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        tables: Arc<Mutex<Tables>>,
    }

    fn holds(appointment: &Appointment, window: ConflictWindow, exclude: Option<i32>) -> bool {
        appointment.master_id == Some(window.master_id)
            && appointment.appointment_date == window.date
            && appointment.appointment_time == window.time
            && Some(appointment.id) != exclude
            && appointment.status.as_deref().is_some_and(|name| ACTIVE_STATUSES.contains(&name))
    }

    #[async_trait]
    impl AppointmentStore for MemoryStore {
        async fn has_active_conflict(&self, window: ConflictWindow, exclude: Option<i32>) -> BookingResult<bool> {
            let tables = self.tables.lock().await;
            Ok(!tables.stale_reads && tables.appointments.iter().any(|a| holds(a, window, exclude)))
        }

        async fn write(&self, draft: &AppointmentDraft) -> BookingResult<Appointment> {
            let mut tables = self.tables.lock().await;
            if let Some(window) = draft.conflict_window() {
                if tables.appointments.iter().any(|a| holds(a, window, draft.id)) {
                    return Err(BookingError::DoubleBooking);
                }
            }
            if let Some(name) = &draft.status {
                if StatusKind::parse(name).is_none() {
                    return Err(BookingError::UnknownStatus(name.clone()));
                }
            }

            let row = |id: i32| Appointment {
                id,
                client_id: draft.client_id,
                master_id: draft.master_id,
                service_id: draft.service_id,
                appointment_date: draft.date.expect("date checked by scheduler"),
                appointment_time: draft.time.expect("time checked by scheduler"),
                status: draft.status.clone(),
                price_paid: draft.price_paid,
            };

            match draft.id {
                None => {
                    tables.next_id += 1;
                    let saved = row(tables.next_id);
                    tables.created_at.insert(saved.id, OffsetDateTime::now_utc());
                    tables.appointments.push(saved.clone());
                    Ok(saved)
                }
                Some(id) => {
                    let existing = tables
                        .appointments
                        .iter_mut()
                        .find(|a| a.id == id)
                        .ok_or(BookingError::AppointmentNotFound(id))?;
                    *existing = row(id);
                    Ok(existing.clone())
                }
            }
        }

        async fn find_appointment(&self, id: i32) -> BookingResult<Option<Appointment>> {
            let tables = self.tables.lock().await;
            Ok(tables.appointments.iter().find(|a| a.id == id).cloned())
        }

        async fn find_service(&self, id: i32) -> BookingResult<Option<Service>> {
            Ok(self.tables.lock().await.services.get(&id).cloned())
        }

        async fn count_created_since(&self, client_id: i32, since: OffsetDateTime) -> BookingResult<i64> {
            let tables = self.tables.lock().await;
            Ok(tables
                .appointments
                .iter()
                .filter(|a| a.client_id == Some(client_id))
                .filter(|a| tables.created_at.get(&a.id).is_some_and(|at| *at >= since))
                .count() as i64)
        }

        async fn active_times(&self, master_id: i32, date: Date) -> BookingResult<Vec<Time>> {
            let tables = self.tables.lock().await;
            Ok(tables
                .appointments
                .iter()
                .filter(|a| a.master_id == Some(master_id) && a.appointment_date == date)
                .filter(|a| a.status_kind().is_some_and(|kind| kind.blocks_slot()))
                .map(|a| a.appointment_time)
                .collect())
        }
    }

    const MASTER: i32 = 1;
    const MANICURE: i32 = 10;
    const NOW: OffsetDateTime = datetime!(2024-05-20 12:00 UTC);

    fn service(id: i32, price: Decimal) -> Service {
        Service {
            id,
            name: "Маникюр".to_string(),
            description: String::new(),
            price,
            duration_minutes: 60,
        }
    }

    fn hours() -> WorkingHours {
        WorkingHours { open_hour: 10, close_hour: 14, slot_minutes: 60 }
    }

    async fn scheduler() -> Scheduler<MemoryStore> {
        let store = MemoryStore::default();
        store
            .tables
            .lock()
            .await
            .services
            .insert(MANICURE, service(MANICURE, Decimal::new(10000, 2)));
        Scheduler::new(store, hours())
    }

    fn draft(client_id: i32, status: StatusKind) -> AppointmentDraft {
        AppointmentDraft {
            client_id: Some(client_id),
            master_id: Some(MASTER),
            service_id: Some(MANICURE),
            date: Some(date!(2024 - 06 - 01)),
            time: Some(time!(10:00)),
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }

    async fn seed_history(store: &MemoryStore, client_id: i32, count: usize, created_at: OffsetDateTime) {
        let mut tables = store.tables.lock().await;
        for day in 0..count {
            tables.next_id += 1;
            let id = tables.next_id;
            tables.appointments.push(Appointment {
                id,
                client_id: Some(client_id),
                master_id: Some(99),
                service_id: Some(MANICURE),
                appointment_date: date!(2024 - 01 - 01) + Duration::days(day as i64),
                appointment_time: time!(12:00),
                status: Some(StatusKind::Completed.as_str().to_string()),
                price_paid: None,
            });
            tables.created_at.insert(id, created_at);
        }
    }

    #[tokio::test]
    async fn confirmed_slot_rejects_new_pending_booking() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();

        let result = scheduler.book(draft(2, StatusKind::Pending), 2, NOW).await;

        assert_matches!(result, Err(BookingError::DoubleBooking));
        assert_eq!(scheduler.store().tables.lock().await.appointments.len(), 1);
    }

    #[tokio::test]
    async fn in_progress_slot_also_blocks() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::InProgress)).await.unwrap();

        assert_matches!(scheduler.validate(&draft(2, StatusKind::Pending)).await, Err(BookingError::DoubleBooking));
    }

    #[tokio::test]
    async fn cancelled_or_completed_slot_can_be_reused() {
        for previous in [StatusKind::Cancelled, StatusKind::Completed, StatusKind::Pending] {
            let scheduler = scheduler().await;
            scheduler.save(draft(1, previous)).await.unwrap();

            let booked = scheduler.book(draft(2, StatusKind::Pending), 2, NOW).await.unwrap();
            assert_eq!(booked.client_id, Some(2));
            assert_eq!(booked.status.as_deref(), Some("Pending"));
        }
    }

    #[tokio::test]
    async fn slot_frees_up_after_cancellation() {
        let scheduler = scheduler().await;
        let first = scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();
        assert_matches!(scheduler.save(draft(2, StatusKind::Confirmed)).await, Err(BookingError::DoubleBooking));

        scheduler.set_status(first.id, StatusKind::Cancelled).await.unwrap();

        let second = scheduler.save(draft(2, StatusKind::Confirmed)).await.unwrap();
        assert_ne!(second.id, first.id);
    }

    #[tokio::test]
    async fn different_time_or_master_does_not_conflict() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();

        let mut later = draft(2, StatusKind::Confirmed);
        later.time = Some(time!(10:30));
        scheduler.save(later).await.unwrap();

        let mut other_master = draft(3, StatusKind::Confirmed);
        other_master.master_id = Some(MASTER + 1);
        scheduler.save(other_master).await.unwrap();
    }

    #[tokio::test]
    async fn updating_appointment_with_its_own_slot_is_allowed() {
        let scheduler = scheduler().await;
        let saved = scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();

        let updated = scheduler.save(saved.to_draft()).await.unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);

        let started = scheduler.set_status(saved.id, StatusKind::InProgress).await.unwrap();
        assert_eq!(started.status_kind(), Some(StatusKind::InProgress));
    }

    #[tokio::test]
    async fn confirming_second_pending_in_taken_slot_fails() {
        let scheduler = scheduler().await;
        let first = scheduler.book(draft(1, StatusKind::Pending), 1, NOW).await.unwrap();
        let second = scheduler.book(draft(2, StatusKind::Pending), 2, NOW).await.unwrap();

        scheduler.set_status(first.id, StatusKind::Confirmed).await.unwrap();
        assert_matches!(
            scheduler.set_status(second.id, StatusKind::Confirmed).await,
            Err(BookingError::DoubleBooking)
        );
        let stored = scheduler.store().find_appointment(second.id).await.unwrap().unwrap();
        assert_eq!(stored.status_kind(), Some(StatusKind::Pending));
    }

    #[tokio::test]
    async fn concurrent_confirmed_bookings_leave_one_active() {
        let scheduler = scheduler().await;
        let (a, b) = tokio::join!(
            scheduler.save(draft(1, StatusKind::Confirmed)),
            scheduler.save(draft(2, StatusKind::Confirmed)),
        );
        assert!(a.is_ok() != b.is_ok());

        let tables = scheduler.store().tables.lock().await;
        let active = tables
            .appointments
            .iter()
            .filter(|a| a.status_kind().is_some_and(|k| k.blocks_slot()))
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn slot_taken_after_validation_is_rejected_on_write() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();
        scheduler.store().tables.lock().await.stale_reads = true;

        assert_matches!(
            scheduler.save(draft(2, StatusKind::Confirmed)).await,
            Err(BookingError::DoubleBooking)
        );
        assert_eq!(scheduler.store().tables.lock().await.appointments.len(), 1);
    }

    #[tokio::test]
    async fn missing_master_skips_conflict_check() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();

        let mut unassigned = draft(2, StatusKind::Confirmed);
        unassigned.master_id = None;
        assert!(scheduler.validate(&unassigned).await.is_ok());
    }

    #[tokio::test]
    async fn save_requires_date_and_time() {
        let scheduler = scheduler().await;
        let mut incomplete = draft(1, StatusKind::Pending);
        incomplete.time = None;
        assert_matches!(scheduler.save(incomplete).await, Err(BookingError::MissingField("time")));
    }

    #[tokio::test]
    async fn unknown_status_is_not_written() {
        let scheduler = scheduler().await;
        let mut odd = draft(1, StatusKind::Pending);
        odd.status = Some("Ожидает".to_string());
        assert_matches!(scheduler.save(odd).await, Err(BookingError::UnknownStatus(name)) if name == "Ожидает");
        assert!(scheduler.store().tables.lock().await.appointments.is_empty());
    }

    #[tokio::test]
    async fn eleven_recent_appointments_earn_discount() {
        let scheduler = scheduler().await;
        seed_history(scheduler.store(), 7, 11, NOW - Duration::days(30)).await;

        let booked = scheduler.book(draft(7, StatusKind::Pending), 7, NOW).await.unwrap();
        assert_eq!(booked.price_paid.map(|p| p.to_string()), Some("90.00".to_string()));
    }

    #[tokio::test]
    async fn ten_recent_appointments_pay_full_price() {
        let scheduler = scheduler().await;
        seed_history(scheduler.store(), 7, 10, NOW - Duration::days(30)).await;

        let booked = scheduler.book(draft(7, StatusKind::Pending), 7, NOW).await.unwrap();
        assert_eq!(booked.price_paid, Some(Decimal::new(10000, 2)));
    }

    #[tokio::test]
    async fn old_appointments_do_not_count_towards_discount() {
        let scheduler = scheduler().await;
        seed_history(scheduler.store(), 7, 20, NOW - Duration::days(LOYALTY_WINDOW_DAYS + 1)).await;

        let booked = scheduler.book(draft(7, StatusKind::Pending), 7, NOW).await.unwrap();
        assert_eq!(booked.price_paid, Some(Decimal::new(10000, 2)));
    }

    #[tokio::test]
    async fn booking_defaults_client_and_status() {
        let scheduler = scheduler().await;
        let mut bare = draft(0, StatusKind::Pending);
        bare.client_id = None;
        bare.status = None;

        let booked = scheduler.book(bare, 5, NOW).await.unwrap();
        assert_eq!(booked.client_id, Some(5));
        assert_eq!(booked.status_kind(), Some(StatusKind::Pending));
    }

    #[tokio::test]
    async fn booking_unknown_service_fails() {
        let scheduler = scheduler().await;
        let mut wrong = draft(1, StatusKind::Pending);
        wrong.service_id = Some(404);
        assert_matches!(scheduler.book(wrong, 1, NOW).await, Err(BookingError::ServiceNotFound(404)));
    }

    #[tokio::test]
    async fn stored_price_survives_list_price_change() {
        let scheduler = scheduler().await;
        let booked = scheduler.book(draft(1, StatusKind::Pending), 1, NOW).await.unwrap();

        scheduler
            .store()
            .tables
            .lock()
            .await
            .services
            .insert(MANICURE, service(MANICURE, Decimal::new(15000, 2)));

        let confirmed = scheduler.set_status(booked.id, StatusKind::Confirmed).await.unwrap();
        assert_eq!(confirmed.price_paid, Some(Decimal::new(10000, 2)));
    }

    #[test]
    fn price_is_rounded_to_cents() {
        let odd = service(1, Decimal::new(1999, 2));
        assert_eq!(price(&odd, 11).to_string(), "17.99");
        assert_eq!(price(&odd, 0).to_string(), "19.99");

        let whole = service(2, Decimal::from(100));
        assert_eq!(price(&whole, 11).to_string(), "90.00");
        assert_eq!(price(&whole, 10).to_string(), "100.00");
    }

    #[test]
    fn candidate_starts_fit_before_closing() {
        let starts = hours().candidate_starts(90);
        assert_eq!(starts, vec![time!(10:00), time!(11:00), time!(12:00)]);

        let half_hourly = WorkingHours { slot_minutes: 30, ..hours() };
        assert_eq!(half_hourly.candidate_starts(240), vec![time!(10:00)]);
        assert!(half_hourly.candidate_starts(300).is_empty());
    }

    #[tokio::test]
    async fn free_slots_hide_active_start_times() {
        let scheduler = scheduler().await;
        scheduler.save(draft(1, StatusKind::Confirmed)).await.unwrap();

        let mut pending = draft(2, StatusKind::Pending);
        pending.time = Some(time!(11:00));
        scheduler.save(pending).await.unwrap();

        let slots = scheduler.free_slots(MASTER, date!(2024 - 06 - 01), 60).await.unwrap();
        assert_eq!(slots, vec![time!(11:00), time!(12:00), time!(13:00)]);
    }
}
