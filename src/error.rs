#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The master already has an active appointment in this slot.
    #[error("the master is already booked for this date and time")]
    DoubleBooking,

    #[error("appointment draft has no {0}")]
    MissingField(&'static str),

    #[error("service {0} not found")]
    ServiceNotFound(i32),

    #[error("appointment {0} not found")]
    AppointmentNotFound(i32),

    #[error("appointment status {0:?} is not defined")]
    UnknownStatus(String),

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i16),

    #[error("only the client of a completed appointment can review it")]
    ReviewNotAllowed,

    #[error("appointment {0} already has a review")]
    AlreadyReviewed(i32),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type BookingResult<T> = Result<T, BookingError>;
