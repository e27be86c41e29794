//! Reservation flow
//!
//! Validates the reservation form against the store's opening hours,
//! gates the verification-code mail behind a resend cooldown, and
//! submits through the gateway. Validation failures surface before
//! anything leaves the process; server rejections of the code get
//! their own variant so the form can point at the code field.

use crate::traits::{BotVerifier, GatewayError, ReservationGateway, VerifierError};
use chrono::{Datelike, NaiveDate, NaiveTime};
use parking_lot::Mutex;
use shared::models::reservation::ReservationRequest;
use shared::models::store::Store;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Wait between verification-code mails
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Server message for a code it does not accept
const CODE_REJECTED_MESSAGE: &str = "Invalid or expired verification code";

/// Reservation flow errors
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The code must be exactly 6 digits
    #[error("Invalid verification code format")]
    InvalidVerificationCode,

    #[error("Invalid guest count")]
    InvalidGuestCount,

    #[error("Reservation date is in the past")]
    DateInPast,

    #[error("Requested time is outside opening hours")]
    OutsideOpeningHours,

    /// The server refused the verification code
    #[error("Verification code rejected")]
    CodeRejected,

    /// Another mail was requested before the cooldown ran out
    #[error("Resend cooldown active")]
    CooldownActive,

    #[error(transparent)]
    Verification(#[from] VerifierError),

    #[error("Reservation failed: {0}")]
    Failed(String),
}

impl ReservationError {
    /// Translation key of the popup, `None` for silent failures
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            ReservationError::MissingFields(_) => Some("reservation.missingFields"),
            ReservationError::InvalidVerificationCode | ReservationError::CodeRejected => {
                Some("reservation.invalidVerificationCode")
            }
            ReservationError::InvalidGuestCount
            | ReservationError::DateInPast
            | ReservationError::OutsideOpeningHours
            | ReservationError::Failed(_) => Some("reservation.errorMessage"),
            ReservationError::CooldownActive | ReservationError::Verification(_) => None,
        }
    }
}

/// Raw form input, field-for-field what the page collects
#[derive(Debug, Clone, Default)]
pub struct ReservationForm {
    pub name: String,
    pub email: String,
    pub verification_code: String,
    pub phone: String,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub time: String,
    pub guests: String,
    pub notes: String,
}

impl ReservationForm {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("verificationCode", &self.verification_code),
            ("phone", &self.phone),
            ("date", &self.date),
            ("time", &self.time),
            ("guests", &self.guests),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Validate and produce the submission payload
    ///
    /// `today` is passed in so the check has no hidden clock.
    pub fn validate(
        &self,
        store_id: &str,
        store: &Store,
        today: NaiveDate,
    ) -> Result<ReservationRequest, ReservationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ReservationError::MissingFields(missing));
        }

        if self.verification_code.len() != 6
            || !self.verification_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ReservationError::InvalidVerificationCode);
        }

        let guest_count: u32 = self
            .guests
            .parse()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(ReservationError::InvalidGuestCount)?;

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| ReservationError::DateInPast)?;
        if date < today {
            return Err(ReservationError::DateInPast);
        }

        let time = NaiveTime::parse_from_str(&self.time, "%H:%M")
            .map_err(|_| ReservationError::OutsideOpeningHours)?;
        if !within_opening_hours(store, date, time) {
            return Err(ReservationError::OutsideOpeningHours);
        }

        Ok(ReservationRequest {
            store_id: store_id.to_string(),
            guest_name: self.name.clone(),
            email: self.email.clone(),
            verification_code: self.verification_code.clone(),
            phone: self.phone.clone(),
            guest_count,
            reservation_time: format!("{}T{}:00+00:00", self.date, self.time),
            notes: self.notes.clone(),
        })
    }
}

/// Check a time against the store's window for that weekday
///
/// A day without configured hours accepts any time.
fn within_opening_hours(store: &Store, date: NaiveDate, time: NaiveTime) -> bool {
    let day = match date.weekday() {
        chrono::Weekday::Mon => "Mon",
        chrono::Weekday::Tue => "Tue",
        chrono::Weekday::Wed => "Wed",
        chrono::Weekday::Thu => "Thu",
        chrono::Weekday::Fri => "Fri",
        chrono::Weekday::Sat => "Sat",
        chrono::Weekday::Sun => "Sun",
    };

    let Some(window) = store.store_info.hours.get(day) else {
        return true;
    };
    let Some((open, close)) = window.split_once('-') else {
        return true;
    };
    let (Ok(open), Ok(close)) = (
        NaiveTime::parse_from_str(open, "%H:%M"),
        NaiveTime::parse_from_str(close, "%H:%M"),
    ) else {
        return true;
    };

    time >= open && time <= close
}

/// Resend gate for the verification mail
pub struct Cooldown {
    period: Duration,
    until: Mutex<Option<Instant>>,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(RESEND_COOLDOWN)
    }
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            until: Mutex::new(None),
        }
    }

    pub fn active(&self) -> bool {
        self.until.lock().is_some_and(|t| Instant::now() < t)
    }

    fn start(&self) {
        *self.until.lock() = Some(Instant::now() + self.period);
    }
}

/// Request a verification-code mail
///
/// Silently refuses while the cooldown runs; obtains a bot token
/// first and only starts the cooldown once the mail was accepted.
pub async fn send_verification_code(
    cooldown: &Cooldown,
    verifier: &dyn BotVerifier,
    gateway: &dyn ReservationGateway,
    email: &str,
) -> Result<(), ReservationError> {
    if email.is_empty() || cooldown.active() {
        return Err(ReservationError::CooldownActive);
    }

    let token = verifier.token("send_verification_code").await?;
    gateway
        .send_verification_code(email, &token)
        .await
        .map_err(|e| ReservationError::Failed(e.to_string()))?;

    cooldown.start();
    Ok(())
}

/// Submit a validated reservation
pub async fn create_reservation(
    gateway: &dyn ReservationGateway,
    request: &ReservationRequest,
) -> Result<(), ReservationError> {
    match gateway.create_reservation(request).await {
        Ok(()) => {
            tracing::info!(store_id = %request.store_id, "Reservation created");
            Ok(())
        }
        Err(GatewayError::Rejected(message)) if message == CODE_REJECTED_MESSAGE => {
            Err(ReservationError::CodeRejected)
        }
        Err(e) => Err(ReservationError::Failed(e.to_string())),
    }
}
