//! Reservation Model

use serde::{Deserialize, Serialize};

/// Create reservation payload for `POST /reservation/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub store_id: String,
    pub guest_name: String,
    pub email: String,
    /// 6-digit code from the verification mail
    pub verification_code: String,
    pub phone: String,
    pub guest_count: u32,
    /// RFC 3339 timestamp with offset (e.g. "2026-08-06T19:30:00+00:00")
    pub reservation_time: String,
    #[serde(default)]
    pub notes: String,
}
