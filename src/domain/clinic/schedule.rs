//! Calendar records: slot dates and times, appointments, booking outcomes.
//!
//! `SlotDate` and `SlotTime` only guarantee the textual shape
//! (`YYYY-MM-DD`, 24-hour `HH:mm`). Whether `2024-02-30` exists is for the
//! scheduling service to decide, which is why `to_naive` is fallible.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{AppointmentId, PatientId, ValidationError};

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles"));

static TIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles"));

/// Pattern advertised to the model for date parameters.
pub const DATE_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$";

/// Pattern advertised to the model for time parameters.
pub const TIME_PATTERN: &str = r"^([01][0-9]|2[0-3]):[0-5][0-9]$";

/// A calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotDate(String);

impl SlotDate {
    /// Accepts any string shaped like `YYYY-MM-DD`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if DATE_SHAPE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::invalid_format(
                "date",
                format!("'{}' is not in YYYY-MM-DD format", value),
            ))
        }
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    /// Resolves to a real calendar day.
    pub fn to_naive(&self) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").map_err(|_| {
            ValidationError::invalid_format(
                "date",
                format!("{} is not a valid calendar date", self.0),
            )
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SlotDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotDate> for String {
    fn from(date: SlotDate) -> Self {
        date.0
    }
}

/// A wall-clock time in 24-hour `HH:mm` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(String);

impl SlotTime {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if TIME_SHAPE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::invalid_format(
                "time",
                format!("'{}' is not a 24-hour HH:mm time", value),
            ))
        }
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self(time.format("%H:%M").to_string())
    }

    /// Builds a slot on the hour, e.g. `09:00`.
    pub fn on_the_hour(hour: u32) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::out_of_range("hour", 0, 23, hour as i64));
        }
        Ok(Self(format!("{:02}:00", hour)))
    }

    pub fn to_naive(&self) -> Result<NaiveTime, ValidationError> {
        NaiveTime::parse_from_str(&self.0, "%H:%M")
            .map_err(|_| ValidationError::invalid_format("time", format!("'{}' is not a clock time", self.0)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotTime> for String {
    fn from(time: SlotTime) -> Self {
        time.0
    }
}

/// Lifecycle of a calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether the appointment still occupies its slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

/// An appointment as reported by the scheduling service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    /// Directory record the appointment is filed under, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    pub patient_name: String,
    pub date: SlotDate,
    pub time: SlotTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
}

impl Appointment {
    pub fn occupies(&self, date: &SlotDate, time: &SlotTime) -> bool {
        self.status.holds_slot() && &self.date == date && &self.time == time
    }

    pub fn belongs_to(&self, patient_name: &str) -> bool {
        self.patient_name.trim().eq_ignore_ascii_case(patient_name.trim())
    }

    /// An id only matches appointments filed under that id, never by name.
    pub fn is_for(&self, patient: &PatientRef) -> bool {
        match patient {
            PatientRef::Name(name) => self.belongs_to(name),
            PatientRef::Id(id) => self.patient_id.as_ref() == Some(id),
        }
    }
}

/// Everything needed to put a new appointment on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub patient_name: String,
    pub date: SlotDate,
    pub time: SlotTime,
    pub appointment_type: String,
}

/// Moves an existing appointment, identified by patient and current slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RescheduleRequest {
    pub patient: PatientRef,
    pub current_date: SlotDate,
    pub current_time: SlotTime,
    pub new_date: SlotDate,
    pub new_time: SlotTime,
}

/// Result of a calendar mutation. A rejection is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub message: String,
}

impl BookingOutcome {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// How a patient's appointments are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientRef {
    Name(String),
    Id(PatientId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slot_date_checks_shape_not_calendar() {
        let date = SlotDate::parse("2024-02-30").unwrap();
        assert!(date.to_naive().is_err());
        assert!(SlotDate::parse("2024-8-5").is_err());
        assert!(SlotDate::parse("15/08/2024").is_err());
    }

    #[test]
    fn slot_time_is_24_hour() {
        assert!(SlotTime::parse("09:00").is_ok());
        assert!(SlotTime::parse("23:59").is_ok());
        assert!(SlotTime::parse("24:00").is_err());
        assert!(SlotTime::parse("9:00").is_err());
        assert!(SlotTime::parse("9:00 AM").is_err());
    }

    #[test]
    fn on_the_hour_pads() {
        assert_eq!(SlotTime::on_the_hour(9).unwrap().as_str(), "09:00");
        assert!(SlotTime::on_the_hour(24).is_err());
    }

    #[test]
    fn appointment_serializes_with_camel_case_and_type_key() {
        let appointment = Appointment {
            id: AppointmentId::new("a1").unwrap(),
            patient_id: None,
            patient_name: "John Doe".to_string(),
            date: SlotDate::parse("2024-08-15").unwrap(),
            time: SlotTime::parse("10:00").unwrap(),
            appointment_type: "Check-up".to_string(),
            status: AppointmentStatus::Confirmed,
            doctor_name: None,
        };
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["patientName"], "John Doe");
        assert_eq!(json["type"], "Check-up");
        assert_eq!(json["status"], "confirmed");
        assert!(json.get("doctorName").is_none());
    }

    #[test]
    fn cancelled_appointments_free_their_slot() {
        let date = SlotDate::parse("2024-08-15").unwrap();
        let time = SlotTime::parse("10:00").unwrap();
        let mut appointment = Appointment {
            id: AppointmentId::generate(),
            patient_id: Some(PatientId::new("p-2").unwrap()),
            patient_name: "Jane Smith".to_string(),
            date: date.clone(),
            time: time.clone(),
            appointment_type: "Consultation".to_string(),
            status: AppointmentStatus::Pending,
            doctor_name: None,
        };
        assert!(appointment.occupies(&date, &time));
        appointment.status = AppointmentStatus::Cancelled;
        assert!(!appointment.occupies(&date, &time));
    }

    #[test]
    fn non_ascii_digits_are_not_a_date_or_time() {
        assert!(SlotDate::parse("٢٠٢٤-٠٨-١٦").is_err());
        assert!(SlotTime::parse("١٤:٠٠").is_err());
        let advertised = Regex::new(DATE_PATTERN).unwrap();
        assert!(!advertised.is_match("٢٠٢٤-٠٨-١٦"));
        assert!(advertised.is_match("2024-08-16"));
    }

    #[test]
    fn id_lookup_never_falls_back_to_the_name() {
        let appointment = Appointment {
            id: AppointmentId::generate(),
            patient_id: Some(PatientId::new("p-9").unwrap()),
            patient_name: "John Doe".to_string(),
            date: SlotDate::parse("2024-08-16").unwrap(),
            time: SlotTime::parse("13:00").unwrap(),
            appointment_type: "Check-up".to_string(),
            status: AppointmentStatus::Confirmed,
            doctor_name: None,
        };
        assert!(appointment.is_for(&PatientRef::Name("john doe".into())));
        assert!(appointment.is_for(&PatientRef::Id(PatientId::new("p-9").unwrap())));
        assert!(!appointment.is_for(&PatientRef::Id(PatientId::new("p-1").unwrap())));

        let unfiled = Appointment {
            patient_id: None,
            ..appointment
        };
        assert!(!unfiled.is_for(&PatientRef::Id(PatientId::new("p-9").unwrap())));
    }

    #[test]
    fn deserializing_malformed_date_fails() {
        let result: Result<SlotDate, _> = serde_json::from_str("\"tomorrow\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn every_valid_clock_time_parses(hour in 0u32..24, minute in 0u32..60) {
            let text = format!("{:02}:{:02}", hour, minute);
            let time = SlotTime::parse(&text).unwrap();
            prop_assert_eq!(SlotTime::from_naive(time.to_naive().unwrap()), time);
        }

        #[test]
        fn real_dates_resolve(days in 0i64..20_000) {
            let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
            let date = base + chrono::Duration::days(days);
            let slot = SlotDate::from_naive(date);
            prop_assert_eq!(slot.to_naive().unwrap(), date);
        }
    }
}
