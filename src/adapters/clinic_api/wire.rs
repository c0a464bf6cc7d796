//! Wire shapes that differ from the domain records.

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::domain::clinic::{Appointment, AppointmentStatus, SlotDate, SlotTime};
use crate::domain::foundation::{AppointmentId, PatientId};

/// An appointment as the backend sends it. Older endpoints send a single ISO
/// `datetime`, newer ones split `date` and `time`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireAppointment {
    id: String,
    #[serde(default)]
    patient_id: Option<String>,
    patient_name: String,
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(rename = "type", default)]
    appointment_type: String,
    status: AppointmentStatus,
    #[serde(default)]
    doctor_name: Option<String>,
}

impl WireAppointment {
    pub(super) fn into_domain(self) -> Result<Appointment, String> {
        let (date, time) = match (self.date.as_deref(), self.time.as_deref(), self.datetime.as_deref()) {
            (Some(date), Some(time), _) => (
                SlotDate::parse(date).map_err(|e| e.to_string())?,
                parse_slot_time(time).ok_or_else(|| format!("unreadable time '{}'", time))?,
            ),
            (_, _, Some(datetime)) => {
                let at = parse_datetime(datetime)
                    .ok_or_else(|| format!("unreadable datetime '{}'", datetime))?;
                (SlotDate::from_naive(at.date()), SlotTime::from_naive(at.time()))
            }
            _ => return Err(format!("appointment {} has no date", self.id)),
        };

        let patient_id = self
            .patient_id
            .filter(|id| !id.trim().is_empty())
            .map(PatientId::new)
            .transpose()
            .map_err(|e| e.to_string())?;

        Ok(Appointment {
            id: AppointmentId::new(self.id).map_err(|e| e.to_string())?,
            patient_id,
            patient_name: self.patient_name,
            date,
            time,
            appointment_type: self.appointment_type,
            status: self.status,
            doctor_name: self.doctor_name,
        })
    }
}

/// Accepts `14:30`, `14:30:00` and `2:30 PM`.
pub(super) fn parse_slot_time(raw: &str) -> Option<SlotTime> {
    let raw = raw.trim();
    SlotTime::parse(raw).ok().or_else(|| {
        ["%H:%M:%S", "%I:%M %p", "%I:%M%p"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
            .map(SlotTime::from_naive)
    })
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok())
}

/// Error body shape for rejected requests.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iso_datetime_is_split() {
        let wire: WireAppointment = serde_json::from_value(json!({
            "id": "a1",
            "patientName": "John Doe",
            "datetime": "2024-08-15T14:30:00.000Z",
            "type": "Check-up",
            "status": "confirmed"
        }))
        .unwrap();
        let appointment = wire.into_domain().unwrap();
        assert_eq!(appointment.date.as_str(), "2024-08-15");
        assert_eq!(appointment.time.as_str(), "14:30");
        assert!(appointment.patient_id.is_none());
    }

    #[test]
    fn patient_id_is_carried_when_sent() {
        let wire: WireAppointment = serde_json::from_value(json!({
            "id": "a1",
            "patientId": "p-1",
            "patientName": "John Doe",
            "date": "2024-08-15",
            "time": "10:00",
            "type": "Check-up",
            "status": "confirmed"
        }))
        .unwrap();
        let appointment = wire.into_domain().unwrap();
        assert_eq!(appointment.patient_id, Some(PatientId::new("p-1").unwrap()));
    }

    #[test]
    fn twelve_hour_times_are_normalized() {
        assert_eq!(parse_slot_time("2:30 PM").unwrap().as_str(), "14:30");
        assert_eq!(parse_slot_time("09:00:00").unwrap().as_str(), "09:00");
        assert!(parse_slot_time("noon").is_none());
    }

    #[test]
    fn missing_date_is_an_error() {
        let wire: WireAppointment = serde_json::from_value(json!({
            "id": "a1", "patientName": "John Doe", "status": "pending"
        }))
        .unwrap();
        assert!(wire.into_domain().is_err());
    }
}
