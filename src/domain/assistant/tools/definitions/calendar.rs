//! Scheduling tools: slots, bookings, day and patient listings, reschedules.

use serde::Deserialize;
use serde_json::json;

use crate::domain::assistant::tools::{ParameterKind, ParameterSpec, ToolDefinition, ToolScope};
use crate::domain::clinic::{BookingRequest, PatientRef, RescheduleRequest, SlotDate, SlotTime};

use super::ToolName;

const DATE_HINT: &str = "in YYYY-MM-DD format.";
const TIME_HINT: &str = "in HH:mm 24-hour format.";

fn appointment_list_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "patientId": { "type": "string" },
                "patientName": { "type": "string" },
                "date": { "type": "string" },
                "time": { "type": "string" },
                "type": { "type": "string" },
                "status": { "type": "string" }
            }
        }
    })
}

fn outcome_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "message": { "type": "string" }
        }
    })
}

pub fn get_available_slots() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetAvailableSlots.as_str(),
        "Get a list of available appointment slots for a given date. Use this before booking \
         or when helping someone pick a new time.",
        ToolScope::Public,
    )
    .with_parameter(ParameterSpec::required(
        "date",
        ParameterKind::Date,
        format!("The date to check for available slots, {}", DATE_HINT),
    ))
    .with_output_schema(json!({ "type": "array", "items": { "type": "string" } }))
}

pub fn book_appointment() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::BookAppointment.as_str(),
        "Book a new appointment for a patient.",
        ToolScope::Administrative,
    )
    .with_parameter(ParameterSpec::required(
        "patientName",
        ParameterKind::String,
        "The full name of the patient.",
    ))
    .with_parameter(ParameterSpec::required(
        "date",
        ParameterKind::Date,
        format!("The date for the appointment, {}", DATE_HINT),
    ))
    .with_parameter(ParameterSpec::required(
        "time",
        ParameterKind::Time,
        format!("The time for the appointment, {}", TIME_HINT),
    ))
    .with_parameter(ParameterSpec::required(
        "type",
        ParameterKind::String,
        "The type of appointment (e.g., Consultation, Check-up, Follow-up).",
    ))
    .with_output_schema(outcome_schema())
}

pub fn get_appointments() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetAppointments.as_str(),
        "Get a list of all appointments for a given date.",
        ToolScope::Administrative,
    )
    .with_parameter(ParameterSpec::required(
        "date",
        ParameterKind::Date,
        format!("The date to retrieve appointments for, {}", DATE_HINT),
    ))
    .with_output_schema(appointment_list_schema())
}

pub fn get_my_appointments() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetMyAppointments.as_str(),
        "Get a list of the patient's upcoming appointments.",
        ToolScope::PatientScoped,
    )
    .with_parameter(
        ParameterSpec::required("patientName", ParameterKind::String, "The patient's full name.")
            .bound_to_identity(),
    )
    .with_output_schema(appointment_list_schema())
}

pub fn request_reschedule() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::RequestReschedule.as_str(),
        "Move an existing appointment to a new date and time. The appointment is identified \
         by the patient and its current date and time.",
        ToolScope::PatientScoped,
    )
    .with_parameter(
        ParameterSpec::required("patientName", ParameterKind::String, "The patient's full name.")
            .bound_to_identity(),
    )
    .with_parameter(ParameterSpec::required(
        "currentDate",
        ParameterKind::Date,
        format!("The current date of the appointment, {}", DATE_HINT),
    ))
    .with_parameter(ParameterSpec::required(
        "currentTime",
        ParameterKind::Time,
        format!("The current time of the appointment, {}", TIME_HINT),
    ))
    .with_parameter(ParameterSpec::required(
        "newDate",
        ParameterKind::Date,
        format!("The desired new date for the appointment, {}", DATE_HINT),
    ))
    .with_parameter(ParameterSpec::required(
        "newTime",
        ParameterKind::Time,
        format!("The desired new time for the appointment, {}", TIME_HINT),
    ))
    .with_output_schema(outcome_schema())
}

// ----- Typed arguments -----

#[derive(Debug, Deserialize)]
pub struct DateArgs {
    pub date: SlotDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientNameArgs {
    pub patient_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentArgs {
    pub patient_name: String,
    pub date: SlotDate,
    pub time: SlotTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
}

impl From<BookAppointmentArgs> for BookingRequest {
    fn from(args: BookAppointmentArgs) -> Self {
        BookingRequest {
            patient_name: args.patient_name,
            date: args.date,
            time: args.time,
            appointment_type: args.appointment_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRescheduleArgs {
    pub patient_name: String,
    pub current_date: SlotDate,
    pub current_time: SlotTime,
    pub new_date: SlotDate,
    pub new_time: SlotTime,
}

impl From<RequestRescheduleArgs> for RescheduleRequest {
    fn from(args: RequestRescheduleArgs) -> Self {
        RescheduleRequest {
            patient: PatientRef::Name(args.patient_name),
            current_date: args.current_date,
            current_time: args.current_time,
            new_date: args.new_date,
            new_time: args.new_time,
        }
    }
}
