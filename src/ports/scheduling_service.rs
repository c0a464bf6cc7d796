//! Scheduling Service Port - the clinic calendar.
//!
//! Owns slot availability, conflict detection and calendar validity of
//! dates. The assistant core never second-guesses its answers.

use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::clinic::{
    Appointment, BookingOutcome, BookingRequest, PatientRef, RescheduleRequest, SlotDate, SlotTime,
};

#[async_trait]
pub trait SchedulingService: Send + Sync {
    /// Open slots on a date, earliest first. Empty when fully booked.
    async fn available_slots(&self, date: &SlotDate) -> Result<Vec<SlotTime>, CollaboratorError>;

    /// Books a slot. A taken slot is `Ok` with `success == false`.
    async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, CollaboratorError>;

    /// All appointments on a date.
    async fn appointments_on(&self, date: &SlotDate) -> Result<Vec<Appointment>, CollaboratorError>;

    /// Appointments belonging to one patient.
    async fn appointments_for_patient(
        &self,
        patient: &PatientRef,
    ) -> Result<Vec<Appointment>, CollaboratorError>;

    /// Moves an appointment. Atomic: on rejection the original slot is kept.
    async fn reschedule(
        &self,
        request: RescheduleRequest,
    ) -> Result<BookingOutcome, CollaboratorError>;
}
