//! InMemoryClinic - one store implementing every clinic collaborator port.
//!
//! Slots run hourly from 09:00 to 16:00. Calendar validity, opening hours
//! and conflicts are checked here, the same way the clinic backend checks
//! them, so tools see identical rejection wording in both setups.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::clinic::{
    Appointment, AppointmentStatus, BillingOverview, BookingOutcome, BookingRequest,
    DashboardStats, Invoice, InvoiceStatus, Patient, PatientRef, RescheduleRequest, SlotDate,
    SlotTime,
};
use crate::domain::foundation::{AppointmentId, InvoiceId, PatientId, ValidationError};
use crate::ports::{
    BillingLedger, ClinicStats, Clock, CollaboratorError, PatientDirectory, SchedulingService,
};

const OPENING_HOUR: u32 = 9;
const LAST_SLOT_HOUR: u32 = 16;

#[derive(Debug, Default)]
struct ClinicState {
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    invoices: Vec<Invoice>,
    ai_interactions: u64,
}

impl ClinicState {
    /// The appointment currently holding a slot.
    fn holder(&self, date: &SlotDate, time: &SlotTime) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.occupies(date, time))
    }

    /// Directory id for a name, only when exactly one patient carries it.
    fn sole_patient_named(&self, name: &str) -> Option<PatientId> {
        let mut matches = self
            .patients
            .iter()
            .filter(|p| p.name.trim().eq_ignore_ascii_case(name.trim()));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.id.clone()),
            _ => None,
        }
    }
}

fn conflict(holder: &Appointment) -> BookingOutcome {
    BookingOutcome::rejected(format!(
        "The {} slot on {} is already booked by {}.",
        holder.time, holder.date, holder.patient_name
    ))
}

fn describe(patient: &PatientRef) -> &str {
    match patient {
        PatientRef::Name(name) => name.trim(),
        PatientRef::Id(_) => "you",
    }
}

/// Thread-safe in-memory clinic.
pub struct InMemoryClinic {
    clock: Arc<dyn Clock>,
    grid: Vec<SlotTime>,
    state: Mutex<ClinicState>,
    booking_attempts: AtomicUsize,
}

impl InMemoryClinic {
    /// An empty clinic.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            grid: (OPENING_HOUR..=LAST_SLOT_HOUR)
                .filter_map(|hour| SlotTime::on_the_hour(hour).ok())
                .collect(),
            state: Mutex::new(ClinicState::default()),
            booking_attempts: AtomicUsize::new(0),
        }
    }

    /// A small demo practice, with appointments placed around the clock's today.
    ///
    /// Today: John Doe 10:00, Jane Smith 11:00. Tomorrow: Maria Garcia 09:00,
    /// John Doe 14:00.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        let day = |offset: i64| SlotDate::from_naive(today + Duration::days(offset));

        let mut clinic = Self::new(clock)
            .with_patient(seed_patient("p-1", "John Doe", "john.doe@example.com"))
            .with_patient(seed_patient("p-2", "Jane Smith", "jane.smith@example.com"))
            .with_patient(seed_patient("p-3", "Maria Garcia", "maria.garcia@example.com"))
            .with_patient(seed_patient("p-4", "David Lee", "david.lee@example.com"))
            .with_ai_interactions(128);

        for (name, offset, hour, kind, status, doctor) in [
            ("John Doe", 0, 10, "Check-up", AppointmentStatus::Confirmed, "Dr. Alice Chen"),
            ("Jane Smith", 0, 11, "Consultation", AppointmentStatus::Confirmed, "Dr. Alice Chen"),
            ("Maria Garcia", 1, 9, "Check-up", AppointmentStatus::Confirmed, "Dr. Omar Haddad"),
            ("John Doe", 1, 14, "Follow-up", AppointmentStatus::Pending, "Dr. Alice Chen"),
            ("David Lee", 2, 10, "Consultation", AppointmentStatus::Cancelled, "Dr. Omar Haddad"),
        ] {
            if let Ok(time) = SlotTime::on_the_hour(hour) {
                clinic = clinic.with_appointment(Appointment {
                    id: AppointmentId::generate(),
                    patient_id: None,
                    patient_name: name.to_string(),
                    date: day(offset),
                    time,
                    appointment_type: kind.to_string(),
                    status,
                    doctor_name: Some(doctor.to_string()),
                });
            }
        }

        for (id, name, offset, amount, status) in [
            ("INV-001", "John Doe", -10, 150.0, InvoiceStatus::Paid),
            ("INV-002", "Jane Smith", -5, 200.0, InvoiceStatus::Unpaid),
            ("INV-003", "Maria Garcia", -40, 120.0, InvoiceStatus::Overdue),
            ("INV-004", "John Doe", -2, 80.0, InvoiceStatus::Unpaid),
        ] {
            if let Ok(invoice_id) = InvoiceId::new(id) {
                clinic = clinic.with_invoice(Invoice {
                    invoice_id,
                    patient_name: name.to_string(),
                    date: day(offset),
                    amount,
                    status,
                });
            }
        }

        clinic
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.state_mut().patients.push(patient);
        self
    }

    /// Adds an appointment. One without a patient id is filed under the
    /// directory record carrying its name, if that name is unique.
    pub fn with_appointment(mut self, mut appointment: Appointment) -> Self {
        let state = self.state_mut();
        if appointment.patient_id.is_none() {
            appointment.patient_id = state.sole_patient_named(&appointment.patient_name);
        }
        state.appointments.push(appointment);
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.state_mut().invoices.push(invoice);
        self
    }

    pub fn with_ai_interactions(mut self, count: u64) -> Self {
        self.state_mut().ai_interactions = count;
        self
    }

    /// Number of times `book` has been called, accepted or not.
    pub fn booking_attempts(&self) -> usize {
        self.booking_attempts.load(Ordering::SeqCst)
    }

    fn state_mut(&mut self) -> &mut ClinicState {
        self.state.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state(&self) -> Result<MutexGuard<'_, ClinicState>, CollaboratorError> {
        self.state
            .lock()
            .map_err(|_| CollaboratorError::unavailable("in-memory clinic state is poisoned"))
    }

    fn calendar_day(&self, date: &SlotDate) -> Result<NaiveDate, CollaboratorError> {
        date.to_naive().map_err(rejection)
    }

    /// Calendar validity, not in the past, on the slot grid.
    fn check_bookable(&self, date: &SlotDate, time: &SlotTime) -> Result<(), String> {
        let day = self.calendar_day(date).map_err(|e| e.user_message())?;
        if day < self.clock.today() {
            return Err(format!("{} is in the past. Please choose a future date.", date));
        }
        if !self.grid.contains(time) {
            return Err(format!(
                "{} is outside clinic hours. Slots run hourly from {:02}:00 to {:02}:00.",
                time, OPENING_HOUR, LAST_SLOT_HOUR
            ));
        }
        Ok(())
    }
}

fn seed_patient(id: &str, name: &str, email: &str) -> Patient {
    Patient {
        id: PatientId::new(id).unwrap_or_else(|_| PatientId::generate()),
        name: name.to_string(),
        email: email.to_string(),
        avatar: Patient::initials(name),
    }
}

fn rejection(err: ValidationError) -> CollaboratorError {
    match err {
        ValidationError::InvalidFormat { reason, .. } => CollaboratorError::Rejected(reason),
        other => CollaboratorError::Rejected(other.to_string()),
    }
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
    appointments
}

#[async_trait]
impl SchedulingService for InMemoryClinic {
    async fn available_slots(&self, date: &SlotDate) -> Result<Vec<SlotTime>, CollaboratorError> {
        let day = self.calendar_day(date)?;
        if day < self.clock.today() {
            return Ok(Vec::new());
        }
        let state = self.state()?;
        Ok(self
            .grid
            .iter()
            .filter(|time| state.holder(date, time).is_none())
            .cloned()
            .collect())
    }

    async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, CollaboratorError> {
        self.booking_attempts.fetch_add(1, Ordering::SeqCst);

        let patient_name = request.patient_name.trim();
        if patient_name.is_empty() {
            return Ok(BookingOutcome::rejected("A patient name is required to book."));
        }
        if let Err(reason) = self.check_bookable(&request.date, &request.time) {
            return Ok(BookingOutcome::rejected(reason));
        }

        let mut state = self.state()?;
        if let Some(holder) = state.holder(&request.date, &request.time) {
            return Ok(conflict(holder));
        }

        let patient_id = state.sole_patient_named(patient_name);
        state.appointments.push(Appointment {
            id: AppointmentId::generate(),
            patient_id,
            patient_name: patient_name.to_string(),
            date: request.date.clone(),
            time: request.time.clone(),
            appointment_type: request.appointment_type.trim().to_string(),
            status: AppointmentStatus::Confirmed,
            doctor_name: None,
        });

        tracing::debug!(date = %request.date, time = %request.time, "Appointment booked");
        Ok(BookingOutcome::accepted(format!(
            "Appointment booked for {} on {} at {}.",
            patient_name, request.date, request.time
        )))
    }

    async fn appointments_on(&self, date: &SlotDate) -> Result<Vec<Appointment>, CollaboratorError> {
        self.calendar_day(date)?;
        let state = self.state()?;
        Ok(sorted(
            state
                .appointments
                .iter()
                .filter(|a| &a.date == date)
                .cloned()
                .collect(),
        ))
    }

    async fn appointments_for_patient(
        &self,
        patient: &PatientRef,
    ) -> Result<Vec<Appointment>, CollaboratorError> {
        let state = self.state()?;
        Ok(sorted(
            state
                .appointments
                .iter()
                .filter(|a| a.is_for(patient))
                .cloned()
                .collect(),
        ))
    }

    async fn reschedule(
        &self,
        request: RescheduleRequest,
    ) -> Result<BookingOutcome, CollaboratorError> {
        if let Err(reason) = self.check_bookable(&request.new_date, &request.new_time) {
            return Ok(BookingOutcome::rejected(reason));
        }

        // Lookup, conflict check and move happen under one lock.
        let mut state = self.state()?;
        let Some(index) = state.appointments.iter().position(|a| {
            a.is_for(&request.patient) && a.occupies(&request.current_date, &request.current_time)
        }) else {
            return Ok(BookingOutcome::rejected(format!(
                "No appointment found for {} on {} at {}.",
                describe(&request.patient),
                request.current_date,
                request.current_time
            )));
        };

        let unchanged = request.current_date == request.new_date
            && request.current_time == request.new_time;
        if !unchanged {
            if let Some(holder) = state.holder(&request.new_date, &request.new_time) {
                return Ok(conflict(holder));
            }
        }

        let appointment = &mut state.appointments[index];
        appointment.date = request.new_date.clone();
        appointment.time = request.new_time.clone();

        Ok(BookingOutcome::accepted(format!(
            "Appointment rescheduled to {} at {}.",
            request.new_date, request.new_time
        )))
    }
}

#[async_trait]
impl PatientDirectory for InMemoryClinic {
    async fn patients(&self, name_filter: Option<&str>) -> Result<Vec<Patient>, CollaboratorError> {
        let state = self.state()?;
        Ok(state
            .patients
            .iter()
            .filter(|p| name_filter.map_or(true, |filter| p.matches_name(filter)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BillingLedger for InMemoryClinic {
    async fn overview(&self) -> Result<BillingOverview, CollaboratorError> {
        let state = self.state()?;
        Ok(BillingOverview::from_invoices(&state.invoices))
    }

    async fn invoices(&self, patient_name: Option<&str>) -> Result<Vec<Invoice>, CollaboratorError> {
        let state = self.state()?;
        let needle = patient_name.map(|n| n.trim().to_lowercase());
        Ok(state
            .invoices
            .iter()
            .filter(|invoice| {
                needle
                    .as_deref()
                    .map_or(true, |n| invoice.patient_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClinicStats for InMemoryClinic {
    async fn dashboard(&self) -> Result<DashboardStats, CollaboratorError> {
        let today = SlotDate::from_naive(self.clock.today());
        let state = self.state()?;
        Ok(DashboardStats {
            total_patients: state.patients.len() as u64,
            appointments_today: state
                .appointments
                .iter()
                .filter(|a| a.date == today && a.status.holds_slot())
                .count() as u64,
            ai_interactions: state.ai_interactions,
            revenue: BillingOverview::from_invoices(&state.invoices).total_collected,
        })
    }
}
