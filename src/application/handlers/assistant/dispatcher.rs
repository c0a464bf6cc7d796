//! ToolDispatcher - turns one model tool call into one collaborator call.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the tool is in the persona's permitted set (`ToolNotPermitted`)
//! 2. the tool is registered (`UnknownTool`)
//! 3. identity-bound arguments are overwritten with the caller's identity
//! 4. arguments match the tool's schema (`SchemaViolation`)
//!
//! On identity-bound turns the collaborator is addressed by the caller's
//! patient id, so namesakes never see each other's records.
//!
//! Only then is a collaborator called. Collaborator failures are not errors
//! here: they come back as a `ToolCallResult` with `success == false`.
//! Nothing is retried, since bookings are not idempotent.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::assistant::tools::definitions::{
    BookAppointmentArgs, DateArgs, InvoiceFilterArgs, PatientNameArgs, PatientSearchArgs,
    RequestRescheduleArgs,
};
use crate::domain::assistant::tools::{
    FieldViolation, SchemaViolation, ToolCallRequest, ToolCallResult, ToolName, ToolRegistry,
    ToolSet,
};
use crate::domain::assistant::{DispatchError, Persona};
use crate::domain::clinic::{PatientIdentity, PatientRef, RescheduleRequest};
use crate::ports::{BillingLedger, ClinicStats, CollaboratorError, PatientDirectory, SchedulingService};

/// The clinic services tools are bound to.
#[derive(Clone)]
pub struct Collaborators {
    pub scheduling: Arc<dyn SchedulingService>,
    pub patients: Arc<dyn PatientDirectory>,
    pub billing: Arc<dyn BillingLedger>,
    pub stats: Arc<dyn ClinicStats>,
}

impl Collaborators {
    /// Uses one backend for every service.
    pub fn single<T>(backend: Arc<T>) -> Self
    where
        T: SchedulingService + PatientDirectory + BillingLedger + ClinicStats + 'static,
    {
        Self {
            scheduling: backend.clone(),
            patients: backend.clone(),
            billing: backend.clone(),
            stats: backend,
        }
    }
}

/// Who a call is made for: the permitted tools and, on patient turns, the
/// caller's identity.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    permitted: ToolSet,
    binds_identity: bool,
    identity: Option<PatientIdentity>,
}

impl DispatchContext {
    pub fn for_persona(persona: &Persona, identity: Option<PatientIdentity>) -> Self {
        Self {
            permitted: persona.tools().clone(),
            binds_identity: persona.binds_identity(),
            identity,
        }
    }

    pub fn permits(&self, tool: &str) -> bool {
        self.permitted.contains(tool)
    }
}

/// Routes validated tool calls to the clinic collaborators.
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    collaborators: Collaborators,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, collaborators: Collaborators) -> Self {
        Self {
            registry,
            collaborators,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatches one call.
    ///
    /// `Err` means the call never reached a collaborator. `Ok` carries the
    /// collaborator's outcome, successful or not.
    pub async fn dispatch(
        &self,
        call: &ToolCallRequest,
        context: &DispatchContext,
    ) -> Result<ToolCallResult, DispatchError> {
        if !context.permits(call.name()) {
            tracing::warn!(tool = %call.name(), call_id = %call.id(), "Tool call outside permitted set");
            return Err(DispatchError::ToolNotPermitted(call.name().to_string()));
        }

        let definition = self
            .registry
            .lookup(call.name())
            .map_err(|_| DispatchError::UnknownTool(call.name().to_string()))?;
        let tool: ToolName = call
            .name()
            .parse()
            .map_err(|_| DispatchError::UnknownTool(call.name().to_string()))?;

        let mut arguments = call.arguments().clone();
        let mut scope = None;
        if context.binds_identity && definition.has_identity_parameter() {
            let Some(identity) = &context.identity else {
                tracing::error!(tool = %call.name(), "Identity-bound tool called without identity");
                return Err(DispatchError::ToolNotPermitted(call.name().to_string()));
            };
            if definition.bind_identity(&mut arguments, identity.name()) {
                tracing::warn!(
                    tool = %call.name(),
                    call_id = %call.id(),
                    patient_id = %identity.id(),
                    "Model-supplied patient name overridden by caller identity"
                );
            }
            scope = Some(PatientRef::Id(identity.id().clone()));
        }

        definition.validate(&arguments).map_err(|violation| {
            tracing::info!(
                tool = %call.name(),
                call_id = %call.id(),
                fields = ?violation.fields(),
                "Tool arguments failed schema validation"
            );
            DispatchError::SchemaViolation(violation)
        })?;

        let started = Instant::now();
        let outcome = self.invoke(tool, arguments, scope).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Invocation::Payload(payload)) => ToolCallResult::success(call, payload),
            Ok(Invocation::Refused(message)) => ToolCallResult::failure(call, message),
            Err(Failure::Schema(violation)) => return Err(DispatchError::SchemaViolation(violation)),
            Err(Failure::Collaborator(err)) => {
                tracing::warn!(
                    tool = %call.name(),
                    call_id = %call.id(),
                    error = %err,
                    elapsed_ms,
                    "Collaborator call failed"
                );
                ToolCallResult::failure(call, err.user_message())
            }
        };

        tracing::info!(
            tool = %call.name(),
            call_id = %call.id(),
            success = result.is_success(),
            elapsed_ms,
            "Tool call dispatched"
        );
        Ok(result)
    }

    /// `scope` replaces any patient named in the arguments.
    async fn invoke(
        &self,
        tool: ToolName,
        arguments: Value,
        scope: Option<PatientRef>,
    ) -> Result<Invocation, Failure> {
        let c = &self.collaborators;
        match tool {
            ToolName::GetAvailableSlots => {
                let args: DateArgs = decode(tool, arguments)?;
                payload(c.scheduling.available_slots(&args.date).await?)
            }
            ToolName::BookAppointment => {
                let args: BookAppointmentArgs = decode(tool, arguments)?;
                let outcome = c.scheduling.book(args.into()).await?;
                Ok(Invocation::from_outcome(outcome.success, outcome.message, || {
                    serde_json::json!({ "success": true })
                }))
            }
            ToolName::GetAppointments => {
                let args: DateArgs = decode(tool, arguments)?;
                payload(c.scheduling.appointments_on(&args.date).await?)
            }
            ToolName::GetMyAppointments => {
                let args: PatientNameArgs = decode(tool, arguments)?;
                let patient = scope.unwrap_or(PatientRef::Name(args.patient_name));
                payload(c.scheduling.appointments_for_patient(&patient).await?)
            }
            ToolName::RequestReschedule => {
                let args: RequestRescheduleArgs = decode(tool, arguments)?;
                let mut request: RescheduleRequest = args.into();
                if let Some(patient) = scope {
                    request.patient = patient;
                }
                let outcome = c.scheduling.reschedule(request).await?;
                Ok(Invocation::from_outcome(outcome.success, outcome.message, || {
                    serde_json::json!({ "success": true })
                }))
            }
            ToolName::GetBillingOverview => payload(c.billing.overview().await?),
            ToolName::GetInvoices => {
                let args: InvoiceFilterArgs = decode(tool, arguments)?;
                payload(c.billing.invoices(non_blank(&args.patient_name)).await?)
            }
            ToolName::GetDashboardStats => payload(c.stats.dashboard().await?),
            ToolName::GetPatients => {
                let args: PatientSearchArgs = decode(tool, arguments)?;
                payload(c.patients.patients(non_blank(&args.name)).await?)
            }
        }
    }
}

enum Invocation {
    Payload(Value),
    Refused(String),
}

impl Invocation {
    /// Mutations report success with the service's message folded into the payload.
    fn from_outcome(success: bool, message: String, base: impl FnOnce() -> Value) -> Self {
        if success {
            let mut body = base();
            body["message"] = Value::String(message);
            Invocation::Payload(body)
        } else {
            Invocation::Refused(message)
        }
    }
}

enum Failure {
    Schema(SchemaViolation),
    Collaborator(CollaboratorError),
}

impl From<CollaboratorError> for Failure {
    fn from(err: CollaboratorError) -> Self {
        Failure::Collaborator(err)
    }
}

fn decode<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, Failure> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|err| {
        Failure::Schema(SchemaViolation {
            tool: tool.to_string(),
            violations: vec![FieldViolation::new("arguments", err.to_string())],
        })
    })
}

fn payload<T: Serialize>(value: T) -> Result<Invocation, Failure> {
    serde_json::to_value(value)
        .map(Invocation::Payload)
        .map_err(|err| Failure::Collaborator(CollaboratorError::Protocol(err.to_string())))
}

fn non_blank(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryClinic;
    use crate::domain::assistant::tools::clinic_registry;
    use crate::domain::foundation::PatientId;
    use serde_json::json;

    fn clinic() -> Arc<InMemoryClinic> {
        Arc::new(InMemoryClinic::seeded(Arc::new(FixedClock::ymd(2024, 8, 15).unwrap())))
    }

    fn dispatcher(clinic: Arc<InMemoryClinic>) -> ToolDispatcher {
        ToolDispatcher::new(
            Arc::new(clinic_registry().unwrap()),
            Collaborators::single(clinic),
        )
    }

    fn admin() -> DispatchContext {
        DispatchContext::for_persona(&Persona::administrator(), None)
    }

    fn patient(name: &str) -> DispatchContext {
        let identity = PatientIdentity::new(PatientId::new("p-1").unwrap(), name).unwrap();
        DispatchContext::for_persona(&Persona::patient(), Some(identity))
    }

    #[tokio::test]
    async fn permission_is_checked_before_anything_else() {
        let clinic = clinic();
        let dispatcher = dispatcher(clinic.clone());
        let call = ToolCallRequest::new(
            "c1",
            "bookAppointment",
            json!({ "patientName": "John Doe", "date": "2024-08-16", "time": "09:00", "type": "Check-up" }),
        );

        let err = dispatcher.dispatch(&call, &patient("John Doe")).await.unwrap_err();
        assert_eq!(err, DispatchError::ToolNotPermitted("bookAppointment".into()));
        assert_eq!(clinic.booking_attempts(), 0);
    }

    #[tokio::test]
    async fn unpermitted_garbage_is_still_not_permitted() {
        let dispatcher = dispatcher(clinic());
        let call = ToolCallRequest::new("c1", "getInvoices", json!("not even an object"));
        assert!(matches!(
            dispatcher.dispatch(&call, &patient("John Doe")).await,
            Err(DispatchError::ToolNotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn schema_violation_never_reaches_collaborator() {
        let clinic = clinic();
        let dispatcher = dispatcher(clinic.clone());
        let call = ToolCallRequest::new(
            "c1",
            "bookAppointment",
            json!({ "patientName": "John Doe", "date": "2024-08-16", "time": "2 PM", "type": "Check-up" }),
        );

        match dispatcher.dispatch(&call, &admin()).await {
            Err(DispatchError::SchemaViolation(violation)) => {
                assert_eq!(violation.fields(), vec!["time"]);
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
        assert_eq!(clinic.booking_attempts(), 0);
    }

    #[tokio::test]
    async fn booking_conflict_is_a_failed_result_not_an_error() {
        let dispatcher = dispatcher(clinic());
        let book = |id: &str, name: &str| {
            ToolCallRequest::new(
                id,
                "bookAppointment",
                json!({ "patientName": name, "date": "2024-08-16", "time": "11:00", "type": "Consultation" }),
            )
        };

        let first = dispatcher.dispatch(&book("c1", "Alex Kim"), &admin()).await.unwrap();
        assert!(first.is_success());
        assert!(first.payload().unwrap()["message"].as_str().unwrap().contains("booked"));

        let second = dispatcher.dispatch(&book("c2", "Sam Lee"), &admin()).await.unwrap();
        assert!(!second.is_success());
        assert!(second.message().unwrap().contains("already booked"));
    }

    #[tokio::test]
    async fn impossible_calendar_date_is_left_to_scheduling() {
        let dispatcher = dispatcher(clinic());
        let call = ToolCallRequest::new("c1", "getAvailableSlots", json!({ "date": "2024-02-30" }));
        let result = dispatcher.dispatch(&call, &admin()).await.unwrap();
        assert!(!result.is_success());
        assert!(result.message().unwrap().contains("not a valid calendar date"));
    }

    #[tokio::test]
    async fn patient_calls_are_rebound_to_caller() {
        let dispatcher = dispatcher(clinic());
        let call = ToolCallRequest::new(
            "c1",
            "getMyAppointments",
            json!({ "patientName": "Jane Smith" }),
        );

        let result = dispatcher.dispatch(&call, &patient("John Doe")).await.unwrap();
        let appointments = result.payload().unwrap().as_array().unwrap().clone();
        assert!(!appointments.is_empty());
        assert!(appointments.iter().all(|a| a["patientName"] == "John Doe"));
    }

    #[tokio::test]
    async fn namesake_records_stay_out_of_patient_turns() {
        use crate::domain::clinic::{Appointment, AppointmentStatus, Patient, SlotDate, SlotTime};
        use crate::domain::foundation::AppointmentId;

        let clinic = Arc::new(
            InMemoryClinic::seeded(Arc::new(FixedClock::ymd(2024, 8, 15).unwrap()))
                .with_patient(Patient {
                    id: PatientId::new("p-9").unwrap(),
                    name: "John Doe".into(),
                    email: "j.doe@example.org".into(),
                    avatar: "JD".into(),
                })
                .with_appointment(Appointment {
                    id: AppointmentId::generate(),
                    patient_id: Some(PatientId::new("p-9").unwrap()),
                    patient_name: "John Doe".into(),
                    date: SlotDate::parse("2024-08-16").unwrap(),
                    time: SlotTime::parse("13:00").unwrap(),
                    appointment_type: "Consultation".into(),
                    status: AppointmentStatus::Confirmed,
                    doctor_name: None,
                }),
        );
        let dispatcher = dispatcher(clinic.clone());

        let listing = ToolCallRequest::new("c1", "getMyAppointments", json!({}));
        let result = dispatcher.dispatch(&listing, &patient("John Doe")).await.unwrap();
        let appointments = result.payload().unwrap().as_array().unwrap().clone();
        assert_eq!(appointments.len(), 2);
        assert!(appointments.iter().all(|a| a["patientId"] == "p-1"));

        let move_theirs = ToolCallRequest::new(
            "c2",
            "requestReschedule",
            json!({
                "currentDate": "2024-08-16", "currentTime": "13:00",
                "newDate": "2024-08-16", "newTime": "15:00"
            }),
        );
        let result = dispatcher.dispatch(&move_theirs, &patient("John Doe")).await.unwrap();
        assert!(!result.is_success());

        let still_there = clinic.appointments_on(&SlotDate::parse("2024-08-16").unwrap()).await.unwrap();
        assert!(still_there.iter().any(|a| a.time.as_str() == "13:00"));
    }

    #[tokio::test]
    async fn patient_call_without_arguments_gets_identity() {
        let dispatcher = dispatcher(clinic());
        let call = ToolCallRequest::new("c1", "getMyAppointments", Value::Null);
        let result = dispatcher.dispatch(&call, &patient("John Doe")).await.unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn missing_identity_fails_closed() {
        let dispatcher = dispatcher(clinic());
        let context = DispatchContext::for_persona(&Persona::patient(), None);
        let call = ToolCallRequest::new("c1", "getMyAppointments", json!({}));
        assert!(matches!(
            dispatcher.dispatch(&call, &context).await,
            Err(DispatchError::ToolNotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn read_tools_return_payloads() {
        let dispatcher = dispatcher(clinic());
        for (name, args) in [
            ("getBillingOverview", json!({})),
            ("getInvoices", json!({ "patientName": "john" })),
            ("getDashboardStats", Value::Null),
            ("getPatients", json!({ "name": "" })),
            ("getAppointments", json!({ "date": "2024-08-15" })),
        ] {
            let call = ToolCallRequest::new("c", name, args);
            let result = dispatcher.dispatch(&call, &admin()).await.unwrap();
            assert!(result.is_success(), "{} failed: {:?}", name, result.message());
        }
    }

    mod permission {
        use super::*;
        use crate::domain::assistant::tools::ToolName;
        use proptest::prelude::*;

        fn run<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(future)
        }

        fn administrative_tool() -> impl Strategy<Value = &'static str> {
            prop::sample::select(vec![
                "bookAppointment",
                "getAppointments",
                "getBillingOverview",
                "getInvoices",
                "getDashboardStats",
                "getPatients",
            ])
        }

        proptest! {
            #[test]
            fn patients_never_reach_tools_outside_their_set(
                tool in administrative_tool(),
                key in "[a-zA-Z]{1,12}",
                value in ".{0,20}",
            ) {
                let clinic = clinic();
                let dispatcher = dispatcher(clinic.clone());
                let call = ToolCallRequest::new("c", tool, json!({ key: value }));

                let outcome = run(dispatcher.dispatch(&call, &patient("John Doe")));

                prop_assert_eq!(outcome, Err(DispatchError::ToolNotPermitted(tool.to_string())));
                prop_assert_eq!(clinic.booking_attempts(), 0);
            }

            #[test]
            fn names_outside_the_catalog_are_never_dispatched(name in "[a-zA-Z_]{1,24}") {
                prop_assume!(name.parse::<ToolName>().is_err());
                let dispatcher = dispatcher(clinic());
                let call = ToolCallRequest::new("c", name.clone(), json!({}));

                let outcome = run(dispatcher.dispatch(&call, &admin()));

                prop_assert!(outcome.is_err());
            }
        }
    }
}
