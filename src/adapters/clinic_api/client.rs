//! ClinicApiClient - reqwest implementation of the collaborator ports.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::wire::{parse_slot_time, ErrorBody, WireAppointment};
use crate::domain::clinic::{
    Appointment, BillingOverview, BookingOutcome, BookingRequest, DashboardStats, Invoice,
    Patient, PatientRef, RescheduleRequest, SlotDate, SlotTime,
};
use crate::ports::{
    BillingLedger, ClinicStats, CollaboratorError, PatientDirectory, SchedulingService,
};

/// Connection settings for the clinic backend.
#[derive(Debug, Clone)]
pub struct ClinicApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClinicApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the clinic REST backend.
pub struct ClinicApiClient {
    base: Url,
    client: Client,
}

impl ClinicApiClient {
    pub fn new(config: ClinicApiClientConfig) -> Result<Self, CollaboratorError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            CollaboratorError::Protocol(format!("invalid clinic API URL '{}': {}", config.base_url, e))
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;
        Ok(Self { base, client })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CollaboratorError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::Protocol("clinic API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, CollaboratorError> {
        Ok(self.client.request(method, self.endpoint(segments)?))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CollaboratorError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                CollaboratorError::Timeout
            } else {
                CollaboratorError::Network(e.to_string())
            }
        })
    }

    /// Sends and decodes. `Ok(None)` for 404, so list endpoints can read it
    /// as empty.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, CollaboratorError> {
        let response = self.send(request).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| CollaboratorError::Protocol(format!("undecodable body: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Clinic API request failed");
        if status.is_client_error() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("The request was rejected ({}).", status.as_u16()));
            Err(CollaboratorError::Rejected(message))
        } else {
            Err(CollaboratorError::unavailable(format!("status {}: {}", status.as_u16(), body)))
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, CollaboratorError> {
        Ok(self.fetch::<Option<Vec<T>>>(request).await?.flatten().unwrap_or_default())
    }

    async fn fetch_required<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, CollaboratorError> {
        self.fetch(request)
            .await?
            .ok_or_else(|| CollaboratorError::Protocol(format!("{} not found", what)))
    }

    async fn appointments(&self, request: RequestBuilder) -> Result<Vec<Appointment>, CollaboratorError> {
        self.fetch_list::<WireAppointment>(request)
            .await?
            .into_iter()
            .map(|wire| wire.into_domain().map_err(CollaboratorError::Protocol))
            .collect()
    }

    /// Mutation endpoints answer 204 for plain success.
    async fn mutate(&self, request: RequestBuilder) -> Result<BookingOutcome, CollaboratorError> {
        let response = self.send(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(BookingOutcome::accepted("Done."));
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() || status.is_client_error() {
            if let Ok(outcome) = serde_json::from_str::<BookingOutcome>(&body) {
                return Ok(outcome);
            }
        }
        if status.is_client_error() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("The request was rejected ({}).", status.as_u16()));
            return Ok(BookingOutcome::rejected(message));
        }
        if status.is_success() {
            return Err(CollaboratorError::Protocol("unexpected mutation response".into()));
        }
        Err(CollaboratorError::unavailable(format!("status {}: {}", status.as_u16(), body)))
    }
}

#[async_trait]
impl SchedulingService for ClinicApiClient {
    async fn available_slots(&self, date: &SlotDate) -> Result<Vec<SlotTime>, CollaboratorError> {
        let request = self
            .request(Method::GET, &["calendar", "slots"])?
            .query(&[("date", date.as_str())]);
        let raw: Vec<String> = self.fetch_list(request).await?;
        Ok(raw
            .iter()
            .filter_map(|slot| {
                let parsed = parse_slot_time(slot);
                if parsed.is_none() {
                    tracing::warn!(slot = %slot, "Skipping unreadable slot from clinic API");
                }
                parsed
            })
            .collect())
    }

    async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, CollaboratorError> {
        let body = json!({
            "patientName": request.patient_name,
            "date": request.date,
            "time": request.time,
            "type": request.appointment_type,
        });
        self.mutate(self.request(Method::POST, &["calendar", "appointments"])?.json(&body))
            .await
    }

    async fn appointments_on(&self, date: &SlotDate) -> Result<Vec<Appointment>, CollaboratorError> {
        let request = self
            .request(Method::GET, &["calendar", "appointments"])?
            .query(&[("date", date.as_str())]);
        self.appointments(request).await
    }

    async fn appointments_for_patient(
        &self,
        patient: &PatientRef,
    ) -> Result<Vec<Appointment>, CollaboratorError> {
        let request = match patient {
            PatientRef::Name(name) => self.request(
                Method::GET,
                &["calendar", "appointments", "patient-by-name", name.trim()],
            )?,
            PatientRef::Id(id) => self.request(
                Method::GET,
                &["calendar", "appointments", "patient", id.as_str()],
            )?,
        };
        self.appointments(request).await
    }

    async fn reschedule(
        &self,
        request: RescheduleRequest,
    ) -> Result<BookingOutcome, CollaboratorError> {
        let mut body = json!({
            "currentDate": request.current_date,
            "currentTime": request.current_time,
            "newDate": request.new_date,
            "newTime": request.new_time,
        });
        match &request.patient {
            PatientRef::Name(name) => body["patientName"] = json!(name.trim()),
            PatientRef::Id(id) => body["patientId"] = json!(id.as_str()),
        }
        let builder = self
            .request(Method::PUT, &["calendar", "appointments", "reschedule"])?
            .json(&body);
        self.mutate(builder).await
    }
}

#[async_trait]
impl PatientDirectory for ClinicApiClient {
    async fn patients(&self, name_filter: Option<&str>) -> Result<Vec<Patient>, CollaboratorError> {
        let mut request = self.request(Method::GET, &["patients"])?;
        if let Some(name) = name_filter {
            request = request.query(&[("name", name)]);
        }
        let mut patients: Vec<Patient> = self.fetch_list(request).await?;
        for patient in patients.iter_mut().filter(|p| p.avatar.is_empty()) {
            patient.avatar = Patient::initials(&patient.name);
        }
        Ok(patients)
    }
}

#[async_trait]
impl BillingLedger for ClinicApiClient {
    async fn overview(&self) -> Result<BillingOverview, CollaboratorError> {
        let request = self.request(Method::GET, &["billing", "overview"])?;
        self.fetch_required(request, "billing overview").await
    }

    async fn invoices(&self, patient_name: Option<&str>) -> Result<Vec<Invoice>, CollaboratorError> {
        let mut request = self.request(Method::GET, &["invoices"])?;
        if let Some(name) = patient_name {
            request = request.query(&[("patientName", name)]);
        }
        self.fetch_list(request).await
    }
}

#[async_trait]
impl ClinicStats for ClinicApiClient {
    async fn dashboard(&self) -> Result<DashboardStats, CollaboratorError> {
        let request = self.request(Method::GET, &["stats", "dashboard"])?;
        self.fetch_required(request, "dashboard stats").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PatientId;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> ClinicApiClient {
        ClinicApiClient::new(ClinicApiClientConfig::new(format!("{}/api/", server.uri()))).unwrap()
    }

    fn date(s: &str) -> SlotDate {
        SlotDate::parse(s).unwrap()
    }

    #[tokio::test]
    async fn slots_are_normalized_and_404_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calendar/slots"))
            .and(query_param("date", "2024-08-16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["09:00", "2:00 PM", "??"])))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let slots = client.available_slots(&date("2024-08-16")).await.unwrap();
        let slots: Vec<&str> = slots.iter().map(SlotTime::as_str).collect();
        assert_eq!(slots, vec!["09:00", "14:00"]);

        let none = client.available_slots(&date("2024-08-17")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn booking_posts_wire_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/calendar/appointments"))
            .and(body_json(json!({
                "patientName": "Alex Kim", "date": "2024-08-16", "time": "15:00", "type": "Consultation"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Booked Alex Kim at 15:00."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server)
            .await
            .book(BookingRequest {
                patient_name: "Alex Kim".into(),
                date: date("2024-08-16"),
                time: SlotTime::parse("15:00").unwrap(),
                appointment_type: "Consultation".into(),
            })
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn conflict_message_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/calendar/appointments/reschedule"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "The 09:00 slot on 2024-08-16 is already booked." })),
            )
            .mount(&server)
            .await;

        let outcome = client(&server)
            .await
            .reschedule(RescheduleRequest {
                patient: PatientRef::Name("John Doe".into()),
                current_date: date("2024-08-16"),
                current_time: SlotTime::parse("14:00").unwrap(),
                new_date: date("2024-08-16"),
                new_time: SlotTime::parse("09:00").unwrap(),
            })
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "The 09:00 slot on 2024-08-16 is already booked.");
    }

    #[tokio::test]
    async fn identity_scoped_calls_address_the_patient_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calendar/appointments/patient/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "a1", "patientId": "p-1", "patientName": "John Doe",
                "date": "2024-08-15", "time": "10:00", "type": "Check-up", "status": "confirmed"
            }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/calendar/appointments/reschedule"))
            .and(body_json(json!({
                "patientId": "p-1",
                "currentDate": "2024-08-16", "currentTime": "14:00",
                "newDate": "2024-08-16", "newTime": "15:00"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let patient = PatientRef::Id(PatientId::new("p-1").unwrap());
        let mine = client.appointments_for_patient(&patient).await.unwrap();
        assert_eq!(mine[0].patient_id, Some(PatientId::new("p-1").unwrap()));

        let outcome = client
            .reschedule(RescheduleRequest {
                patient,
                current_date: date("2024-08-16"),
                current_time: SlotTime::parse("14:00").unwrap(),
                new_date: date("2024-08-16"),
                new_time: SlotTime::parse("15:00").unwrap(),
            })
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn patient_name_is_path_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/calendar/appointments/patient-by-name/John%20Doe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "a1", "patientName": "John Doe", "datetime": "2024-08-15T10:00:00Z",
                "type": "Check-up", "status": "confirmed"
            }])))
            .mount(&server)
            .await;

        let appointments = client(&server)
            .await
            .appointments_for_patient(&PatientRef::Name("John Doe".into()))
            .await
            .unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].time.as_str(), "10:00");
    }

    #[tokio::test]
    async fn server_errors_are_unavailable_and_client_errors_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/billing/overview"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/calendar/appointments"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid date." })),
            )
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert!(matches!(client.overview().await, Err(CollaboratorError::Unavailable(_))));
        assert_eq!(
            client.appointments_on(&date("2024-02-30")).await.unwrap_err(),
            CollaboratorError::Rejected("Invalid date.".into())
        );
    }

    #[tokio::test]
    async fn patients_get_initials_when_avatar_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/patients"))
            .and(query_param("name", "jane"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "p-2", "name": "Jane Smith", "email": "jane@example.com", "dob": "1990-01-01" }
            ])))
            .mount(&server)
            .await;

        let patients = client(&server).await.patients(Some("jane")).await.unwrap();
        assert_eq!(patients[0].avatar, "JS");
    }
}
