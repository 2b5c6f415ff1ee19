//! Servicio de notificaciones por email
//!
//! Envía los dos correos del envío final (centro de despacho y motorista)
//! a través de la API HTTP de Resend. Los envíos son best-effort: cada
//! canal reporta su propio booleano y las fallas quedan logueadas, nunca
//! propagadas al flujo del wizard.

use serde::Serialize;

use crate::models::{short_request_id, Draft};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

pub struct NotificationService {
    api_key: Option<String>,
    dispatch_email: String,
    from_address: String,
    client: reqwest::Client,
}

impl NotificationService {
    pub fn new(
        api_key: Option<String>,
        dispatch_email: String,
        from_address: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            dispatch_email,
            from_address,
            client,
        }
    }

    /// Enviar ambos correos; siempre corren hasta el final, cada uno con su
    /// resultado independiente
    pub async fn notify_all(&self, draft: &Draft) -> (bool, bool) {
        tokio::join!(self.send_operator_email(draft), self.send_customer_email(draft))
    }

    /// Correo al centro de despacho con el detalle completo de la solicitud
    pub async fn send_operator_email(&self, draft: &Draft) -> bool {
        let subject = operator_subject(draft);
        let body = operator_body(draft);
        self.send(&self.dispatch_email, &subject, &body).await
    }

    /// Confirmación al motorista con su número de referencia
    pub async fn send_customer_email(&self, draft: &Draft) -> bool {
        let Some(motorist) = &draft.motorist else {
            log::error!("❌ Customer email skipped: draft has no motorist contact");
            return false;
        };
        let subject = format!("Your roadside assistance request {}", draft.short_id());
        let body = customer_body(draft);
        self.send(&motorist.email, &subject, &body).await
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(api_key) = &self.api_key else {
            log::error!("❌ Email not sent (no API key configured). Subject: {}", subject);
            log::info!("📄 Email body:\n{}", body);
            return false;
        };

        let email = ResendEmail {
            from: &self.from_address,
            to: vec![to],
            subject,
            text: body,
        };

        match self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                log::info!("✅ Email sent to {}: {}", to, subject);
                true
            }
            Ok(response) => {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                log::error!("❌ Email to {} failed with status {}: {}", to, status, error_text);
                false
            }
            Err(e) => {
                log::error!("❌ Email to {} failed: {}", to, e);
                false
            }
        }
    }
}

/// "[Roadside Request] Flat Tire — 123 Main St — 550E8400"
fn operator_subject(draft: &Draft) -> String {
    let label = draft
        .service_type
        .map(|s| s.label())
        .unwrap_or("Unknown Service");
    let street = draft
        .pickup_location
        .as_ref()
        .and_then(|l| l.address.split(',').next())
        .unwrap_or("Unknown location")
        .trim();
    format!(
        "[Roadside Request] {} — {} — {}",
        label,
        street,
        short_request_id(&draft.request_id)
    )
}

fn operator_body(draft: &Draft) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("New roadside assistance request".to_string());
    lines.push(String::new());
    lines.push(format!("Request ID: {}", draft.request_id));
    if let Some(service) = draft.service_type {
        lines.push(format!("Service: {}", service.label()));
    }
    lines.push(String::new());

    if let Some(motorist) = &draft.motorist {
        lines.push("Motorist:".to_string());
        lines.push(format!("  Name: {}", motorist.full_name()));
        lines.push(format!("  Phone: {}", motorist.phone));
        lines.push(format!("  Email: {}", motorist.email));
        lines.push(String::new());
    }

    if let Some(location) = &draft.pickup_location {
        lines.push("Pickup location:".to_string());
        lines.push(format!("  Address: {}", location.address));
        lines.push(format!("  Coordinates: {}, {}", location.lat, location.lng));
        lines.push(format!(
            "  Source: {}",
            match location.source {
                crate::models::LocationSource::Gps => "GPS",
                crate::models::LocationSource::Manual => "manual entry",
            }
        ));
        lines.push(String::new());
    }

    if let Some(situation) = &draft.situation {
        lines.push("Situation:".to_string());
        for (key, value) in situation.detail_lines() {
            lines.push(format!("  • {}: {}", key, value));
        }
        lines.push(String::new());
    }

    if let Some(vehicle) = &draft.vehicle {
        lines.push(format!("Vehicle: {}", vehicle.describe()));
        lines.push(String::new());
    }

    lines.push("Action required: dispatch a service provider and contact the motorist.".to_string());
    lines.join("\n")
}

fn customer_body(draft: &Draft) -> String {
    let name = draft
        .motorist
        .as_ref()
        .map(|m| m.first_name.clone())
        .unwrap_or_else(|| "there".to_string());
    let label = draft
        .service_type
        .map(|s| s.label())
        .unwrap_or("roadside assistance");
    let address = draft
        .pickup_location
        .as_ref()
        .map(|l| l.address.clone())
        .unwrap_or_default();

    format!(
        "Hi {},\n\n\
         We received your {} request and a service provider is being dispatched.\n\n\
         Reference number: {}\n\
         Pickup location: {}\n\n\
         Keep your phone nearby. A dispatcher may call to confirm details.",
        name,
        label,
        short_request_id(&draft.request_id),
        address
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LocationSource, Motorist, PickupLocation, ServiceType, Situation, VehicleInfo,
    };
    use uuid::Uuid;

    fn complete_draft() -> Draft {
        let mut draft = Draft::new();
        draft.request_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        draft.service_type = Some(ServiceType::FlatTire);
        draft.pickup_location = Some(PickupLocation {
            address: "123 Main St, Springfield, IL".to_string(),
            lat: 39.7817,
            lng: -89.6501,
            source: LocationSource::Manual,
        });
        draft.situation = Some(Situation::FlatTire {
            tire_count: 1,
            has_spare: true,
            safe_location: true,
        });
        draft.vehicle = Some(VehicleInfo {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2018,
            color: "Blue".to_string(),
            is_awd: false,
        });
        draft.motorist = Some(Motorist {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: "(217) 555-0133".to_string(),
            email: "jane@example.com".to_string(),
        });
        draft
    }

    #[test]
    fn test_operator_subject_format() {
        let draft = complete_draft();
        assert_eq!(
            operator_subject(&draft),
            "[Roadside Request] Flat Tire — 123 Main St — 550E8400"
        );
    }

    #[test]
    fn test_operator_body_includes_every_section() {
        let draft = complete_draft();
        let body = operator_body(&draft);

        assert!(body.contains("Request ID: 550e8400-e29b-41d4-a716-446655440000"));
        assert!(body.contains("Name: Jane Doe"));
        assert!(body.contains("Phone: (217) 555-0133"));
        assert!(body.contains("Address: 123 Main St, Springfield, IL"));
        assert!(body.contains("Source: manual entry"));
        assert!(body.contains("• Tire Count: 1"));
        assert!(body.contains("• Has Spare: Yes"));
        assert!(body.contains("Vehicle: 2018 Toyota Camry (Blue)"));
        assert!(body.contains("Action required"));
    }

    #[test]
    fn test_customer_body_carries_reference() {
        let draft = complete_draft();
        let body = customer_body(&draft);
        assert!(body.contains("Hi Jane,"));
        assert!(body.contains("Reference number: 550E8400"));
        assert!(body.contains("123 Main St, Springfield, IL"));
    }

    #[tokio::test]
    async fn test_send_without_api_key_reports_failure() {
        let service = NotificationService::new(
            None,
            "dispatch@example.com".to_string(),
            "noreply@example.com".to_string(),
            reqwest::Client::new(),
        );
        let draft = complete_draft();

        let (operator, customer) = service.notify_all(&draft).await;
        assert!(!operator);
        assert!(!customer);
    }
}
