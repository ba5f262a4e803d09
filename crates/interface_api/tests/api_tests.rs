//! HTTP tests for the workflow API over the in-memory store

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use core_kernel::{Actor, ActorId, Role};
use interface_api::auth::create_token;
use interface_api::config::{ApiConfig, StoreBackend};
use interface_api::create_router;
use test_utils::{WorkflowActors, WorkflowHarness};

const SECRET: &str = "api-test-secret";

struct Api {
    server: TestServer,
    harness: WorkflowHarness,
}

impl Api {
    fn new() -> Self {
        let harness = WorkflowHarness::new();
        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            store: StoreBackend::Memory,
            ..ApiConfig::default()
        };
        let server = TestServer::new(create_router(harness.service.clone(), config)).unwrap();
        Self { server, harness }
    }

    fn actors(&self) -> &WorkflowActors {
        &self.harness.actors
    }

    fn token(actor: &Actor) -> String {
        create_token(actor, SECRET, 300).unwrap()
    }

    async fn post(&self, actor: &Actor, path: &str, body: Value) -> axum_test::TestResponse {
        self.server
            .post(path)
            .authorization_bearer(Self::token(actor))
            .json(&body)
            .await
    }

    async fn get(&self, actor: &Actor, path: &str) -> axum_test::TestResponse {
        self.server
            .get(path)
            .authorization_bearer(Self::token(actor))
            .await
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let api = Api::new();
        let response = api.server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_store() {
        let api = Api::new();
        let response = api.server.get("/health/ready").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["store"]["adapter_id"], "memory-workflow-store");
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let api = Api::new();
        let response = api
            .server
            .post("/api/v1/alerts")
            .json(&json!({"priority": "urgent"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let api = Api::new();
        let actor = Actor::new(ActorId::new(), Role::Insured);
        let token = create_token(&actor, "not-the-secret", 300).unwrap();
        let response = api
            .server
            .get("/api/v1/alerts/ALR-00000000-0000-0000-0000-000000000000")
            .authorization_bearer(token)
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod alerts {
    use super::*;

    #[tokio::test]
    async fn test_raise_and_read_alert() {
        let api = Api::new();
        let insured = api.actors().insured.clone();

        let response = api
            .post(&insured, "/api/v1/alerts", json!({"priority": "critical", "location": "Blida"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let alert = response.json::<Value>();
        assert_eq!(alert["status"], "pending");
        let id = alert["id"].as_str().unwrap();
        assert!(id.starts_with("ALR-"));

        let response = api.get(&insured, &format!("/api/v1/alerts/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["location"], "Blida");
    }

    #[tokio::test]
    async fn test_other_insured_cannot_see_alert() {
        let api = Api::new();
        let owner = api.actors().insured.clone();
        let stranger = Actor::new(ActorId::new(), Role::Insured);

        let alert = api
            .post(&owner, "/api/v1/alerts", json!({"priority": "normal"}))
            .await
            .json::<Value>();
        let response = api
            .get(&stranger, &format!("/api/v1/alerts/{}", alert["id"].as_str().unwrap()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "not_found");
    }

    #[tokio::test]
    async fn test_resolve_pending_alert_is_conflict() {
        let api = Api::new();
        let a = api.actors().clone();
        let alert = api
            .post(&a.insured, "/api/v1/alerts", json!({"priority": "high"}))
            .await
            .json::<Value>();

        let response = api
            .post(
                &a.operator,
                &format!("/api/v1/alerts/{}/resolve", alert["id"].as_str().unwrap()),
                json!({}),
            )
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "invalid_transition");
    }

    #[tokio::test]
    async fn test_assign_hospital_opens_claim() {
        let api = Api::new();
        let a = api.actors().clone();
        let alert = api
            .post(&a.insured, "/api/v1/alerts", json!({"priority": "urgent"}))
            .await
            .json::<Value>();

        let response = api
            .post(
                &a.operator,
                &format!("/api/v1/alerts/{}/hospital", alert["id"].as_str().unwrap()),
                json!({"hospital_id": a.hospital.to_string()}),
            )
            .await;
        response.assert_status(StatusCode::CREATED);
        let claim = response.json::<Value>();
        assert!(claim["id"].as_str().unwrap().starts_with("SIN-"));
        assert_eq!(claim["steps"][0]["step_key"], "urgency_verification");
        assert_eq!(claim["steps"][0]["status"], "in_progress");
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let api = Api::new();
        let response = api.get(&api.actors().operator.clone(), "/api/v1/alerts/not-an-id").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod claims {
    use super::*;

    #[tokio::test]
    async fn test_urgency_decision_is_idempotent() {
        let api = Api::new();
        let referent = api.actors().referent.clone();
        let claim = api.harness.open_claim().await;
        let path = format!("/api/v1/claims/{}/urgency-decision", claim.id);

        let first = api.post(&referent, &path, json!({"approve": true})).await;
        first.assert_status_ok();
        let numero = first.json::<Value>()["numero"].clone();
        assert!(numero.is_string());

        let repeat = api.post(&referent, &path, json!({"approve": true})).await;
        repeat.assert_status_ok();
        assert_eq!(repeat.json::<Value>()["numero"], numero);

        let flip = api.post(&referent, &path, json!({"approve": false})).await;
        flip.assert_status(StatusCode::CONFLICT);
        assert_eq!(flip.json::<Value>()["error"], "already_decided");
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let api = Api::new();
        let doctor = api.actors().doctor.clone();
        let claim = api.harness.open_claim().await;

        let response = api
            .post(
                &doctor,
                &format!("/api/v1/claims/{}/urgency-decision", claim.id),
                json!({"approve": true}),
            )
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_orientation_before_urgency_is_conflict() {
        let api = Api::new();
        let a = api.actors().clone();
        let claim = api.harness.open_claim().await;

        let response = api
            .post(
                &a.reception,
                &format!("/api/v1/claims/{}/orientation", claim.id),
                json!({"doctor_id": a.doctor.id.to_string()}),
            )
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "premature_orientation");
    }

    #[tokio::test]
    async fn test_get_claim_carries_stage() {
        let api = Api::new();
        let referent = api.actors().referent.clone();
        let claim = api.harness.open_claim().await;

        let response = api.get(&referent, &format!("/api/v1/claims/{}", claim.id)).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["stage"], "claim_review");
        assert!(body["stay"].is_null());
    }

    #[tokio::test]
    async fn test_queue_by_stage() {
        let api = Api::new();
        let referent = api.actors().referent.clone();
        api.harness.open_claim().await;
        api.harness.open_claim().await;
        api.harness.validated_stay().await;

        let review = api
            .get(&referent, "/api/v1/claims?classified_stage=claim_review&per_page=1")
            .await;
        review.assert_status_ok();
        let body = review.json::<Value>();
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let validated = api
            .get(&referent, "/api/v1/claims?classified_stage=report_validated")
            .await
            .json::<Value>();
        assert_eq!(validated["total"], 1);
    }

    #[tokio::test]
    async fn test_unknown_stage_is_bad_request() {
        let api = Api::new();
        let referent = api.actors().referent.clone();
        let response = api.get(&referent, "/api/v1/claims?classified_stage=archived").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod stays {
    use super::*;

    #[tokio::test]
    async fn test_report_round_trips_days() {
        let api = Api::new();
        let doctor = api.actors().doctor.clone();
        let stay = api.harness.open_stay().await;

        let response = api
            .post(
                &doctor,
                &format!("/api/v1/stays/{}/report", stay.id),
                json!({"motif_consultation": "Fracture", "duration_days": 3, "close_stay": false}),
            )
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["report"]["duration_days"], 3);
    }

    #[tokio::test]
    async fn test_invoice_on_open_stay_is_conflict() {
        let api = Api::new();
        let accountant = api.actors().accountant.clone();
        let stay = api.harness.open_stay().await;

        let response = api
            .post(
                &accountant,
                &format!("/api/v1/stays/{}/invoice", stay.id),
                json!({"lines": [{"label": "Consultation", "quantity": 1, "unit_price": "1000"}], "tax_rate": "0.09"}),
            )
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "stay_not_validated");
    }

    #[tokio::test]
    async fn test_invalid_line_is_unprocessable() {
        let api = Api::new();
        let accountant = api.actors().accountant.clone();
        let stay = api.harness.validated_stay().await;

        let response = api
            .post(
                &accountant,
                &format!("/api/v1/stays/{}/invoice", stay.id),
                json!({"lines": [{"label": "Radio", "quantity": 0, "unit_price": "800"}], "tax_rate": "0"}),
            )
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "invalid_line");
    }

    #[tokio::test]
    async fn test_empty_invoice_is_rejected_before_the_service() {
        let api = Api::new();
        let accountant = api.actors().accountant.clone();
        let stay = api.harness.validated_stay().await;

        let response = api
            .post(
                &accountant,
                &format!("/api/v1/stays/{}/invoice", stay.id),
                json!({"lines": [], "tax_rate": "0"}),
            )
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_unknown_currency_is_rejected() {
        let api = Api::new();
        let accountant = api.actors().accountant.clone();
        let stay = api.harness.validated_stay().await;

        let response = api
            .post(
                &accountant,
                &format!("/api/v1/stays/{}/invoice", stay.id),
                json!({"lines": [{"label": "Radio", "quantity": 1, "unit_price": "800"}], "tax_rate": "0", "currency": "XYZ"}),
            )
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod invoices {
    use super::*;

    #[tokio::test]
    async fn test_issue_invoice_totals() {
        let api = Api::new();
        let accountant = api.actors().accountant.clone();
        let stay = api.harness.validated_stay().await;

        let response = api
            .post(
                &accountant,
                &format!("/api/v1/stays/{}/invoice", stay.id),
                json!({
                    "lines": [
                        {"label": "Consultation", "quantity": 1, "unit_price": "2000"},
                        {"label": "Nuit", "quantity": 2, "unit_price": "5000"}
                    ],
                    "tax_rate": "0.09"
                }),
            )
            .await;
        response.assert_status(StatusCode::CREATED);
        let invoice = response.json::<Value>();
        assert_eq!(invoice["status"], "pending_medical");
        assert_eq!(invoice["subtotal"], "12000");
        assert_eq!(invoice["tax_amount"], "1080");
        assert_eq!(invoice["total"], "13080");
        assert!(invoice["numero"].as_str().unwrap().starts_with("FAC-"));
    }

    #[tokio::test]
    async fn test_full_approval_chain() {
        let api = Api::new();
        let a = api.actors().clone();
        let invoice = api.harness.issued_invoice().await;

        let medical = api
            .post(
                &a.referent,
                &format!("/api/v1/invoices/{}/validate-medical", invoice.id),
                json!({"approve": true}),
            )
            .await;
        medical.assert_status_ok();
        assert_eq!(medical.json::<Value>()["status"], "pending_sinistre");

        let queue = api.get(&a.agent, "/api/v1/invoices?awaiting=me").await;
        queue.assert_status_ok();
        assert_eq!(queue.json::<Value>()["total"], 1);

        api.post(
            &a.agent,
            &format!("/api/v1/invoices/{}/validate-sinistre", invoice.id),
            json!({"approve": true}),
        )
        .await
        .assert_status_ok();

        let compta = api
            .post(
                &a.insurer_accountant,
                &format!("/api/v1/invoices/{}/validate-compta", invoice.id),
                json!({"approve": true, "notes": "payé"}),
            )
            .await;
        compta.assert_status_ok();
        let body = compta.json::<Value>();
        assert_eq!(body["status"], "validated");
        assert_eq!(body["validation_compta"]["notes"], "payé");

        let claim = api
            .get(&a.referent, &format!("/api/v1/claims/{}", invoice.claim_id))
            .await
            .json::<Value>();
        assert_eq!(claim["stage"], "resolved");
        assert_eq!(claim["stay"]["status"], "completed");
    }

    #[tokio::test]
    async fn test_second_decision_is_conflict() {
        let api = Api::new();
        let referent = api.actors().referent.clone();
        let invoice = api.harness.issued_invoice().await;
        let path = format!("/api/v1/invoices/{}/validate-medical", invoice.id);

        api.post(&referent, &path, json!({"approve": false})).await.assert_status_ok();
        let again = api.post(&referent, &path, json!({"approve": true})).await;
        again.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_queue_requires_awaiting_me() {
        let api = Api::new();
        let agent = api.actors().agent.clone();
        let response = api.get(&agent, "/api/v1/invoices").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_doctor_has_no_invoice_queue() {
        let api = Api::new();
        let doctor = api.actors().doctor.clone();
        let response = api.get(&doctor, "/api/v1/invoices?awaiting=me").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
