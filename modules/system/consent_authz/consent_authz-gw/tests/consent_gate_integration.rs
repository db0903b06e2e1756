#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use consent_authz_gw::{ConsentAuthzGateway, ConsentAuthzGwConfig, InMemorySessionStore};
use consent_authz_sdk::{
    Action, ActionSet, AuthenticationContext, AuthenticationOutcome, AuthorizationDecision,
    AuthorizedVia, ConsentGateClient, ConsentGrantModel, Principal, RejectReason,
    ResourceDescriptor, RoleRejected, RoleSink, SessionDataStore, Tag, TagMatchMode,
};
use tracing_test::traced_test;

/// Accepts every role and remembers what it was given.
#[derive(Default)]
struct AcceptingSink {
    roles: Mutex<Vec<String>>,
}

impl RoleSink for AcceptingSink {
    fn add_authority(&self, role: &str) -> Result<(), RoleRejected> {
        self.roles.lock().unwrap().push(role.to_owned());
        Ok(())
    }
}

/// Rejects every role.
struct RejectingSink;

impl RoleSink for RejectingSink {
    fn add_authority(&self, role: &str) -> Result<(), RoleRejected> {
        Err(RoleRejected(role.to_owned()))
    }
}

struct Harness {
    client: Arc<dyn ConsentGateClient>,
    store: Arc<InMemorySessionStore>,
}

fn harness(cfg: ConsentAuthzGwConfig) -> Harness {
    let store = Arc::new(InMemorySessionStore::new());
    let gateway = ConsentAuthzGateway::init(cfg, store.clone()).unwrap();
    Harness {
        client: gateway.client(),
        store,
    }
}

fn token(claims: serde_json::Value) -> AuthenticationContext {
    AuthenticationContext::TokenBased {
        claims: claims.as_object().cloned().expect("claims must be an object"),
    }
}

fn resource(study_codes: &[&str]) -> ResourceDescriptor {
    study_codes
        .iter()
        .fold(ResourceDescriptor::new("Observation").with_id("O1"), |r, code| {
            r.with_tag(Tag::study(*code))
        })
}

/// Run stage 1 and, on `Proceed`, stage 2.
async fn request(
    client: &dyn ConsentGateClient,
    principal: &Principal,
    operation: &str,
    resource: &ResourceDescriptor,
) -> AuthorizationDecision {
    match client.start_operation(principal).await.unwrap() {
        AuthorizationDecision::Proceed => client
            .can_see_resource(principal, operation, resource)
            .await
            .unwrap(),
        terminal => terminal,
    }
}

#[tokio::test]
async fn read_all_and_write_one_study() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-1", ["FHIR_ALL_READ"]);

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({
                "fhir_roles": [],
                "fhir_consent_grants": [
                    "fhir-consent-read-study|all",
                    "fhir-consent-write-study|SD-0"
                ]
            })),
            &AcceptingSink::default(),
        )
        .await
        .unwrap();

    let expected = ConsentGrantModel {
        all: ActionSet {
            read: true,
            ..ActionSet::NONE
        },
        study: BTreeMap::from([(
            "SD-0".to_owned(),
            ActionSet {
                write: true,
                ..ActionSet::NONE
            },
        )]),
    };
    assert_eq!(
        outcome,
        AuthenticationOutcome::Authenticated {
            roles_added: vec![],
            grants: expected,
        }
    );

    let client = h.client.as_ref();
    assert_eq!(
        request(client, &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::AllGrant(Action::Read))
    );
    assert_eq!(
        request(client, &principal, "PUT", &resource(&["SD-0"])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::StudyGrant(Action::Write))
    );
    assert_eq!(
        request(client, &principal, "PUT", &resource(&["SD-1"])).await,
        AuthorizationDecision::Rejected(RejectReason::InsufficientGrants(Action::Write))
    );
    assert_eq!(
        request(client, &principal, "DELETE", &resource(&[])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::StudyGrant(Action::Delete))
    );
    assert_eq!(
        request(client, &principal, "PATCH", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::UnrecognizedOperation("PATCH".to_owned()))
    );
}

#[tokio::test]
async fn legacy_token_derives_roles_and_grants() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-2", Vec::<String>::new());
    let sink = AcceptingSink::default();

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({
                "fhir": [
                    "fhir-role-fhir-client-superuser_ro",
                    "fhir-consent-read-study|SD-7"
                ]
            })),
            &sink,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AuthenticationOutcome::Authenticated { ref roles_added, .. }
            if roles_added == &vec!["ROLE_FHIR_CLIENT_SUPERUSER_RO".to_owned()]
    ));
    assert_eq!(
        *sink.roles.lock().unwrap(),
        vec!["ROLE_FHIR_CLIENT_SUPERUSER_RO".to_owned()]
    );

    // The host applies the added authority to the principal.
    let principal = Principal::new("session-2", ["ROLE_FHIR_CLIENT_SUPERUSER_RO"]);
    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&["SD-7"])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::StudyGrant(Action::Read))
    );
}

#[tokio::test]
async fn session_notes_grants_are_stored() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-3", ["FHIR_ALL_WRITE"]);
    let context = AuthenticationContext::SessionNotesBased {
        notes: r#"{"fhir_consent_grants": ["fhir-consent-write-study|SD-0"]}"#.to_owned(),
    };

    h.client
        .on_authenticate_success(&principal, &context, &AcceptingSink::default())
        .await
        .unwrap();

    let raw = h
        .store
        .load("session-3", "consentGrants")
        .await
        .unwrap()
        .expect("grants stored");
    let model = ConsentGrantModel::from_stored(&raw).unwrap();
    assert!(model.study["SD-0"].write);
    assert!(!model.all.write);
}

#[tokio::test]
async fn superuser_skips_everything() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-4", ["ROLE_SUPERUSER"]);
    h.store
        .store("session-4", "consentGrants", r#"{"all":{"read":true}}"#.to_owned())
        .await
        .unwrap();

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &AuthenticationContext::SessionNotesBased {
                notes: "not json".to_owned(),
            },
            &AcceptingSink::default(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, AuthenticationOutcome::Bypassed);
    assert!(h.store.is_empty());

    assert_eq!(
        request(h.client.as_ref(), &principal, "DELETE", &resource(&["SD-9"])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::Superuser)
    );
}

#[tokio::test]
async fn principal_without_admission_role_is_rejected() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-5", ["ROLE_USER"]);

    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::NoAdmissionRole)
    );
}

#[tokio::test]
async fn missing_and_corrupt_grants_are_rejected() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-6", ["FHIR_ALL_READ"]);

    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::MissingGrantModel)
    );

    h.store
        .store("session-6", "consentGrants", "{".to_owned())
        .await
        .unwrap();
    assert!(matches!(
        request(h.client.as_ref(), &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::MalformedGrantModel(_))
    ));

    h.store
        .store("session-6", "consentGrants", r#"{"all":{}}"#.to_owned())
        .await
        .unwrap();
    assert!(matches!(
        request(h.client.as_ref(), &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::InvalidGrantModel(_))
    ));
}

#[tokio::test]
async fn empty_grants_are_rejected() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-7", ["FHIR_ALL_READ"]);

    h.client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({"fhir": []})),
            &AcceptingSink::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&[])).await,
        AuthorizationDecision::Rejected(RejectReason::NoGrants)
    );
}

#[tokio::test]
async fn study_tags_only_policy_ignores_other_tag_systems() {
    let mut cfg = ConsentAuthzGwConfig::default();
    cfg.gate.tag_match = TagMatchMode::StudyTagsOnly;
    let h = harness(cfg);
    let principal = Principal::new("session-8", ["FHIR_ALL_READ"]);

    h.client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({"fhir": ["fhir-consent-read-study|SD-0"]})),
            &AcceptingSink::default(),
        )
        .await
        .unwrap();

    let tagged = resource(&["SD-0"]).with_tag(Tag::new("urn:category", "vitals"));
    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &tagged).await,
        AuthorizationDecision::Authorized(AuthorizedVia::StudyGrant(Action::Read))
    );
}

#[tokio::test]
#[traced_test]
async fn rejected_roles_do_not_fail_authentication() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-9", Vec::<String>::new());

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({
                "fhir": ["fhir-role-fhir-client-superuser", "fhir-consent-read-study|all"]
            })),
            &RejectingSink,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AuthenticationOutcome::Authenticated { ref roles_added, .. } if roles_added.is_empty()
    ));
    assert!(logs_contain("Unrecognized role, skipping"));
    assert!(logs_contain("ROLE_FHIR_CLIENT_SUPERUSER"));
}

#[tokio::test]
async fn malformed_claim_yields_failure_outcome() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-10", Vec::<String>::new());

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({"fhir": ["fhir-consent-admin-study|SD-0"]})),
            &AcceptingSink::default(),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, AuthenticationOutcome::Failure { .. }));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn failed_reauthentication_revokes_earlier_grants() {
    let h = harness(ConsentAuthzGwConfig::default());
    let principal = Principal::new("session-11", ["FHIR_ALL_READ"]);
    let sink = AcceptingSink::default();

    h.client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({"fhir": ["fhir-consent-read-study|all"]})),
            &sink,
        )
        .await
        .unwrap();
    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&["SD-5"])).await,
        AuthorizationDecision::Authorized(AuthorizedVia::AllGrant(Action::Read))
    );

    let outcome = h
        .client
        .on_authenticate_success(
            &principal,
            &token(serde_json::json!({
                "fhir": ["fhir-role-fhir-client-superuser", "fhir-consent-admin-study|SD-0"]
            })),
            &sink,
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        AuthenticationOutcome::Failure {
            message: "Failed to parse consent authorizations".to_owned()
        }
    );
    assert!(sink.roles.lock().unwrap().is_empty());
    assert_eq!(
        request(h.client.as_ref(), &principal, "GET", &resource(&["SD-5"])).await,
        AuthorizationDecision::Rejected(RejectReason::MissingGrantModel)
    );
}
