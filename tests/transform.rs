use serde_json::json;

use sso_deeplink::domain::{AppInstance, PLACEHOLDER};
use sso_deeplink::fetch::FetchOutcome;
use sso_deeplink::transform::{Classified, classify};

const PREFIX: &str = "https://example.awsapps.com/start/saml/custom/";

fn team() -> AppInstance {
    AppInstance::from_value(&json!({
        "id": "ins-1",
        "name": "My Team",
        "searchMetadata": {
            "AccountId": "123456789012",
            "AccountName": "my-team",
            "AccountEmail": "team@example.com"
        }
    }))
}

fn profiles_payload() -> serde_json::Value {
    json!({
        "result": [
            {
                "id": "p-1",
                "name": "AdministratorAccess",
                "description": "full access",
                "url": "https://portal.sso.eu-west-1.amazonaws.com/saml/assertion/abc123",
                "protocol": "SAML",
                "relayState": ""
            },
            {
                "id": "p-2",
                "name": "ReadOnly",
                "url": "https://portal.sso.eu-west-1.amazonaws.com/saml/assertion/def456",
                "protocol": "SAML"
            }
        ]
    })
}

#[test]
fn rewrites_profile_urls() {
    let outcome = FetchOutcome::Success {
        instance: team(),
        payload: profiles_payload(),
    };
    let Classified::Profiles(values) = classify(outcome, PREFIX) else {
        panic!("expected profiles");
    };

    assert_eq!(values.len(), 2);
    assert_eq!(
        values[0].profile.url,
        "https://example.awsapps.com/start/saml/custom/My%20Team/abc123"
    );
    assert_eq!(values[0].profile.name, "AdministratorAccess");
    assert_eq!(values[1].account, team());
}

#[test]
fn missing_description_becomes_placeholder() {
    let outcome = FetchOutcome::Success {
        instance: team(),
        payload: profiles_payload(),
    };
    let Classified::Profiles(values) = classify(outcome, PREFIX) else {
        panic!("expected profiles");
    };
    assert_eq!(values[1].profile.description, PLACEHOLDER);
    assert_eq!(values[1].profile.relay_state, PLACEHOLDER);
}

#[test]
fn classification_is_idempotent() {
    let first = classify(
        FetchOutcome::Success {
            instance: team(),
            payload: profiles_payload(),
        },
        PREFIX,
    );
    let second = classify(
        FetchOutcome::Success {
            instance: team(),
            payload: profiles_payload(),
        },
        PREFIX,
    );
    assert_eq!(first, second);
}

#[test]
fn missing_result_is_a_single_error() {
    let outcome = FetchOutcome::Success {
        instance: team(),
        payload: json!({ "message": "access denied" }),
    };
    let Classified::Error(error) = classify(outcome, PREFIX) else {
        panic!("expected an error entry");
    };
    assert_eq!(error.account.id, "ins-1");
    assert_eq!(error.response, json!({ "message": "access denied" }));
}

#[test]
fn transport_failure_is_an_error_entry() {
    let outcome = FetchOutcome::Failure {
        instance: team(),
        payload: json!({ "error": "connection refused" }),
    };
    assert!(matches!(classify(outcome, PREFIX), Classified::Error(_)));
}

#[test]
fn non_list_result_is_an_error() {
    let outcome = FetchOutcome::Success {
        instance: team(),
        payload: json!({ "result": null }),
    };
    assert!(matches!(classify(outcome, PREFIX), Classified::Error(_)));
}
