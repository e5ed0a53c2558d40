use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::aggregate::{OutError, OutValue};
use crate::domain::Profile;
use crate::fetch::FetchOutcome;

// Unreserved characters plus `/` stay literal.
const DEEPLINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// One instance's contribution to the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Profiles(Vec<OutValue>),
    Error(OutError),
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, DEEPLINK_ENCODE_SET).to_string()
}

/// Builds `{prefix}/{display name}/{last segment of source_url}`, both parts
/// percent-encoded.
pub fn canonical_url(relay_state_prefix: &str, display_name: &str, source_url: &str) -> String {
    let assertion = source_url.rsplit('/').next().unwrap_or(source_url);
    format!(
        "{}/{}/{}",
        relay_state_prefix.trim_end_matches('/'),
        encode_component(display_name),
        encode_component(assertion)
    )
}

/// Splits a fetch outcome into deep-linked profiles, or a single error entry
/// when the payload has no `result` list.
pub fn classify(outcome: FetchOutcome, relay_state_prefix: &str) -> Classified {
    let (instance, payload) = outcome.into_parts();

    let Some(entries) = payload.get("result").and_then(Value::as_array) else {
        return Classified::Error(OutError {
            account: instance,
            response: payload,
        });
    };

    let values = entries
        .iter()
        .map(|entry| {
            let profile = Profile::from_value(entry);
            let url = canonical_url(relay_state_prefix, instance.display_name(), &profile.url);
            OutValue {
                profile: profile.with_url(url),
                account: instance.clone(),
            }
        })
        .collect();

    Classified::Profiles(values)
}
