use serde::Serialize;
use serde_json::Value;

use crate::domain::{AppInstance, Profile};
use crate::transform::Classified;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutValue {
    pub profile: Profile,
    pub account: AppInstance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutError {
    pub account: AppInstance,
    pub response: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Output {
    pub result: Vec<OutValue>,
    pub errors: Vec<OutError>,
}

impl Output {
    /// Number of distinct instances that contributed at least one profile.
    pub fn accounts_with_profiles(&self) -> usize {
        let mut ids = self
            .result
            .iter()
            .map(|value| value.account.id.as_str())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

/// Partitions classified items, keeping arrival order within each side.
pub fn merge<I>(items: I) -> Output
where
    I: IntoIterator<Item = Classified>,
{
    let mut output = Output::default();
    for item in items {
        match item {
            Classified::Profiles(values) => output.result.extend(values),
            Classified::Error(error) => output.errors.push(error),
        }
    }
    output
}
