//! Data-arrival validation
//!
//! After a recipe runs, its validation query is polled until it reports data
//! for this host or the attempts run out.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::Profile;
use crate::discovery::DiscoveryManifest;
use crate::error::{InstallError, Result};
use crate::recipe::Recipe;

/// Outcome of a validation attempt that completed without error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub confirmed: bool,
    /// Empty when the query did not identify an entity
    pub entity_guid: String,
}

/// Confirms a recipe produced telemetry
pub trait RecipeValidator {
    fn validate(
        &self,
        cancel: &CancellationToken,
        manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<Validation>;
}

const QUERY: &str = "query($accountId: Int!, $nrql: Nrql!) \
    { actor { account(id: $accountId) { nrql(query: $nrql) { results } } } }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Validator polling NRQL through the account's GraphQL API
pub struct NerdGraphValidator {
    client: reqwest::blocking::Client,
    profile: Profile,
    max_attempts: u32,
    interval: Duration,
}

impl NerdGraphValidator {
    pub fn new(profile: Profile, max_attempts: u32, interval: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            profile,
            max_attempts,
            interval,
        })
    }

    /// Substitute host placeholders in a validation query
    pub fn render_query(nrql: &str, manifest: &DiscoveryManifest) -> String {
        nrql.replace("{HOSTNAME}", &manifest.hostname)
    }

    /// Interpret the `results` rows of an NRQL response
    pub fn interpret(response: &Value) -> Result<Validation> {
        let parsed: GraphqlResponse = serde_json::from_value(response.clone())?;
        if let Some(error) = parsed.errors.first() {
            return Err(InstallError::ValidationFailed {
                message: error.message.clone(),
            });
        }

        let results = parsed
            .data
            .as_ref()
            .and_then(|d| d.pointer("/actor/account/nrql/results"))
            .and_then(Value::as_array)
            .ok_or_else(|| InstallError::ValidationFailed {
                message: "response did not contain query results".to_string(),
            })?;

        let Some(row) = results.first() else {
            return Ok(Validation::default());
        };

        let count = row.get("count").and_then(Value::as_f64).unwrap_or(0.0);
        let entity_guid = row
            .get("entityGuid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Validation {
            confirmed: count > 0.0,
            entity_guid,
        })
    }

    fn query_once(&self, nrql: &str) -> Result<Validation> {
        let body = json!({
            "query": QUERY,
            "variables": { "accountId": self.profile.account_id, "nrql": nrql },
        });

        let response: Value = self
            .client
            .post(self.profile.region.graphql_endpoint())
            .header("API-Key", &self.profile.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        Self::interpret(&response)
    }
}

impl RecipeValidator for NerdGraphValidator {
    fn validate(
        &self,
        cancel: &CancellationToken,
        manifest: &DiscoveryManifest,
        recipe: &Recipe,
    ) -> Result<Validation> {
        if self.profile.api_key.is_empty() {
            return Err(InstallError::ProfileInvalid {
                message: "an API key is required to validate recipe data".to_string(),
            });
        }

        let nrql = Self::render_query(&recipe.validation_nrql, manifest);
        let mut last = Validation::default();

        for attempt in 1..=self.max_attempts {
            cancel.check()?;
            last = self.query_once(&nrql)?;
            debug!(
                recipe = %recipe.name,
                attempt,
                confirmed = last.confirmed,
                "Validation attempt"
            );
            if last.confirmed {
                return Ok(last);
            }
            if attempt < self.max_attempts {
                cancel.sleep(self.interval)?;
            }
        }

        Ok(last)
    }
}
