//! Client for the external chemistry and nuclear equation checker.

use crate::error::CheckerError;
use reqwest::blocking::Client;
use segue_config::CheckerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The two checking services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckerEndpoint {
    /// Chemical equations and expressions.
    Chemistry,
    /// Nuclear equations and expressions.
    Nuclear,
}

impl CheckerEndpoint {
    /// Selects the endpoint for a question.
    pub fn for_question(is_nuclear: bool) -> Self {
        if is_nuclear {
            CheckerEndpoint::Nuclear
        } else {
            CheckerEndpoint::Chemistry
        }
    }

    /// Returns the URL path of the endpoint.
    pub fn path(self) -> &'static str {
        match self {
            CheckerEndpoint::Chemistry => "/chemistry/check",
            CheckerEndpoint::Nuclear => "/nuclear/check",
        }
    }
}

/// One comparison request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerRequest {
    /// The authored choice's expression.
    pub target: String,
    /// The submitted expression.
    pub test: String,
    /// Free-text context, the question id.
    pub description: String,
    /// `"true"` if reordering terms is acceptable.
    pub allow_permutations: String,
    /// Id of the question.
    #[serde(rename = "questionID")]
    pub question_id: String,
}

impl CheckerRequest {
    /// Builds a request comparing `test` against `target`.
    pub fn new(target: &str, test: &str, question_id: &str, allow_permutations: bool) -> Self {
        Self {
            target: target.to_string(),
            test: test.to_string(),
            description: question_id.to_string(),
            allow_permutations: allow_permutations.to_string(),
            question_id: question_id.to_string(),
        }
    }
}

/// The checker's verdict. Absent fields read as `false` or empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerResponse {
    /// The expressions are equivalent.
    pub is_equal: bool,
    /// One is an equation and the other an expression.
    pub type_mismatch: bool,
    /// Same elements on each side.
    pub same_elements: bool,
    /// Same coefficients.
    pub same_coefficient: bool,
    /// Same state symbols.
    pub same_state: bool,
    /// Same reaction arrow.
    pub same_arrow: bool,
    /// Same bracketing.
    pub same_brackets: bool,
    /// The submitted equation balances.
    pub is_balanced: bool,
    /// Atomic and mass numbers of the submission are consistent.
    pub valid_atomic_number: bool,
    /// Kind of the target, e.g. `statement` or `expr`.
    pub expected_type: String,
    /// Kind of the submission.
    pub received_type: String,
    /// The submission could not be parsed.
    pub contains_error: bool,
    /// Parser message when `contains_error` is set.
    pub error: Option<String>,
}

/// Compares two mhchem expressions.
pub trait ChemistryChecker: Send + Sync {
    /// Sends one request to the given endpoint.
    fn check(
        &self,
        endpoint: CheckerEndpoint,
        request: &CheckerRequest,
    ) -> Result<CheckerResponse, CheckerError>;
}

/// [`ChemistryChecker`] speaking JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpChemistryChecker {
    client: Client,
    base_url: String,
}

impl HttpChemistryChecker {
    /// Creates a client for the configured checker.
    pub fn new(config: &CheckerConfig) -> Result<Self, CheckerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CheckerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// Returns the full URL of an endpoint.
    pub fn url(&self, endpoint: CheckerEndpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

impl ChemistryChecker for HttpChemistryChecker {
    fn check(
        &self,
        endpoint: CheckerEndpoint,
        request: &CheckerRequest,
    ) -> Result<CheckerResponse, CheckerError> {
        let url = self.url(endpoint);
        debug!(url = %url, question = %request.question_id, "calling chemistry checker");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| CheckerError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckerError::Status(status.as_u16()));
        }
        response
            .json::<CheckerResponse>()
            .map_err(|e| CheckerError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let request = CheckerRequest::new("H2O", "H_2O", "q1", false);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["target"], "H2O");
        assert_eq!(json["test"], "H_2O");
        assert_eq!(json["description"], "q1");
        assert_eq!(json["allowPermutations"], "false");
        assert_eq!(json["questionID"], "q1");
    }

    #[test]
    fn response_defaults_missing_fields() {
        let response: CheckerResponse =
            serde_json::from_str(r#"{"isEqual":true,"expectedType":"statement"}"#).unwrap();
        assert!(response.is_equal);
        assert_eq!(response.expected_type, "statement");
        assert!(!response.contains_error);
        assert!(response.error.is_none());
    }

    #[test]
    fn endpoint_urls() {
        let checker = HttpChemistryChecker::new(&CheckerConfig::default()).unwrap();
        assert_eq!(
            checker.url(CheckerEndpoint::Nuclear),
            "http://localhost:5000/nuclear/check"
        );
        assert_eq!(
            checker.url(CheckerEndpoint::for_question(false)),
            "http://localhost:5000/chemistry/check"
        );
    }

    #[test]
    fn unreachable_checker_is_transport_error() {
        let config = CheckerConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            timeout_secs: 1,
        };
        let checker = HttpChemistryChecker::new(&config).unwrap();
        let err = checker
            .check(CheckerEndpoint::Chemistry, &CheckerRequest::new("a", "b", "q", false))
            .unwrap_err();
        assert!(matches!(err, CheckerError::Transport(_)));
    }
}
