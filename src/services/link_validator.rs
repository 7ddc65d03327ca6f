//! Link validation service
//!
//! Before the hub acts on a third-party URL it fetches that resource and checks
//! that its `Link` header really names this hub. Nothing is cached: trust is
//! re-established on every request.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::models::{LinkMetadata, LinkValidationError, LDP_INBOX, REL_HUB, REL_INBOX, REL_SELF};
use crate::pubsub::HubClient;

/// What a relation's URL has to look like
#[derive(Clone)]
pub enum Expectation {
    /// Literal string equality
    Equals(String),
    /// Arbitrary predicate, with a description used in errors
    Satisfies {
        description: String,
        predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
    },
}

impl Expectation {
    fn accepts(&self, actual: &str) -> bool {
        match self {
            Expectation::Equals(expected) => expected == actual,
            Expectation::Satisfies { predicate, .. } => predicate(actual),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Expectation::Equals(expected) => expected,
            Expectation::Satisfies { description, .. } => description,
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Equals(expected) => f.debug_tuple("Equals").field(expected).finish(),
            Expectation::Satisfies { description, .. } => {
                f.debug_struct("Satisfies").field("description", description).finish()
            }
        }
    }
}

/// One relation that must be present and match
#[derive(Debug, Clone)]
pub struct RelationRequirement {
    /// Accepted names; the first one is reported in errors
    names: Vec<String>,
    expectation: Expectation,
}

impl RelationRequirement {
    pub fn equals(relation: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            names: vec![relation.into()],
            expectation: Expectation::Equals(expected.into()),
        }
    }

    pub fn satisfying<F>(relation: impl Into<String>, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            names: vec![relation.into()],
            expectation: Expectation::Satisfies {
                description: description.into(),
                predicate: Arc::new(predicate),
            },
        }
    }

    /// Also accept the relation under another name
    pub fn or_named(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    pub fn relation(&self) -> &str {
        &self.names[0]
    }

    fn check(&self, links: &LinkMetadata) -> Result<(), LinkValidationError> {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let actual = links
            .get_any(&names)
            .ok_or_else(|| LinkValidationError::MissingRelation(self.relation().to_string()))?;

        if self.expectation.accepts(actual) {
            Ok(())
        } else {
            Err(LinkValidationError::RelationMismatch {
                relation: self.relation().to_string(),
                expected: self.expectation.describe().to_string(),
                actual: actual.to_string(),
            })
        }
    }
}

/// Requirements for a WebSub topic: it names this hub and itself
pub fn topic_requirements(hub_endpoint: &str, topic: &str) -> Vec<RelationRequirement> {
    vec![
        RelationRequirement::equals(REL_HUB, hub_endpoint),
        RelationRequirement::equals(REL_SELF, topic),
    ]
}

/// Requirements for an inbox relay target: its inbox is this hub, keyed by itself
pub fn inbox_requirements(inbox_url: &str) -> Vec<RelationRequirement> {
    vec![RelationRequirement::equals(REL_INBOX, inbox_url).or_named(LDP_INBOX)]
}

/// Check already fetched link metadata against `required`
pub fn check_links(
    links: &LinkMetadata,
    required: &[RelationRequirement],
) -> Result<(), LinkValidationError> {
    required.iter().try_for_each(|requirement| requirement.check(links))
}

/// Fetches resources and checks their advertised relations
#[derive(Debug, Clone)]
pub struct LinkValidator {
    client: HubClient,
}

impl LinkValidator {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    /// Fetch `resource_url` and check every requirement
    pub async fn validate(
        &self,
        resource_url: &str,
        required: &[RelationRequirement],
    ) -> Result<LinkMetadata, LinkValidationError> {
        let links = self.client.fetch_links(resource_url).await?;
        check_links(&links, required)?;
        debug!(url = %resource_url, checked = required.len(), "Link metadata validated");
        Ok(links)
    }
}
