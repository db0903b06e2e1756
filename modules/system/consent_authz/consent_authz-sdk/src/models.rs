//! Domain models for the `consent_authz` module.
//!
//! The central entity is [`ConsentGrantModel`]: blanket grants under `all`
//! plus per-study grants under `study`. It is derived from identity-provider
//! claims once per authentication, persisted as JSON on the user session and
//! re-read (and re-validated) on every resource check.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{GrantModelError, validate_consent_grant_model};

/// Tag system whose codes are interpreted as study identifiers.
pub const STUDY_TAG_SYSTEM: &str = "urn:study_id";

/// Reserved claim identifier that routes a grant to the `all` bucket.
pub const ALL_IDENTIFIER: &str = "all";

/// Opaque study identifier taken verbatim from claim payloads and tag codes.
pub type StudyId = String;

/// One of the three canonical actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    /// Every action, in canonical order.
    pub const ALL: [Action; 3] = [Action::Read, Action::Write, Action::Delete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action token outside `{read, write, delete}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            "delete" => Ok(Action::Delete),
            other => Err(UnknownAction(other.to_owned())),
        }
    }
}

/// Boolean grant for each action. All three keys are always serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl ActionSet {
    /// No action granted.
    pub const NONE: ActionSet = ActionSet {
        read: false,
        write: false,
        delete: false,
    };

    #[must_use]
    pub const fn allows(self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::Write => self.write,
            Action::Delete => self.delete,
        }
    }

    /// Flip `action` to granted. Grants are never revoked.
    pub fn grant(&mut self, action: Action) {
        match action {
            Action::Read => self.read = true,
            Action::Write => self.write = true,
            Action::Delete => self.delete = true,
        }
    }

    /// Returns `true` if no action is granted.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.read || self.write || self.delete)
    }
}

/// Where a single consent grant applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrantScope {
    /// Every resource regardless of tags.
    All,
    /// Resources tagged with this study.
    Study(StudyId),
}

impl GrantScope {
    /// Route a raw claim identifier: `all` is reserved, anything else is a study.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Self {
        if identifier == ALL_IDENTIFIER {
            GrantScope::All
        } else {
            GrantScope::Study(identifier.to_owned())
        }
    }
}

/// Consent grants attached to an authenticated session.
///
/// ```
/// use consent_authz_sdk::{Action, ConsentGrantModel, GrantScope};
///
/// let mut model = ConsentGrantModel::default();
/// model.grant(Action::Write, &GrantScope::Study("SD-0".to_owned()));
///
/// assert!(!model.all.allows(Action::Write));
/// assert!(model.authorized_study_ids(Action::Write).contains("SD-0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentGrantModel {
    /// Blanket grants.
    pub all: ActionSet,
    /// Per-study grants. Entries are created lazily with every action denied.
    pub study: BTreeMap<StudyId, ActionSet>,
}

impl ConsentGrantModel {
    /// Record a grant. Only ever sets flags to `true`.
    pub fn grant(&mut self, action: Action, scope: &GrantScope) {
        match scope {
            GrantScope::All => self.all.grant(action),
            GrantScope::Study(id) => self.study.entry(id.clone()).or_default().grant(action),
        }
    }

    /// Study identifiers for which `action` is granted.
    #[must_use]
    pub fn authorized_study_ids(&self, action: Action) -> BTreeSet<&str> {
        self.study
            .iter()
            .filter(|(_, grants)| grants.allows(action))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Returns `true` if at least one action is granted anywhere.
    #[must_use]
    pub fn has_any_grant(&self) -> bool {
        !self.all.is_empty() || self.study.values().any(|grants| !grants.is_empty())
    }

    /// Serialize for session storage.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse, validate and decode a model read back from session storage.
    ///
    /// Validation always runs before decoding, so a structurally broken model
    /// can never reach the evaluator.
    ///
    /// # Errors
    ///
    /// - [`StoredGrantError::Malformed`] if `raw` is not JSON
    /// - [`StoredGrantError::Invalid`] if the JSON does not have the grant-model shape
    /// - [`StoredGrantError::Decode`] if typed decoding fails after validation
    pub fn from_stored(raw: &str) -> Result<Self, StoredGrantError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(StoredGrantError::Malformed)?;
        validate_consent_grant_model(&value)?;
        serde_json::from_value(value).map_err(StoredGrantError::Decode)
    }
}

/// Failure to restore a [`ConsentGrantModel`] from session storage.
#[derive(Debug, thiserror::Error)]
pub enum StoredGrantError {
    #[error("stored consent grants are not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("stored consent grants failed validation: {0}")]
    Invalid(#[from] GrantModelError),

    #[error("stored consent grants could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub system: String,
    pub code: String,
}

impl Tag {
    #[must_use]
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
        }
    }

    /// Tag in the [`STUDY_TAG_SYSTEM`].
    #[must_use]
    pub fn study(code: impl Into<String>) -> Self {
        Self::new(STUDY_TAG_SYSTEM, code)
    }

    #[must_use]
    pub fn is_study_tag(&self) -> bool {
        self.system == STUDY_TAG_SYSTEM
    }
}

/// Read-only view of the resource being accessed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Resource type (e.g. `Patient`).
    pub resource_type: String,
    /// Resource identifier; absent for resources being created.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ResourceDescriptor {
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Tags in the [`STUDY_TAG_SYSTEM`].
    pub fn study_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|tag| tag.is_study_tag())
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{id}", self.resource_type),
            None => f.write_str(&self.resource_type),
        }
    }
}

/// The authenticated principal as seen by the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// Key of the session that holds the serialized grant model.
    pub session_id: String,
    /// Authorities held by the principal.
    pub roles: BTreeSet<String>,
}

impl Principal {
    #[must_use]
    pub fn new<I, S>(session_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            session_id: session_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

/// How the principal authenticated, resolved once by the host before the
/// authentication hook runs.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticationContext {
    /// Identity-provider token; `claims` is the decoded claim set.
    TokenBased {
        claims: serde_json::Map<String, serde_json::Value>,
    },
    /// Local user whose consent claims live in a free-text notes field.
    SessionNotesBased { notes: String },
}

/// Result of the authentication hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// Superuser: nothing derived, nothing stored.
    Bypassed,
    /// Grants derived and stored on the session.
    Authenticated {
        roles_added: Vec<String>,
        grants: ConsentGrantModel,
    },
    /// Claims could not be turned into a grant model.
    Failure { message: String },
}
