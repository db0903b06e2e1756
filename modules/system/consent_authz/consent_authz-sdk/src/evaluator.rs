//! Per-resource consent evaluation.
//!
//! A resource is accessible through the study path when every counted tag
//! names a study the principal holds `action` on. Untagged resources are
//! vacuously accessible.
//!
//! A blanket grant (`all[action]`) authorizes any resource without looking
//! at its tags.

use serde::{Deserialize, Serialize};

use crate::models::{Action, ConsentGrantModel, ResourceDescriptor};

/// Which tags the study match count is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatchMode {
    /// Compare against every tag on the resource. A resource carrying any
    /// non-study tag is never authorized through the study path.
    #[default]
    AllTags,
    /// Compare against the study tags only; other tag systems are ignored.
    StudyTagsOnly,
}

/// Evaluate study grants against all resource tags ([`TagMatchMode::AllTags`]).
#[must_use]
pub fn is_authorized(
    model: &ConsentGrantModel,
    action: Action,
    resource: &ResourceDescriptor,
) -> bool {
    is_authorized_with(model, action, resource, TagMatchMode::AllTags)
}

/// Evaluate study grants with an explicit [`TagMatchMode`].
#[must_use]
pub fn is_authorized_with(
    model: &ConsentGrantModel,
    action: Action,
    resource: &ResourceDescriptor,
    mode: TagMatchMode,
) -> bool {
    if model.all.allows(action) {
        return true;
    }

    let authorized = model.authorized_study_ids(action);

    let mut study_tags = 0usize;
    let mut matched = 0usize;
    for tag in resource.study_tags() {
        study_tags += 1;
        if authorized.contains(tag.code.as_str()) {
            matched += 1;
        }
    }

    let required = match mode {
        TagMatchMode::AllTags => resource.tags.len(),
        TagMatchMode::StudyTagsOnly => study_tags,
    };
    matched == required
}
