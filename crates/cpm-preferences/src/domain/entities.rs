//! # Domain Entities
//!
//! The [`Preference`] record as it lives in world-state, and the validated
//! [`PreferenceSubmission`] a caller hands in for `sp` / `abp`.

use crate::domain::value_objects::OrgId;
use serde::{Deserialize, Serialize};

/// Fixed record-type tag stored in every preference.
pub const OBJECT_TYPE: &str = "Preferences";

/// Submission field names.
pub mod fields {
    /// Subscriber number, also the world-state key.
    pub const MSISDN: &str = "msisdn";
    /// Service provider.
    pub const SERVICE_PROVIDER: &str = "svcprv";
    /// Request number.
    pub const REQUEST_NUMBER: &str = "reqno";
    /// Registration mode.
    pub const REGISTRATION_MODE: &str = "rmode";
    /// Category.
    pub const CATEGORY: &str = "ctgr";
    /// Communication mode.
    pub const COMMUNICATION_MODE: &str = "cmode";
    /// Day type.
    pub const DAY_TYPE: &str = "day";
    /// Day time band.
    pub const DAY_TIME_BAND: &str = "time";
    /// Location routing number.
    pub const LRN: &str = "lrn";
    /// Update timestamp.
    pub const UPDATE_TS: &str = "uts";
    /// Create timestamp.
    pub const CREATE_TS: &str = "cts";
}

/// Exactly the keys a submission must carry, no more, no fewer.
pub const REQUIRED_FIELDS: [&str; 11] = [
    fields::MSISDN,
    fields::SERVICE_PROVIDER,
    fields::REQUEST_NUMBER,
    fields::REGISTRATION_MODE,
    fields::CATEGORY,
    fields::COMMUNICATION_MODE,
    fields::DAY_TYPE,
    fields::DAY_TIME_BAND,
    fields::LRN,
    fields::UPDATE_TS,
    fields::CREATE_TS,
];

/// Shape hint returned with schema errors.
pub const EXPECTED_JSON_TEMPLATE: &str = r#"{"msisdn":"value","svcprv":"value","reqno":"value","rmode":"value","ctgr":"value","cmode":"value","day":"value","time":"value","lrn":"value","uts":"value","cts":"value"}"#;

// =============================================================================
// PREFERENCE
// =============================================================================

/// One subscriber's preference record, keyed by `phone`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Record-type tag, always [`OBJECT_TYPE`].
    #[serde(rename = "obj")]
    pub kind: String,
    #[serde(rename = "msisdn")]
    pub phone: String,
    #[serde(rename = "svcprv")]
    pub service_provider: String,
    #[serde(rename = "reqno")]
    pub request_number: String,
    #[serde(rename = "rmode")]
    pub registration_mode: String,
    #[serde(rename = "ctgr")]
    pub category: String,
    #[serde(rename = "cmode")]
    pub communication_mode: String,
    #[serde(rename = "day")]
    pub day_type: String,
    #[serde(rename = "time")]
    pub day_time_band: String,
    pub lrn: String,
    #[serde(rename = "uts")]
    pub update_ts: String,
    #[serde(rename = "cts")]
    pub create_ts: String,
    /// Owning organization. Set from the caller's identity, never from input.
    #[serde(rename = "uby")]
    pub updated_by: String,
}

impl Preference {
    /// Record for a phone that has no preference yet.
    #[must_use]
    pub fn create(submission: PreferenceSubmission, owner: &OrgId) -> Self {
        Self {
            kind: OBJECT_TYPE.to_string(),
            phone: submission.phone,
            service_provider: submission.service_provider,
            request_number: submission.request_number,
            registration_mode: submission.registration_mode,
            category: submission.category,
            communication_mode: submission.communication_mode,
            day_type: submission.day_type,
            day_time_band: submission.day_time_band,
            lrn: submission.lrn,
            update_ts: submission.update_ts,
            create_ts: submission.create_ts,
            updated_by: owner.as_str().to_string(),
        }
    }

    /// Full replacement of an existing record.
    ///
    /// Every submitted field wins except `cts`, which keeps the value
    /// established when the record was created.
    #[must_use]
    pub fn replaced_by(&self, submission: PreferenceSubmission, owner: &OrgId) -> Self {
        let mut next = Self::create(submission, owner);
        next.create_ts.clone_from(&self.create_ts);
        next
    }

    /// Record after ownership moves to `service_provider`.
    #[must_use]
    pub fn ported_out(&self, service_provider: &str, update_ts: &str, owner: &OrgId) -> Self {
        Self {
            kind: OBJECT_TYPE.to_string(),
            service_provider: service_provider.to_string(),
            update_ts: update_ts.to_string(),
            updated_by: owner.as_str().to_string(),
            ..self.clone()
        }
    }
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// A caller-supplied record that passed schema and format validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceSubmission {
    pub phone: String,
    pub service_provider: String,
    pub request_number: String,
    pub registration_mode: String,
    pub category: String,
    pub communication_mode: String,
    pub day_type: String,
    pub day_time_band: String,
    pub lrn: String,
    pub update_ts: String,
    pub create_ts: String,
}

// =============================================================================
// TESTS
// =============================================================================
