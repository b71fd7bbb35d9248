//! Record normalization.
//!
//! Cached records can carry the remote wire shape (snake_case), the canonical
//! cache shape (camelCase), or a mix of both when a stale cache write landed
//! before a schema change.  Each canonical field therefore has an ordered
//! alias list -- canonical name first, known wire/legacy names after -- and
//! the first non-null, non-empty match wins.  A field with no match takes its
//! documented default: empty string for text, `"active"` for status, an empty
//! collection for lists, `None` for optional references.
//!
//! Normalization is pure and idempotent: feeding a normalized record back in
//! yields an identical record.  The resolver relies on this, since cache
//! entries may be normalized more than once across read paths.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Contractor, ContractorKind, Project, UserProfile};

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

mod aliases {
    pub const ID: &[&str] = &["id"];

    // Project
    pub const PROJECT_NAME: &[&str] = &["name", "projectName", "project_name"];
    pub const CONTRACT_NO: &[&str] =
        &["contractNo", "contract_no", "noabProjectNo", "noab_project_no"];
    pub const SOLICITATION_NO: &[&str] = &[
        "solicitationNo",
        "solicitation_no",
        "cnoSolicitationNo",
        "cno_solicitation_no",
    ];
    pub const LOCATION: &[&str] = &["location"];
    pub const PRIME_CONTRACTOR: &[&str] = &["primeContractor", "prime_contractor"];
    pub const STATUS: &[&str] = &["status"];
    pub const USER_ID: &[&str] = &["userId", "user_id"];
    pub const LOGO_URL: &[&str] = &["logoUrl", "logo_url"];
    pub const LOGO_THUMBNAIL: &[&str] = &["logoThumbnail", "logo_thumbnail"];

    // Contractor
    pub const CONTRACTOR_PROJECT_ID: &[&str] = &["projectId", "project_id"];
    pub const CONTRACTOR_NAME: &[&str] = &["name"];
    pub const CONTRACTOR_COMPANY: &[&str] = &["company"];
    pub const CONTRACTOR_KIND: &[&str] = &["kind", "type"];

    // User profile
    pub const DEVICE_ID: &[&str] = &["deviceId", "device_id"];
    pub const FULL_NAME: &[&str] = &["fullName", "full_name"];
    pub const TITLE: &[&str] = &["title"];
    pub const COMPANY: &[&str] = &["company"];
    pub const EMAIL: &[&str] = &["email"];
    pub const PHONE: &[&str] = &["phone"];
    pub const UPDATED_AT: &[&str] = &["updatedAt", "updated_at"];
}

// ---------------------------------------------------------------------------
// Generic field lookup
// ---------------------------------------------------------------------------

/// Return the first alias whose value is present, non-null and (for strings)
/// non-empty.
pub fn field<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| match record.get(*key) {
        Some(Value::Null) | None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    })
}

/// First matching alias as a string slice.
pub fn str_field<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a str> {
    field(record, aliases).and_then(Value::as_str)
}

fn text(record: &Value, aliases: &[&str]) -> String {
    str_field(record, aliases).unwrap_or_default().to_string()
}

fn text_or(record: &Value, aliases: &[&str], default: &str) -> String {
    str_field(record, aliases).unwrap_or(default).to_string()
}

fn opt_text(record: &Value, aliases: &[&str]) -> Option<String> {
    str_field(record, aliases).map(str::to_string)
}

fn opt_datetime(record: &Value, aliases: &[&str]) -> Option<DateTime<Utc>> {
    str_field(record, aliases)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Entity normalizers
// ---------------------------------------------------------------------------

/// Collapse any plausible project shape into the canonical [`Project`].
pub fn normalize_project(record: &Value) -> Project {
    let contractors = record
        .get("contractors")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(normalize_contractor).collect())
        .unwrap_or_default();

    Project {
        id: text(record, aliases::ID),
        name: text(record, aliases::PROJECT_NAME),
        contract_no: text(record, aliases::CONTRACT_NO),
        solicitation_no: text(record, aliases::SOLICITATION_NO),
        location: text(record, aliases::LOCATION),
        prime_contractor: text(record, aliases::PRIME_CONTRACTOR),
        status: text_or(record, aliases::STATUS, "active"),
        user_id: text(record, aliases::USER_ID),
        logo_url: opt_text(record, aliases::LOGO_URL),
        logo_thumbnail: opt_text(record, aliases::LOGO_THUMBNAIL),
        contractors,
    }
}

/// Collapse any plausible contractor shape into the canonical [`Contractor`].
pub fn normalize_contractor(record: &Value) -> Contractor {
    Contractor {
        id: text(record, aliases::ID),
        project_id: text(record, aliases::CONTRACTOR_PROJECT_ID),
        name: text(record, aliases::CONTRACTOR_NAME),
        company: text(record, aliases::CONTRACTOR_COMPANY),
        kind: str_field(record, aliases::CONTRACTOR_KIND)
            .map(ContractorKind::parse)
            .unwrap_or(ContractorKind::Sub),
        status: text_or(record, aliases::STATUS, "active"),
    }
}

/// Collapse any plausible user-profile shape into the canonical
/// [`UserProfile`].
pub fn normalize_user_profile(record: &Value) -> UserProfile {
    UserProfile {
        id: opt_text(record, aliases::ID),
        device_id: text(record, aliases::DEVICE_ID),
        full_name: text(record, aliases::FULL_NAME),
        title: text(record, aliases::TITLE),
        company: text(record, aliases::COMPANY),
        email: text(record, aliases::EMAIL),
        phone: text(record, aliases::PHONE),
        updated_at: opt_datetime(record, aliases::UPDATED_AT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renormalize_project(project: &Project) -> Project {
        let value = serde_json::to_value(project).unwrap();
        normalize_project(&value)
    }

    #[test]
    fn project_normalization_is_idempotent() {
        let wire = json!({
            "id": "p-1",
            "project_name": "Canal St Levee",
            "noab_project_no": "N-204",
            "cno_solicitation_no": "S-88",
            "location": "New Orleans, LA",
            "prime_contractor": "Acme Civil",
            "user_id": "u-9",
            "logo_url": null,
            "contractors": [
                { "id": "c-1", "project_id": "p-1", "name": "Jo", "company": "Acme", "type": "prime" }
            ]
        });

        let once = normalize_project(&wire);
        let twice = renormalize_project(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn wire_and_canonical_shapes_normalize_identically() {
        let legacy = json!({
            "id": "p-2",
            "project_name": "Pump Station 4",
            "noab_project_no": "N-7",
            "cno_solicitation_no": "S-3",
            "location": "Metairie",
            "prime_contractor": "Delta Builders",
            "status": "active",
            "user_id": "u-1"
        });
        let canonical = json!({
            "id": "p-2",
            "name": "Pump Station 4",
            "contractNo": "N-7",
            "solicitationNo": "S-3",
            "location": "Metairie",
            "primeContractor": "Delta Builders",
            "status": "active",
            "userId": "u-1"
        });

        assert_eq!(normalize_project(&legacy), normalize_project(&canonical));
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let project = normalize_project(&json!({ "id": "p-3" }));
        assert_eq!(project.name, "");
        assert_eq!(project.status, "active");
        assert_eq!(project.user_id, "");
        assert_eq!(project.logo_url, None);
        assert!(project.contractors.is_empty());

        let contractor = normalize_contractor(&json!({ "id": "c-3" }));
        assert_eq!(contractor.kind, ContractorKind::Sub);
        assert_eq!(contractor.status, "active");
    }

    #[test]
    fn canonical_name_wins_over_aliases() {
        let mixed = json!({
            "id": "p-4",
            "name": "Canonical",
            "project_name": "Stale Wire Name"
        });
        assert_eq!(normalize_project(&mixed).name, "Canonical");
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let record = json!({
            "id": "p-5",
            "name": "",
            "project_name": "Recovered"
        });
        assert_eq!(normalize_project(&record).name, "Recovered");
    }

    #[test]
    fn profile_normalization_is_idempotent_and_parses_timestamps() {
        let wire = json!({
            "id": "u-1",
            "device_id": "dev-42",
            "full_name": "Sam Inspector",
            "title": "Senior Inspector",
            "company": "DOT",
            "email": "sam@example.com",
            "phone": "555-0100",
            "updated_at": "2026-03-01T08:30:00Z"
        });

        let once = normalize_user_profile(&wire);
        assert_eq!(once.id.as_deref(), Some("u-1"));
        assert_eq!(once.device_id, "dev-42");
        assert!(once.updated_at.is_some());

        let twice = normalize_user_profile(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn profile_without_remote_id_keeps_none() {
        let wire = json!({ "device_id": "dev-1", "full_name": "A" });
        let profile = normalize_user_profile(&wire);
        assert_eq!(profile.id, None);
        assert_eq!(profile.updated_at, None);
    }
}
