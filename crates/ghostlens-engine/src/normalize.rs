//! Normalization from collector [`FollowerProfile`]s to [`NormalizedProfile`].
//!
//! This is the only place that branches on missing profile fields. Everything
//! downstream sees concrete values with documented defaults.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ghostlens_core::{AccountType, Diagnostics, FollowerProfile, ValidationError};
use serde::Serialize;

use crate::rules::{bot_signal, BotInput};

/// A follower profile with every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProfile {
    pub username: String,
    pub fullname: Option<String>,
    pub bio_preview: Option<String>,
    /// `0` when the collector did not record it.
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub account_type: AccountType,
    /// `false` when unknown; see `privacy_unknown`.
    pub is_private: bool,
    pub privacy_unknown: bool,
    /// Bot likelihood in `[0.0, 1.0]` from the username and profile rules.
    pub bot_signal: f64,
    /// Names of the bot rules that matched, in rule order.
    pub bot_rules: Vec<&'static str>,
    pub collected_at: Option<DateTime<Utc>>,
    pub detailed_profile_analyzed: bool,
    /// `false` for followers seen only in engagement data.
    pub profile_known: bool,
    /// Optional fields that were absent and defaulted.
    #[serde(skip)]
    pub missing_fields: Vec<&'static str>,
}

impl NormalizedProfile {
    /// Follows far more accounts than follow back, with almost no posts.
    #[must_use]
    pub fn is_mass_following(&self) -> bool {
        let following = self.following_count;
        let followers = self.followers_count;
        let lopsided = followers < 100 || following > followers.saturating_mul(10);
        following > 1000 && lopsided && self.posts_count < 10
    }
}

/// Normalizes a raw [`FollowerProfile`] into a [`NormalizedProfile`].
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] if the username is missing or
/// blank. Every other field degrades to a default and is listed in
/// `missing_fields`.
pub fn normalize_profile(profile: &FollowerProfile) -> Result<NormalizedProfile, ValidationError> {
    let username = profile.username.trim();
    if username.is_empty() {
        return Err(ValidationError::MissingField { field: "username" });
    }

    let mut missing_fields = Vec::new();
    let mut count = |value: Option<u64>, field: &'static str| -> u64 {
        value.unwrap_or_else(|| {
            missing_fields.push(field);
            0
        })
    };
    let posts_count = count(profile.posts_count, "posts_count");
    let followers_count = count(profile.followers_count, "followers_count");
    let following_count = count(profile.following_count, "following_count");

    let account_type = AccountType::resolve(profile.account_type.as_deref());
    if account_type == AccountType::Unknown {
        missing_fields.push("account_type");
    }

    let privacy_unknown = profile.is_private.is_none();
    if privacy_unknown {
        missing_fields.push("is_private");
    }

    // Blank text is treated as absent.
    let fullname = non_blank(profile.fullname.as_deref());
    let bio_preview = non_blank(profile.bio_preview.as_deref());

    let lowered = username.to_lowercase();
    let (bot_signal, bot_rules) = bot_signal(&BotInput {
        username: &lowered,
        posts_count: profile.posts_count,
        bio: bio_preview.as_deref(),
    });

    Ok(NormalizedProfile {
        username: username.to_string(),
        fullname,
        bio_preview,
        posts_count,
        followers_count,
        following_count,
        account_type,
        is_private: profile.is_private.unwrap_or(false),
        privacy_unknown,
        bot_signal,
        bot_rules,
        collected_at: profile.collected_at,
        detailed_profile_analyzed: profile.detailed_profile_analyzed,
        profile_known: true,
        missing_fields,
    })
}

/// Normalize a whole profile list. Invalid and repeated usernames are
/// dropped with a validation diagnostic (the first occurrence wins) and each
/// defaulted field is reported as incomplete data.
pub fn normalize_profiles(
    profiles: &[FollowerProfile],
    diagnostics: &mut Diagnostics,
) -> Vec<NormalizedProfile> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(profiles.len());

    for (i, raw) in profiles.iter().enumerate() {
        let profile = match normalize_profile(raw) {
            Ok(profile) => profile,
            Err(err) => {
                diagnostics.validation(format!("profile[{i}]"), &err);
                continue;
            }
        };
        if !seen.insert(profile.username.clone()) {
            diagnostics.validation(
                profile.username.clone(),
                &ValidationError::DuplicateUsername(profile.username),
            );
            continue;
        }
        for field in &profile.missing_fields {
            diagnostics.incomplete(profile.username.clone(), format!("{field} missing; defaulted"));
        }
        normalized.push(profile);
    }

    normalized
}

/// Normalized profile for a follower that appears only in engagement data.
/// Bot rules still run on the username.
#[must_use]
pub fn normalize_unprofiled(username: &str) -> NormalizedProfile {
    let profile = FollowerProfile::username_only(username);
    match normalize_profile(&profile) {
        Ok(mut normalized) => {
            normalized.profile_known = false;
            normalized
        }
        // Event usernames are validated non-blank by the store.
        Err(_) => NormalizedProfile {
            username: username.to_string(),
            fullname: None,
            bio_preview: None,
            posts_count: 0,
            followers_count: 0,
            following_count: 0,
            account_type: AccountType::Unknown,
            is_private: false,
            privacy_unknown: true,
            bot_signal: 0.0,
            bot_rules: Vec::new(),
            collected_at: None,
            detailed_profile_analyzed: false,
            profile_known: false,
            missing_fields: Vec::new(),
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
