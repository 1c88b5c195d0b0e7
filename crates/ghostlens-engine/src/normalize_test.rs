use super::*;

fn full_profile(username: &str) -> FollowerProfile {
    FollowerProfile {
        username: username.to_string(),
        fullname: Some("Alice Example".to_string()),
        bio_preview: Some("Coffee and climbing".to_string()),
        posts_count: Some(42),
        followers_count: Some(120),
        following_count: Some(300),
        account_type: Some("Personal".to_string()),
        is_private: Some(false),
        collected_at: None,
        detailed_profile_analyzed: true,
    }
}

#[test]
fn complete_profile_has_no_missing_fields() {
    let normalized = normalize_profile(&full_profile("alice")).unwrap();
    assert_eq!(normalized.username, "alice");
    assert_eq!(normalized.account_type, AccountType::Personal);
    assert_eq!(normalized.followers_count, 120);
    assert!(!normalized.is_private);
    assert!(!normalized.privacy_unknown);
    assert!(normalized.profile_known);
    assert!(normalized.missing_fields.is_empty());
    assert!(normalized.bot_signal.abs() < f64::EPSILON);
}

#[test]
fn blank_username_is_rejected() {
    let err = normalize_profile(&FollowerProfile::username_only("   ")).unwrap_err();
    assert_eq!(err, ValidationError::MissingField { field: "username" });
}

#[test]
fn username_is_trimmed() {
    let normalized = normalize_profile(&full_profile("  alice ")).unwrap();
    assert_eq!(normalized.username, "alice");
}

#[test]
fn missing_counts_default_to_zero_and_are_listed() {
    let normalized = normalize_profile(&FollowerProfile::username_only("dana")).unwrap();
    assert_eq!(normalized.posts_count, 0);
    assert_eq!(normalized.followers_count, 0);
    assert_eq!(normalized.following_count, 0);
    assert_eq!(
        normalized.missing_fields,
        vec![
            "posts_count",
            "followers_count",
            "following_count",
            "account_type",
            "is_private"
        ]
    );
}

#[test]
fn absent_privacy_is_public_but_flagged() {
    let mut profile = full_profile("alice");
    profile.is_private = None;
    let normalized = normalize_profile(&profile).unwrap();
    assert!(!normalized.is_private);
    assert!(normalized.privacy_unknown);
}

#[test]
fn unrecognized_account_type_is_unknown() {
    let mut profile = full_profile("alice");
    profile.account_type = Some("government".to_string());
    let normalized = normalize_profile(&profile).unwrap();
    assert_eq!(normalized.account_type, AccountType::Unknown);
    assert!(normalized.missing_fields.contains(&"account_type"));
}

#[test]
fn bot_rules_see_lowercased_username() {
    let mut profile = full_profile("Carol_1234567");
    profile.posts_count = Some(0);
    profile.bio_preview = None;
    let normalized = normalize_profile(&profile).unwrap();
    assert_eq!(normalized.username, "Carol_1234567");
    assert!(normalized.bot_rules.contains(&"numeric_suffix"));
    assert!(normalized.bot_rules.contains(&"sparse_profile"));
    assert!(normalized.bot_signal >= 0.5);
}

#[test]
fn unknown_post_count_does_not_trigger_sparse_profile() {
    let mut profile = FollowerProfile::username_only("carol_1234567");
    profile.bio_preview = None;
    let normalized = normalize_profile(&profile).unwrap();
    assert!(!normalized.bot_rules.contains(&"sparse_profile"));
}

#[test]
fn blank_text_fields_become_none() {
    let mut profile = full_profile("alice");
    profile.fullname = Some("  ".to_string());
    profile.bio_preview = Some(String::new());
    let normalized = normalize_profile(&profile).unwrap();
    assert!(normalized.fullname.is_none());
    assert!(normalized.bio_preview.is_none());
}

#[test]
fn unprofiled_follower_is_marked_unknown() {
    let normalized = normalize_unprofiled("erin99887");
    assert!(!normalized.profile_known);
    assert_eq!(normalized.account_type, AccountType::Unknown);
    assert!(normalized.bot_rules.contains(&"numeric_suffix"));
}

#[test]
fn mass_following_needs_lopsided_ratio_and_few_posts() {
    let mut profile = full_profile("spree");
    profile.following_count = Some(4000);
    profile.followers_count = Some(80);
    profile.posts_count = Some(2);
    assert!(normalize_profile(&profile).unwrap().is_mass_following());

    profile.followers_count = Some(350);
    assert!(normalize_profile(&profile).unwrap().is_mass_following(), "ratio above 10");

    profile.followers_count = Some(800);
    assert!(!normalize_profile(&profile).unwrap().is_mass_following());

    profile.followers_count = Some(50);
    profile.posts_count = Some(25);
    assert!(!normalize_profile(&profile).unwrap().is_mass_following());
}

#[test]
fn profile_list_drops_blank_and_repeated_usernames() {
    let mut diagnostics = Diagnostics::new();
    let profiles = vec![
        full_profile("alice"),
        full_profile("  "),
        full_profile(" alice "),
        FollowerProfile::username_only("bob"),
    ];
    let normalized = normalize_profiles(&profiles, &mut diagnostics);

    let names: Vec<_> = normalized.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, ["alice", "bob"]);
    assert_eq!(normalized[0].followers_count, 120);
    assert_eq!(diagnostics.count(ghostlens_core::DiagnosticKind::Validation), 2);
    // bob is missing three counts, account type and privacy
    assert_eq!(diagnostics.count(ghostlens_core::DiagnosticKind::IncompleteData), 5);
}
