use mcp_catalog_model::{group_dir_name, safe_slug, subpath_to_variant, variant_dir_name};
use proptest::prelude::*;
use proptest::test_runner::Config;

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn slug_is_lowercase_alnum_dash_without_edge_dashes(input in ".{0,40}") {
        let slug = safe_slug(&input);
        prop_assert!(!slug.is_empty());
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn slug_is_idempotent(input in ".{0,40}") {
        let once = safe_slug(&input);
        prop_assert_eq!(safe_slug(&once), once);
    }

    #[test]
    fn variant_name_never_contains_a_separator(subpath in "[a-zA-Z0-9_./\\\\ -]{0,40}") {
        let variant = subpath_to_variant("widget", &subpath);
        prop_assert!(variant.starts_with("widget__"));
        prop_assert!(!variant.contains('/'));
        prop_assert!(!variant.contains('\\'));
    }

    #[test]
    fn group_and_variant_names_are_single_path_segments(
        owner in "[A-Za-z0-9._-]{0,16}",
        repo in "[A-Za-z0-9._-]{0,16}",
        subpath in "[a-z0-9/]{0,24}"
    ) {
        let repo_full = format!("{owner}/{repo}");
        let group = group_dir_name(&repo_full);
        let variant = variant_dir_name(&repo_full, &subpath);
        prop_assert!(!group.contains('/'));
        prop_assert!(!variant.contains('/'));
        prop_assert!(group != "." && group != "..");
    }
}
