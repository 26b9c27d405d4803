//! Property-based tests for path and location helpers.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::path::Path;

    use crate::path::{
        component_dir, compile_rooted_pattern, encode_component_id, relative_entry,
        TEMPLATE_MATCH_OPTIONS,
    };
    use crate::repository::{Credentials, Repository};
    use proptest::prelude::*;

    // ============================================================================
    // encode_component_id property tests
    // ============================================================================

    proptest! {
        /// Property: encode_component_id never produces filesystem-unsafe characters
        #[test]
        fn encode_component_id_never_produces_unsafe_chars(input in ".*") {
            let result = encode_component_id(&input);
            let unsafe_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
            for ch in unsafe_chars {
                prop_assert!(
                    !result.contains(ch),
                    "encode_component_id produced unsafe character '{}' from input '{}'",
                    ch,
                    input
                );
            }
        }

        /// Property: the encoded id is a single, non-empty path component
        #[test]
        fn encode_component_id_is_one_normal_component(input in ".*") {
            let result = encode_component_id(&input);
            prop_assert!(!result.is_empty());
            prop_assert!(result != "." && result != "..");
            let work = Path::new("/work");
            let dir = component_dir(work, &input);
            prop_assert_eq!(dir.parent(), Some(work));
        }

        /// Property: plain names are kept readable
        #[test]
        fn encode_component_id_preserves_plain_names(input in "[a-zA-Z0-9_-][a-zA-Z0-9._-]*") {
            let result = encode_component_id(&input);
            prop_assert_eq!(result, input);
        }

        /// Property: distinct identities never share a directory
        #[test]
        fn encode_component_id_is_injective(a in ".*", b in ".*") {
            prop_assume!(a != b);
            prop_assert_ne!(encode_component_id(&a), encode_component_id(&b));
        }

        /// Property: identities differing only in a separator stay apart
        #[test]
        fn encode_component_id_keeps_separators_apart(
            left in "[a-z]{1,8}",
            right in "[a-z]{1,8}",
            sep in "[/:*?<>|]",
        ) {
            let escaped = encode_component_id(&format!("{}{}{}", left, sep, right));
            let dashed = encode_component_id(&format!("{}-{}", left, right));
            let underscored = encode_component_id(&format!("{}_{}", left, right));
            prop_assert_ne!(&escaped, &dashed);
            prop_assert_ne!(&escaped, &underscored);
        }
    }

    // ============================================================================
    // Rooted pattern property tests
    // ============================================================================

    proptest! {
        /// Property: a literal name always matches itself below the root
        #[test]
        fn rooted_literal_matches_itself(name in "[a-zA-Z0-9_.-]{1,20}") {
            let root = Path::new("/work/c");
            let pattern = compile_rooted_pattern(root, &name).unwrap();
            prop_assert!(pattern.matches_path_with(&root.join(&name), TEMPLATE_MATCH_OPTIONS));
        }

        /// Property: `*` never crosses a directory separator
        #[test]
        fn rooted_star_stays_in_directory(
            dir in "[a-z]{1,10}",
            file in "[a-z]{1,10}",
        ) {
            let root = Path::new("/work/c");
            let nested = root.join(dir).join(format!("{}.tpl", file));
            let shallow = compile_rooted_pattern(root, "*.tpl").unwrap();
            let deep = compile_rooted_pattern(root, "**/*.tpl").unwrap();
            prop_assert!(!shallow.matches_path_with(&nested, TEMPLATE_MATCH_OPTIONS));
            prop_assert!(deep.matches_path_with(&nested, TEMPLATE_MATCH_OPTIONS));
        }
    }

    // ============================================================================
    // relative_entry property tests
    // ============================================================================

    proptest! {
        /// Property: an accepted entry always stays below the root
        #[test]
        fn relative_entry_never_leaves_root(
            segments in prop::collection::vec("(\\.\\.|\\.|[a-z]{1,6})", 1..6),
            rooted in any::<bool>(),
        ) {
            let name = format!("{}{}", if rooted { "/" } else { "" }, segments.join("/"));
            if let Some(relative) = relative_entry(&name) {
                prop_assert!(relative.is_relative());
                prop_assert!(Path::new("/work/c").join(&relative).starts_with("/work/c"));
                prop_assert!(!segments.iter().any(|s| s == ".."));
            }
        }
    }

    // ============================================================================
    // Repository child resolution property tests
    // ============================================================================

    proptest! {
        /// Property: `../sibling/child` replaces the last two segments of the parent
        #[test]
        fn child_location_walks_up_from_parent(
            group in "[a-z]{1,10}",
            parent in "[a-z]{1,10}",
            sibling in "[a-z]{1,10}",
            child in "[a-z]{1,10}",
        ) {
            let base = Repository::create(
                &format!("git://host/{}/{}", group, parent),
                "",
                Credentials::new(),
            ).unwrap();
            let relative = format!("../{}/{}", sibling, child);
            let resolved = base
                .create_child_repository(&relative, "", Credentials::new())
                .unwrap();
            prop_assert_eq!(
                resolved.location().unwrap().as_str(),
                format!("git://host/{}/{}", sibling, child)
            );
        }

        /// Property: a child location starting with `/` replaces the whole path
        #[test]
        fn rooted_child_location_replaces_path(
            segments in prop::collection::vec("[a-z]{1,8}", 1..5),
            other in prop::collection::vec("[a-z]{1,8}", 1..5),
        ) {
            let base = Repository::create(
                &format!("https://host/{}", segments.join("/")),
                "",
                Credentials::new(),
            ).unwrap();
            let rooted = format!("/{}", other.join("/"));
            let resolved = base
                .create_child_repository(&rooted, "", Credentials::new())
                .unwrap();
            prop_assert_eq!(resolved.location().unwrap().path(), rooted.as_str());
            prop_assert_eq!(resolved.location().unwrap().host_str(), Some("host"));
        }

        /// Property: absolute child locations are kept as-is
        #[test]
        fn absolute_child_location_is_kept(path in "[a-z]{1,10}(/[a-z]{1,10}){0,3}") {
            let base =
                Repository::create("git://host/group/parent", "", Credentials::new()).unwrap();
            let location = format!("https://other/{}", path);
            let resolved = base
                .create_child_repository(&location, "", Credentials::new())
                .unwrap();
            prop_assert_eq!(resolved.location().unwrap().as_str(), location.as_str());
        }
    }
}
