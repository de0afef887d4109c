//! Property tests for manifest parsing.

#![allow(clippy::expect_used)]

use envstrap_cli::domain::manifest::parse_manifest;
use proptest::prelude::*;

fn package_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,20}[a-z0-9]"
}

fn version() -> impl Strategy<Value = String> {
    (0u32..50, 0u32..50, 0u32..50).prop_map(|(a, b, c)| format!("{a}.{b}.{c}"))
}

proptest! {
    /// Every pinned `name==version` line comes back as that name and pin.
    #[test]
    fn prop_pinned_requirements_parse(
        reqs in prop::collection::vec((package_name(), version()), 1..10)
    ) {
        let text: String = reqs
            .iter()
            .map(|(name, ver)| format!("{name}=={ver}\n"))
            .collect();
        let manifest = parse_manifest(&text).expect("valid manifest");

        prop_assert_eq!(manifest.requirements().len(), reqs.len());
        for (parsed, (name, ver)) in manifest.requirements().iter().zip(&reqs) {
            prop_assert_eq!(&parsed.name, name);
            let pin = format!("=={ver}");
            prop_assert_eq!(parsed.specifier.as_deref(), Some(pin.as_str()));
        }
    }

    /// Comments and blank lines never change what is parsed.
    #[test]
    fn prop_comments_are_ignored(
        names in prop::collection::vec(package_name(), 1..8),
        comment in "[ a-zA-Z0-9]{0,30}",
    ) {
        let plain: String = names.iter().map(|n| format!("{n}\n")).collect();
        let noisy: String = names
            .iter()
            .map(|n| format!("# {comment}\n\n{n}  # {comment}\n"))
            .collect();

        let a = parse_manifest(&plain).expect("plain manifest");
        let b = parse_manifest(&noisy).expect("noisy manifest");
        prop_assert_eq!(a, b);
    }

    /// Lines starting with a version operator are always rejected.
    #[test]
    fn prop_missing_name_rejected(ver in version(), op in prop::sample::select(vec!["==", ">=", "<=", "~=", "!="])) {
        let text = format!("{op}{ver}\n");
        prop_assert!(parse_manifest(&text).is_err());
    }
}
