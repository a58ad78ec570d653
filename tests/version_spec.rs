use std::str::FromStr;

use planbridge::import::reconcile::{decide, plan_name};
use planbridge::import::suites::{normalize_suite_name, validate_suite_name};
use planbridge::models::{classify, PlanSummary, SemanticVersion, VersionChange};
use speculate2::speculate;

fn v(s: &str) -> SemanticVersion {
    SemanticVersion::from_str(s).expect("valid version")
}

fn plans(names: &[&str]) -> Vec<PlanSummary> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| PlanSummary {
            id: (i + 1) as i64,
            name: name.to_string(),
        })
        .collect()
}

speculate! {
    describe "version parsing" {
        it "parses a plain version" {
            assert_eq!(v("1.2.3"), SemanticVersion::new(1, 2, 3));
        }

        it "strips a leading v" {
            assert_eq!(v("v2.0.0"), SemanticVersion::new(2, 0, 0));
        }

        it "rejects malformed strings" {
            for bad in ["", "1.2", "1.2.3.4", "1.2.x", "1..3", "a.b.c", " 1.2.3", "1.2.3 "] {
                assert!(SemanticVersion::from_str(bad).is_err(), "accepted '{}'", bad);
            }
        }

        it "rejects components over 999" {
            assert!(SemanticVersion::from_str("1000.0.0").is_err());
            assert!(SemanticVersion::from_str("1.1000.0").is_err());
            assert!(SemanticVersion::from_str("1.0.1000").is_err());
            assert!(SemanticVersion::from_str("999.999.999").is_ok());
        }

        it "orders lexicographically" {
            assert!(v("2.0.0") > v("1.999.999"));
            assert!(v("1.3.0") > v("1.2.999"));
            assert!(v("1.2.4") > v("1.2.3"));
        }
    }

    describe "classify" {
        it "matches the documented precedence examples" {
            assert_eq!(classify(v("1.2.3"), v("2.5.9")), VersionChange::Major);
            assert_eq!(classify(v("1.2.3"), v("1.5.0")), VersionChange::Minor);
            assert_eq!(classify(v("1.2.3"), v("1.2.9")), VersionChange::Patch);
            assert_eq!(classify(v("1.2.3"), v("1.2.3")), VersionChange::Same);
        }

        it "treats any major inequality as major, even a downgrade" {
            assert_eq!(classify(v("3.0.0"), v("2.9.9")), VersionChange::Major);
            assert_eq!(classify(v("2.9.9"), v("3.0.0")), VersionChange::Major);
        }

        it "is same for identical versions" {
            for s in ["0.0.0", "1.2.3", "999.999.999"] {
                assert_eq!(classify(v(s), v(s)), VersionChange::Same);
            }
        }

        it "prefers major over minor when both change" {
            assert_eq!(classify(v("1.2.3"), v("2.5.3")), VersionChange::Major);
        }

        it "treats patch downgrades as patch" {
            assert_eq!(classify(v("1.2.5"), v("1.2.1")), VersionChange::Patch);
        }
    }

    describe "reconciliation decision" {
        it "uses 0.0.0 as baseline when no plans exist" {
            let d = decide("Acme", v("1.0.0"), &[]);
            assert_eq!(d.baseline, SemanticVersion::ZERO);
            assert_eq!(d.kind, VersionChange::Major);
            assert_eq!(d.plan_name, "Acme Test Plan v1.0.0");
            assert!(d.delete_candidate.is_none());
        }

        it "excludes the target version from the baseline search" {
            // A plan already named for the target must not make the run look
            // like a 'same' re-import of itself.
            let existing = plans(&["Acme Test Plan v1.0.0"]);
            let d = decide("Acme", v("1.0.0"), &existing);
            assert_eq!(d.baseline, SemanticVersion::ZERO);
            assert_eq!(d.kind, VersionChange::Major);
        }

        it "ignores plans with unparsable version suffixes" {
            let existing = plans(&[
                "Acme Test Plan vnext",
                "Acme Test Plan v1.2",
                "Unrelated plan",
                "Acme Test Plan v1.1.0",
            ]);
            let d = decide("Acme", v("1.1.5"), &existing);
            assert_eq!(d.baseline, v("1.1.0"));
            assert_eq!(d.kind, VersionChange::Patch);
        }

        it "creates fresh without deleting on minor bumps" {
            let existing = plans(&["Acme Test Plan v1.1.0"]);
            let d = decide("Acme", v("1.2.0"), &existing);
            assert_eq!(d.kind, VersionChange::Minor);
            assert!(d.delete_candidate.is_none());
        }

        it "selects the highest patch sibling as the deletion candidate" {
            let existing = plans(&[
                "Acme Test Plan v1.1.0",
                "Acme Test Plan v1.1.3",
                "Acme Test Plan v1.1.1",
                "Acme Test Plan v1.0.9",
            ]);
            let d = decide("Acme", v("1.1.4"), &existing);
            assert_eq!(d.kind, VersionChange::Patch);
            let candidate = d.delete_candidate.expect("deletion candidate");
            assert_eq!(candidate.name, "Acme Test Plan v1.1.3");
        }

        it "classifies a re-import against the prior version, not itself" {
            let existing = plans(&[
                "Acme Test Plan v1.0.0",
                "Acme Test Plan v1.1.0",
            ]);
            let d = decide("Acme", v("1.1.0"), &existing);
            assert_eq!(d.baseline, v("1.0.0"));
            assert_eq!(d.kind, VersionChange::Minor);
            assert!(d.delete_candidate.is_none());
        }

        it "sweeps a previous import of the same version through the patch path" {
            // Re-importing 1.2.3 while the 1.2 line still exists classifies
            // as patch and deletes the old 1.2.3 plan itself.
            let existing = plans(&[
                "Acme Test Plan v1.2.0",
                "Acme Test Plan v1.2.3",
            ]);
            let d = decide("Acme", v("1.2.3"), &existing);
            assert_eq!(d.kind, VersionChange::Patch);
            let candidate = d.delete_candidate.expect("deletion candidate");
            assert_eq!(candidate.name, "Acme Test Plan v1.2.3");
        }

        it "deletes the exact canonical plan on a same-kind re-import" {
            let existing = plans(&["Acme Test Plan v0.0.0"]);
            let d = decide("Acme", v("0.0.0"), &existing);
            assert_eq!(d.kind, VersionChange::Same);
            let candidate = d.delete_candidate.expect("deletion candidate");
            assert_eq!(candidate.name, "Acme Test Plan v0.0.0");
        }

        it "yields identical decisions for identical inputs" {
            let existing = plans(&[
                "Acme Test Plan v1.2.0",
                "Acme Test Plan v1.2.3",
            ]);
            assert_eq!(
                decide("Acme", v("1.2.3"), &existing),
                decide("Acme", v("1.2.3"), &existing)
            );
        }

        it "builds the canonical plan name" {
            assert_eq!(plan_name("Test Process", v("2.0.0")), "Test Process Test Plan v2.0.0");
        }
    }

    describe "suite name validation" {
        it "passes clean names through" {
            assert_eq!(validate_suite_name("Login - v1.2.3").unwrap(), "Login - v1.2.3");
        }

        it "replaces forbidden characters with underscores" {
            assert_eq!(
                validate_suite_name("a<b>c:d\"e/f\\g|h?i*j").unwrap(),
                "a_b_c_d_e_f_g_h_i_j"
            );
        }

        it "rejects empty names" {
            assert!(validate_suite_name("   ").is_err());
        }

        it "rejects names over 200 characters" {
            assert!(validate_suite_name(&"x".repeat(201)).is_err());
            assert!(validate_suite_name(&"x".repeat(200)).is_ok());
        }

        it "counts the limit in characters, not bytes" {
            // 150 Persian characters span 300 bytes.
            assert!(validate_suite_name(&"ی".repeat(150)).is_ok());
            assert!(validate_suite_name(&"ی".repeat(201)).is_err());
        }
    }

    describe "suite name normalization" {
        it "strips trailing version suffixes" {
            assert_eq!(normalize_suite_name("Login - v1.2.3"), "login");
            assert_eq!(normalize_suite_name("Login v2.0"), "login");
            assert_eq!(normalize_suite_name("Login"), "login");
        }

        it "matches the same feature across import versions" {
            assert_eq!(
                normalize_suite_name("Checkout - v1.0.0"),
                normalize_suite_name("Checkout - v1.0.1")
            );
        }

        it "strips trailing timestamps" {
            assert_eq!(normalize_suite_name("Login_1754396042"), "login");
        }

        it "strips a pre-release tail together with the version" {
            assert_eq!(normalize_suite_name("Checkout - v1.2.3-rc1"), "checkout");
        }

        it "caps over-long names with an ellipsis" {
            let normalized = normalize_suite_name(&"x".repeat(250));
            assert_eq!(normalized.chars().count(), 200);
            assert!(normalized.ends_with("..."));
        }

        it "collapses whitespace and lowercases" {
            assert_eq!(normalize_suite_name("  Some   Feature  "), "some feature");
        }

        it "keeps the explicit suite suffix distinct" {
            assert_ne!(normalize_suite_name("Login - Suite"), normalize_suite_name("Login"));
        }

        it "never returns an empty name" {
            assert_eq!(normalize_suite_name(""), "unnamed_suite");
            assert_eq!(normalize_suite_name("   "), "unnamed_suite");
        }
    }
}
