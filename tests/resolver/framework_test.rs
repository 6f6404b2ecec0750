/*!
 * Framework Tests
 * Merge, rematch and rewrite chaining through the full resolver
 */

use super::common::FakeProcessTable;
use pretty_assertions::assert_eq;
use procprofile::{
    Framework, MemoryProcessStore, MemoryProfileStore, Profile, ProcessResolver, ProcessStore,
    ResolveError, RewriteRule,
};
use std::num::NonZeroU8;
use std::sync::Arc;

fn hops(n: u8) -> NonZeroU8 {
    NonZeroU8::new(n).unwrap()
}

fn setup() -> (
    Arc<FakeProcessTable>,
    Arc<MemoryProfileStore>,
    Arc<MemoryProcessStore>,
    ProcessResolver,
) {
    let table = Arc::new(FakeProcessTable::new());
    let profiles = Arc::new(MemoryProfileStore::new());
    let processes = Arc::new(MemoryProcessStore::new());
    let resolver = ProcessResolver::new(table.clone(), profiles.clone(), processes.clone());
    (table, profiles, processes, resolver)
}

fn bound(profiles: &MemoryProfileStore, path: &str, profile: Profile) {
    let id = profile.id.clone();
    profiles.insert(profile);
    profiles.bind(path, id);
}

#[test]
fn test_merge_resolves_to_parent() {
    let (table, profiles, processes, resolver) = setup();
    table.add(100, 1, "/usr/lib/slack/slack");
    table.add(200, 100, "/usr/lib/slack/chrome-helper --type=renderer");
    bound(&profiles, "/usr/lib/slack/slack", Profile::new("slack", "Slack"));
    bound(
        &profiles,
        "/usr/lib/slack/chrome-helper",
        Profile::new("helper", "Helper").with_framework(Framework::AscendAndMerge { hops: hops(1) }),
    );

    let process = resolver.resolve(200).unwrap();

    assert_eq!(process.pid, 100);
    assert_eq!(process.profile.as_ref().unwrap().id, "slack");
    assert!(processes.get("100").is_ok());
    assert!(processes.get("200").unwrap_err().is_not_found());
    assert_eq!(resolver.stats().merges, 1);
}

#[test]
fn test_merge_walks_exact_hops() {
    let (table, profiles, _processes, resolver) = setup();
    table.add(100, 1, "/usr/bin/launcher");
    table.add(150, 100, "/usr/bin/sandbox");
    table.add(200, 150, "/usr/bin/worker");
    bound(&profiles, "/usr/bin/launcher", Profile::new("launcher", "Launcher"));
    bound(&profiles, "/usr/bin/sandbox", Profile::new("sandbox", "Sandbox"));
    bound(
        &profiles,
        "/usr/bin/worker",
        Profile::new("worker", "Worker").with_framework(Framework::AscendAndMerge { hops: hops(2) }),
    );

    let process = resolver.resolve(200).unwrap();
    assert_eq!(process.pid, 100);
    assert_eq!(process.profile.as_ref().unwrap().id, "launcher");
}

#[test]
fn test_merge_with_missing_ancestor_fails() {
    let (table, profiles, _processes, resolver) = setup();
    table.add(200, 999, "/usr/bin/worker");
    bound(
        &profiles,
        "/usr/bin/worker",
        Profile::new("worker", "Worker").with_framework(Framework::AscendAndMerge { hops: hops(2) }),
    );

    let err = resolver.resolve(200).unwrap_err();
    assert!(matches!(err, ResolveError::AncestryWalk { pid: 200, hop: 2, .. }));
}

#[test]
fn test_merge_cycle_is_bounded() {
    let (table, profiles, _processes, resolver) = setup();
    table.add(600, 601, "/usr/bin/pinger");
    table.add(601, 600, "/usr/bin/pinger");
    bound(
        &profiles,
        "/usr/bin/pinger",
        Profile::new("pinger", "Pinger").with_framework(Framework::AscendAndMerge { hops: hops(1) }),
    );

    let err = resolver.resolve(600).unwrap_err();
    assert!(matches!(err, ResolveError::MergeDepthExceeded { pid: 600, .. }));
}

#[test]
fn test_rematch_keeps_child_identity() {
    let (table, profiles, processes, resolver) = setup();
    table.add(100, 1, "/usr/lib/slack/slack");
    table.add(400, 100, "/usr/libexec/crash-reporter");
    bound(&profiles, "/usr/lib/slack/slack", Profile::new("slack", "Slack"));
    bound(
        &profiles,
        "/usr/libexec/crash-reporter",
        Profile::new("reporter", "Reporter")
            .with_framework(Framework::AscendAndRematch { hops: hops(1) }),
    );

    let process = resolver.resolve(400).unwrap();

    assert_eq!(process.pid, 400);
    assert_eq!(process.exec_path, "/usr/libexec/crash-reporter");
    assert_eq!(process.profile.as_ref().unwrap().id, "slack");
    assert!(processes.get("400").is_ok());
    assert!(processes.get("100").unwrap_err().is_not_found());
}

#[test]
fn test_merged_child_resolves_without_requery() {
    let (table, profiles, processes, resolver) = setup();
    table.add(100, 1, "/usr/lib/slack/slack");
    table.add(200, 100, "/usr/lib/slack/chrome-helper --type=gpu");
    bound(&profiles, "/usr/lib/slack/slack", Profile::new("slack", "Slack"));
    bound(
        &profiles,
        "/usr/lib/slack/chrome-helper",
        Profile::new("helper", "Helper").with_framework(Framework::AscendAndMerge { hops: hops(1) }),
    );

    let first = resolver.resolve(200).unwrap();
    let queries = table.exe_queries();
    let second = resolver.resolve(200).unwrap();

    assert_eq!(table.exe_queries(), queries);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.pid, 100);
    assert!(processes.get("200").unwrap_err().is_not_found());
    assert_eq!(resolver.stats().resolutions, 2);
}

#[test]
fn test_rematch_chains_through_ancestors() {
    let (table, profiles, processes, resolver) = setup();
    table.add(100, 1, "/usr/bin/make");
    table.add(150, 100, "/bin/sh -c build");
    table.add(200, 150, "/usr/libexec/helper");
    bound(&profiles, "/usr/bin/make", Profile::new("make", "Make"));
    bound(
        &profiles,
        "/bin/sh",
        Profile::new("sh", "Shell").with_framework(Framework::AscendAndRematch { hops: hops(1) }),
    );
    bound(
        &profiles,
        "/usr/libexec/helper",
        Profile::new("helper", "Helper")
            .with_framework(Framework::AscendAndRematch { hops: hops(1) }),
    );

    let process = resolver.resolve(200).unwrap();

    assert_eq!(process.pid, 200);
    assert_eq!(process.exec_path, "/usr/libexec/helper");
    assert_eq!(process.profile.as_ref().unwrap().id, "make");
    assert!(processes.get("200").is_ok());
    assert_eq!(resolver.stats().ascents, 2);
}

#[test]
fn test_rematch_then_merge_walks_from_ancestor() {
    let (table, profiles, processes, resolver) = setup();
    table.add(100, 1, "/usr/lib/slack/slack");
    table.add(150, 100, "/usr/lib/slack/renderer");
    table.add(200, 150, "/usr/libexec/helper");
    bound(&profiles, "/usr/lib/slack/slack", Profile::new("slack", "Slack"));
    bound(
        &profiles,
        "/usr/lib/slack/renderer",
        Profile::new("renderer", "Renderer")
            .with_framework(Framework::AscendAndMerge { hops: hops(1) }),
    );
    bound(
        &profiles,
        "/usr/libexec/helper",
        Profile::new("helper", "Helper")
            .with_framework(Framework::AscendAndRematch { hops: hops(1) }),
    );

    let process = resolver.resolve(200).unwrap();

    assert_eq!(process.pid, 100);
    assert_eq!(process.profile.as_ref().unwrap().id, "slack");
    assert!(processes.get("200").unwrap_err().is_not_found());
    assert!(processes.get("150").unwrap_err().is_not_found());
}

#[test]
fn test_rewrites_chain() {
    let (table, profiles, _processes, resolver) = setup();
    table.add(700, 1, "/usr/bin/env /usr/bin/python3 -u /srv/app.py --port 80");
    bound(
        &profiles,
        "/usr/bin/env",
        Profile::new("env", "env").with_framework(Framework::Rewrite {
            rule: RewriteRule::FirstNonFlagArgument,
        }),
    );
    bound(
        &profiles,
        "/usr/bin/python3",
        Profile::new("python", "Python").with_framework(Framework::Rewrite {
            rule: RewriteRule::FirstNonFlagArgument,
        }),
    );
    bound(&profiles, "/srv/app.py", Profile::new("app", "App"));

    let process = resolver.resolve(700).unwrap();

    assert_eq!(process.profile.as_ref().unwrap().id, "app");
    assert_eq!(process.exec_path, "/srv/app.py");
    assert_eq!(process.cmd_line, "/srv/app.py --port 80");
    assert_eq!(resolver.stats().rewrites, 2);
}

#[test]
fn test_failed_rewrite_is_hard_error() {
    let (table, profiles, _processes, resolver) = setup();
    table.add(710, 1, "/usr/bin/env");
    bound(
        &profiles,
        "/usr/bin/env",
        Profile::new("env", "env").with_framework(Framework::Rewrite {
            rule: RewriteRule::FirstNonFlagArgument,
        }),
    );

    let err = resolver.resolve(710).unwrap_err();
    match err {
        ResolveError::FrameworkRewrite { profile, .. } => assert_eq!(profile, "env"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_rewrite_loop_is_bounded() {
    let (table, profiles, _processes, resolver) = setup();
    let cmd = vec!["/usr/bin/again"; 16].join(" ");
    table.add(720, 1, &cmd);
    bound(
        &profiles,
        "/usr/bin/again",
        Profile::new("again", "Again").with_framework(Framework::Rewrite {
            rule: RewriteRule::Argument(1),
        }),
    );

    let process = resolver.resolve(720).unwrap();

    assert!(!process.is_profiled());
    let stats = resolver.stats();
    assert_eq!(stats.rewrites, 10);
    assert_eq!(stats.unprofiled, 1);
}
