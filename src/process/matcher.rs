/*!
 * Profile Matcher
 * Finds the profile governing a process, chasing framework indirections
 *
 * Each iteration looks up the profile for the current match path and then
 * follows its action: bind it, walk up the ancestry, or rewrite the command
 * line and look again. The loop is bounded; lookup errors and framework hops
 * all count toward the bound.
 */

use super::traits::ProcessInfoSource;
use super::types::Process;
use crate::core::errors::{ResolveError, ResolveResult, StoreResult};
use crate::core::limits::MAX_MATCH_ITERATIONS;
use crate::core::types::Pid;
use crate::monitoring::ResolverStats;
use crate::profile::framework::program_of;
use crate::profile::store::ProfileStore;
use crate::profile::types::{MatchAction, Profile};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a matching run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A terminal profile was bound to the process
    Bound,
    /// The process is an alias of this ancestor; resolve it instead
    Delegate(Pid),
    /// The iteration bound elapsed; the process stays unprofiled
    LoopExceeded,
}

/// Framework-chasing matcher for one process
pub struct ProfileMatcher<'a> {
    profiles: &'a dyn ProfileStore,
    source: &'a dyn ProcessInfoSource,
    stats: &'a ResolverStats,
}

impl<'a> ProfileMatcher<'a> {
    pub fn new(
        profiles: &'a dyn ProfileStore,
        source: &'a dyn ProcessInfoSource,
        stats: &'a ResolverStats,
    ) -> Self {
        Self {
            profiles,
            source,
            stats,
        }
    }

    /// Match `process`, starting from its executable path
    ///
    /// Rewrites update `cmd_line` and `exec_path` on the process. On `Bound`
    /// the profile and profile key are set. After a rematch, later ancestry
    /// walks start from the ancestor whose executable is being matched.
    pub fn run(&self, process: &mut Process) -> ResolveResult<MatchOutcome> {
        let mut path = process.exec_path.clone();
        let mut match_pid = process.pid;

        for attempt in 1..=MAX_MATCH_ITERATIONS {
            let profile = match self.lookup(&path, &process.user_home) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(
                        process = %process,
                        attempt,
                        error = %e,
                        "could not get profile"
                    );
                    continue;
                }
            };

            match profile.match_action() {
                MatchAction::Terminal => {
                    self.bind(process, Arc::clone(&profile));
                    return Ok(MatchOutcome::Bound);
                }
                MatchAction::AscendAndMerge { hops } => {
                    let ancestor = self.ascend(match_pid, hops)?;
                    debug!(pid = process.pid, ancestor, profile = %profile.id, "merging with parent");
                    return Ok(MatchOutcome::Delegate(ancestor));
                }
                MatchAction::AscendAndRematch { hops } => {
                    let ancestor = self.ascend(match_pid, hops)?;
                    path = self.source.executable_path(ancestor).map_err(|e| {
                        ResolveError::AncestryWalk {
                            pid: match_pid,
                            hop: hops,
                            source: e,
                        }
                    })?;
                    debug!(pid = process.pid, ancestor, path = %path, "re-matching from ancestor");
                    match_pid = ancestor;
                }
                MatchAction::Rewrite(rule) => {
                    let rewritten = rule.apply(&process.cmd_line, &process.cwd).map_err(|reason| {
                        ResolveError::FrameworkRewrite {
                            profile: profile.id.clone(),
                            reason,
                        }
                    })?;
                    self.stats.record_rewrite();
                    debug!(pid = process.pid, profile = %profile.id, cmd_line = %rewritten, "framework rewrite");

                    process.exec_path = program_of(&rewritten).to_string();
                    process.cmd_line = rewritten;
                    path = process.exec_path.clone();
                }
            }
        }

        warn!(process = %process, "got into loop while getting profile");
        Ok(MatchOutcome::LoopExceeded)
    }

    fn lookup(&self, path: &str, user_home: &str) -> StoreResult<Arc<Profile>> {
        match self.profiles.get_active_profile_by_path(path) {
            Err(e) if e.is_not_found() => self.profiles.find_profile_by_path(path, user_home),
            other => other,
        }
    }

    /// Walk `hops` parent links up from `pid`
    fn ascend(&self, pid: Pid, hops: u8) -> ResolveResult<Pid> {
        let mut current = pid;
        for hop in 1..=hops {
            current = self
                .source
                .parent_id(current)
                .map_err(|e| ResolveError::AncestryWalk { pid, hop, source: e })?;
        }
        self.stats.record_ascent();
        Ok(current)
    }

    fn bind(&self, process: &mut Process, profile: Arc<Profile>) {
        let profile = if !profile.default && !process.icon.is_empty() && !profile.has_icon() {
            self.backfill_icon(&profile, &process.icon)
        } else {
            profile
        };
        debug!(process = %process, profile = %profile.id, "applied profile");
        process.bind(profile);
    }

    /// Give the profile the process icon; a failed save is only logged
    fn backfill_icon(&self, profile: &Profile, icon: &str) -> Arc<Profile> {
        let updated = Arc::new(profile.clone().with_icon(icon));
        match self.profiles.save(Arc::clone(&updated)) {
            Ok(()) => self.stats.record_icon_backfill(),
            Err(e) => warn!(profile = %profile.id, error = %e, "failed to save profile icon"),
        }
        updated
    }
}
