/*!
 * Process Resolver
 * Turns a bare pid into a persisted Process bound to its governing profile
 *
 * ## Flow
 * 1. Process store lookup by decimal pid (hit returns immediately)
 * 2. Kernel/idle pid is synthesized without OS queries
 * 3. OS metadata gathering; every field failure is soft
 * 4. Profile matching (see `matcher`)
 * 5. Executable file metadata
 * 6. Process store create
 *
 * Merge-with-parent matches do not recurse: the matcher yields the ancestor
 * pid and the resolve loop continues with it. The child to ancestor link is
 * remembered in memory so later calls for the child skip straight to the
 * ancestor; it is never written to the process store.
 */

use super::matcher::{MatchOutcome, ProfileMatcher};
use super::traits::{FileInfoProvider, ProcessInfoSource, ProcessStore};
use super::types::Process;
use crate::core::config::ResolverConfig;
use crate::core::errors::{IntrospectionError, IntrospectionResult, ResolveError, ResolveResult};
use crate::core::limits::MAX_MERGE_DELEGATIONS;
use crate::core::types::{pid_key, Pid};
use crate::monitoring::{ResolveSpan, ResolverStats, ResolverStatsSnapshot};
use crate::profile::store::ProfileStore;
use crate::profile::types::{is_system_pid, ProfileFlags};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One step of the resolve trampoline
enum Step {
    Done(Arc<Process>),
    Delegate(Pid),
}

/// Public entry point for process identity resolution
pub struct ProcessResolver {
    source: Arc<dyn ProcessInfoSource>,
    profiles: Arc<dyn ProfileStore>,
    processes: Arc<dyn ProcessStore>,
    file_info: Option<Arc<dyn FileInfoProvider>>,
    config: ResolverConfig,
    inflight: DashMap<Pid, Arc<Mutex<()>>>,
    aliases: DashMap<Pid, Pid>,
    stats: ResolverStats,
}

/// Builder for ProcessResolver
pub struct ProcessResolverBuilder {
    source: Arc<dyn ProcessInfoSource>,
    profiles: Arc<dyn ProfileStore>,
    processes: Arc<dyn ProcessStore>,
    file_info: Option<Arc<dyn FileInfoProvider>>,
    config: ResolverConfig,
}

impl ProcessResolverBuilder {
    /// Attach an executable metadata provider
    pub fn with_file_info(mut self, provider: Arc<dyn FileInfoProvider>) -> Self {
        self.file_info = Some(provider);
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ProcessResolver {
        info!(
            single_flight = self.config.single_flight,
            file_info = self.config.file_info && self.file_info.is_some(),
            unprofiled_policy = ?self.config.unprofiled_policy,
            "process resolver initialized"
        );
        ProcessResolver {
            source: self.source,
            profiles: self.profiles,
            processes: self.processes,
            file_info: self.file_info,
            config: self.config,
            inflight: DashMap::new(),
            aliases: DashMap::new(),
            stats: ResolverStats::new(),
        }
    }
}

impl ProcessResolver {
    /// Create a resolver with default configuration and no file metadata
    pub fn new(
        source: Arc<dyn ProcessInfoSource>,
        profiles: Arc<dyn ProfileStore>,
        processes: Arc<dyn ProcessStore>,
    ) -> Self {
        Self::builder(source, profiles, processes).build()
    }

    pub fn builder(
        source: Arc<dyn ProcessInfoSource>,
        profiles: Arc<dyn ProfileStore>,
        processes: Arc<dyn ProcessStore>,
    ) -> ProcessResolverBuilder {
        ProcessResolverBuilder {
            source,
            profiles,
            processes,
            file_info: None,
            config: ResolverConfig::default(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn stats(&self) -> ResolverStatsSnapshot {
        self.stats.snapshot()
    }

    /// Flags the enforcement layer applies, honoring the unprofiled policy
    pub fn effective_flags(&self, process: &Process) -> ProfileFlags {
        process.effective_flags(self.config.unprofiled_policy)
    }

    /// Resolve `pid` to a persisted Process
    ///
    /// Returns the stored record when one exists for this run. Merge-with-parent
    /// profiles resolve to the ancestor's record; the aliasing pid is never
    /// persisted itself.
    pub fn resolve(&self, pid: Pid) -> ResolveResult<Arc<Process>> {
        let span = ResolveSpan::new(pid);
        let _entered = span.enter();

        let mut current = pid;
        for _ in 0..=MAX_MERGE_DELEGATIONS {
            if let Some(ancestor) = self.alias_of(current) {
                debug!(pid = current, ancestor, "known merge alias");
                current = ancestor;
                continue;
            }

            match self.resolve_step(current)? {
                Step::Done(process) => return Ok(process),
                Step::Delegate(ancestor) => {
                    self.stats.record_merge();
                    debug!(pid = current, ancestor, "delegating to ancestor");
                    self.aliases.insert(current, ancestor);
                    current = ancestor;
                }
            }
        }

        Err(ResolveError::MergeDepthExceeded {
            pid,
            limit: MAX_MERGE_DELEGATIONS,
        })
    }

    fn resolve_step(&self, pid: Pid) -> ResolveResult<Step> {
        let key = pid_key(pid);
        if let Some(process) = self.cached(&key) {
            return Ok(Step::Done(process));
        }

        if !self.config.single_flight {
            return self.derive(pid, &key);
        }

        let gate = Arc::clone(
            self.inflight
                .entry(pid)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        let result = {
            let _guard = match gate.try_lock() {
                Some(guard) => guard,
                None => {
                    self.stats.record_single_flight_wait();
                    gate.lock()
                }
            };
            // The holder before us may have stored it
            match self.cached(&key) {
                Some(process) => Ok(Step::Done(process)),
                None => self.derive(pid, &key),
            }
        };

        self.inflight.remove_if(&pid, |_, g| Arc::ptr_eq(g, &gate));
        result
    }

    fn alias_of(&self, pid: Pid) -> Option<Pid> {
        self.aliases.get(&pid).map(|entry| *entry.value())
    }

    fn cached(&self, key: &str) -> Option<Arc<Process>> {
        match self.processes.get(key) {
            Ok(process) => {
                self.stats.record_cache_hit();
                debug!(pid = process.pid, "process store hit");
                Some(process)
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(key, error = %e, "process store lookup failed, resolving fresh");
                None
            }
        }
    }

    /// Build, match and persist a new record for `pid`
    fn derive(&self, pid: Pid, key: &str) -> ResolveResult<Step> {
        self.stats.record_resolution();

        let process = if is_system_pid(pid) {
            self.stats.record_system();
            Process::system(pid)
        } else {
            let mut process = self.gather(pid);
            let matcher = ProfileMatcher::new(self.profiles.as_ref(), self.source.as_ref(), &self.stats);
            match matcher.run(&mut process)? {
                MatchOutcome::Bound => {}
                MatchOutcome::LoopExceeded => self.stats.record_unprofiled(),
                MatchOutcome::Delegate(ancestor) => return Ok(Step::Delegate(ancestor)),
            }

            if self.config.file_info {
                if let Some(provider) = &self.file_info {
                    process.file_info = provider.file_info(&process.exec_path);
                }
            }
            process
        };

        let process = Arc::new(process);
        self.processes
            .create(key, Arc::clone(&process))
            .map_err(|e| ResolveError::Persistence { pid, source: e })?;

        debug!(process = %process, profiled = process.is_profiled(), "resolved process");
        Ok(Step::Done(process))
    }

    /// Query OS metadata; individual failures leave the field empty
    fn gather(&self, pid: Pid) -> Process {
        let source = self.source.as_ref();
        let mut process = Process::new(pid);

        #[cfg(unix)]
        {
            process.user_id = soft(pid, "uid", source.owner_uid(pid));
        }
        process.user_name = soft(pid, "username", source.owner_user_name(pid));
        process.user_home = soft(pid, "user home", source.user_home(pid));
        process.parent_pid = soft(pid, "ppid", source.parent_id(pid));
        process.exec_path = soft(pid, "path", source.executable_path(pid));
        process.cwd = soft(pid, "cwd", source.working_directory(pid));
        process.cmd_line = soft(pid, "cmdline", source.command_line(pid));
        process.name = soft(pid, "name", source.name(pid));
        process.icon = soft(pid, "icon", source.icon(pid)).unwrap_or_default();

        process
    }
}

fn soft<T: Default>(pid: Pid, field: &str, result: IntrospectionResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(IntrospectionError::Unsupported(_)) => {
            debug!(pid, field, "field not supported on this platform");
            T::default()
        }
        Err(e) => {
            warn!(pid, field, error = %e, "failed to get process field");
            T::default()
        }
    }
}
