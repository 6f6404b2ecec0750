/*!
 * procprofile - Main Entry Point
 *
 * Resolves the pids given on the command line (or every pid in /proc when
 * none are given) and prints each process with its bound profile as JSON.
 *
 * Configuration comes from the PROCPROFILE_* environment variables and
 * RUST_LOG.
 */

use procprofile::{
    init_tracing, Error, FsFileInfoProvider, MemoryProcessStore, MemoryProfileStore, Pid,
    ProcessInfoSource, ProcessResolver, ResolverConfig, Result,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    init_tracing();
    run().await.map_err(miette::Report::new)
}

async fn run() -> Result<()> {
    let config = ResolverConfig::from_env()?;

    let profiles = match &config.profiles_path {
        Some(path) => {
            info!(path = %path.display(), "loading profiles");
            MemoryProfileStore::from_json_file(path)?
        }
        None => MemoryProfileStore::new(),
    };
    info!(profiles = profiles.len(), "profile store ready");

    let (source, mut pids) = platform_source()?;
    let requested = parse_pids(std::env::args().skip(1))?;
    if !requested.is_empty() {
        pids = requested;
    }

    let resolver = Arc::new(
        ProcessResolver::builder(source, Arc::new(profiles), Arc::new(MemoryProcessStore::new()))
            .with_file_info(Arc::new(FsFileInfoProvider))
            .with_config(config)
            .build(),
    );

    let handles: Vec<_> = pids
        .into_iter()
        .map(|pid| {
            let resolver = Arc::clone(&resolver);
            (pid, tokio::task::spawn_blocking(move || resolver.resolve(pid)))
        })
        .collect();

    let mut resolved = Vec::with_capacity(handles.len());
    for (pid, handle) in handles {
        match handle.await {
            Ok(Ok(process)) => resolved.push(process),
            Ok(Err(e)) => warn!(pid, error = %e, "could not resolve process"),
            Err(e) => warn!(pid, error = %e, "resolver task failed"),
        }
    }

    let output = serde_json::json!({
        "processes": resolved,
        "stats": resolver.stats(),
    });
    let text = serde_json::to_string_pretty(&output).map_err(|e| Error::Io(e.to_string()))?;
    println!("{}", text);

    info!(
        resolved = resolved.len(),
        hit_rate = resolver.stats().hit_rate(),
        "done"
    );
    Ok(())
}

fn parse_pids(args: impl Iterator<Item = String>) -> Result<Vec<Pid>> {
    args.map(|arg| {
        arg.parse::<Pid>()
            .map_err(|e| Error::Io(format!("invalid pid {:?}: {}", arg, e)))
    })
    .collect()
}

#[cfg(target_os = "linux")]
const PROCFS_ROOT: &str = "/proc";

#[cfg(target_os = "linux")]
fn platform_source() -> Result<(Arc<dyn ProcessInfoSource>, Vec<Pid>)> {
    use procprofile::process::procfs::{is_procfs_root, ProcfsInfoSource};

    let root = std::path::Path::new(PROCFS_ROOT);
    if !is_procfs_root(root) {
        return Err(Error::Io(format!("{} is not a mounted procfs", PROCFS_ROOT)));
    }
    let source = ProcfsInfoSource::with_root(root);
    let pids = source.list_pids()?;
    Ok((Arc::new(source), pids))
}

#[cfg(not(target_os = "linux"))]
fn platform_source() -> Result<(Arc<dyn ProcessInfoSource>, Vec<Pid>)> {
    Err(Error::Io(
        "no process table source available on this platform".to_string(),
    ))
}
