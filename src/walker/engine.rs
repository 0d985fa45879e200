//! The parallel traversal engine (spec.md section 4.3).
//!
//! Work distribution is a direct generalization of the teacher's worker pool
//! in `walk/finder.rs`: a `crossbeam_deque` `Injector` seeds the walk, each
//! worker owns a LIFO `Worker` and steals from its siblings when its own
//! queue runs dry, and a `PendingGuard` drives the active-worker-count +
//! queue-empty check spec.md section 4.3 requires to be observed as "a
//! single consistent state" rather than a racy empty-queue poll.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use tracing::debug;

use crate::entry::{EntryKind, FileSystemEntry};
use crate::native::NativeDirIter;
use crate::options::Options;
use crate::security::SecurityResolver;
use crate::walker::task::{DedupSet, WalkTask};

struct PendingGuard<'guard> {
    pending: &'guard AtomicUsize,
    shutdown_flag: &'guard AtomicBool,
}

impl<'guard> PendingGuard<'guard> {
    const fn new(pending: &'guard AtomicUsize, shutdown_flag: &'guard AtomicBool) -> Self {
        Self { pending, shutdown_flag }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        // The thread performing the final decrement sees the up-to-date
        // value (acquire half) and can then safely signal shutdown.
        let remaining = self.pending.fetch_sub(1, Ordering::AcqRel) - 1;
        if remaining == 0 {
            self.shutdown_flag.store(true, Ordering::Relaxed);
        }
    }
}

fn find_task(
    local: &Worker<WalkTask>,
    injector: &Injector<WalkTask>,
    stealers: &[Stealer<WalkTask>],
) -> Option<WalkTask> {
    if let Some(task) = local.pop() {
        return Some(task);
    }

    loop {
        match injector.steal_batch_and_pop(local) {
            Steal::Success(task) => return Some(task),
            Steal::Retry => continue,
            Steal::Empty => {}
        }

        let mut retry = false;
        for stealer in stealers {
            match stealer.steal() {
                Steal::Success(task) => return Some(task),
                Steal::Retry => retry = true,
                Steal::Empty => {}
            }
        }

        if !retry {
            return None;
        }
    }
}

/// Owns the shared state of one `enumerate` call: the work queue, dedup set,
/// shutdown signal and pending counter. Spec.md section 9 calls for
/// replacing "global mutable traversal state" with an explicit per-call
/// context handed to workers; this is that context.
pub struct Walker {
    options: Arc<Options>,
    resolver: Arc<SecurityResolver>,
}

impl Walker {
    #[must_use]
    pub fn new(options: Arc<Options>, resolver: Arc<SecurityResolver>) -> Self {
        Self { options, resolver }
    }

    /// Starts the worker pool rooted at `root` and returns the receiving end
    /// of the output channel (spec.md section 2, "Control flow"). When
    /// `resolve_security` is `false` (the `enumerate_paths` entry point),
    /// workers skip `SecurityResolver::resolve` entirely.
    pub fn spawn(&self, root: PathBuf, resolve_security: bool) -> Receiver<FileSystemEntry> {
        let thread_count = self.options.thread_count().get();
        let (sender, receiver) = unbounded();
        let injector = Arc::new(Injector::new());
        let dedup = Arc::new(DedupSet::new());
        let pending = Arc::new(AtomicUsize::new(1));
        let shutdown_flag = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(thread_count);
        let mut stealers = Vec::with_capacity(thread_count);
        for _ in 0..thread_count {
            let worker = Worker::new_lifo();
            stealers.push(worker.stealer());
            workers.push(worker);
        }
        let stealers_shared = Arc::new(stealers);

        dedup.insert(root.clone());
        injector.push(WalkTask { path: root, depth: 0 });

        for (index, worker) in workers.into_iter().enumerate() {
            let options = Arc::clone(&self.options);
            let resolver = Arc::clone(&self.resolver);
            let sender = sender.clone();
            let injector = Arc::clone(&injector);
            let dedup = Arc::clone(&dedup);
            let pending = Arc::clone(&pending);
            let shutdown_flag = Arc::clone(&shutdown_flag);
            let stealers_pool = Arc::clone(&stealers_shared);

            let spawned = thread::Builder::new()
                .name(format!("ntacl-walk-{index}"))
                .spawn(move || {
                    let local_stealers: Vec<_> = stealers_pool
                        .iter()
                        .enumerate()
                        .filter(|(idx, _)| *idx != index)
                        .map(|(_, stealer)| stealer.clone())
                        .collect();

                    loop {
                        if shutdown_flag.load(Ordering::Relaxed) && worker.is_empty() && injector.is_empty() {
                            break;
                        }
                        if options.cancellation().is_cancelled() {
                            debug!("worker observed cancellation before task pop");
                            break;
                        }

                        let Some(task) = find_task(&worker, &injector, &local_stealers) else {
                            if shutdown_flag.load(Ordering::Relaxed) {
                                break;
                            }
                            thread::yield_now();
                            continue;
                        };

                        let _guard = PendingGuard::new(&pending, &shutdown_flag);
                        process_directory(DirectoryJob {
                            task: &task,
                            options: &options,
                            resolver: &resolver,
                            resolve_security,
                            sender: &sender,
                            local: &worker,
                            dedup: &dedup,
                            pending: &pending,
                            shutdown_flag: &shutdown_flag,
                        });
                    }
                });

            if let Err(err) = spawned {
                debug!(error = %err, index, "failed to spawn traversal worker thread");
            }
        }

        receiver
    }
}

struct DirectoryJob<'job> {
    task: &'job WalkTask,
    options: &'job Options,
    resolver: &'job SecurityResolver,
    resolve_security: bool,
    sender: &'job Sender<FileSystemEntry>,
    local: &'job Worker<WalkTask>,
    dedup: &'job DedupSet,
    pending: &'job AtomicUsize,
    shutdown_flag: &'job AtomicBool,
}

fn process_directory(job: DirectoryJob<'_>) {
    let search_for = job.options.search_for();
    let within_depth = |depth: u32| job.options.max_depth().is_none_or(|max| depth <= max);

    for child in NativeDirIter::open(&job.task.path, job.options.search_pattern()) {
        if job.options.cancellation().is_cancelled() {
            debug!(path = %job.task.path.display(), "worker observed cancellation between children");
            return;
        }

        let full_path = job.task.path.join(&child.name);
        let kind = EntryKind::from_attributes(child.attributes);

        if kind.is_directory() {
            let child_depth = job.task.depth + 1;
            if within_depth(child_depth) && job.dedup.insert(full_path.clone()) {
                enqueue(
                    WalkTask { path: full_path.clone(), depth: child_depth },
                    job.local,
                    job.pending,
                    job.shutdown_flag,
                );
            }
            if search_for.wants_directories() {
                emit(&full_path, child.attributes, job.options, job.resolver, job.resolve_security, job.sender, job.shutdown_flag);
            }
        } else if search_for.wants_files() {
            emit(&full_path, child.attributes, job.options, job.resolver, job.resolve_security, job.sender, job.shutdown_flag);
        }
    }
}

fn enqueue(task: WalkTask, local: &Worker<WalkTask>, pending: &AtomicUsize, shutdown_flag: &AtomicBool) {
    if shutdown_flag.load(Ordering::Relaxed) {
        return;
    }
    // Atomicity alone ensures every worker observes a consistent modification
    // order for `pending`, so the final count is correct even if increments
    // and the matching `PendingGuard` decrements interleave across threads.
    pending.fetch_add(1, Ordering::Relaxed);
    local.push(task);
}

#[allow(clippy::too_many_arguments)]
fn emit(
    path: &Path,
    attributes: u32,
    options: &Options,
    resolver: &SecurityResolver,
    resolve_security: bool,
    sender: &Sender<FileSystemEntry>,
    shutdown_flag: &AtomicBool,
) {
    let kind = EntryKind::from_attributes(attributes);
    let path_string = path.to_string_lossy().into_owned();

    let entry = if resolve_security {
        match resolver.resolve(path, kind, options) {
            Ok((owner, acl)) => FileSystemEntry::resolved(path_string, attributes, owner, acl),
            Err(err) => FileSystemEntry::failed(path_string, attributes, &err),
        }
    } else {
        FileSystemEntry::resolved(path_string, attributes, String::new(), std::collections::HashMap::new())
    };

    if sender.send(entry).is_err() {
        shutdown_flag.store(true, Ordering::Relaxed);
    }
}
