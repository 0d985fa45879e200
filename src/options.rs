//! Walk configuration (spec.md section 3 "Options" and section 6 "Options surface").
//!
//! Shaped after the teacher's `FinderBuilder`: a consuming builder with
//! chainable `#[must_use]` setters and a validating terminal `build()`.

use std::num::NonZeroUsize;

use crate::cancellation::CancellationToken;
use crate::entry::SearchFor;
use crate::error::WalkError;

/// Logical CPU count baked in by `build.rs` (`cargo:rustc-env=THREAD_COUNT`).
const DEFAULT_THREAD_COUNT_STR: &str = env!("THREAD_COUNT");

/// Read-only for the duration of a walk (spec.md section 3 "Lifecycles").
#[derive(Clone, Debug)]
pub struct Options {
    pub(crate) search_for: SearchFor,
    pub(crate) include_inherited: bool,
    pub(crate) resolve_owner: bool,
    pub(crate) use_native_owner: bool,
    pub(crate) max_depth: Option<u32>,
    pub(crate) search_pattern: String,
    pub(crate) cancellation: CancellationToken,
    pub(crate) thread_count: NonZeroUsize,
}

impl Default for Options {
    fn default() -> Self {
        OptionsBuilder::new().build().expect("default options are always valid")
    }
}

impl Options {
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    #[must_use]
    #[inline]
    pub const fn search_for(&self) -> SearchFor {
        self.search_for
    }

    #[must_use]
    #[inline]
    pub const fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    #[must_use]
    #[inline]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    #[inline]
    pub fn search_pattern(&self) -> &str {
        &self.search_pattern
    }

    #[must_use]
    #[inline]
    pub const fn include_inherited(&self) -> bool {
        self.include_inherited
    }

    #[must_use]
    #[inline]
    pub const fn resolve_owner(&self) -> bool {
        self.resolve_owner
    }

    #[must_use]
    #[inline]
    pub const fn use_native_owner(&self) -> bool {
        self.use_native_owner
    }

    #[must_use]
    #[inline]
    pub const fn thread_count(&self) -> NonZeroUsize {
        self.thread_count
    }
}

/// Builds an [`Options`]. Mirrors the teacher's `FinderBuilder`: every setter
/// consumes and returns `Self`, and the only fallible step is `build()`.
#[derive(Clone, Debug)]
pub struct OptionsBuilder {
    search_for: SearchFor,
    include_inherited: bool,
    resolve_owner: bool,
    use_native_owner: bool,
    max_depth: Option<u32>,
    search_pattern: String,
    cancellation: Option<CancellationToken>,
    thread_count: Option<NonZeroUsize>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            search_for: SearchFor::Files,
            include_inherited: true,
            resolve_owner: true,
            use_native_owner: true,
            max_depth: None,
            search_pattern: "*".to_owned(),
            cancellation: None,
            thread_count: None,
        }
    }

    #[must_use]
    pub const fn search_for(mut self, search_for: SearchFor) -> Self {
        self.search_for = search_for;
        self
    }

    #[must_use]
    pub const fn include_inherited(mut self, include_inherited: bool) -> Self {
        self.include_inherited = include_inherited;
        self
    }

    #[must_use]
    pub const fn resolve_owner(mut self, resolve_owner: bool) -> Self {
        self.resolve_owner = resolve_owner;
        self
    }

    #[must_use]
    pub const fn use_native_owner(mut self, use_native_owner: bool) -> Self {
        self.use_native_owner = use_native_owner;
        self
    }

    /// `0` means root-only, matching spec.md section 3. `None` is unbounded.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn search_pattern<P: Into<String>>(mut self, pattern: P) -> Self {
        let pattern = pattern.into();
        self.search_pattern = if pattern.is_empty() { "*".to_owned() } else { pattern };
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Worker pool size. Defaults to `ceil(1.5 * logical_cpu_count)` per
    /// spec.md section 4.3, computed in `build()` so this setter can stay
    /// infallible.
    #[must_use]
    pub const fn thread_count(mut self, threads: NonZeroUsize) -> Self {
        self.thread_count = Some(threads);
        self
    }

    /// Validates and finalizes the configuration.
    ///
    /// # Errors
    /// Never fails today (no field here has an invalid combination), but
    /// returns `Result` to match the root-path validation `enumerate` performs
    /// and to leave room for future cross-field checks without a breaking
    /// signature change.
    pub fn build(self) -> Result<Options, WalkError> {
        let thread_count = self.thread_count.unwrap_or_else(default_thread_count);
        Ok(Options {
            search_for: self.search_for,
            include_inherited: self.include_inherited,
            resolve_owner: self.resolve_owner,
            use_native_owner: self.use_native_owner,
            max_depth: self.max_depth,
            search_pattern: self.search_pattern,
            cancellation: self.cancellation.unwrap_or_default(),
            thread_count,
        })
    }
}

fn default_thread_count() -> NonZeroUsize {
    let cpus = DEFAULT_THREAD_COUNT_STR.parse::<usize>().unwrap_or(1).max(1);
    let recommended = (cpus * 3).div_ceil(2);
    NonZeroUsize::new(recommended).unwrap_or(NonZeroUsize::MIN)
}
