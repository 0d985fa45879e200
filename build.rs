fn main() {
    // Pick a sane default worker count at compile time so `Options::default()`
    // doesn't need to re-probe this on every call to `enumerate`.
    const MIN_THREADS: usize = 1;
    let num_threads =
        std::thread::available_parallelism().map_or(MIN_THREADS, core::num::NonZeroUsize::get);

    println!("cargo:rustc-env=THREAD_COUNT={num_threads}");
}
