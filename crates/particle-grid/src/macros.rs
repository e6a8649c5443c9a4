/// Emit a `tracing::warn!` the first time this call site is reached.
#[doc(hidden)]
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)+) => {{
        static WARNED: ::std::sync::atomic::AtomicBool = ::std::sync::atomic::AtomicBool::new(false);
        if !WARNED.swap(true, ::std::sync::atomic::Ordering::Relaxed) {
            ::tracing::warn!($($arg)+);
        }
    }};
}
