//! Delay source for the dispatcher's idle back-off. Injected so tests can
//! count waits instead of sleeping.

/// Cooperative delay provider (embassy timer, tokio sleep, test fake).
pub trait KorriTimer {
    /// Resolve after roughly `millis` milliseconds without blocking the executor.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}
