//! Local task spawning.
//!
//! Event listeners start async controller work on the current thread's
//! executor: the browser microtask queue on wasm32, a tokio `LocalSet`
//! natively (spawning outside one panics).

use std::future::Future;
use std::pin::Pin;

/// Boxed future that stays on the current thread.
pub type LocalFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Spawns `future` on the local executor.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns `future` on the local executor.
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	tokio::task::spawn_local(future);
}
