//! The render wrapper every engine adapter routes through.
//!
//! There is exactly one wrap site in the process: engine adapters call
//! [`instrumented_render`] around their own render logic. Emission is armed
//! once by [`crate::engine::install`]; until then the wrapper is a plain
//! passthrough. The wrapped call always runs and its error, if any,
//! propagates unchanged — instrumentation never swallows engine failures.

use crate::bus::{template_rendered, NodeInterval, RenderEvent};
use crate::utils::error::RenderError;
use log::debug;
use once_cell::sync::Lazy;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// All event timestamps are seconds since this per-process epoch, so a
/// legitimate timestamp of exactly 0.0 is possible for the first render.
static CLOCK_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Arm event emission. Called from the one-shot installer.
pub(crate) fn arm() {
    if !INSTALLED.swap(true, Ordering::AcqRel) {
        debug!("render instrumentation armed");
    }
}

/// Whether render instrumentation has been installed in this process
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Acquire)
}

/// Monotonic timestamp in seconds
pub fn now_seconds() -> f64 {
    CLOCK_EPOCH.elapsed().as_secs_f64()
}

thread_local! {
    static RENDER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII nesting-depth tracker.
///
/// Depth is an explicit per-thread counter threaded through the render call
/// path, not a host-stack approximation; it restores on drop so an
/// unwinding render cannot leave the counter skewed.
struct DepthGuard {
    level: usize,
}

impl DepthGuard {
    fn enter() -> Self {
        let level = RENDER_DEPTH.with(|depth| {
            let level = depth.get() + 1;
            depth.set(level);
            level
        });
        Self { level }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        RENDER_DEPTH.with(|depth| depth.set(self.level - 1));
    }
}

/// What an engine adapter tells the wrapper about one render call
pub struct RenderMeta<'a> {
    /// Identifier of the originating engine
    pub engine: &'static str,

    /// Template display name, if known
    pub name: Option<&'a str>,

    /// Walks the engine's node tree after a successful render; the argument
    /// is the starting tree depth. `None` for engines without a node tree.
    pub node_timeline: Option<&'a dyn Fn(usize) -> Vec<NodeInterval>>,
}

/// Time `render`, then publish a [`RenderEvent`] for it.
///
/// The wrapper is transparent to callers: arguments and the return value
/// pass through unchanged, and a render error is returned as-is with no
/// event published. Nesting level is the depth of this call at the moment
/// of invocation, starting at 1 for a top-level render.
pub fn instrumented_render<F>(meta: RenderMeta<'_>, render: F) -> Result<String, RenderError>
where
    F: FnOnce() -> Result<String, RenderError>,
{
    if !is_installed() {
        return render();
    }

    let guard = DepthGuard::enter();
    let start = now_seconds();
    let result = render();
    let end = now_seconds();
    let level = guard.level;
    drop(guard);

    if result.is_ok() {
        let nodes = meta.node_timeline.map(|walk| walk(0));
        template_rendered().publish(&RenderEvent {
            engine: meta.engine,
            name: meta.name.map(str::to_owned),
            start,
            end,
            level,
            nodes,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_clock_is_monotonic() {
        let a = now_seconds();
        let b = now_seconds();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn test_depth_guard_nests_and_restores() {
        let outer = DepthGuard::enter();
        assert_eq!(outer.level, 1);
        {
            let inner = DepthGuard::enter();
            assert_eq!(inner.level, 2);
        }
        let sibling = DepthGuard::enter();
        assert_eq!(sibling.level, 2);
        drop(sibling);
        drop(outer);
        RENDER_DEPTH.with(|depth| assert_eq!(depth.get(), 0));
    }

    #[test]
    fn test_depth_guard_restores_on_unwind() {
        let caught = std::panic::catch_unwind(|| {
            let _guard = DepthGuard::enter();
            panic!("render blew up");
        });
        assert!(caught.is_err());
        RENDER_DEPTH.with(|depth| assert_eq!(depth.get(), 0));
    }

    #[test]
    fn test_failed_render_publishes_no_event() {
        arm();

        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let marker = "instrument-failed-render-probe";
        let id = template_rendered().connect(move |event| {
            if event.name.as_deref() == Some(marker) {
                *counter.lock() += 1;
            }
        });

        let meta = RenderMeta {
            engine: "test",
            name: Some(marker),
            node_timeline: None,
        };
        let result = instrumented_render(meta, || {
            Err(RenderError::UnknownTemplate {
                name: "missing".to_string(),
            })
        });

        template_rendered().disconnect(id);
        assert!(result.is_err());
        assert_eq!(*seen.lock(), 0);
    }

    #[test]
    fn test_successful_render_publishes_once_with_level() {
        arm();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::clone(&seen);
        let marker = "instrument-success-probe";
        let id = template_rendered().connect(move |event| {
            if event.name.as_deref() == Some(marker) {
                events.lock().push((event.level, event.start, event.end));
            }
        });

        let meta = RenderMeta {
            engine: "test",
            name: Some(marker),
            node_timeline: None,
        };
        let result = instrumented_render(meta, || Ok("out".to_string()));

        template_rendered().disconnect(id);
        assert_eq!(result.unwrap(), "out");

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        let (level, start, end) = events[0];
        assert_eq!(level, 1);
        assert!(end >= start);
    }
}
