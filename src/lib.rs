//! Template Trace Panel
//!
//! Instruments template rendering inside a request/response cycle and
//! produces a per-request timeline of render calls for a web-framework
//! debugging sidebar.
//!
//! The host framework constructs one [`panel::TemplateProfilerPanel`] per
//! request, calls `enable_instrumentation` / `disable_instrumentation`
//! around the window it wants measured, and reads the stats payload back
//! at response time:
//!
//! ```
//! use template_trace_panel::engine::template::Engine;
//! use template_trace_panel::engine::Context;
//! use template_trace_panel::panel::TemplateProfilerPanel;
//!
//! let mut panel = TemplateProfilerPanel::new();
//! let engine = Engine::new();
//! let template = engine
//!     .template_from_source(Some("hello.html"), "Hi {{ name }}!")
//!     .unwrap();
//!
//! let mut ctx = Context::new();
//! ctx.set("name", "ada");
//!
//! panel.enable_instrumentation();
//! template.render(&ctx).unwrap();
//! panel.disable_instrumentation();
//!
//! let stats = panel.process_response();
//! assert_eq!(stats.total_calls, 1);
//! ```

pub mod aggregator;
pub mod bus;
pub mod color;
pub mod commands;
pub mod engine;
pub mod instrument;
pub mod output;
pub mod panel;
pub mod recorder;
pub mod utils;
