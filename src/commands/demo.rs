//! Demo command implementation.
//!
//! The demo command:
//! 1. Creates a panel and enables instrumentation
//! 2. Registers a small sample site with the built-in engine
//! 3. Renders it (optionally several times)
//! 4. Prints the resulting timeline and summary
//! 5. Optionally writes the JSON payload

use crate::engine::template::Engine;
use crate::engine::Context;
use crate::output::{render_text_timeline, write_stats};
use crate::panel::TemplateProfilerPanel;
use crate::recorder::RecorderConfig;
use anyhow::{bail, Context as _, Result};
use log::{debug, info};
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the demo command
#[derive(Debug, Clone)]
pub struct DemoArgs {
    /// Output path for the JSON stats payload (optional)
    pub output_json: Option<PathBuf>,

    /// How many times to render the sample page
    pub iterations: usize,

    /// Extra template-name prefixes to exclude from recording
    pub skip_prefixes: Vec<String>,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            output_json: None,
            iterations: 1,
            skip_prefixes: Vec::new(),
        }
    }
}

/// Check demo arguments before running.
pub fn validate_args(args: &DemoArgs) -> Result<()> {
    if args.iterations == 0 {
        bail!("iterations must be at least 1");
    }
    if args.iterations > 1000 {
        bail!("iterations must be at most 1000");
    }
    Ok(())
}

/// Execute the demo command.
pub fn execute_demo(args: DemoArgs) -> Result<()> {
    info!("Rendering sample site ({} iteration(s))", args.iterations);

    let mut panel = TemplateProfilerPanel::with_config(RecorderConfig {
        skip_template_prefixes: args.skip_prefixes.clone(),
    });

    let engine = build_sample_site().context("Failed to parse sample templates")?;
    let ctx = sample_context();

    panel.enable_instrumentation();
    for iteration in 0..args.iterations {
        let page = engine
            .get_template("page.html")
            .context("Sample page is not registered")?;
        let html = page.render(&ctx).context("Failed to render sample page")?;
        debug!("iteration {}: rendered {} bytes", iteration + 1, html.len());
    }

    #[cfg(feature = "minijinja")]
    render_jinja_sample(&ctx).context("Failed to render jinja sample")?;

    panel.disable_instrumentation();

    let stats = panel.process_response();
    println!("{}", render_text_timeline(stats));

    if let Some(path) = &args.output_json {
        write_stats(stats, path).context("Failed to write stats JSON")?;
        info!("Stats written to: {}", path.display());
    }

    Ok(())
}

fn build_sample_site() -> Result<Engine> {
    let engine = Engine::new();
    engine.add_template("shared/header.html", "<h1>{{ title }}</h1>")?;
    engine.add_template("shared/footer.html", "<footer>{{ title }}</footer>")?;
    engine.add_template("shop/row.html", "<li>{{ item }}</li>")?;
    engine.add_template(
        "page.html",
        concat!(
            "{% include \"shared/header.html\" %}\n",
            "{% profile \"content\" %}<ul>",
            "{% for item in items %}{% include \"shop/row.html\" %}{% endfor %}",
            "</ul>{% endprofile %}\n",
            "{% if user.active %}Welcome back, {{ user.name }}!",
            "{% else %}Hello, guest.{% endif %}\n",
            "{% include \"shared/footer.html\" %}\n",
        ),
    )?;
    Ok(engine)
}

fn sample_context() -> Context {
    let mut ctx = Context::new();
    ctx.set("title", "Demo Dashboard");
    ctx.set("items", json!(["alpha", "beta", "gamma"]));
    ctx.set("user", json!({"name": "ada", "active": true}));
    ctx
}

#[cfg(feature = "minijinja")]
fn render_jinja_sample(ctx: &Context) -> Result<()> {
    use crate::engine::{install, JINJA_ENGINE_ID};

    let Some(jinja) = install().engine(JINJA_ENGINE_ID) else {
        return Ok(());
    };
    let banner = jinja.template_from_str(Some("jinja/banner.html"), "** {{ title }} **")?;
    let out = banner.render(ctx)?;
    debug!("jinja sample rendered {} bytes", out.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_default_is_valid() {
        assert!(validate_args(&DemoArgs::default()).is_ok());
    }

    #[test]
    fn test_validate_args_zero_iterations() {
        let args = DemoArgs {
            iterations: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_too_many_iterations() {
        let args = DemoArgs {
            iterations: 2000,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_sample_site_renders() {
        let engine = build_sample_site().unwrap();
        let page = engine.get_template("page.html").unwrap();
        let html = page.render(&sample_context()).unwrap();

        assert!(html.contains("<h1>Demo Dashboard</h1>"));
        assert!(html.contains("<li>alpha</li>"));
        assert!(html.contains("Welcome back, ada!"));
        assert!(html.contains("<footer>Demo Dashboard</footer>"));
    }
}
