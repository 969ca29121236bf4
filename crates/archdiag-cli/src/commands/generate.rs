//! Generate command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archdiag::plugins::PluginRegistry;
use archdiag::{build, BuildRequest, Config, Selection};

use super::{project_dir, CliError};

/// Arguments of `archdiag generate`.
#[derive(Debug, Default, clap::Args)]
pub struct GenerateArgs {
    /// Project directory (default: from config)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Output file, or `-` for stdout (default: from config, else workspace.dsl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// View keys or names to build (comma-separated, globs allowed)
    #[arg(long, value_delimiter = ',')]
    pub views: Vec<String>,

    /// View tags to build (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// View modules to build (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Drop elements the selected views do not reference
    #[arg(long)]
    pub prune_to_views: bool,

    /// Exporter key (see list-plugins)
    #[arg(long)]
    pub exporter: Option<String>,

    /// Tagging strategies to apply (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tagging: Vec<String>,

    /// View generator key
    #[arg(long)]
    pub view_generator: Option<String>,

    /// View generator options as a JSON object
    #[arg(long)]
    pub view_generator_config: Option<String>,

    /// Reuse cached output when inputs are unchanged
    #[arg(long)]
    pub enable_cache: bool,

    /// Cache directory (implies --enable-cache)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Runs the generate command.
pub fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| config.output());
    let request = request(args, config)?;
    let registry = PluginRegistry::with_builtins();

    let result = build(&request, &registry)
        .with_context(|| format!("Generation failed for {}", request.project_dir().display()))?;

    if output.as_os_str() == "-" {
        print!("{}", result.text);
        return Ok(());
    }
    write_output(&output, &result.text)?;
    tracing::info!(
        "Wrote {} view(s) to {}{}",
        result.views.len(),
        output.display(),
        if result.from_cache { " (cached)" } else { "" }
    );
    Ok(())
}

/// Merges flags over config into a build request. Flags win.
fn request(args: GenerateArgs, config: &Config) -> Result<BuildRequest> {
    let dir = project_dir(args.project, config)?;

    let mut selection = Selection::all();
    for name in args.views {
        selection = selection.name(name);
    }
    for tag in args.tags {
        selection = selection.tag(tag);
    }
    for module in &args.modules {
        selection = selection.module(module);
    }

    let mut request = BuildRequest::new(dir)
        .selection(selection)
        .exporter(args.exporter.as_deref().unwrap_or_else(|| config.exporter()))
        .prune_to_views(args.prune_to_views || config.prune_to_views);

    let tagging = if args.tagging.is_empty() {
        config.tagging.clone()
    } else {
        args.tagging
    };
    for key in tagging {
        request = request.tagging(key);
    }

    if let Some((key, options)) = generator(args.view_generator, args.view_generator_config, config)? {
        request = request.view_generator(key, options);
    }

    if let Some(dir) = args.cache_dir {
        request = request.cache_dir(dir);
    } else if args.enable_cache || config.cache.enabled {
        request = request.cache_dir(config.cache.dir.clone());
    }
    Ok(request)
}

/// Generator key and options: flags first, then `[view_generator]`.
///
/// Options from the config file apply to a flag-selected generator of the
/// same name.
fn generator(
    key: Option<String>,
    options: Option<String>,
    config: &Config,
) -> Result<Option<(String, serde_json::Value)>> {
    let configured = config.view_generator.as_ref();
    let Some(key) = key.or_else(|| configured.map(|g| g.name.clone())) else {
        return Ok(None);
    };
    if let Some(raw) = options {
        let value = serde_json::from_str(&raw).context("Invalid --view-generator-config JSON")?;
        return Ok(Some((key, value)));
    }
    match configured.filter(|g| g.name == key) {
        Some(g) => Ok(Some((key, g.config_json()?))),
        None => Ok(Some((key, serde_json::json!({})))),
    }
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)
    };
    write().map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> GenerateArgs {
        GenerateArgs {
            project: Some(PathBuf::from("projects/shop")),
            ..GenerateArgs::default()
        }
    }

    fn delta_config() -> Config {
        Config::parse(
            r#"
[view_generator]
name = "delta_lineage"

[view_generator.config]
name = "FromConfig"
"#,
        )
        .unwrap()
    }

    #[test]
    fn flags_override_config_generator_options() {
        let config = delta_config();
        let (key, value) = generator(None, Some(r#"{"name":"FromFlag"}"#.into()), &config)
            .unwrap()
            .unwrap();
        assert_eq!(key, "delta_lineage");
        assert_eq!(value["name"], "FromFlag");
    }

    #[test]
    fn config_generator_options_apply_by_name() {
        let config = delta_config();
        let (_, value) = generator(None, None, &config).unwrap().unwrap();
        assert_eq!(value["name"], "FromConfig");

        let (key, value) = generator(Some("other".into()), None, &config).unwrap().unwrap();
        assert_eq!(key, "other");
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn bad_generator_json_is_an_error() {
        let err = generator(Some("g".into()), Some("{".into()), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--view-generator-config"));
    }

    #[test]
    fn no_generator_by_default() {
        assert!(generator(None, None, &Config::default()).unwrap().is_none());
    }

    #[test]
    fn flags_build_request() {
        let config = Config {
            tagging: vec!["auto_external".into()],
            ..Config::default()
        };
        let request = request(
            GenerateArgs {
                views: vec!["Landscape".into()],
                modules: vec!["Payments Core".into()],
                enable_cache: true,
                ..args()
            },
            &config,
        )
        .unwrap();
        assert_eq!(request.project_dir(), Path::new("projects/shop"));
        let debug = format!("{request:?}");
        assert!(debug.contains("Landscape"));
        assert!(debug.contains("payments-core"));
        assert!(debug.contains("auto_external"));
        assert!(debug.contains(".archdiag-cache"));
    }

    #[test]
    fn write_output_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/workspace.dsl");
        write_output(&path, "workspace {}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "workspace {}");
    }

    #[test]
    fn write_failure_maps_to_write_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let err = write_output(&blocker.join("workspace.dsl"), "x").unwrap_err();
        assert_eq!(super::super::exit_code(&err), super::super::EXIT_WRITE_FAILED);
    }
}
