//! Init command implementation.

use std::path::Path;

use anyhow::{bail, Context, Result};

const DEFAULT_CONFIG: &str = r#"# archdiag configuration

# Directory holding one subdirectory per project
projects_dir = "projects"

# Project built when --project is not given
default_project = "sample"

# Output file ("-" writes to stdout)
output = "workspace.dsl"

# Exporter: structurizr | json
exporter = "structurizr"

# Tagging strategies applied after overlays
tagging = ["auto_external"]

# Drop elements the selected views do not reference
prune_to_views = false

[cache]
enabled = false
dir = ".archdiag-cache"

# [view_generator]
# name = "delta_lineage"
#
# [view_generator.config]
# name = "QueueMigration"
# before = { system = "Sample", container = "Kafka" }
# after = { system = "Sample", container = "Redis Queue" }
"#;

const SAMPLE_MANIFEST: &str = r#"name = "sample"
workspace_name = "Sample"
description = "Starter project generated by archdiag init"
"#;

const SAMPLE_MODEL: &str = r#"[[people]]
name = "Customer"
description = "Uses the product"

[[systems]]
name = "Sample"
description = "The system being described"

[[systems.containers]]
name = "Web"
description = "User interface"
technology = "TypeScript"

[[systems.containers]]
name = "API"
description = "Business logic"
technology = "Rust"

[[systems]]
name = "Payment Provider"
description = "External card processing"

[[relationships]]
from = "person:Customer"
to = "Sample/Web"
description = "Uses"
technology = "HTTPS"

[[relationships]]
from = "Sample/Web"
to = "Sample/API"
description = "Calls"
technology = "JSON/HTTPS"

[[relationships]]
from = "Sample/API"
to = "Payment Provider"
description = "Charges cards"
"#;

const SAMPLE_VIEWS: &str = r#"[[views]]
key = "Landscape"
name = "System landscape"
view_type = "SystemLandscape"
tags = ["overview"]
smart = true

[[views]]
key = "SampleContext"
view_type = "SystemContext"
subject = "Sample"
tags = ["overview"]
includes = ["person:Customer", "Payment Provider"]

[[views]]
key = "SampleContainers"
view_type = "Container"
subject = "Sample"
includes = ["person:Customer", "Sample/Web", "Sample/API", "Payment Provider"]
"#;

/// Files written by init, relative to the target directory.
const FILES: &[(&str, &str)] = &[
    ("archdiag.toml", DEFAULT_CONFIG),
    ("projects/sample/project.toml", SAMPLE_MANIFEST),
    ("projects/sample/models/sample.toml", SAMPLE_MODEL),
    ("projects/sample/views/sample.toml", SAMPLE_VIEWS),
];

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(FILES[0].0);
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    for (rel, content) in FILES {
        let path = dir.join(rel);
        if path.exists() && !force {
            tracing::info!("Keeping existing {}", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Created {rel}");
    }

    println!("\nNext steps:");
    println!("  1. Describe your system in projects/sample/models/");
    println!("  2. Run: archdiag generate");
    println!("  3. Open workspace.dsl in Structurizr");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdiag::plugins::PluginRegistry;
    use archdiag::{build, BuildRequest, Config};
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.default_project.as_deref(), Some("sample"));
        assert_eq!(config.tagging, ["auto_external"]);
        assert!(config.view_generator.is_none());
    }

    #[test]
    fn sample_project_builds() {
        let tmp = TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();

        let registry = PluginRegistry::with_builtins();
        let request = BuildRequest::new(tmp.path().join("projects/sample")).tagging("auto_external");
        let out = build(&request, &registry).unwrap();
        assert_eq!(out.views, ["Landscape", "SampleContext", "SampleContainers"]);
        assert!(out.text.contains("Charges cards"));
        assert!(out.text.contains(r#""external""#));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();
        let err = run(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        run(tmp.path(), true).unwrap();
    }
}
