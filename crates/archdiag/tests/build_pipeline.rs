//! Integration test: full builds of on-disk projects.

use std::fs;
use std::path::Path;

use archdiag::plugins::PluginRegistry;
use archdiag::{build, BuildError, BuildRequest, Selection};
use serde_json::json;
use tempfile::TempDir;

const MANIFEST: &str = r#"
name = "shop"
workspace_name = "Shop Platform"
description = "Online retail"
"#;

const CORE_MODEL: &str = r#"
[[people]]
name = "Customer"
description = "Buys things"

[[systems]]
name = "Shop"
description = "Online shop"

[[systems.containers]]
name = "Web"
technology = "React"

[[systems.containers]]
name = "Kafka"
technology = "Kafka"

[[systems]]
name = "Payment Gateway"
description = "Card processing"

[[systems]]
name = "Warehouse"
description = "Stock keeping"
"#;

const LINKS_MODEL: &str = r#"
[[relationships]]
from = "person:Customer"
to = "Shop/Web"
description = "Browses"
technology = "HTTPS"

[[relationships]]
from = "Shop/Web"
to = "Shop/Kafka"
description = "Publishes orders"

[[relationships]]
from = "Shop/Kafka"
to = "Payment Gateway"
description = "Requests payment"
"#;

const VIEWS: &str = r#"
[[views]]
key = "Landscape"
name = "Shop landscape"
view_type = "SystemLandscape"
tags = ["overview"]
includes = ["person:Customer", "Shop", "Payment Gateway"]

[[views]]
key = "ShopContainers"
view_type = "Container"
subject = "Shop"
tags = ["detail"]
includes = ["Shop/Web", "Shop/Kafka"]
"#;

const OVERLAY: &str = r#"
[[replace_container]]
system = "Shop"
old = "Kafka"
new = "Redis Queue"
technology = "Redis Streams"
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
    fs::write(path, content).expect("write file");
}

fn shop_project(root: &Path) -> std::path::PathBuf {
    let dir = root.join("shop");
    write(&dir, "project.toml", MANIFEST);
    write(&dir, "models/10-core.toml", CORE_MODEL);
    write(&dir, "models/00-links.toml", LINKS_MODEL);
    write(&dir, "views/main.toml", VIEWS);
    dir
}

#[test]
fn builds_every_view_into_structurizr() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    let registry = PluginRegistry::with_builtins();

    let out = build(&BuildRequest::new(&dir), &registry).expect("build should succeed");

    assert_eq!(out.views, ["Landscape", "ShopContainers"]);
    assert_eq!(out.exporter, "structurizr");
    assert!(!out.from_cache);
    assert!(out.text.starts_with("workspace {"));
    assert!(out.text.contains("// Shop Platform"));
    assert!(out.text.contains(r#"// View: key="Landscape" name="Shop landscape""#));
    assert!(out.text.contains(r#"// View: key="ShopContainers""#));
    assert!(out.text.contains("Publishes orders"));
}

#[test]
fn overlays_run_before_views() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    write(&dir, "overlays/redis.toml", OVERLAY);
    let registry = PluginRegistry::with_builtins();

    let out = build(
        &BuildRequest::new(&dir).selection(Selection::all().name("ShopContainers")),
        &registry,
    )
    .expect("build should succeed");

    assert!(out.text.contains(r#"container "Redis Queue""#));
    assert!(!out.text.contains(r#"container "Kafka""#));
    assert!(out.text.contains("Requests payment"));
}

#[test]
fn tagging_and_json_exporter() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    let registry = PluginRegistry::with_builtins();

    let out = build(
        &BuildRequest::new(&dir)
            .exporter("json")
            .tagging("auto_external")
            .tagging("auto_broker_queue")
            .tagging("no_such_strategy"),
        &registry,
    )
    .expect("build should succeed");

    let graph: serde_json::Value = serde_json::from_str(&out.text).expect("valid JSON");
    assert_eq!(graph["name"], "Shop Platform");
    let gateway = graph["systems"]
        .as_array()
        .expect("systems array")
        .iter()
        .find(|s| s["name"] == "Payment Gateway")
        .expect("gateway present");
    assert_eq!(gateway["tags"], json!(["external"]));
    assert_eq!(graph["systems"][0]["containers"][1]["tags"], json!(["message-broker"]));
}

#[test]
fn prune_drops_unreferenced_systems() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    let registry = PluginRegistry::with_builtins();

    let pruned = build(
        &BuildRequest::new(&dir)
            .selection(Selection::all().tag("overview"))
            .prune_to_views(true),
        &registry,
    )
    .expect("build should succeed");
    assert_eq!(pruned.views, ["Landscape"]);
    assert!(!pruned.text.contains("Warehouse"));
    assert!(pruned.text.contains("Payment Gateway"));

    let full = build(
        &BuildRequest::new(&dir).selection(Selection::all().tag("overview")),
        &registry,
    )
    .expect("build should succeed");
    assert!(full.text.contains("Warehouse"));
}

#[test]
fn view_generator_adds_views_and_bad_config_is_skipped() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    write(&dir, "overlays/redis.toml", OVERLAY);
    let registry = PluginRegistry::with_builtins();

    let out = build(
        &BuildRequest::new(&dir).view_generator(
            "delta_lineage",
            json!({
                "name": "QueueDelta",
                "before": { "system": "Shop", "container": "Kafka" },
                "after": { "system": "Shop", "container": "Redis Queue" },
            }),
        ),
        &registry,
    )
    .expect("build should succeed");
    assert_eq!(
        out.views,
        ["Landscape", "ShopContainers", "QueueDelta", "QueueDeltaAfter"]
    );

    let out = build(
        &BuildRequest::new(&dir).view_generator("delta_lineage", json!({ "title": "no name" })),
        &registry,
    )
    .expect("generator failure is not fatal");
    assert_eq!(out.views, ["Landscape", "ShopContainers"]);
}

#[test]
fn cache_serves_identical_requests() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    let cache = tmp.path().join("cache");
    let registry = PluginRegistry::with_builtins();
    let request = BuildRequest::new(&dir).cache_dir(&cache);

    let first = build(&request, &registry).expect("first build");
    assert!(!first.from_cache);
    let entries = fs::read_dir(&cache).expect("cache dir").count();
    assert_eq!(entries, 1);

    let second = build(&request, &registry).expect("second build");
    assert!(second.from_cache);
    assert_eq!(first.text, second.text);

    let json = build(&request.clone().exporter("json"), &registry).expect("json build");
    assert!(!json.from_cache);
}

#[test]
fn extends_layers_a_derived_project() {
    let tmp = TempDir::new().expect("tempdir");
    shop_project(tmp.path());
    let next = tmp.path().join("shop-next");
    write(&next, "project.toml", "extends = \"shop\"\nworkspace_name = \"Shop Next\"\n");
    write(
        &next,
        "models/loyalty.toml",
        r#"
[[systems]]
name = "Loyalty"
description = "Points"

[[relationships]]
from = "Shop"
to = "Loyalty"
description = "Awards points"
"#,
    );
    write(
        &next,
        "views/landscape.toml",
        r#"
[[views]]
key = "Landscape"
view_type = "SystemLandscape"
extends = "Landscape"
includes = ["Loyalty"]
"#,
    );
    let registry = PluginRegistry::with_builtins();

    let out = build(&BuildRequest::new(&next), &registry).expect("build should succeed");
    assert!(out.text.contains("// Shop Next"));
    assert_eq!(out.views, ["Landscape", "ShopContainers"]);
    assert!(out.text.contains("Awards points"));
    assert!(out.text.contains(r#"// View: key="Landscape" name="Landscape""#));
}

#[test]
fn error_categories() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = shop_project(tmp.path());
    let registry = PluginRegistry::with_builtins();

    let err = build(&BuildRequest::new(tmp.path().join("ghost")), &registry)
        .expect_err("missing project");
    assert!(err.is_not_found());

    let err = build(
        &BuildRequest::new(&dir).selection(Selection::all().name("Nope")),
        &registry,
    )
    .expect_err("nothing selected");
    assert!(matches!(err, BuildError::NoViewsSelected));

    write(
        &dir,
        "views/broken.toml",
        r#"
[[views]]
key = "Broken"
view_type = "Container"
"#,
    );
    let err = build(&BuildRequest::new(&dir), &registry).expect_err("subject missing");
    assert!(matches!(err, BuildError::View(_)));
    assert!(!err.is_not_found());
}
