//! List plugins command implementation.

use archdiag::plugins::PluginRegistry;

/// Runs the list-plugins command.
pub fn run() {
    let registry = PluginRegistry::with_builtins();

    println!("Available plugins:\n");
    println!("{:<16} {:<20} Description", "Kind", "Key");
    println!("{}", "-".repeat(80));

    for (kind, key, description) in registry.describe() {
        println!("{kind:<16} {key:<20} {description}");
    }

    println!("\nUse them with, e.g.:");
    println!("  archdiag generate --exporter json");
    println!("  archdiag generate --tagging auto_external,auto_broker_queue");
    println!("  archdiag generate --view-generator delta_lineage --view-generator-config '{{\"name\":\"Delta\"}}'");
}
