//! List rules command implementation.

/// Runs the list-rules command.
pub fn run() {
    println!("Built-in rule shapes:\n");
    println!("{:<22} Description", "Type");
    println!("{}", "-".repeat(78));
    println!(
        "{:<22} {}",
        "layer-isolation", "forbid edges from units under source_prefix to units under target_prefix"
    );
    println!(
        "{:<22} {}",
        "required-dependency",
        "units matching unit_pattern must import one of required_any"
    );
    println!(
        "{:<22} {}",
        "forbidden-dependency",
        "edges from source_pattern units to any of forbidden_any are disallowed"
    );

    println!("\nAlways on:");
    println!("  dependency-cycle     every detected cycle is a blocking violation");
    println!("                       (skip detection with: modgraph check --no-cycles)");

    println!("\nConfigure rules in modgraph.toml; run `modgraph init` for a starter file.");
}
