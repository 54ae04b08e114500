//! List rules command implementation.

use proboscis_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<28} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<28} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nPresets:");
    println!("  strict       - PL001-PL004 as errors (default)");
    println!("  recommended  - PL002 and PL003 downgraded to warnings");
    println!("  minimal      - PL001 only (for gradual adoption)");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  proboscis check --rules require-unit-test,require-test-markers");
    println!("  proboscis check --rules PL001,PL004");
}
