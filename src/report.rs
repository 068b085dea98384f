//! Console presentation. Check routines only produce structured
//! [`CheckLog`](crate::types::CheckLog) values; everything colorized lives
//! here so the check logic stays testable without capturing output.

use colored::Colorize;

use crate::types::{CheckLog, DeploymentInfo, LogEntry};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║        WEBAPP SMOKE TEST - Infrastructure Validation          ║".cyan()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════════╝".cyan()
    );
    println!();
}

pub fn context(info: &DeploymentInfo) {
    println!("  Deployment ID: {}", info.deployment_id.cyan());
    println!("  Region: {}", info.region.cyan());
    println!("  Domain: {}", info.domain.cyan());
}

pub fn header(title: &str) {
    println!("\n{}", RULE.blue());
    println!("{}", format!("  {}", title).blue());
    println!("{}", RULE.blue());
}

pub fn print_log(log: &CheckLog) {
    for entry in log.entries() {
        match entry {
            LogEntry::Section(title) => println!("\n{}", format!("▶ {}", title).yellow()),
            LogEntry::Check(result) => println!("  {}", result),
        }
    }
}

pub fn summary(log: &CheckLog) {
    header("TEST SUMMARY");
    println!("\n  {}   {}", "✓ Passed:".green(), log.passed());
    println!("  {}   {}", "✗ Failed:".red(), log.failed());
    println!("  {} {}", "⚠ Warnings:".yellow(), log.warned());
    println!("  ─────────────────");
    println!("  Total:     {}", log.total());
    if log.has_failures() {
        println!("\n{}\n", "✗ Some checks failed. Review output above.".red());
    } else {
        println!("\n{}\n", "✓ All critical checks passed!".green());
    }
}
