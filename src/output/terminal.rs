// Colored terminal output for profiles, reports, gating decisions, and
// draft checks.
//
// This module handles all terminal-specific formatting: colors, tables,
// summary lines. The main.rs command handlers delegate here.

use colored::Colorize;

use crate::db::models::{CommunityProfile, ForbiddenPatternEntry, PatternOrigin};
use crate::gating::GenerationConstraint;
use crate::patterns::{PenaltyPhrase, Severity};
use crate::scoring::PostScore;

/// Display the ranked community comparison table.
pub fn display_profile_list(profiles: &[CommunityProfile]) {
    if profiles.is_empty() {
        println!("No community profiles yet. Run `litmus analyze --input posts.json` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Community Report ({} communities) ===", profiles.len()).bold()
    );
    println!();

    println!(
        "  {:>4}  {:<24} {:>5}  {:<20}  {:>6}  {:>8}",
        "Rank".dimmed(),
        "Community".dimmed(),
        "ISC".dimmed(),
        "Tier".dimmed(),
        "Posts".dimmed(),
        "Patterns".dimmed(),
    );
    println!("  {}", "-".repeat(76).dimmed());

    for (i, profile) in profiles.iter().enumerate() {
        println!(
            "  {:>4}. {:<24} {:>5.1}  {:<20}  {:>6}  {:>8}",
            i + 1,
            profile.community_id,
            profile.sensitivity.score,
            colorize_tier(profile.sensitivity.tier.as_str()),
            profile.sample_size,
            profile.forbidden_patterns.detected.len(),
        );
    }
    println!();
}

/// Display a single community's full profile.
pub fn display_profile(profile: &CommunityProfile) {
    println!(
        "\n{}",
        format!("=== Profile: {} ===", profile.community_id).bold()
    );

    let s = &profile.sensitivity;
    println!(
        "  Sensitivity: {:.1}/10  ({})",
        s.score,
        colorize_tier(s.tier.as_str())
    );
    println!(
        "    Jargon: {:.2}  Links: {:.2}  Vulnerability: {:.2}  Depth: {:.2}",
        s.jargon_sensitivity, s.link_sensitivity, s.vulnerability_preference, s.engagement_depth
    );

    println!("  Dominant tone: {}", profile.dominant_tone);
    if let Some(formality) = profile.formality_level {
        println!("  Formality level: {formality:.1}");
    }
    if let Some(len) = profile.avg_sentence_length {
        println!("  Avg sentence length: {len:.1} words");
    }
    println!(
        "  Sample: {} posts, analyzed {}",
        profile.sample_size, profile.analyzed_at
    );

    if !profile.archetype_distribution.is_empty() {
        println!("\n  Archetypes:");
        for (label, count) in &profile.archetype_distribution {
            println!("    {:<24} {count}", label);
        }
    }

    if !profile.style.top_terms.is_empty() {
        let preview: Vec<&str> = profile
            .style
            .top_terms
            .iter()
            .take(12)
            .map(String::as_str)
            .collect();
        println!("\n  Vocabulary: {}", preview.join(", ").dimmed());
    }
    if !profile.style.opening_patterns.is_empty() {
        println!("  Openings:");
        for opening in profile.style.opening_patterns.iter().take(5) {
            println!("    {:<30} x{}", opening.pattern, opening.count);
        }
    }

    if !profile.top_success_hooks.is_empty() {
        println!("\n  Success hooks:");
        for (i, hook) in profile.top_success_hooks.iter().enumerate() {
            let preview = super::truncate_chars(hook, 100);
            println!("    {}. {}", i + 1, preview.dimmed());
        }
    }

    if !profile.forbidden_patterns.detected.is_empty() {
        println!("\n  Forbidden patterns:");
        for pattern in &profile.forbidden_patterns.detected {
            println!(
                "    [{}] {} — {} posts ({})",
                pattern.category.as_str(),
                pattern.description,
                pattern.match_count,
                colorize_severity(pattern.severity),
            );
        }
    }
    println!();
}

/// Display the blacklist view.
pub fn display_blacklist(entries: &[ForbiddenPatternEntry]) {
    if entries.is_empty() {
        println!("Blacklist is empty.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Forbidden Patterns ({} entries) ===", entries.len()).bold()
    );
    println!();

    for entry in entries {
        let scope = entry.community_id.as_deref().unwrap_or("global");
        let origin = match entry.origin {
            PatternOrigin::System => "system".dimmed(),
            PatternOrigin::User => "user".cyan(),
        };
        println!(
            "  #{:<5} {:<16} [{}] {} ({})",
            entry.id,
            scope,
            entry.category.as_str(),
            entry.pattern_text,
            origin,
        );
    }
    println!();
}

/// Display a gating decision.
pub fn display_constraint(constraint: &GenerationConstraint) {
    let verdict = if constraint.allowed {
        "ALLOWED".green().bold()
    } else {
        "DOWNGRADED".yellow().bold()
    };
    println!("\n  Request: {verdict}");
    println!("  Archetype: {}", constraint.archetype);
    if let Some(forced) = constraint.forced_archetype {
        println!("  Forced to: {}", forced.to_string().yellow());
    }
    if let Some(reason) = &constraint.reason {
        println!("  Reason: {reason}");
    }
    match constraint.max_links {
        Some(n) => println!("  Max links: {n}"),
        None => println!("  Max links: community norms"),
    }

    println!("\n  Constraints for the generator:");
    for line in &constraint.constraints {
        println!("    - {line}");
    }
    println!();
}

/// Display a draft review: flagged phrases plus the factor breakdown.
pub fn display_check(phrases: &[PenaltyPhrase], score: &PostScore) {
    if phrases.is_empty() {
        println!("\n  {}", "No forbidden phrases found.".green());
    } else {
        println!(
            "\n  {} flagged phrase(s):",
            phrases.len().to_string().yellow().bold()
        );
        for p in phrases {
            println!(
                "    \"{}\" [{}] ({})",
                p.phrase,
                p.category.as_str(),
                colorize_severity(p.severity),
            );
        }
    }

    println!("\n  Score breakdown:");
    println!("    Vulnerability: {:>5.1}", score.vulnerability_weight);
    println!("    Rhythm:        {:>5.1}", score.rhythm_adherence);
    println!("    Formality:     {:>5.1}", score.formality_match);
    println!("    Jargon:        {:>5.1} (penalty)", score.jargon_penalty);
    println!(
        "    Links:         {:>5.1} (penalty)",
        score.link_density_penalty
    );
    println!("    {} {:>5.1}/10", "Total:".bold(), score.total_score);
    println!();
}

/// Colorize a sensitivity tier string.
fn colorize_tier(tier: &str) -> colored::ColoredString {
    match tier {
        "Very High Sensitivity" => tier.red().bold(),
        "High Sensitivity" => tier.bright_red(),
        "Moderate Sensitivity" => tier.yellow(),
        "Low Sensitivity" => tier.green(),
        _ => tier.dimmed(),
    }
}

fn colorize_severity(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::High => "high".red(),
        Severity::Medium => "medium".yellow(),
        Severity::Low => "low".green(),
    }
}
