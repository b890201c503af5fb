//! Vertical card display for seeds and validation results.

use lexitalia_core::ValidationResult;
use lexitalia_store::SeedRecord;

const PREVIEW_CHARS: usize = 96;

// ── Public API ──

/// Print one seed as a card: identity, then provisions, then cross-references.
pub fn print_seed_card(seed: &SeedRecord, limit: usize) {
    println!("=== {} ===", seed.id);
    if !seed.title.is_empty() {
        println!("{}", seed.title);
    }
    println!();

    println!("Identity");
    field("type", seed.instrument.code());
    field("status", seed.status.as_str());
    if let Some(short) = &seed.short_name {
        field("short_name", short);
    }
    if let Some(date) = &seed.issued_date {
        field("issued_date", date);
    }
    field("url", &seed.url);
    println!();

    println!("Provisions ({})", seed.provisions.len());
    for p in seed.provisions.iter().take(limit) {
        let heading = p.title.as_deref().map(|t| format!(" ({t})")).unwrap_or_default();
        println!("  art. {}{}", p.section, heading);
        println!("      {}", preview(&p.content));
    }
    if seed.provisions.len() > limit {
        println!("  ... {} more", seed.provisions.len() - limit);
    }
    println!();

    if !seed.cross_references.is_empty() {
        println!("Cross-references ({})", seed.cross_references.len());
        for x in &seed.cross_references {
            let r = &x.reference;
            let pinpoint = r.article.as_deref().map(|a| format!(" art. {a}")).unwrap_or_default();
            println!(
                "  {:<12} {}{} [{:?}]{}",
                x.provision_ref,
                r.foreign_id(),
                pinpoint,
                r.relation,
                if r.primary { " primary" } else { "" }
            );
        }
        println!();
    }
}

pub fn print_validation(text: &str, result: &ValidationResult) {
    println!("=== {text} ===");
    if let Some(err) = &result.error {
        field("valid", "no");
        field("error", err);
        return;
    }
    field("valid", "yes");
    if let Some(id) = &result.act_id {
        field("act", id);
    }
    if let Some(title) = &result.act_title {
        field("title", title);
    }
    if let Some(kind) = result.matched_by {
        field("matched_by", &format!("{kind:?}"));
    }
    if let Some(found) = result.provision_found {
        field("provision", if found { "found" } else { "missing" });
    }
    for w in &result.warnings {
        field("warning", w);
    }
}

// ── Helpers ──

fn field(name: &str, value: &str) {
    println!("  {:<26} {}", name, value);
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut.trim_end())
}
