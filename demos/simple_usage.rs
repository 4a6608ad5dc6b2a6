/// Complete certdex API Demo
///
/// Demonstrates the catalog operations:
/// - Loading a sharded catalog
/// - Filtered, sorted and paginated search
/// - Fuzzy free-text queries and typeahead
/// - Single-record lookup, statistics and cache invalidation
///
/// Run with `RUST_LOG=certdex=debug` to see load and cache events.

use certdex::{Catalog, Config, Filters, MemorySource, RecordId, SortKey, SortSpec};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MANIFEST: &str = r#"{
    "version": "2024-06-01",
    "generated_at": "2024-06-01T00:00:00Z",
    "shards": [
        { "letters": "a", "file": "/data/certifications/a.json", "count": 2, "size_bytes": 512 },
        { "letters": "c", "file": "/data/certifications/c.json", "count": 2, "size_bytes": 512 }
    ]
}"#;

const SHARD_A: &str = r#"[
    { "slug": "aws-certified-cloud-practitioner", "name": "AWS Certified Cloud Practitioner",
      "issuer": "Amazon Web Services (AWS)", "domain": "CS/IT", "level": "Foundational",
      "rating": 4.6, "cost": 100, "skills": ["Cloud Computing"], "rank": 3 },
    { "slug": "agile-project-management", "name": "Agile Project Management",
      "issuer": "APMG International", "domain": "Business", "level": "Associate",
      "rating": 4.1, "exam_fee_usd": 350 }
]"#;

const SHARD_C: &str = r#"[
    { "slug": "certified-kubernetes-administrator", "name": "Certified Kubernetes Administrator",
      "issuer": "Cloud Native Computing Foundation", "domain": "CS/IT", "level": "Professional",
      "rating": 4.8, "cost": 395, "skills": ["Kubernetes", "Containers"], "rank": 1 },
    { "slug": "comptia-security-plus", "name": "CompTIA Security+",
      "issuer": "CompTIA", "domain": "CS/IT", "level": "Associate",
      "rating": 4.5, "cost": 404, "skills": ["Security"] }
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║   certdex Catalog - Complete API Demo         ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Open catalog over an in-memory source
    println!("Opening catalog...");
    let source = MemorySource::new()
        .with_file("certifications/index.map.json", MANIFEST)
        .with_file("certifications/a.json", SHARD_A)
        .with_file("certifications/c.json", SHARD_C);
    let catalog = Catalog::new(Arc::new(source), Config::default())?;
    let manifest = catalog.load_manifest().await?;
    println!("  {} shards, {} records announced\n", manifest.shards.len(), manifest.total_records());

    // Step 2: Filters
    println!("Step 2: FILTER - CS/IT with rating >= 4.6...");
    let filters = Filters::new().domain("CS/IT").min_rating(4.6);
    let result = catalog.search(&filters, None, 1, 10).await?;
    for record in &result.items {
        println!("  {} ({:.1})", record.display_name, record.numeric_rating);
    }
    println!("  {} matched in {} ms\n", result.total_matched, result.took_ms);

    // Step 3: Sort and paginate
    println!("Step 3: SORT - cheapest first, two per page...");
    let page1 = catalog.search(&Filters::default(), Some(SortSpec::asc(SortKey::Cost)), 1, 2).await?;
    let page2 = catalog.search(&Filters::default(), Some(SortSpec::asc(SortKey::Cost)), 2, 2).await?;
    for record in page1.items.iter().chain(page2.items.iter()) {
        println!("  {:>6.2} {}  {}", record.price_amount, record.price_currency, record.display_name);
    }
    println!("  {} pages\n", page1.total_pages);

    // Step 4: Fuzzy search
    println!("Step 4: FUZZY - 'kubernets administrtor'...");
    let result = catalog.search(&Filters::new().query("kubernets administrtor"), None, 1, 10).await?;
    for record in &result.items {
        println!("  {}", record.display_name);
    }
    println!();

    // Step 5: Typeahead
    println!("Step 5: SUGGEST - 'secur'...");
    for suggestion in catalog.suggest("secur", 5).await? {
        println!("  {} (score {:.3})", suggestion.display_name, suggestion.score);
    }
    println!();

    // Step 6: Lookup and statistics
    println!("Step 6: LOOKUP & STATS...");
    if let Some(record) = catalog.get_by_identifier(&RecordId::new("comptia-security-plus")).await? {
        println!("  found {} by {}", record.display_name, record.issuer_name);
    }
    let stats = catalog.stats().await?;
    println!("  {} records, average rating {:.2}", stats.total_records, stats.average_rating);
    for (domain, count) in &stats.by_domain {
        println!("  {:<10} {}", domain, count);
    }
    println!();

    // Step 7: Cache
    println!("Step 7: CACHE...");
    let cache = catalog.cache_stats();
    println!("  hit rate {:.0}% ({} entries)", cache.hit_rate() * 100.0, cache.size);
    catalog.invalidate_cache();
    println!("  invalidated, next query reloads\n");

    println!("Done!");
    Ok(())
}
