//! Example caching responses under keys derived from request URLs.
//!
//! Run with: cargo run --example url_cache

use std::error::Error;
use std::sync::Arc;

use heapcache::builder::CacheBuilder;
use heapcache::policy::priority::PriorityCache;
use heapcache::store::MemoryBackend;
use serde_json::{Value, json};

const URL: &str = "http://www.example.com/sample";

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== URL Cache Example ===\n");

    let backend = Arc::new(MemoryBackend::new());

    // 1. Fill a cache of two entries
    println!("1. Caching responses");
    let mut cache = CacheBuilder::new(2)
        .namespace("responses")
        .try_build::<_, Value>(Arc::clone(&backend))?;

    let page1 = cache.key_from_url(URL, [("page", "1"), ("lang", "en")]);
    let page2 = cache.key_from_url(URL, [("page", "2"), ("lang", "en")]);
    let page3 = cache.key_from_url(URL, [("page", "3"), ("lang", "en")]);

    cache.add_item(page1.as_str(), json!({ "items": [1, 2, 3] }), 10.0)?;
    cache.add_item(page2.as_str(), json!({ "items": [4, 5, 6] }), 5.0)?;

    // Parameter order does not matter
    let same = cache.key_from_url(URL, [("lang", "en"), ("page", "1")]);
    println!("   same key for reordered params? {}", same == page1);
    println!("   page 1: {:?}", cache.get_item(same.as_str())?);

    // 2. A third response evicts the lowest priority (page 2)
    println!("\n2. Evicting");
    let evicted = cache.add_item(page3.as_str(), json!({ "items": [7, 8, 9] }), 7.0)?;
    println!("   evicted {} entry", evicted.len());
    println!("   page 2 cached? {} (lowest priority)", cache.contains_key(page2.as_str()));
    drop(cache);

    // 3. Everything lives in the backend, so a new handle sees it
    println!("\n3. Reopening over the same backend");
    let reopened: PriorityCache<_> = PriorityCache::new(Arc::clone(&backend), "responses", 2)?;
    println!("   entries: {}", reopened.len()?);
    println!("   page 1: {:?}", reopened.get_item(page1.as_str())?);
    println!("   page 3: {:?}", reopened.get_item(page3.as_str())?);
    println!("   backend keys: {}", backend.len());

    Ok(())
}
