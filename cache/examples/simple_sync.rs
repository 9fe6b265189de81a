use fibre_nway::{Cache, CacheError};

fn main() {
  // Four sets of two lines each, least recently used replacement.
  let cache = Cache::new(4, "LRU", 2).expect("Failed to build cache");

  println!("Putting ('key1', 100) into the cache.");
  cache.put("key1".to_string(), 100);

  // `put` returns before the write lands; the `get` is queued behind it.
  match cache.get(&"key1".to_string()) {
    Ok(value) => println!("Found value for key1: {}", value),
    Err(e) => println!("Value for key1 not found: {}", e),
  }

  match cache.get_located(&"key1".to_string()) {
    Ok((set, _)) => println!("key1 lives in set {}", set),
    Err(e) => println!("key1 disappeared: {}", e),
  }

  match cache.get(&"missing".to_string()) {
    Err(CacheError::NotFound) => println!("'missing' is not cached (as expected)."),
    other => println!("Unexpected answer: {:?}", other),
  }

  println!("\nCache metrics: {:#?}", cache.metrics());
}
