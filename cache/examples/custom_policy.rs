use fibre_nway::{CacheBuilder, SetView};

fn main() {
  println!("--- Single-set cache that always evicts the largest key ---");

  let cache = CacheBuilder::<i32, String>::new()
    .sets(1)
    .lines_per_set(3)
    .replacement_policy(|set: &SetView<'_, i32, String>| {
      let victim = *set.keys().max().expect("a full set is never empty");
      println!("[Policy] set {} is full, evicting key {}", set.set_index(), victim);
      victim
    })
    .build()
    .expect("Failed to build cache");

  cache.put(1, "one".to_string());
  cache.put(9, "nine".to_string());
  cache.put(5, "five".to_string());
  println!("Inserted keys 1, 9, 5. The set is full.");

  println!("\nInserting key 2. This evicts key 9.");
  cache.put(2, "two".to_string());
  cache.flush().expect("cache shut down");

  for key in [1, 9, 5, 2] {
    match cache.get(&key) {
      Ok(value) => println!("Key {}: present ('{}')", key, value),
      Err(e) => println!("Key {}: {}", key, e),
    }
  }

  println!("\nFinal metrics: {:#?}", cache.metrics());
}
