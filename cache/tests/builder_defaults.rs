use fibre_nway::builder::DEFAULT_LINES_PER_SET;
use fibre_nway::{BuildError, Cache, CacheBuilder};
use pretty_assertions::assert_eq;

#[test]
fn test_builder_defaults() {
  let cache: Cache<u8, u8> = CacheBuilder::default().build().unwrap();
  // One set, and so one worker, per CPU.
  assert!(cache.set_count() >= 1);
  assert_eq!(cache.lines_per_set(), DEFAULT_LINES_PER_SET);
  assert!(cache.is_empty());
}

#[test]
fn test_builder_errors_display() {
  assert_eq!(BuildError::ZeroSets.to_string(), "set count cannot be zero");
  assert_eq!(BuildError::ZeroLines.to_string(), "lines per set cannot be zero");
  assert!(BuildError::UnknownPolicy("x".into()).to_string().contains("'x'"));
}

#[test]
fn test_builder_zero_configuration_is_rejected() {
  let err = Cache::<u8, u8>::new(0, "LRU", 4).unwrap_err();
  assert_eq!(err, BuildError::ZeroSets);
  let err = Cache::<u8, u8>::new(4, "LRU", 0).unwrap_err();
  assert_eq!(err, BuildError::ZeroLines);
}
