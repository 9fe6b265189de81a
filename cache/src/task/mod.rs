//! Background tasks of the cache: one worker thread per set.

pub(crate) mod worker;
