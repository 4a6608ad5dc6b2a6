pub mod cancel;
pub mod source;
pub mod manifest;
pub mod record;
pub mod shard_loader;
