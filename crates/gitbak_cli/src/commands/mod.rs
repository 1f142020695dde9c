pub mod copy_github;
pub mod meta;
pub mod shared;
pub mod sync;
