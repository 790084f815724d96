pub mod bundle;
pub mod cache;
pub mod cli;
pub mod extract;
pub mod handle;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod unity;
pub mod utils;
pub mod version;

pub use rabex;

pub use cache::{Cache, CacheKey};
pub use extract::{BundleExtractor, Extract, ExtractSummary};
pub use paths::{DefaultPaths, Host, Paths};
pub use pipeline::{Invocation, Outcome};
pub use version::VersionResolver;
