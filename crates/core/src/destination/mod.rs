//! Destination path resolution.
//!
//! Decides where a conversion writes its output before any encoder starts:
//! a synthesized, uniquified name next to the source when the caller gave no
//! destination, the caller's path when it is free, or a pending decision when
//! it already exists and overwriting was not pre-authorized.
//!
//! # Example
//!
//! ```ignore
//! use convertbot_core::destination::{DestinationResolver, Resolution};
//!
//! let resolver = DestinationResolver::with_defaults();
//! match resolver.resolve(None, Path::new("/media/clip.mov"), "mp3", false).await? {
//!     Resolution::Ready(path) => println!("writing {}", path.display()),
//!     Resolution::NeedsDecision(existing) => ask_user(existing),
//! }
//! ```

mod config;
mod error;
mod resolver;
mod types;

pub use config::DestinationConfig;
pub use error::DestinationError;
pub use resolver::DestinationResolver;
pub use types::{OverwriteDecision, Resolution};
