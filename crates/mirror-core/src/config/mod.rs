//! Configuration resolution
//!
//! Options form a fixed schema ([`OptionKey`]): each has an environment key,
//! a declared type and a built-in default. Raw text is coerced
//! ([`OptionValue::coerce`]) and then checked against the declared type
//! when the typed [`Settings`] snapshot is built.
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::config::{ConfigResolver, OptionKey};
//! use mirror_fs::NormalizedPath;
//!
//! let settings = ConfigResolver::new(NormalizedPath::new("."))
//!     .with_override(OptionKey::InvalidateCache, true)
//!     .resolve_settings()?;
//! println!("State root: {}", settings.state.display());
//! ```

mod resolver;
mod schema;
mod settings;
mod value;

pub use resolver::{ConfigResolver, EnvSource, ProcessEnv, ValueSource};
pub use schema::{OptionKey, OptionKind};
pub use settings::{AzureDevOpsSettings, CiSettings, GithubSettings, Settings};
pub use value::OptionValue;
