//! Configuration helpers
//!
//! Environment variable loading with proper error handling and `${VAR}`
//! interpolation for values read from config files.
//!
//! # Example
//!
//! ```rust,ignore
//! use tooling::config::{expand_env_vars, get_env_parse};
//!
//! let api_key = expand_env_vars("${GOOGLE_API_KEY}");
//! let attempts: Option<usize> = get_env_parse("TASKMATE_MAX_ATTEMPTS")?;
//! ```

mod env;

pub use env::{expand_env_vars, get_env, get_env_first, get_env_parse, has_unresolved_placeholder};
