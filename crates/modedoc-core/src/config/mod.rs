//! Configuration
//!
//! Settings are loaded from `modedoc.toml` next to the document sources:
//!
//! ```toml
//! mode = "r"
//!
//! [registry]
//! builtin = true
//! check_consistency = true
//!
//! [vars.python]
//! pkg = "pandas"
//! mean = [{ type = "inlineCode", value = "np.mean" }]
//!
//! [vars.r]
//! pkg = "dplyr"
//! mean = "`mean`"
//! ```
//!
//! The host reads settings once and hands the resulting values to every
//! transform run; nothing here is consulted during a run.

mod settings;


pub use settings::{RegistrySettings, Settings, CONFIG_FILE_NAME, MODE_ENV_VAR};
