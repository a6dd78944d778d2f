//! Configuration ingestion (§6): pointer file, `settings.txt`, the
//! machine/application capability matrix, and the `Applications/`
//! directory — an opaque `ConfigProvider` as far as the protocol is
//! concerned, but `FileConfigProvider` gives it a real, minimal
//! implementation.

mod pointer;
mod provider;
mod settings;

pub use provider::{ConfigProvider, FileConfigProvider, ResolvedConfig, MACHINE_ENV, USER_ENV};
pub use settings::Settings;
