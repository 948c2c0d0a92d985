//! Purpose: SDK surface around the decoding core.
//! Exports: Client, configuration, transport, parameters, auth, upload, and plugin types.
//! Role: Everything that talks to the CMS or to the host application lives here.
//! Invariants: The core never depends on this module.

mod auth;
mod client;
mod config;
mod parameter;
mod plugin;
mod transport;
mod upload;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use auth::{MemoryTokenStore, TokenStore};
pub use client::{CLIENT_OS, Client};
pub use config::{ClientConfig, DEFAULT_API_VERSION, DEVELOPMENT_BASE_URL, PRODUCTION_BASE_URL};
pub use parameter::{ImageFormat, Parameter, query_pairs};
pub use plugin::{Plugin, PluginPipeline};
pub use transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
pub use upload::{
    FormContent, FormPart, UploadFactory, Uploadable, UploadableCheckbox, UploadableFiles,
    UploadableText, form_parts,
};
