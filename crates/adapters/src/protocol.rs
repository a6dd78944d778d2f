//! The small stdin/stdout JSON protocol every adapter executable speaks:
//! input paths in, output paths out.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub scratch_dir: PathBuf,
    pub input_files: Vec<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub output_files: Vec<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendRequest {
    pub user_selection: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub bundles: Vec<Vec<PathBuf>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceiveRequest {
    pub scratch_dir: PathBuf,
    pub output_files: Vec<PathBuf>,
}
