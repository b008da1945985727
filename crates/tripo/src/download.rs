//! Materializes the mesh of a successful task on local disk.

use std::path::{Path, PathBuf};

use chrono::Local;
use reqwest::StatusCode;
use toon3d_core::naming::model_file_name;

use crate::api::status_error;
use crate::error::TripoError;
use crate::messages::TaskResult;

/// Field path of the mesh URL inside a success payload.
const MODEL_URL_FIELD: &str = "data.result.pbr_model.url";

/// Fetch the mesh referenced by `result` and write it into `dir`.
///
/// The URL is read from `data.result.pbr_model.url`; a payload without it
/// fails with [`TripoError::MalformedResult`] before any request is made.
/// The asset URL is pre-signed, so no credential is sent. Anything other
/// than `200 OK` fails with [`TripoError::Download`] and leaves the
/// filesystem untouched. On success the directory is created if needed
/// and the body is written verbatim to `model_<YYYYMMDD_HHMMSS>.glb`.
pub async fn download_model(
    client: &reqwest::Client,
    result: &TaskResult,
    dir: &Path,
) -> Result<PathBuf, TripoError> {
    let url = result
        .model_url()
        .ok_or(TripoError::MalformedResult(MODEL_URL_FIELD))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TripoError::Download(e.into()))?;

    if response.status() != StatusCode::OK {
        let err = status_error(response).await;
        tracing::error!(url, error = %err, "Model download rejected");
        return Err(TripoError::Download(err));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TripoError::Download(e.into()))?;

    tokio::fs::create_dir_all(dir).await.map_err(|source| TripoError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(model_file_name(&Local::now()));
    tokio::fs::write(&path, &bytes).await.map_err(|source| TripoError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), size = bytes.len(), "Model downloaded");
    Ok(path)
}
