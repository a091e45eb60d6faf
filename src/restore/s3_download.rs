// pg-s3-backup/src/restore/s3_download.rs
use tracing::info;

use crate::backup::archive::gzip_decompress;
use crate::errors::Result;
use crate::storage::ObjectStore;

/// Downloads a dump and returns it as SQL text, gunzipping first when `compressed`.
pub async fn download_sql(
    store: &dyn ObjectStore,
    compressed: bool,
    s3_bucket: &str,
    s3_key: &str,
) -> Result<String> {
    info!(target: "download", "getting file from s3");
    let body = store.get_object(s3_bucket, s3_key).await?;
    info!(target: "download", "received file from s3, length: {}", body.len());

    let body = if compressed {
        gzip_decompress(&body)?
    } else {
        body
    };
    Ok(String::from_utf8(body)?)
}
