use bytes::Bytes;
use tracing::info;

use super::client::{ApiToken, DoorayClient, UploadPart};
use super::error::{Step, UpstreamError};
use super::model::{FileMeta, Member};

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub name: String,
    pub bytes: Bytes,
}

/// Byte transfer between clients and the upstream drive.
pub struct FileTransfer {
    client: DoorayClient,
}

impl FileTransfer {
    pub fn new(client: DoorayClient) -> Self {
        Self { client }
    }

    /// Looks up the file's drive and name, then fetches its raw bytes.
    pub async fn download(
        &self,
        token: &ApiToken,
        file_id: &str,
    ) -> Result<DownloadedFile, UpstreamError> {
        let file_segment = urlencoding::encode(file_id);
        let meta: FileMeta = self
            .client
            .get_json(
                token,
                Step::Meta,
                &format!("/drive/v1/files/{}", file_segment),
                &[("media", "meta".to_string())],
            )
            .await?
            .ok_or_else(|| UpstreamError::malformed(Step::Meta, "empty file metadata"))?;

        let bytes = self
            .client
            .get_bytes(
                token,
                Step::Download,
                &format!(
                    "/drive/v1/drives/{}/files/{}",
                    urlencoding::encode(&meta.drive_id),
                    file_segment
                ),
                &[("media", "raw".to_string())],
            )
            .await?;

        info!(file_id, size = bytes.len(), "Downloaded upstream file");
        Ok(DownloadedFile {
            name: meta.name,
            bytes,
        })
    }

    /// Posts `upload` into `drive_id`, optionally under `parent_id`, and
    /// returns the upstream JSON body.
    pub async fn upload(
        &self,
        token: &ApiToken,
        drive_id: &str,
        parent_id: Option<&str>,
        upload: &UploadPart,
    ) -> Result<serde_json::Value, UpstreamError> {
        let query: Vec<(&str, String)> = parent_id
            .filter(|p| !p.is_empty())
            .map(|p| vec![("parentId", p.to_string())])
            .unwrap_or_default();

        let body = self
            .client
            .post_multipart(
                token,
                Step::Upload,
                &format!("/drive/v1/drives/{}/files", urlencoding::encode(drive_id)),
                &query,
                upload,
            )
            .await?;

        info!(drive_id, file_name = %upload.file_name, size = upload.bytes.len(), "Uploaded file upstream");
        Ok(body)
    }

    /// Display name of an organization member, `None` when the upstream has none.
    pub async fn member_name(
        &self,
        token: &ApiToken,
        member_id: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let member: Option<Member> = self
            .client
            .get_json(
                token,
                Step::Member,
                &format!("/common/v1/members/{}", urlencoding::encode(member_id)),
                &[],
            )
            .await?;
        Ok(member.and_then(|m| m.name))
    }
}
