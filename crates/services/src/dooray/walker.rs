use std::collections::HashSet;

use drivegate_config::DooraySettings;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use super::client::{ApiToken, DoorayClient};
use super::error::{Step, UpstreamError};
use super::model::{Drive, DriveItem, DriveSummary, File, Folder, Node};

/// Expands every private drive of a token into a full folder tree.
///
/// Calls are issued one after another. Any failing call aborts the walk,
/// so callers only ever see complete trees.
pub struct DriveWalker {
    client: DoorayClient,
    file_page_size: u32,
    follow_file_pages: bool,
    max_file_pages: u32,
}

impl DriveWalker {
    pub fn new(client: DoorayClient, settings: &DooraySettings) -> Self {
        Self {
            client,
            file_page_size: settings.file_page_size.max(1),
            follow_file_pages: settings.follow_file_pages,
            max_file_pages: settings.max_file_pages.max(1),
        }
    }

    pub async fn full_drive(&self, token: &ApiToken) -> Result<Vec<Drive>, UpstreamError> {
        let summaries: Vec<DriveSummary> = self
            .client
            .get_json(
                token,
                Step::Drives,
                "/drive/v1/drives",
                &[("type", "private".to_string())],
            )
            .await?
            .unwrap_or_default();

        let mut drives = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let root = self.expand_root(token, &summary).await?;
            drives.push(Drive::new(summary, root));
        }

        info!(drives = drives.len(), "Drive walk complete");
        Ok(drives)
    }

    async fn expand_root(
        &self,
        token: &ApiToken,
        summary: &DriveSummary,
    ) -> Result<Option<Folder>, UpstreamError> {
        let drive_id = summary.id.as_str();
        let folders = self.list_folders(token, drive_id, None).await?;

        let Some(root) = folders
            .into_iter()
            .filter_map(|item| match item {
                DriveItem::Folder(folder) => Some(folder),
                _ => None,
            })
            .find(|folder| folder.is_root())
        else {
            debug!(drive_id, "Drive has no root folder, skipping");
            return Ok(None);
        };

        // The root never reappears as a descendant.
        let mut visited = HashSet::from([root.id.clone()]);
        let mut children = self.walk(token, drive_id, &root.id, &mut visited).await?;
        children.extend(self.files_in(token, drive_id, &root.id).await?);

        Ok(Some(Folder::root(root.id, summary.root_name(), children)))
    }

    /// Depth-first pre-order expansion of the folders under `parent_id`.
    /// Folders already in `visited` are dropped, which breaks cycles.
    fn walk<'a>(
        &'a self,
        token: &'a ApiToken,
        drive_id: &'a str,
        parent_id: &'a str,
        visited: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, Result<Vec<Node>, UpstreamError>> {
        Box::pin(async move {
            let items = self.list_folders(token, drive_id, Some(parent_id)).await?;

            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                let DriveItem::Folder(folder) = item else {
                    continue;
                };
                if !visited.insert(folder.id.clone()) {
                    debug!(drive_id, folder_id = %folder.id, "Folder already visited");
                    continue;
                }

                let mut children = self.walk(token, drive_id, &folder.id, visited).await?;
                children.extend(self.files_in(token, drive_id, &folder.id).await?);
                nodes.push(Node::Folder(Folder::from_item(folder, children)));
            }
            Ok(nodes)
        })
    }

    async fn list_folders(
        &self,
        token: &ApiToken,
        drive_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<DriveItem>, UpstreamError> {
        let mut query = vec![("type", "folder".to_string())];
        if let Some(parent_id) = parent_id {
            query.push(("parentId", parent_id.to_string()));
        }

        Ok(self
            .client
            .get_json(token, Step::Folders, &files_path(drive_id), &query)
            .await?
            .unwrap_or_default())
    }

    /// Files directly inside `parent_id`. Only `page=0` is read unless
    /// page following is enabled. Following stops at a short page, at a page
    /// that repeats the previous one, or after `max_file_pages` pages.
    async fn files_in(
        &self,
        token: &ApiToken,
        drive_id: &str,
        parent_id: &str,
    ) -> Result<Vec<Node>, UpstreamError> {
        let path = files_path(drive_id);
        let mut files = Vec::new();
        let mut previous_ids: Vec<String> = Vec::new();
        let mut page: u32 = 0;

        loop {
            let items: Vec<DriveItem> = self
                .client
                .get_json(
                    token,
                    Step::Files,
                    &path,
                    &[
                        ("parentId", parent_id.to_string()),
                        ("size", self.file_page_size.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?
                .unwrap_or_default();

            let fetched = items.len();
            let page_files: Vec<File> = items
                .into_iter()
                .filter_map(|item| match item {
                    DriveItem::File(file) => Some(File::from_item(drive_id, file)),
                    _ => None,
                })
                .collect();
            let ids: Vec<String> = page_files.iter().map(|f| f.id.clone()).collect();

            if page > 0 && !ids.is_empty() && ids == previous_ids {
                warn!(drive_id, parent_id, page, "Upstream repeated a file page, stopping");
                break;
            }
            files.extend(page_files.into_iter().map(Node::File));

            if !self.follow_file_pages || fetched < self.file_page_size as usize {
                break;
            }
            if page + 1 >= self.max_file_pages {
                warn!(drive_id, parent_id, pages = page + 1, "File page limit reached");
                break;
            }
            previous_ids = ids;
            page += 1;
        }

        Ok(files)
    }
}

fn files_path(drive_id: &str) -> String {
    format!("/drive/v1/drives/{}/files", urlencoding::encode(drive_id))
}
