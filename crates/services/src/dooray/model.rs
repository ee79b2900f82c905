//! Typed upstream payloads and the drive tree the walker builds from them.
//!
//! Upstream objects carry many more fields than the gateway looks at
//! (`size`, `creator`, `createdAt`, ...). Those are kept in `extra` and
//! written back out unchanged so clients see the upstream shape.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// `{ header: {...}, result: ... }` wrapper around every upstream JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub header: EnvelopeHeader,
    pub result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeHeader {
    pub is_successful: bool,
    #[serde(default)]
    pub result_code: i64,
    #[serde(default)]
    pub result_message: String,
}

/// One entry of `/drive/v1/drives`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveSummary {
    /// Name given to the drive's root folder: `title`, then `name`, then the id.
    pub fn root_name(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// One entry of a `/drive/v1/drives/<id>/files` listing, split on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DriveItem {
    Folder(FolderItem),
    File(FileItem),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "subType", default)]
    pub sub_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderItem {
    pub fn is_root(&self) -> bool {
        self.sub_type.as_deref() == Some("root")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/common/v1/members/<id>` result.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub name: Option<String>,
}

/// `/drive/v1/files/<id>?media=meta` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub drive_id: String,
}

/// A drive with its fully expanded root folder.
#[derive(Debug, Clone, Serialize)]
pub struct Drive {
    #[serde(flatten)]
    pub summary: DriveSummary,
    #[serde(rename = "uniqueKey")]
    pub unique_key: String,
    /// Absent when the upstream reports no root folder for the drive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Folder>,
}

impl Drive {
    pub fn new(summary: DriveSummary, root: Option<Folder>) -> Self {
        Self {
            unique_key: format!("drive-{}", summary.id),
            summary,
            root,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Folder(Folder),
    File(File),
}

impl Node {
    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }
}

/// A folder and its children in upstream order: subfolders first, then files.
#[derive(Debug, Clone)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub sub_type: Option<String>,
    pub extra: Map<String, Value>,
    pub children: Vec<Node>,
}

impl Folder {
    pub fn root(id: String, name: String, children: Vec<Node>) -> Self {
        Self {
            id,
            name,
            sub_type: None,
            extra: Map::new(),
            children,
        }
    }

    pub fn from_item(item: FolderItem, children: Vec<Node>) -> Self {
        let mut extra = item.extra;
        extra.insert("type".to_string(), Value::from("folder"));
        Self {
            id: item.id,
            name: item.name,
            sub_type: item.sub_type,
            extra,
            children,
        }
    }

    pub fn sub_folders(&self) -> impl Iterator<Item = &Folder> {
        self.children.iter().filter_map(Node::as_folder)
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.children.iter().filter_map(Node::as_file)
    }
}

const FOLDER_KEYS: [&str; 5] = ["id", "name", "subType", "subFolders", "files"];

impl Serialize for Folder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sub_folders: Vec<&Folder> = self.sub_folders().collect();
        let files: Vec<&File> = self.files().collect();

        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.extra {
            if !FOLDER_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        if let Some(sub_type) = &self.sub_type {
            map.serialize_entry("subType", sub_type)?;
        }
        map.serialize_entry("subFolders", &sub_folders)?;
        map.serialize_entry("files", &files)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub id: String,
    pub name: String,
    #[serde(rename = "uniqueKey")]
    pub unique_key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl File {
    pub fn from_item(drive_id: &str, item: FileItem) -> Self {
        let mut extra = item.extra;
        extra.remove("uniqueKey");
        extra.insert("type".to_string(), Value::from("file"));
        Self {
            unique_key: format!("drive-{}-file-{}", drive_id, item.id),
            id: item.id,
            name: item.name,
            extra,
        }
    }
}
