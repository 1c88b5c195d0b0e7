//! Reading and writing collector files under a data directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ghostlens_core::{Channel, Diagnostics};
use ghostlens_engine::{EventStore, Snapshot, Whitelist};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::convert::record_engagement;
use crate::error::IngestError;
use crate::types::{EngagementFiles, FollowerFile};

/// Subdirectory holding dated follower snapshots.
const FOLLOWERS_SUBDIR: &str = "followers";

/// A collector data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{target}_followers.json` if present, otherwise the last
    /// `followers/{target}_followers_*.json` by file name.
    #[must_use]
    pub fn followers_path(&self, target: &str) -> Option<PathBuf> {
        let direct = self.root.join(format!("{target}_followers.json"));
        if direct.is_file() {
            return Some(direct);
        }

        let prefix = format!("{target}_followers_");
        let entries = fs::read_dir(self.root.join(FOLLOWERS_SUBDIR)).ok()?;
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            })
            .max()
    }

    /// Path of the engagement file for one channel.
    #[must_use]
    pub fn engagement_path(&self, target: &str, channel: Channel) -> PathBuf {
        let suffix = match channel {
            Channel::Post => "post_engagement",
            Channel::Story => "story_engagement",
            Channel::Reel => "reel_engagement",
            Channel::OnlineActivity => "online_activity",
        };
        self.root.join(format!("{target}_{suffix}.json"))
    }

    /// # Errors
    ///
    /// Returns [`IngestError::NoFollowerData`] when no follower file exists,
    /// or a read or parse error for the file that does.
    pub fn load_followers(&self, target: &str) -> Result<FollowerFile, IngestError> {
        let path = self
            .followers_path(target)
            .ok_or_else(|| IngestError::NoFollowerData {
                target: target.to_string(),
                data_dir: self.root.clone(),
            })?;
        tracing::info!(path = %path.display(), "loading follower data");
        read_json(&path)
    }

    /// Load every engagement file. A missing file is recorded in
    /// `diagnostics` and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load_engagement(
        &self,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<EngagementFiles, IngestError> {
        Ok(EngagementFiles {
            posts: self.read_optional(target, Channel::Post, diagnostics)?,
            stories: self.read_optional(target, Channel::Story, diagnostics)?,
            reels: self.read_optional(target, Channel::Reel, diagnostics)?,
            online_activity: self.read_optional(target, Channel::OnlineActivity, diagnostics)?,
        })
    }

    fn read_optional<T: DeserializeOwned>(
        &self,
        target: &str,
        channel: Channel,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<T>, IngestError> {
        let path = self.engagement_path(target, channel);
        if !path.is_file() {
            diagnostics.incomplete(
                path.display().to_string(),
                format!("no {channel} engagement file; treated as empty"),
            );
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    /// Assemble a [`Snapshot`] for `target` from whatever files exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_snapshot(
        &self,
        target: &str,
        whitelist: Whitelist,
    ) -> Result<Snapshot, IngestError> {
        let mut diagnostics = Diagnostics::new();

        let profiles = match self.load_followers(target) {
            Ok(file) => file.into_followers(),
            Err(IngestError::NoFollowerData { .. }) => {
                diagnostics.incomplete(target, "no follower file; using engagement data only");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let files = self.load_engagement(target, &mut diagnostics)?;
        let mut events = EventStore::new();
        record_engagement(&files, &mut events, &mut diagnostics);

        tracing::info!(
            target_account = target,
            profiles = profiles.len(),
            events = events.len(),
            "snapshot loaded"
        );

        Ok(Snapshot {
            profiles,
            events,
            whitelist,
            observed_at: None,
            diagnostics,
        })
    }

    /// Write each non-empty engagement list, returning the paths written.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be serialized or written.
    pub fn write_engagement(
        &self,
        target: &str,
        files: &EngagementFiles,
    ) -> Result<Vec<PathBuf>, IngestError> {
        let mut written = Vec::new();
        self.write_list(target, Channel::Post, &files.posts, &mut written)?;
        self.write_list(target, Channel::Story, &files.stories, &mut written)?;
        self.write_list(target, Channel::Reel, &files.reels, &mut written)?;
        self.write_list(
            target,
            Channel::OnlineActivity,
            &files.online_activity,
            &mut written,
        )?;
        Ok(written)
    }

    fn write_list<T: Serialize>(
        &self,
        target: &str,
        channel: Channel,
        list: &[T],
        written: &mut Vec<PathBuf>,
    ) -> Result<(), IngestError> {
        if list.is_empty() {
            return Ok(());
        }
        let path = self.engagement_path(target, channel);
        write_json_atomic(&path, list)?;
        tracing::info!(path = %path.display(), records = list.len(), "engagement file written");
        written.push(path);
        Ok(())
    }
}

/// Read and parse a whitelist file.
///
/// # Errors
///
/// Returns [`IngestError::Read`] if the file cannot be read.
pub fn load_whitelist(path: &Path) -> Result<Whitelist, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let whitelist = Whitelist::parse(&text);
    tracing::debug!(path = %path.display(), entries = whitelist.len(), "whitelist loaded");
    Ok(whitelist)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| IngestError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` as pretty JSON to a temp file beside `path`, then rename
/// it into place. Readers never see a partial file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the value cannot be
/// serialized, or the file cannot be written or renamed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IngestError> {
    StagedJson::write(path, value)?.commit()
}

/// A fully written and synced temp file waiting to replace its target.
/// Dropping it without [`StagedJson::commit`] removes the temp file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedJson {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedJson {
    /// Serialize `value` into a temp file in the directory of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the value cannot
    /// be serialized, or the temp file cannot be written.
    pub fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Self, IngestError> {
        let write_err = |source| IngestError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut tmp, value).map_err(|source| IngestError::Serialize {
            context: path.display().to_string(),
            source,
        })?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the target.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Write`] if the rename fails.
    pub fn commit(self) -> Result<(), IngestError> {
        let Self { tmp, path } = self;
        tmp.persist(&path).map_err(|e| IngestError::Write {
            path,
            source: e.error,
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
