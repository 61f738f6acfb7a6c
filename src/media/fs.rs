use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{PlayerError, PlayerResult},
    media::{
        decode::decode_image,
        ffmpeg::FfmpegVideo,
        source::{LoadedMedia, MediaLoader, PendingLoad, ThreadedLoad},
    },
    playlist::entry::{MediaKind, PlaylistEntry},
};

/// Loads playlist entries from the filesystem on worker threads.
///
/// Relative urls resolve against `root`. Images decode through `image`; videos are probed and
/// decoded through `ffmpeg` (feature `media-ffmpeg`).
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let url = url.strip_prefix("file://").unwrap_or(url);
        let p = Path::new(url);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

fn load_from_path(path: &Path, url: &str, kind: MediaKind) -> PlayerResult<LoadedMedia> {
    match kind {
        MediaKind::Image => {
            let bytes =
                std::fs::read(path).map_err(|e| PlayerError::resource_load(url, e))?;
            let frame = decode_image(&bytes).map_err(|e| PlayerError::resource_load(url, e))?;
            Ok(LoadedMedia::Image(frame))
        }
        MediaKind::Video => {
            if !path.is_file() {
                return Err(PlayerError::resource_load(url, "file not found"));
            }
            let video = FfmpegVideo::open(path)?;
            Ok(LoadedMedia::Video(Box::new(video)))
        }
    }
}

impl MediaLoader for FsLoader {
    fn request(&self, entry: &PlaylistEntry) -> Box<dyn PendingLoad> {
        let path = self.resolve(&entry.url);
        let url = entry.url.clone();
        let kind = entry.kind;
        tracing::debug!(url = %url, path = %path.display(), "spawning load");
        Box::new(ThreadedLoad::spawn(entry.url.clone(), move || {
            load_from_path(&path, &url, kind)
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/fs.rs"]
mod tests;
