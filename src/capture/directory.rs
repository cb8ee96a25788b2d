// Replays a directory of captured frames (PNG/JPEG) in file-name order
use super::{Frame, FrameSource};
use crate::error::{CaptchaError, CaptchaResult};
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug)]
pub struct DirectoryFrameSource {
    files: Vec<PathBuf>,
    stride: usize,
    next: usize,
}

impl DirectoryFrameSource {
    /// Every `stride`-th image file of `dir`, sorted by name. A stride of 0 is treated as 1.
    pub fn open(dir: impl AsRef<Path>, stride: usize) -> CaptchaResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CaptchaError::FrameSource {
                description: format!("frame directory {:?} does not exist", dir),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_frame && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        log::info!("🎞️ {} frame file(s) found in {:?} (stride {})", files.len(), dir, stride.max(1));
        Ok(Self {
            files,
            stride: stride.max(1),
            next: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for DirectoryFrameSource {
    fn next_frame(&mut self) -> CaptchaResult<Option<Frame>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        let index = self.next as u64;
        // Advance first so an unreadable file is skipped on the next call
        self.next += self.stride;

        let image = image::open(path).map_err(|e| CaptchaError::FrameSource {
            description: format!("{}: {e}", path.display()),
        })?;
        log::debug!("📸 Frame #{index} loaded from {:?}", path.file_name().unwrap_or_default());
        Ok(Some(Frame {
            index,
            image: image.to_rgb8(),
        }))
    }
}
