//! Frame sources feeding the captcha session in arrival order

pub mod directory;

pub use directory::DirectoryFrameSource;

use crate::error::CaptchaResult;
use image::RgbImage;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in the underlying stream (not the count of frames delivered)
    pub index: u64,
    pub image: RgbImage,
}

/// Sequential supplier of frames; `Ok(None)` marks the end of the stream
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> CaptchaResult<Option<Frame>>;
}

/// Frames held in memory, mostly for tests and replaying captured sequences
#[derive(Debug, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<Frame>,
}

impl MemoryFrameSource {
    pub fn new(images: impl IntoIterator<Item = RgbImage>) -> Self {
        let frames = images
            .into_iter()
            .enumerate()
            .map(|(i, image)| Frame {
                index: i as u64,
                image,
            })
            .collect();
        Self { frames }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> CaptchaResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}
