// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media probing (images and videos).
//!
//! This module decides what a submitted URL points at and reports the
//! natural pixel dimensions the board needs to size a tile. Images are
//! fetched and decoded so the same pixels can back the tile texture.
//! Video decoding is out of scope: a `VideoBackend` only reports frame
//! size and duration.

use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::time::Duration;
use url::Url;

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "ogv", "ogg", "mov", "m4v", "mkv", "m3u8", "mpd",
];
const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com"];

/// Decoded RGBA8 image.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// What a probe found behind a URL.
#[derive(Debug)]
pub enum ProbedMedia {
    Image(LoadedImage),
    Video,
}

/// Video metadata reported once the player is ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub duration: Option<f64>,
}

/// Classifies a URL and loads image pixels.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, url: &Url) -> Result<ProbedMedia>;
}

/// Opens a video far enough to learn its frame size and duration.
pub trait VideoBackend: Send + Sync {
    fn open(&self, url: &Url) -> Result<VideoMeta>;
}

/// Parse user input as a board URL.
pub fn validate_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty URL");
    }
    let url = Url::parse(input).with_context(|| format!("cannot parse '{}'", input))?;
    match url.scheme() {
        "http" | "https" => {
            if url.host_str().map_or(true, str::is_empty) {
                bail!("missing host in '{}'", input);
            }
        }
        "file" => {}
        other => bail!("unsupported scheme '{}'", other),
    }
    Ok(url)
}

/// Whether the video player can be expected to handle this URL.
pub fn is_playable_video_url(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    let by_extension = path
        .rsplit_once('.')
        .map(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext))
        .unwrap_or(false);

    let by_host = url.host_str().map_or(false, |host| {
        VIDEO_HOSTS
            .iter()
            .any(|known| host == *known || host.ends_with(&format!(".{}", known)))
    });

    by_extension || by_host
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Probe backed by `ureq` for remote URLs and the filesystem for `file://`.
#[derive(Debug, Clone)]
pub struct HttpMediaProbe {
    timeout: Duration,
    max_bytes: u64,
}

impl HttpMediaProbe {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        Self { timeout, max_bytes }
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let reader: Box<dyn Read> = match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow!("not a local path: {}", url))?;
                Box::new(
                    std::fs::File::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?,
                )
            }
            _ => {
                let response = ureq::get(url.as_str())
                    .timeout(self.timeout)
                    .call()
                    .map_err(|e| anyhow!("request failed: {}", e))?;
                response.into_reader()
            }
        };

        let mut bytes = Vec::new();
        reader
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .context("failed to read asset body")?;
        if bytes.len() as u64 > self.max_bytes {
            bail!("asset exceeds {} bytes", self.max_bytes);
        }
        Ok(bytes)
    }
}

impl MediaProbe for HttpMediaProbe {
    fn probe(&self, url: &Url) -> Result<ProbedMedia> {
        if is_playable_video_url(url) {
            log::debug!("Treating {} as video", url);
            return Ok(ProbedMedia::Video);
        }

        let bytes = self.fetch(url)?;
        let image = decode_image(&bytes)
            .with_context(|| format!("{} is not a decodable image", url))?;
        log::info!("Probed image {} ({}x{})", url, image.width, image.height);
        Ok(ProbedMedia::Image(image))
    }
}

/// Reports a fixed frame size and unknown duration.
///
/// Local files are still checked for existence so a broken path is treated
/// as a load failure.
#[derive(Debug, Clone, Copy)]
pub struct FallbackVideoBackend {
    pub width: u32,
    pub height: u32,
}

impl VideoBackend for FallbackVideoBackend {
    fn open(&self, url: &Url) -> Result<VideoMeta> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| anyhow!("not a local path: {}", url))?;
            if !path.exists() {
                bail!("video not found: {}", path.display());
            }
        }
        Ok(VideoMeta {
            width: self.width,
            height: self.height,
            duration: None,
        })
    }
}

/// Reads frame size and duration through OpenCV's video capture.
#[cfg(feature = "video-opencv")]
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvVideoBackend;

#[cfg(feature = "video-opencv")]
impl VideoBackend for OpenCvVideoBackend {
    fn open(&self, url: &Url) -> Result<VideoMeta> {
        use opencv::{prelude::*, videoio};

        let source = match url.scheme() {
            "file" => url
                .to_file_path()
                .map_err(|_| anyhow!("not a local path: {}", url))?
                .to_string_lossy()
                .to_string(),
            _ => url.to_string(),
        };

        let capture = videoio::VideoCapture::from_file(&source, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            bail!("failed to open video {}", source);
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let frames = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let duration = (frames > 0.0 && fps > 0.0).then(|| frames / fps);

        log::info!("Opened video {} ({}x{}, {:?}s)", source, width, height, duration);
        Ok(VideoMeta {
            width,
            height,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("  https://example.com/a.png ").is_ok());
        assert!(validate_url("file:///tmp/a.png").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("example.com/a.png").is_err());
        assert!(validate_url("ftp://example.com/a.png").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_video_detection_by_extension() {
        assert!(is_playable_video_url(&url("https://cdn.example.com/v/clip.MP4")));
        assert!(is_playable_video_url(&url("https://example.com/stream.m3u8?token=1")));
        assert!(!is_playable_video_url(&url("https://example.com/photo.png")));
        assert!(!is_playable_video_url(&url("https://example.com/mp4")));
    }

    #[test]
    fn test_video_detection_by_host() {
        assert!(is_playable_video_url(&url("https://www.youtube.com/watch?v=abc")));
        assert!(is_playable_video_url(&url("https://youtu.be/abc")));
        assert!(is_playable_video_url(&url("https://vimeo.com/12345")));
        assert!(!is_playable_video_url(&url("https://notyoutube.com/watch")));
    }

    #[test]
    fn test_probe_local_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let probe = HttpMediaProbe::new(Duration::from_secs(1), 1 << 20);
        let file_url = Url::from_file_path(&path).unwrap();
        match probe.probe(&file_url).unwrap() {
            ProbedMedia::Image(img) => {
                assert_eq!((img.width, img.height), (4, 2));
                assert_eq!(img.pixels.len(), 4 * 2 * 4);
            }
            ProbedMedia::Video => panic!("expected image"),
        }
    }

    #[test]
    fn test_probe_rejects_garbage_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[7u8; 64]).unwrap();

        let file_url = Url::from_file_path(&path).unwrap();
        assert!(HttpMediaProbe::new(Duration::from_secs(1), 1 << 20)
            .probe(&file_url)
            .is_err());
        let err = HttpMediaProbe::new(Duration::from_secs(1), 16)
            .probe(&file_url)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_probe_video_without_fetching() {
        let probe = HttpMediaProbe::new(Duration::from_secs(1), 16);
        let probed = probe.probe(&url("https://unreachable.invalid/clip.webm")).unwrap();
        assert!(matches!(probed, ProbedMedia::Video));
    }

    #[test]
    fn test_fallback_backend() {
        let backend = FallbackVideoBackend {
            width: 1280,
            height: 720,
        };
        let meta = backend.open(&url("https://example.com/clip.mp4")).unwrap();
        assert_eq!(
            meta,
            VideoMeta {
                width: 1280,
                height: 720,
                duration: None
            }
        );

        let dir = tempfile::tempdir().unwrap();
        let missing = Url::from_file_path(dir.path().join("gone.mp4")).unwrap();
        assert!(backend.open(&missing).is_err());
    }
}
