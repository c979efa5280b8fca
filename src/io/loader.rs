// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background loading of submitted URLs.
//!
//! A submission is probed off the UI thread. The probe result decides the
//! asset kind (the app adds the asset on `Probed`), then the media reports
//! readiness with its natural size, or fails and the app removes the asset.

use super::media::{LoadedImage, MediaProbe, ProbedMedia, VideoBackend};
use crate::models::asset::AssetKind;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use url::Url;

/// Identifies one submission. Events left over from an earlier load of the
/// same URL carry a different ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

/// Progress of a single submission, in emission order.
#[derive(Debug)]
pub enum LoadEvent {
    /// The URL cannot be shown; nothing was added.
    Rejected { url: String, reason: String },
    /// The URL is loadable as `kind`; the asset should be added now.
    Probed {
        url: String,
        kind: AssetKind,
        image: Option<LoadedImage>,
    },
    /// The media reported its natural size.
    Ready {
        url: String,
        width: u32,
        height: u32,
        duration: Option<f64>,
    },
    /// Unrecoverable load failure after the asset was added.
    Failed { url: String, reason: String },
}

/// Probe a URL and report each stage through `emit`.
pub fn run_load(
    url: &Url,
    probe: &dyn MediaProbe,
    backend: &dyn VideoBackend,
    mut emit: impl FnMut(LoadEvent),
) {
    let key = url.to_string();

    let probed = match probe.probe(url) {
        Ok(probed) => probed,
        Err(e) => {
            log::warn!("Probe failed for {}: {:#}", key, e);
            emit(LoadEvent::Rejected {
                url: key,
                reason: format!("{:#}", e),
            });
            return;
        }
    };

    match probed {
        ProbedMedia::Image(image) => {
            let (width, height) = (image.width, image.height);
            emit(LoadEvent::Probed {
                url: key.clone(),
                kind: AssetKind::Image,
                image: Some(image),
            });
            emit(LoadEvent::Ready {
                url: key,
                width,
                height,
                duration: None,
            });
        }
        ProbedMedia::Video => {
            emit(LoadEvent::Probed {
                url: key.clone(),
                kind: AssetKind::Video,
                image: None,
            });
            match backend.open(url) {
                Ok(meta) => emit(LoadEvent::Ready {
                    url: key,
                    width: meta.width,
                    height: meta.height,
                    duration: meta.duration,
                }),
                Err(e) => {
                    log::error!("Failed to load video {}: {:#}", key, e);
                    emit(LoadEvent::Failed {
                        url: key,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }
    }
}

/// Run `run_load` on a background thread, sending events tagged with
/// `ticket` to `sender`.
pub fn spawn_load(
    ticket: LoadTicket,
    url: Url,
    probe: Arc<dyn MediaProbe>,
    backend: Arc<dyn VideoBackend>,
    sender: Sender<(LoadTicket, LoadEvent)>,
) {
    std::thread::spawn(move || {
        run_load(&url, probe.as_ref(), backend.as_ref(), |event| {
            let _ = sender.send((ticket, event));
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::VideoMeta;
    use anyhow::{bail, Result};
    use std::sync::mpsc::channel;

    struct FakeProbe;

    impl MediaProbe for FakeProbe {
        fn probe(&self, url: &Url) -> Result<ProbedMedia> {
            match url.path() {
                "/ok.png" => Ok(ProbedMedia::Image(LoadedImage {
                    width: 3,
                    height: 2,
                    pixels: vec![0; 24],
                })),
                "/clip.mp4" | "/broken.mp4" => Ok(ProbedMedia::Video),
                _ => bail!("404"),
            }
        }
    }

    struct FakeBackend;

    impl VideoBackend for FakeBackend {
        fn open(&self, url: &Url) -> Result<VideoMeta> {
            if url.path() == "/broken.mp4" {
                bail!("codec not supported");
            }
            Ok(VideoMeta {
                width: 640,
                height: 480,
                duration: Some(12.0),
            })
        }
    }

    fn collect(url: &str) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        run_load(&Url::parse(url).unwrap(), &FakeProbe, &FakeBackend, |e| {
            events.push(e)
        });
        events
    }

    #[test]
    fn test_image_is_probed_then_ready() {
        let events = collect("https://example.com/ok.png");
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            LoadEvent::Probed { kind: AssetKind::Image, image: Some(_), .. }
        ));
        assert!(matches!(
            &events[1],
            LoadEvent::Ready { width: 3, height: 2, duration: None, .. }
        ));
    }

    #[test]
    fn test_video_reports_duration() {
        let events = collect("https://example.com/clip.mp4");
        assert!(matches!(
            &events[0],
            LoadEvent::Probed { kind: AssetKind::Video, image: None, .. }
        ));
        match &events[1] {
            LoadEvent::Ready { width, height, duration, .. } => {
                assert_eq!((*width, *height), (640, 480));
                assert_eq!(*duration, Some(12.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_probe_failure_rejects_without_adding() {
        let events = collect("https://example.com/missing.png");
        assert_eq!(events.len(), 1);
        match &events[0] {
            LoadEvent::Rejected { url, reason } => {
                assert_eq!(url, "https://example.com/missing.png");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_video_open_failure_after_add() {
        let events = collect("https://example.com/broken.mp4");
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], LoadEvent::Probed { .. }));
        assert!(matches!(
            &events[1],
            LoadEvent::Failed { reason, .. } if reason.contains("codec")
        ));
    }

    #[test]
    fn test_spawn_load_delivers_over_channel() {
        let (sender, receiver) = channel();
        spawn_load(
            LoadTicket(7),
            Url::parse("https://example.com/ok.png").unwrap(),
            Arc::new(FakeProbe),
            Arc::new(FakeBackend),
            sender,
        );
        let events: Vec<(LoadTicket, LoadEvent)> = receiver.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|(ticket, _)| *ticket == LoadTicket(7)));
        assert!(matches!(&events[1].1, LoadEvent::Ready { .. }));
    }
}
