use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play(&mut self, path: &Path);
}

/// Used when audio is disabled or no output device exists.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, path: &Path) {
        debug!("audio disabled, skipping {}", path.display());
    }
}

pub struct RodioAudio {
    // dropping the stream silences every sound started on the handle
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioAudio {
    pub fn try_default() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
            }),
            Err(err) => {
                warn!("no audio output: {err}");
                None
            }
        }
    }
}

impl AudioSink for RodioAudio {
    fn play(&mut self, path: &Path) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!("cannot open {}: {err}", path.display());
                return;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(source) => source,
            Err(err) => {
                warn!("cannot decode {}: {err}", path.display());
                return;
            }
        };
        if let Err(err) = self.handle.play_raw(source.convert_samples()) {
            warn!("cannot play {}: {err}", path.display());
        }
    }
}

/// Picks rodio when enabled and a device is present, otherwise [`NullAudio`].
pub fn default_sink(enabled: bool) -> Box<dyn AudioSink> {
    if enabled {
        if let Some(audio) = RodioAudio::try_default() {
            return Box::new(audio);
        }
    }
    Box::new(NullAudio)
}
