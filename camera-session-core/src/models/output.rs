use serde::{Deserialize, Serialize};

use super::media::CaptureMode;

/// Identifier of an output sink attached to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SinkId(pub uuid::Uuid);

impl SinkId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

/// Still-image output.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoSink {
    pub id: SinkId,
}

/// Movie-file output.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFileSink {
    pub id: SinkId,
    /// Recording stops on its own after this many seconds (None = unlimited).
    pub max_duration_secs: Option<f64>,
}

/// The single active output of a capture session.
///
/// Replaced on every mode switch, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSink {
    Photo(PhotoSink),
    MovieFile(MovieFileSink),
}

impl OutputSink {
    /// Build a fresh sink for `mode`.
    pub fn for_mode(mode: CaptureMode, max_movie_duration_secs: Option<f64>) -> Self {
        match mode {
            CaptureMode::Photo => Self::Photo(PhotoSink { id: SinkId::new() }),
            CaptureMode::Video => Self::MovieFile(MovieFileSink {
                id: SinkId::new(),
                max_duration_secs: max_movie_duration_secs,
            }),
        }
    }

    pub fn id(&self) -> SinkId {
        match self {
            Self::Photo(sink) => sink.id,
            Self::MovieFile(sink) => sink.id,
        }
    }

    /// The capture mode this sink serves.
    pub fn mode(&self) -> CaptureMode {
        match self {
            Self::Photo(_) => CaptureMode::Photo,
            Self::MovieFile(_) => CaptureMode::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_matches_mode() {
        let photo = OutputSink::for_mode(CaptureMode::Photo, Some(10.0));
        assert!(matches!(photo, OutputSink::Photo(_)));
        assert_eq!(photo.mode(), CaptureMode::Photo);

        let movie = OutputSink::for_mode(CaptureMode::Video, Some(10.0));
        match &movie {
            OutputSink::MovieFile(sink) => assert_eq!(sink.max_duration_secs, Some(10.0)),
            other => panic!("expected movie sink, got {:?}", other),
        }
        assert_eq!(movie.mode(), CaptureMode::Video);
    }

    #[test]
    fn each_sink_gets_a_fresh_id() {
        let a = OutputSink::for_mode(CaptureMode::Photo, None);
        let b = OutputSink::for_mode(CaptureMode::Photo, None);
        assert_ne!(a.id(), b.id());
    }
}
