use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// The one local audio stream handle for a session. Shared read-only by
/// every link; owned by the MediaSource, released by the session.
pub type LocalAudio = Arc<dyn TrackLocal + Send + Sync>;

/// A remote participant's audio track, surfaced to the embedding UI.
pub type RemoteAudio = Arc<TrackRemote>;

/// Supplier of the local audio stream. Capture devices themselves are the
/// embedder's concern; the session only needs a track to attach.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire_local_audio(&self) -> Result<LocalAudio, MediaError>;
}

/// An opus-capable local track that never produces samples. Stands in for
/// a capture device in headless and test sessions.
pub struct SilentAudioSource;

#[async_trait]
impl MediaSource for SilentAudioSource {
    async fn acquire_local_audio(&self) -> Result<LocalAudio, MediaError> {
        let track = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "huddle".to_owned(),
        );

        Ok(Arc::new(track))
    }
}
