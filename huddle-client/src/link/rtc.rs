use crate::error::NegotiationError;
use crate::link::driver::{LinkDriver, LinkEvent, LinkFactory};
use crate::media::LocalAudio;
use async_trait::async_trait;
use huddle_core::{PeerId, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

#[derive(Debug, Clone, Default)]
pub struct RtcConfig {
    /// STUN/TURN urls. Empty means host candidates only, which is enough on
    /// a local network.
    pub ice_servers: Vec<String>,
}

/// Production LinkFactory over the webrtc crate. One API object serves every
/// connection the session opens.
pub struct RtcLinkFactory {
    api: API,
    config: RtcConfig,
}

impl RtcLinkFactory {
    pub fn new(config: RtcConfig) -> Result<Self, NegotiationError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api, config })
    }
}

#[async_trait]
impl LinkFactory for RtcLinkFactory {
    async fn create(
        &self,
        peer_id: PeerId,
        local_audio: LocalAudio,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Arc<dyn LinkDriver>, NegotiationError> {
        let ice_servers = if self.config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let pc = Arc::new(self.api.new_peer_connection(rtc_config).await?);

        pc.add_track(local_audio).await?;

        let track_tx = events.clone();
        let uid_track = peer_id.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let peer_id = uid_track.clone();

            Box::pin(async move {
                debug!("Remote track arrived from {}", peer_id);
                let _ = tx.send(LinkEvent::RemoteTrack { peer_id, track }).await;
            })
        }));

        let state_tx = events;
        let uid_state = peer_id.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let peer_id = uid_state.clone();

            Box::pin(async move {
                debug!("Peer connection state for {}: {:?}", peer_id, s);
                match s {
                    RTCPeerConnectionState::Connected => {
                        let _ = tx.send(LinkEvent::Connected { peer_id }).await;
                    }
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(LinkEvent::Closed { peer_id }).await;
                    }
                    _ => {}
                }
            })
        }));

        Ok(Arc::new(RtcLink { pc }))
    }
}

/// LinkDriver over one RTCPeerConnection.
pub struct RtcLink {
    pc: Arc<RTCPeerConnection>,
}

impl RtcLink {
    /// Wait for candidate gathering to finish, then serialize the local
    /// descriptor. The emitted payload is self-contained, so negotiation
    /// needs a single exchange per direction.
    async fn finalize_local(&self) -> Result<SignalPayload, NegotiationError> {
        let mut gathered = self.pc.gathering_complete_promise().await;
        let _ = gathered.recv().await;

        let desc = self
            .pc
            .local_description()
            .await
            .ok_or(NegotiationError::MissingDescriptor)?;

        let json = serde_json::to_string(&desc).map_err(NegotiationError::BadDescriptor)?;
        Ok(SignalPayload(json))
    }
}

#[async_trait]
impl LinkDriver for RtcLink {
    async fn create_offer(&self) -> Result<SignalPayload, NegotiationError> {
        let offer = self.pc.create_offer(None).await?;
        self.pc.set_local_description(offer).await?;
        self.finalize_local().await
    }

    async fn create_answer(&self) -> Result<SignalPayload, NegotiationError> {
        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer).await?;
        self.finalize_local().await
    }

    async fn apply_remote(&self, signal: &SignalPayload) -> Result<(), NegotiationError> {
        let desc: RTCSessionDescription =
            serde_json::from_str(&signal.0).map_err(NegotiationError::BadDescriptor)?;
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            warn!("Failed to close peer connection: {}", e);
        }
    }
}
