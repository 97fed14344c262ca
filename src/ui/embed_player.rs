use crate::player::backend::{PlayerBackend, PlayerError, RawPlayerEvent};
use dioxus::document;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc as tokio_mpsc, oneshot};
use tracing::{debug, warn};

/// JS calls the backend wants executed inside the webview.
///
/// `document::eval` only works from a Dioxus scope, while the session actor
/// runs on the tokio runtime, so the backend hands its scripts to a pump
/// task that the lesson page runs (`pump_embed_requests`).
pub enum JsRequest {
    Exec {
        script: String,
    },
    Query {
        script: String,
        reply: oneshot::Sender<Option<Value>>,
    },
}

/// [`PlayerBackend`] over an embedded iframe player driven through the
/// webview's JS API.
pub struct EmbedPlayerBackend {
    container_id: String,
    js_tx: tokio_mpsc::UnboundedSender<JsRequest>,
    subscribers: Mutex<Vec<tokio_mpsc::UnboundedSender<RawPlayerEvent>>>,
}

impl EmbedPlayerBackend {
    /// Returns the backend plus the request stream the lesson page must
    /// drain with [`pump_embed_requests`].
    pub fn new(container_id: &str) -> (Arc<Self>, tokio_mpsc::UnboundedReceiver<JsRequest>) {
        let (js_tx, js_rx) = tokio_mpsc::unbounded_channel();
        (
            Arc::new(Self {
                container_id: container_id.to_string(),
                js_tx,
                subscribers: Mutex::new(Vec::new()),
            }),
            js_rx,
        )
    }

    fn exec(&self, script: String) {
        let _ = self.js_tx.send(JsRequest::Exec { script });
    }

    async fn query(&self, script: String) -> Option<Value> {
        let (reply, rx) = oneshot::channel();
        self.js_tx.send(JsRequest::Query { script, reply }).ok()?;
        rx.await.ok().flatten()
    }

    /// Fan a raw embed event out to the session(s)
    fn dispatch(&self, event: RawPlayerEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait::async_trait]
impl PlayerBackend for EmbedPlayerBackend {
    async fn load_api(&self) -> Result<(), PlayerError> {
        // One injection per page lifetime; later callers share the promise.
        let script = r#"
            if (!window.__embedApiPromise) {
              window.__embedApiPromise = new Promise((resolve) => {
                if (!document.getElementById("embed-iframe-api")) {
                  const s = document.createElement("script");
                  s.id = "embed-iframe-api";
                  s.src = "https://www.youtube.com/iframe_api";
                  document.body.appendChild(s);
                }
                const prev = window.onYouTubeIframeAPIReady;
                window.onYouTubeIframeAPIReady = () => { if (prev) prev(); resolve(); };
                const tick = () => (window.YT && window.YT.Player) ? resolve() : setTimeout(tick, 50);
                tick();
              });
            }
            await window.__embedApiPromise;
            return true;
        "#
        .to_string();

        match self.query(script).await {
            Some(Value::Bool(true)) => Ok(()),
            other => Err(PlayerError::ApiLoad(format!(
                "embed API load returned {:?}",
                other
            ))),
        }
    }

    async fn create(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError> {
        let script = format!(
            r#"
            const host = document.getElementById("{container}");
            if (!host) return false;
            window.__trilhaPlayer = new YT.Player(host, {{
                videoId: "{video}",
                host: "https://www.youtube-nocookie.com",
                playerVars: {{
                    controls: 0,
                    modestbranding: 1,
                    rel: 0,
                    iv_load_policy: 3,
                    fs: 0,
                    disablekb: 1,
                    playsinline: 1,
                    enablejsapi: 1,
                    start: {start}
                }},
                events: {{
                    onReady: () => window.__trilhaEmit && window.__trilhaEmit("ready", null),
                    onStateChange: (e) => window.__trilhaEmit && window.__trilhaEmit("state", e.data),
                }},
            }});
            return true;
            "#,
            container = self.container_id,
            video = video_id,
            start = start_seconds,
        );

        match self.query(script).await {
            Some(Value::Bool(true)) => Ok(()),
            other => Err(PlayerError::Host(format!(
                "embed creation returned {:?}",
                other
            ))),
        }
    }

    async fn cue(&self, video_id: &str, start_seconds: u32) -> Result<(), PlayerError> {
        self.exec(format!(
            r#"const p = window.__trilhaPlayer;
               if (p && p.loadVideoById) p.loadVideoById({{ videoId: "{video}", startSeconds: {start} }});"#,
            video = video_id,
            start = start_seconds,
        ));
        Ok(())
    }

    async fn play(&self) {
        self.exec("const p = window.__trilhaPlayer; if (p && p.playVideo) p.playVideo();".into());
    }

    async fn pause(&self) {
        self.exec("const p = window.__trilhaPlayer; if (p && p.pauseVideo) p.pauseVideo();".into());
    }

    async fn seek_to(&self, seconds: f64) {
        self.exec(format!(
            "const p = window.__trilhaPlayer; if (p && p.seekTo) p.seekTo({}, true);",
            seconds
        ));
    }

    async fn set_volume(&self, volume: u8) {
        self.exec(format!(
            "const p = window.__trilhaPlayer; if (p && p.setVolume) p.setVolume({});",
            volume
        ));
    }

    async fn set_muted(&self, muted: bool) {
        let script = if muted {
            "const p = window.__trilhaPlayer; if (p && p.mute) p.mute();"
        } else {
            "const p = window.__trilhaPlayer; if (p && p.unMute) p.unMute();"
        };
        self.exec(script.into());
    }

    async fn set_playback_rate(&self, rate: f64) {
        self.exec(format!(
            "const p = window.__trilhaPlayer; if (p && p.setPlaybackRate) p.setPlaybackRate({});",
            rate
        ));
    }

    async fn playback_rate(&self) -> Option<f64> {
        let value = self
            .query(
                "const p = window.__trilhaPlayer; \
                 return (p && p.getPlaybackRate) ? p.getPlaybackRate() : null;"
                    .into(),
            )
            .await?;
        value.as_f64()
    }

    async fn available_rates(&self) -> Vec<f64> {
        let value = self
            .query(
                "const p = window.__trilhaPlayer; \
                 return (p && p.getAvailablePlaybackRates) ? p.getAvailablePlaybackRates() : [];"
                    .into(),
            )
            .await;
        match value {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_f64).collect(),
            _ => Vec::new(),
        }
    }

    async fn position(&self) -> Option<(f64, f64)> {
        let value = self
            .query(
                "const p = window.__trilhaPlayer; \
                 if (!p || !p.getDuration) return null; \
                 return [p.getCurrentTime() || 0, p.getDuration() || 0];"
                    .into(),
            )
            .await?;
        match value {
            Value::Array(values) if values.len() == 2 => {
                Some((values[0].as_f64()?, values[1].as_f64()?))
            }
            _ => None,
        }
    }

    async fn volume_state(&self) -> Option<(u8, bool)> {
        let value = self
            .query(
                "const p = window.__trilhaPlayer; \
                 if (!p || !p.getVolume) return null; \
                 return [p.getVolume(), p.isMuted()];"
                    .into(),
            )
            .await?;
        match value {
            Value::Array(values) if values.len() == 2 => Some((
                values[0].as_u64()? as u8,
                values[1].as_bool().unwrap_or(false),
            )),
            _ => None,
        }
    }

    async fn set_fullscreen(&self, fullscreen: bool) {
        let script = if fullscreen {
            format!(
                r#"const host = document.getElementById("{}");
                   const surface = host ? host.parentElement : null;
                   if (surface && surface.requestFullscreen) surface.requestFullscreen();"#,
                self.container_id
            )
        } else {
            "if (document.fullscreenElement && document.exitFullscreen) document.exitFullscreen();"
                .to_string()
        };
        self.exec(script);
    }

    fn subscribe_events(&self) -> tokio_mpsc::UnboundedReceiver<RawPlayerEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// Installs the webview-side event bridge, then serves the backend's JS
/// requests until the page unmounts. Must run inside a Dioxus scope.
pub async fn pump_embed_requests(
    backend: Arc<EmbedPlayerBackend>,
    mut js_rx: tokio_mpsc::UnboundedReceiver<JsRequest>,
) {
    // Persistent eval: its `dioxus.send` stays callable for as long as the
    // handle is alive, which is how embed callbacks reach Rust.
    let mut bridge = document::eval(
        r#"
        window.__trilhaEmit = (kind, data) => dioxus.send({ kind: kind, data: data });
        "#,
    );

    loop {
        tokio::select! {
            event = bridge.recv::<Value>() => match event {
                Ok(value) => {
                    if let Some(event) = parse_bridge_event(&value) {
                        backend.dispatch(event);
                    }
                }
                Err(error) => {
                    warn!("Embed event bridge closed: {:?}", error);
                    break;
                }
            },
            request = js_rx.recv() => match request {
                Some(JsRequest::Exec { script }) => {
                    if let Err(error) = document::eval(&script).await {
                        debug!("Embed call failed: {:?}", error);
                    }
                }
                Some(JsRequest::Query { script, reply }) => {
                    let value = document::eval(&script).await.ok();
                    let _ = reply.send(value);
                }
                None => break,
            },
        }
    }
}

/// Map the provider's state codes onto normalized events: 0 = ended,
/// 1 = playing, 2 = paused. Buffering/cued states carry no signal.
fn parse_bridge_event(value: &Value) -> Option<RawPlayerEvent> {
    match value.get("kind")?.as_str()? {
        "ready" => Some(RawPlayerEvent::Ready),
        "state" => match value.get("data")?.as_i64()? {
            0 => Some(RawPlayerEvent::Ended),
            1 => Some(RawPlayerEvent::PlayingChanged { playing: true }),
            2 => Some(RawPlayerEvent::PlayingChanged { playing: false }),
            _ => None,
        },
        _ => None,
    }
}
