//! # Playback Coordinator
//!
//! The public surface of the playback core: queue commands, transport
//! commands and the transport event pump, composed over the queue model,
//! the resolver service, the prefetcher and the engine adapter.
//!
//! ## Concurrency Model
//!
//! The coordinator is a single logical actor per player instance. All queue
//! mutations and engine pushes happen under one async mutex, so user
//! commands and engine transport events interleave at operation granularity,
//! never mid-mutation. The only concurrency inside the core is resolution:
//! prefetch tasks run outside the session lock and touch nothing but the
//! resolution cache, and per-identifier coalescing in the resolver service
//! makes a just-in-time resolve and a prefetch of the same track share one
//! network call.
//!
//! A prefetch that completes after the cursor has moved on is a cache write
//! and nothing else; only the coordinator pushes to the engine, and it only
//! pushes the track under the cursor.

use crate::adapter::EngineAdapter;
use crate::error::{PlaybackError, Result};
use crate::prefetch::Prefetcher;
use crate::queue::{Advance, Direction, EnqueueMode, QueueModel, RemoveOutcome, RepeatMode};
use bridge_traits::{AudioEngine, StreamingApi, TrackId, TransportEvent};
use core_resolver::{ResolutionCache, ResolveError, ResolverService, SourceResolver, Track};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{EventBus, PlaybackEvent, PlayerEvent, QueueEvent, Receiver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ============================================================================
// Public request/state types
// ============================================================================

/// Lifecycle state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No track is active.
    #[default]
    Idle,
    /// The current track is being resolved or handed to the engine.
    Loading,
    /// The engine is playing the current track.
    Playing,
    /// Playback is paused with a track loaded.
    Paused,
    /// The engine stalled waiting for data.
    Buffering,
    /// The last track finished with repeat off.
    Ended,
}

impl PlayerState {
    /// Stable lowercase name used in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Buffering => "buffering",
            PlayerState::Ended => "ended",
        }
    }
}

/// A batch enqueue command.
///
/// Mirrors the app-facing "add to queue" surface: one call covers append,
/// replace, play-next and jump-to-track.
#[derive(Debug, Clone, Default)]
pub struct EnqueueRequest {
    /// Tracks to insert, in the order they should appear.
    pub tracks: Vec<Track>,
    /// Drop the existing queue first and start playing the new one.
    pub clear_queue: bool,
    /// Start playback from the inserted tracks immediately.
    pub play_now: bool,
    /// Insert right after the current track instead of at the end.
    pub play_next: bool,
    /// Start playback from the first occurrence of this identifier instead
    /// of the first inserted track.
    pub start_from_id: Option<TrackId>,
}

impl EnqueueRequest {
    /// Append tracks without touching playback.
    pub fn append(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Replace the whole queue and start playing it.
    pub fn replace_and_play(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            clear_queue: true,
            play_now: true,
            ..Self::default()
        }
    }

    /// Insert tracks right after the current one.
    pub fn insert_next(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            play_next: true,
            ..Self::default()
        }
    }

    /// Start playback from the given identifier once inserted.
    pub fn starting_from(mut self, id: TrackId) -> Self {
        self.start_from_id = Some(id);
        self.play_now = true;
        self
    }
}

/// Read-only view of the player for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    /// Lifecycle state.
    pub state: PlayerState,
    /// Tracks in canonical order.
    pub tracks: Vec<Track>,
    /// The track under the cursor.
    pub current: Option<Track>,
    /// Cursor position in traversal order.
    pub cursor: Option<usize>,
    /// Whether traversal follows the shuffled view.
    pub shuffle: bool,
    /// Repeat mode.
    pub repeat: RepeatMode,
}

// ============================================================================
// Coordinator
// ============================================================================

struct Session {
    queue: QueueModel,
    state: PlayerState,
    /// Index into the current track's URL chain; nonzero while playing from
    /// a backup URL.
    fallback_step: usize,
}

/// Orchestrates the queue, resolution and the external engine.
pub struct PlaybackCoordinator {
    session: AsyncMutex<Session>,
    engine: Arc<dyn AudioEngine>,
    api: Arc<dyn StreamingApi>,
    adapter: EngineAdapter,
    prefetcher: Prefetcher,
    service: Arc<ResolverService>,
    events: EventBus,
    lookahead: usize,
}

impl PlaybackCoordinator {
    /// Builds a coordinator from a validated configuration.
    pub fn new(config: PlayerConfig) -> Arc<Self> {
        let events = EventBus::new(config.event_buffer_size);
        let service = Arc::new(ResolverService::new(
            SourceResolver::new(
                Arc::clone(&config.api),
                Arc::clone(&config.credentials),
                config.quality,
            ),
            ResolutionCache::default(),
            config.locator_ttl,
        ));
        let adapter = EngineAdapter::new(
            Arc::clone(&config.engine),
            Arc::clone(&service),
            config.locator_ttl,
        );
        let prefetcher = Prefetcher::new(Arc::clone(&service), events.clone());

        Arc::new(Self {
            session: AsyncMutex::new(Session {
                queue: QueueModel::new(),
                state: PlayerState::Idle,
                fallback_step: 0,
            }),
            engine: config.engine,
            api: config.api,
            adapter,
            prefetcher,
            service,
            events,
            lookahead: config.prefetch_lookahead,
        })
    }

    /// Subscribes to the player event stream.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Spawns the task that drives the coordinator from engine transport
    /// events. Call once after construction; the task ends when the engine
    /// drops its event channel.
    pub fn spawn_event_pump(self: &Arc<Self>) -> JoinHandle<()> {
        let mut stream = self.engine.transport_events();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match stream.recv().await {
                    Ok(event) => this.handle_transport_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "transport event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // Queue commands
    // ------------------------------------------------------------------

    /// Inserts tracks and optionally starts playback, per the request.
    pub async fn enqueue(&self, request: EnqueueRequest) -> Result<()> {
        if request.tracks.is_empty() {
            return Ok(());
        }
        let first_inserted = request.tracks.first().map(|t| t.id().clone());
        let mode = if request.clear_queue {
            EnqueueMode::ReplaceAll
        } else if request.play_next {
            EnqueueMode::InsertNext
        } else {
            EnqueueMode::Append
        };

        let mut s = self.session.lock().await;
        let count = s.queue.enqueue(request.tracks, mode);
        info!(count, mode = mode.as_str(), "tracks enqueued");
        self.events
            .emit(PlayerEvent::Queue(QueueEvent::TracksEnqueued {
                count,
                mode: mode.as_str().to_string(),
            }))
            .ok();

        // An explicit replacement always restarts playback; appends and
        // play-next only interrupt when asked to.
        if request.play_now || request.clear_queue {
            let target = request.start_from_id.or(first_inserted);
            if let Some(id) = target {
                s.queue.set_cursor_to_id(&id);
            }
            self.emit_cursor(&s);
            self.load_current(&mut s, true).await?;
        }
        self.schedule_prefetch(&s);
        Ok(())
    }

    /// Fetches a remote collection's track identifiers and enqueues them.
    ///
    /// Returns the number of tracks enqueued. The network fetch happens
    /// before the session lock is taken, so an in-progress playback command
    /// is never stalled behind it.
    pub async fn enqueue_collection(
        &self,
        collection_id: u64,
        mut request: EnqueueRequest,
    ) -> Result<usize> {
        let ids = self
            .api
            .fetch_collection_ids(collection_id)
            .await
            .map_err(ResolveError::from)?;
        let count = ids.len();
        request.tracks = ids.into_iter().map(Track::unresolved).collect();
        self.enqueue(request).await?;
        Ok(count)
    }

    /// Removes the first occurrence of a track. Unknown identifiers are
    /// ignored.
    pub async fn remove_track(&self, id: &TrackId) -> Result<()> {
        let mut s = self.session.lock().await;
        let was_playing = matches!(
            s.state,
            PlayerState::Playing | PlayerState::Buffering | PlayerState::Loading
        );
        match s.queue.remove(id) {
            RemoveOutcome::NotFound => Ok(()),
            RemoveOutcome::Removed { was_current } => {
                self.events
                    .emit(PlayerEvent::Queue(QueueEvent::TrackRemoved {
                        track_id: id.clone(),
                    }))
                    .ok();
                if was_current {
                    if s.queue.current().is_some() {
                        self.emit_cursor(&s);
                        self.load_current(&mut s, was_playing).await?;
                    } else {
                        self.finish_queue(&mut s).await?;
                        if s.queue.is_empty() {
                            s.state = PlayerState::Idle;
                        }
                    }
                }
                self.schedule_prefetch(&s);
                Ok(())
            }
        }
    }

    /// Stops playback and drops the whole queue.
    pub async fn reset(&self) -> Result<()> {
        let mut s = self.session.lock().await;
        self.adapter.stop().await?;
        s.queue.clear();
        s.state = PlayerState::Idle;
        s.fallback_step = 0;
        self.events.emit(PlayerEvent::Queue(QueueEvent::Cleared)).ok();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transport commands
    // ------------------------------------------------------------------

    /// Toggles between playing and paused. From idle with a non-empty
    /// queue, starts at the cursor (or the head of the traversal).
    pub async fn toggle_play(&self) -> Result<()> {
        let mut s = self.session.lock().await;
        match s.state {
            PlayerState::Playing => {
                self.adapter.pause().await?;
                s.state = PlayerState::Paused;
                if let Some(track) = s.queue.current() {
                    self.events
                        .emit(PlayerEvent::Playback(PlaybackEvent::Paused {
                            track_id: track.id().clone(),
                        }))
                        .ok();
                }
                Ok(())
            }
            PlayerState::Paused | PlayerState::Buffering => {
                self.adapter.play().await?;
                s.state = PlayerState::Playing;
                if let Some(track) = s.queue.current() {
                    self.events
                        .emit(PlayerEvent::Playback(PlaybackEvent::Resumed {
                            track_id: track.id().clone(),
                        }))
                        .ok();
                }
                Ok(())
            }
            PlayerState::Idle | PlayerState::Ended => {
                if s.queue.cursor().is_none() && !s.queue.is_empty() {
                    s.queue.set_cursor(0);
                    self.emit_cursor(&s);
                }
                if s.queue.current().is_some() {
                    self.load_current(&mut s, true).await?;
                    self.schedule_prefetch(&s);
                }
                Ok(())
            }
            PlayerState::Loading => Ok(()),
        }
    }

    /// Skips to the next track in traversal order.
    pub async fn skip_to_next(&self) -> Result<()> {
        self.skip(Direction::Next).await
    }

    /// Skips to the previous track in traversal order.
    pub async fn skip_to_previous(&self) -> Result<()> {
        self.skip(Direction::Previous).await
    }

    async fn skip(&self, direction: Direction) -> Result<()> {
        let mut s = self.session.lock().await;
        if s.queue.is_empty() {
            return Ok(());
        }
        match s.queue.advance(direction) {
            Advance::Moved(_) => {
                self.emit_cursor(&s);
                self.load_current(&mut s, true).await?;
                self.schedule_prefetch(&s);
                Ok(())
            }
            Advance::Ended => self.finish_queue(&mut s).await,
        }
    }

    /// Jumps to a traversal position. Out-of-range positions are ignored.
    pub async fn skip_to_track(&self, position: usize) -> Result<()> {
        let mut s = self.session.lock().await;
        if !s.queue.set_cursor(position) {
            return Ok(());
        }
        self.emit_cursor(&s);
        self.load_current(&mut s, true).await?;
        self.schedule_prefetch(&s);
        Ok(())
    }

    /// Seeks within the current track, clamped to its known duration. With
    /// no current track this is a no-op.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        let s = self.session.lock().await;
        let Some(track) = s.queue.current() else {
            return Ok(());
        };
        let duration = track.metadata().and_then(|m| m.duration);
        self.adapter.seek_clamped(position, duration).await
    }

    /// Cycles repeat Off -> Track -> Queue and returns the new mode.
    pub async fn toggle_repeat_mode(&self) -> RepeatMode {
        let mut s = self.session.lock().await;
        let mode = s.queue.toggle_repeat();
        self.events
            .emit(PlayerEvent::Queue(QueueEvent::RepeatChanged {
                mode: mode.as_str().to_string(),
            }))
            .ok();
        // The lookahead window depends on the repeat mode.
        self.schedule_prefetch(&s);
        mode
    }

    /// Toggles the shuffled traversal view and returns whether it is now
    /// enabled. The current track keeps playing either way.
    pub async fn toggle_shuffle_mode(&self) -> bool {
        let mut s = self.session.lock().await;
        let enabled = !s.queue.shuffle_enabled();
        s.queue.toggle_shuffle(enabled);
        self.events
            .emit(PlayerEvent::Queue(QueueEvent::ShuffleChanged { enabled }))
            .ok();
        self.emit_cursor(&s);
        self.schedule_prefetch(&s);
        enabled
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Current playback position, straight from the engine.
    pub async fn position(&self) -> Result<Duration> {
        self.adapter.position().await
    }

    /// Read-only snapshot of queue and transport state.
    pub async fn snapshot(&self) -> PlayerSnapshot {
        let s = self.session.lock().await;
        PlayerSnapshot {
            state: s.state,
            tracks: s.queue.tracks().to_vec(),
            current: s.queue.current().cloned(),
            cursor: s.queue.cursor(),
            shuffle: s.queue.shuffle_enabled(),
            repeat: s.queue.repeat(),
        }
    }

    // ------------------------------------------------------------------
    // Transport events
    // ------------------------------------------------------------------

    /// Reacts to one engine transport event. Normally invoked by the pump
    /// task; exposed so embedders driving the engine manually (and tests)
    /// can feed events directly.
    pub async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::TrackEnded { track_id } => self.handle_track_ended(track_id).await,
            TransportEvent::Buffering { active } => {
                let mut s = self.session.lock().await;
                match (active, s.state) {
                    (true, PlayerState::Playing) => s.state = PlayerState::Buffering,
                    (false, PlayerState::Buffering) => s.state = PlayerState::Playing,
                    _ => {}
                }
                self.events
                    .emit(PlayerEvent::Playback(PlaybackEvent::BufferingChanged {
                        active,
                    }))
                    .ok();
            }
            TransportEvent::PlaybackFailed {
                track_id,
                url,
                message,
            } => self.handle_playback_failure(track_id, url, message).await,
            TransportEvent::PositionChanged { position } => {
                let s = self.session.lock().await;
                if let Some(track) = s.queue.current() {
                    self.events
                        .emit(PlayerEvent::Playback(PlaybackEvent::PositionChanged {
                            track_id: track.id().clone(),
                            position,
                        }))
                        .ok();
                }
            }
        }
    }

    async fn handle_track_ended(&self, track_id: TrackId) {
        let mut s = self.session.lock().await;
        if s.queue.current().map(Track::id) != Some(&track_id) {
            debug!(track = %track_id, "ignoring TrackEnded for a non-current track");
            return;
        }
        match s.queue.advance(Direction::Next) {
            Advance::Moved(_) => {
                self.emit_cursor(&s);
                if let Err(err) = self.load_current(&mut s, true).await {
                    warn!(error = %err, "auto-advance failed to start the next track");
                } else {
                    self.schedule_prefetch(&s);
                }
            }
            Advance::Ended => {
                if let Err(err) = self.finish_queue(&mut s).await {
                    warn!(error = %err, "failed to stop the engine at queue end");
                }
            }
        }
    }

    /// Walks the current track's backup-URL chain; when the chain is
    /// exhausted, reports the failure and moves on.
    async fn handle_playback_failure(&self, track_id: TrackId, url: String, message: String) {
        let mut s = self.session.lock().await;
        let Some(current) = s.queue.current().cloned() else {
            return;
        };
        if current.id() != &track_id {
            debug!(track = %track_id, "ignoring failure for a non-current track");
            return;
        }
        warn!(track = %track_id, %url, %message, "engine reported a playback failure");

        let chain: Vec<String> = current
            .locator()
            .map(|l| l.url_chain().map(str::to_string).collect())
            .unwrap_or_default();
        s.fallback_step += 1;
        while let Some(backup) = chain.get(s.fallback_step) {
            info!(url = %backup, "retrying with backup URL");
            let pushed = self.adapter.push(&current, Some(backup)).await;
            if pushed.is_ok() && self.adapter.play().await.is_ok() {
                s.state = PlayerState::Playing;
                return;
            }
            s.fallback_step += 1;
        }

        // Every URL in the chain failed; the resolution is likely expired.
        self.service.invalidate(&track_id);
        self.events
            .emit(PlayerEvent::Playback(PlaybackEvent::Error {
                track_id: Some(track_id.clone()),
                message: format!("All audio URLs failed: {message}"),
                recoverable: true,
            }))
            .ok();

        if s.queue.repeat() == RepeatMode::Track {
            // Auto-retrying the same track would loop on the dead source;
            // stop and let the listener decide.
            self.adapter.stop().await.ok();
            s.state = PlayerState::Idle;
            return;
        }
        match s.queue.advance(Direction::Next) {
            Advance::Moved(_) => {
                self.emit_cursor(&s);
                if let Err(err) = self.load_current(&mut s, true).await {
                    warn!(error = %err, "failed to start the next track after a failure");
                } else {
                    self.schedule_prefetch(&s);
                }
            }
            Advance::Ended => {
                self.finish_queue(&mut s).await.ok();
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resolves the track under the cursor just in time and mirrors it into
    /// the engine. Holding the session lock across the resolve keeps the
    /// cursor from moving underneath it; a concurrent prefetch of the same
    /// identifier coalesces onto the same upstream call.
    async fn load_current(&self, s: &mut Session, play: bool) -> Result<()> {
        let Some(track) = s.queue.current().cloned() else {
            return Ok(());
        };
        s.state = PlayerState::Loading;
        s.fallback_step = 0;

        let prepared = match self.adapter.prepare(&track).await {
            Ok(prepared) => prepared,
            Err(err) => {
                s.state = PlayerState::Idle;
                self.events
                    .emit(PlayerEvent::Playback(PlaybackEvent::Error {
                        track_id: Some(track.id().clone()),
                        message: err.to_string(),
                        recoverable: err.is_transient(),
                    }))
                    .ok();
                return Err(err);
            }
        };
        if prepared.needs_update {
            if let (Some(metadata), Some(locator)) =
                (prepared.track.metadata(), prepared.track.locator())
            {
                s.queue.store_resolved(track.id(), metadata, locator);
            }
        }

        let started = async {
            self.adapter.push(&prepared.track, None).await?;
            if play {
                self.adapter.play().await?;
            }
            Ok::<_, PlaybackError>(())
        }
        .await;
        match started {
            Ok(()) => {
                if play {
                    s.state = PlayerState::Playing;
                    self.events
                        .emit(PlayerEvent::Playback(PlaybackEvent::TrackStarted {
                            track_id: prepared.track.id().clone(),
                            title: prepared.track.display_title(),
                        }))
                        .ok();
                } else {
                    s.state = PlayerState::Paused;
                }
                Ok(())
            }
            Err(err) => {
                s.state = PlayerState::Idle;
                self.events
                    .emit(PlayerEvent::Playback(PlaybackEvent::Error {
                        track_id: Some(track.id().clone()),
                        message: err.to_string(),
                        recoverable: err.is_transient(),
                    }))
                    .ok();
                Err(err)
            }
        }
    }

    async fn finish_queue(&self, s: &mut Session) -> Result<()> {
        self.adapter.stop().await?;
        s.state = PlayerState::Ended;
        self.events
            .emit(PlayerEvent::Playback(PlaybackEvent::QueueEnded))
            .ok();
        self.emit_cursor(s);
        Ok(())
    }

    fn schedule_prefetch(&self, s: &Session) {
        let window = s.queue.upcoming_window(self.lookahead);
        if !window.is_empty() {
            self.prefetcher.schedule(window);
        }
    }

    fn emit_cursor(&self, s: &Session) {
        self.events
            .emit(PlayerEvent::Queue(QueueEvent::CursorMoved {
                index: s.queue.cursor(),
                track_id: s.queue.current().map(|t| t.id().clone()),
            }))
            .ok();
    }
}
