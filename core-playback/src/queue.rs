//! # Queue Model
//!
//! Canonical playback queue with a separated traversal view.
//!
//! ## Overview
//!
//! The queue stores tracks in their canonical (insertion) order. Shuffle is a
//! permutation laid over that order, never a reordering of it: disabling
//! shuffle restores the canonical sequence exactly. The cursor addresses a
//! position in the *traversal* order, so "next" and "previous" are always one
//! step in whatever order the listener currently sees.
//!
//! All mutations are synchronous and infallible; invalid requests (bad
//! indices, unknown identifiers, operations on an empty queue) are no-ops.
//! The async world — resolution, the engine — lives in the coordinator.

use bridge_traits::TrackId;
use core_resolver::{AudioLocator, Track, TrackMetadata};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How playback continues when the traversal runs off either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Stop after the last track.
    #[default]
    Off,
    /// Repeat the current track indefinitely.
    Track,
    /// Wrap around to the first track.
    Queue,
}

impl RepeatMode {
    /// Stable lowercase name used in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::Track => "track",
            RepeatMode::Queue => "queue",
        }
    }

    /// The next mode in the Off -> Track -> Queue -> Off cycle.
    pub fn cycled(&self) -> RepeatMode {
        match self {
            RepeatMode::Off => RepeatMode::Track,
            RepeatMode::Track => RepeatMode::Queue,
            RepeatMode::Queue => RepeatMode::Off,
        }
    }
}

/// Where newly enqueued tracks land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnqueueMode {
    /// Append to the end of the queue.
    Append,
    /// Drop the existing queue and cursor, then insert.
    ReplaceAll,
    /// Insert immediately after the current cursor position.
    InsertNext,
}

impl EnqueueMode {
    /// Stable lowercase name used in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnqueueMode::Append => "append",
            EnqueueMode::ReplaceAll => "replace_all",
            EnqueueMode::InsertNext => "insert_next",
        }
    }
}

/// Traversal direction for cursor advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the traversal order.
    Next,
    /// Toward the start of the traversal order.
    Previous,
}

/// Outcome of advancing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to (or stayed at) this traversal position.
    Moved(usize),
    /// The traversal ran off the end with repeat off; the cursor is cleared.
    Ended,
}

/// Outcome of removing a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No track with that identifier was in the queue.
    NotFound,
    /// The first occurrence was removed.
    Removed {
        /// Whether the removed track was the one under the cursor. The
        /// caller must resync the engine in that case.
        was_current: bool,
    },
}

/// Canonical queue, shuffle permutation and cursor.
#[derive(Debug, Default)]
pub struct QueueModel {
    /// Tracks in canonical order.
    tracks: Vec<Track>,
    /// Traversal permutation over canonical indices; only meaningful while
    /// `shuffled` is set.
    order: Vec<usize>,
    shuffled: bool,
    /// Position in traversal order of the current track.
    cursor: Option<usize>,
    repeat: RepeatMode,
}

impl QueueModel {
    /// An empty queue with repeat off and shuffle disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks in the queue.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns `true` when the queue holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in canonical order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Current repeat mode.
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Whether traversal follows the shuffled view.
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffled
    }

    /// Cursor position in traversal order, when a track is current.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    fn canonical(&self, pos: usize) -> Option<usize> {
        if self.shuffled {
            self.order.get(pos).copied()
        } else if pos < self.tracks.len() {
            Some(pos)
        } else {
            None
        }
    }

    /// Canonical index of the current track.
    pub fn current_canonical_index(&self) -> Option<usize> {
        self.cursor.and_then(|pos| self.canonical(pos))
    }

    /// The track under the cursor.
    pub fn current(&self) -> Option<&Track> {
        self.current_canonical_index().map(|i| &self.tracks[i])
    }

    /// The track at a traversal position.
    pub fn track_at(&self, pos: usize) -> Option<&Track> {
        self.canonical(pos).map(|i| &self.tracks[i])
    }

    /// Inserts tracks according to `mode`. Returns the number inserted.
    ///
    /// `ReplaceAll` clears the queue and cursor first; the caller decides
    /// where playback starts afterwards. `InsertNext` on an empty queue (or
    /// with no cursor) degrades to `ReplaceAll`/`Append` semantics: the
    /// tracks simply become the front of the queue.
    pub fn enqueue(&mut self, tracks: Vec<Track>, mode: EnqueueMode) -> usize {
        self.enqueue_with_rng(tracks, mode, &mut rand::thread_rng())
    }

    /// [`QueueModel::enqueue`] with a caller-supplied RNG, for deterministic
    /// shuffled-view placement in tests.
    pub fn enqueue_with_rng<R: Rng>(
        &mut self,
        tracks: Vec<Track>,
        mode: EnqueueMode,
        rng: &mut R,
    ) -> usize {
        if tracks.is_empty() {
            return 0;
        }
        let count = tracks.len();

        match mode {
            EnqueueMode::ReplaceAll => {
                self.tracks = tracks;
                self.cursor = None;
                if self.shuffled {
                    self.order = (0..self.tracks.len()).collect();
                    self.order.shuffle(rng);
                }
            }
            EnqueueMode::Append => {
                let start = self.tracks.len();
                self.tracks.extend(tracks);
                if self.shuffled {
                    // New tracks join the tail of the traversal, shuffled
                    // among themselves; everything already scheduled keeps
                    // its place.
                    let mut tail: Vec<usize> = (start..self.tracks.len()).collect();
                    tail.shuffle(rng);
                    self.order.extend(tail);
                }
            }
            EnqueueMode::InsertNext => {
                let insert_at = match self.current_canonical_index() {
                    Some(i) => i + 1,
                    None => 0,
                };
                self.tracks.splice(insert_at..insert_at, tracks);
                if self.shuffled {
                    // Canonical indices at or past the splice point shifted.
                    for slot in &mut self.order {
                        if *slot >= insert_at {
                            *slot += count;
                        }
                    }
                    let after_cursor = match self.cursor {
                        Some(c) => c + 1,
                        None => 0,
                    };
                    self.order
                        .splice(after_cursor..after_cursor, insert_at..insert_at + count);
                }
            }
        }
        count
    }

    /// Moves the cursor to a traversal position. Out-of-range positions are
    /// ignored; returns whether the cursor moved.
    pub fn set_cursor(&mut self, pos: usize) -> bool {
        if pos < self.tracks.len() {
            self.cursor = Some(pos);
            true
        } else {
            false
        }
    }

    /// Moves the cursor to the first occurrence of an identifier in
    /// traversal order. Returns the new position when found.
    pub fn set_cursor_to_id(&mut self, id: &TrackId) -> Option<usize> {
        let pos = (0..self.tracks.len())
            .find(|&pos| self.track_at(pos).map(Track::id) == Some(id))?;
        self.cursor = Some(pos);
        Some(pos)
    }

    /// Removes the first occurrence of an identifier (in canonical order).
    ///
    /// Removing a track before the cursor shifts the cursor back by one so
    /// the current track stays current. Removing the current track leaves the
    /// cursor at the vacated position (the former successor); when that runs
    /// off the end, the cursor wraps under `Repeat::Queue` and clears
    /// otherwise.
    pub fn remove(&mut self, id: &TrackId) -> RemoveOutcome {
        let Some(canonical) = self.tracks.iter().position(|t| t.id() == id) else {
            return RemoveOutcome::NotFound;
        };
        let traversal = if self.shuffled {
            // The permutation covers every canonical index.
            self.order
                .iter()
                .position(|&slot| slot == canonical)
                .unwrap_or(canonical)
        } else {
            canonical
        };
        let was_current = self.cursor == Some(traversal);

        self.tracks.remove(canonical);
        if self.shuffled {
            self.order.retain(|&slot| slot != canonical);
            for slot in &mut self.order {
                if *slot > canonical {
                    *slot -= 1;
                }
            }
        }

        self.cursor = match self.cursor {
            Some(c) if traversal < c => Some(c - 1),
            Some(c) if traversal == c => {
                if c < self.tracks.len() {
                    Some(c)
                } else if self.repeat == RepeatMode::Queue && !self.tracks.is_empty() {
                    Some(0)
                } else {
                    None
                }
            }
            other => other,
        };
        if self.tracks.is_empty() {
            self.cursor = None;
        }

        RemoveOutcome::Removed { was_current }
    }

    /// Steps the cursor one position in traversal order.
    ///
    /// Under `Repeat::Track` the cursor does not move in either direction.
    /// `Previous` at the first position stays there unless `Repeat::Queue`
    /// wraps to the last; `Next` past the last position wraps under
    /// `Repeat::Queue` and otherwise ends the traversal.
    pub fn advance(&mut self, direction: Direction) -> Advance {
        if self.tracks.is_empty() {
            self.cursor = None;
            return Advance::Ended;
        }
        let Some(c) = self.cursor else {
            self.cursor = Some(0);
            return Advance::Moved(0);
        };
        if self.repeat == RepeatMode::Track {
            return Advance::Moved(c);
        }

        let next = match direction {
            Direction::Next => {
                if c + 1 < self.tracks.len() {
                    Some(c + 1)
                } else if self.repeat == RepeatMode::Queue {
                    Some(0)
                } else {
                    None
                }
            }
            Direction::Previous => {
                if c > 0 {
                    Some(c - 1)
                } else if self.repeat == RepeatMode::Queue {
                    Some(self.tracks.len() - 1)
                } else {
                    Some(0)
                }
            }
        };
        match next {
            Some(pos) => {
                self.cursor = Some(pos);
                Advance::Moved(pos)
            }
            None => {
                self.cursor = None;
                Advance::Ended
            }
        }
    }

    /// Cycles the repeat mode and returns the new one.
    pub fn toggle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Sets the repeat mode directly.
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Enables or disables the shuffled traversal view.
    pub fn toggle_shuffle(&mut self, enabled: bool) {
        self.toggle_shuffle_with_rng(enabled, &mut rand::thread_rng());
    }

    /// [`QueueModel::toggle_shuffle`] with a caller-supplied RNG, for
    /// deterministic permutations in tests.
    ///
    /// Enabling draws a fresh permutation every time (no permutation is
    /// remembered across toggles) and moves the current track to the front
    /// of the shuffled order so it keeps playing. Disabling restores
    /// canonical order with the cursor following the current track.
    pub fn toggle_shuffle_with_rng<R: Rng>(&mut self, enabled: bool, rng: &mut R) {
        if enabled {
            let current = self.current_canonical_index();
            self.order = (0..self.tracks.len()).collect();
            self.order.shuffle(rng);
            if let Some(canonical) = current {
                let pos = self
                    .order
                    .iter()
                    .position(|&slot| slot == canonical)
                    .unwrap_or(0);
                self.order.swap(0, pos);
                self.cursor = Some(0);
            }
            self.shuffled = true;
        } else {
            self.cursor = self.current_canonical_index();
            self.shuffled = false;
            self.order.clear();
        }
    }

    /// Identifiers of up to `n` tracks after the cursor in traversal order.
    ///
    /// Honors repeat: under `Repeat::Track` the window is empty (the next
    /// track is the current one), and under `Repeat::Queue` it wraps but
    /// never revisits the current position. With no cursor the window starts
    /// at the head of the traversal.
    pub fn upcoming_window(&self, n: usize) -> Vec<TrackId> {
        if self.tracks.is_empty() || n == 0 || self.repeat == RepeatMode::Track {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(n);
        match self.cursor {
            None => {
                for pos in 0..n.min(self.tracks.len()) {
                    if let Some(track) = self.track_at(pos) {
                        out.push(track.id().clone());
                    }
                }
            }
            Some(c) => {
                for k in 1..=n {
                    let pos = c + k;
                    let pos = if pos < self.tracks.len() {
                        pos
                    } else if self.repeat == RepeatMode::Queue {
                        pos % self.tracks.len()
                    } else {
                        break;
                    };
                    if pos == c {
                        break;
                    }
                    if let Some(track) = self.track_at(pos) {
                        out.push(track.id().clone());
                    }
                }
            }
        }
        out
    }

    /// Upgrades every occurrence of an identifier to resolved. Returns the
    /// number of entries upgraded.
    ///
    /// Duplicates share an identity, so one resolution serves them all.
    pub fn store_resolved(
        &mut self,
        id: &TrackId,
        metadata: &TrackMetadata,
        locator: &AudioLocator,
    ) -> usize {
        let mut upgraded = 0;
        for track in &mut self.tracks {
            if track.id() == id {
                *track = Track::Resolved {
                    id: id.clone(),
                    metadata: metadata.clone(),
                    locator: locator.clone(),
                };
                upgraded += 1;
            }
        }
        upgraded
    }

    /// Drops every track and clears the cursor. Repeat and shuffle settings
    /// survive.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.order.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(bvid: &str) -> Track {
        Track::unresolved(TrackId::new(bvid))
    }

    fn ids(queue: &QueueModel) -> Vec<String> {
        (0..queue.len())
            .map(|pos| queue.track_at(pos).unwrap().id().bvid.clone())
            .collect()
    }

    #[test]
    fn append_preserves_cursor() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a"), track("b")], EnqueueMode::Append);
        q.set_cursor(1);
        q.enqueue(vec![track("c")], EnqueueMode::Append);
        assert_eq!(q.cursor(), Some(1));
        assert_eq!(q.current().unwrap().id().bvid, "b");
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn replace_all_clears_cursor() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a")], EnqueueMode::Append);
        q.set_cursor(0);
        q.enqueue(vec![track("b"), track("c")], EnqueueMode::ReplaceAll);
        assert_eq!(q.cursor(), None);
        assert_eq!(ids(&q), vec!["b", "c"]);
    }

    #[test]
    fn insert_next_lands_after_cursor() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a"), track("b"), track("c")], EnqueueMode::Append);
        q.set_cursor(0);
        q.enqueue(vec![track("x"), track("y")], EnqueueMode::InsertNext);
        assert_eq!(ids(&q), vec!["a", "x", "y", "b", "c"]);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn insert_next_into_empty_queue_becomes_the_queue() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a")], EnqueueMode::InsertNext);
        assert_eq!(ids(&q), vec!["a"]);
        assert_eq!(q.cursor(), None);
    }

    #[test]
    fn advance_wraps_only_under_repeat_queue() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a"), track("b")], EnqueueMode::Append);
        q.set_cursor(1);
        assert_eq!(q.advance(Direction::Next), Advance::Ended);
        assert_eq!(q.cursor(), None);

        q.set_cursor(1);
        q.set_repeat(RepeatMode::Queue);
        assert_eq!(q.advance(Direction::Next), Advance::Moved(0));
    }

    #[test]
    fn previous_at_start_stays_unless_wrapping() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a"), track("b")], EnqueueMode::Append);
        q.set_cursor(0);
        assert_eq!(q.advance(Direction::Previous), Advance::Moved(0));

        q.set_repeat(RepeatMode::Queue);
        assert_eq!(q.advance(Direction::Previous), Advance::Moved(1));
    }

    #[test]
    fn repeat_track_pins_the_cursor() {
        let mut q = QueueModel::new();
        q.enqueue(vec![track("a"), track("b")], EnqueueMode::Append);
        q.set_cursor(0);
        q.set_repeat(RepeatMode::Track);
        assert_eq!(q.advance(Direction::Next), Advance::Moved(0));
        assert_eq!(q.advance(Direction::Previous), Advance::Moved(0));
    }

    #[test]
    fn repeat_cycles_off_track_queue() {
        let mut q = QueueModel::new();
        assert_eq!(q.toggle_repeat(), RepeatMode::Track);
        assert_eq!(q.toggle_repeat(), RepeatMode::Queue);
        assert_eq!(q.toggle_repeat(), RepeatMode::Off);
    }

    #[test]
    fn operations_on_empty_queue_are_noops() {
        let mut q = QueueModel::new();
        assert!(!q.set_cursor(0));
        assert_eq!(q.set_cursor_to_id(&TrackId::new("a")), None);
        assert_eq!(q.remove(&TrackId::new("a")), RemoveOutcome::NotFound);
        assert_eq!(q.advance(Direction::Next), Advance::Ended);
        assert!(q.upcoming_window(3).is_empty());
        q.toggle_shuffle(true);
        assert_eq!(q.cursor(), None);
    }
}
