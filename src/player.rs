//! Client-side playback state
//!
//! Tracks the open playlist, the (optionally shuffled) play queue, the song
//! that is playing and the set of liked song ids. Nothing here touches the
//! network except [`Player::audio_source`], which only builds URLs.

mod navigator;

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Url;

use navigator::QueueNavigator;

use crate::api::{ApiClient, ClientError, DEMO_AUDIO_URL};
use crate::library::{Playlist, QueueSong};

#[derive(Debug, Clone, Default)]
pub struct Player {
    current_playlist: Option<Playlist>,
    shuffled: bool,
    queue: Vec<QueueSong>,
    now_playing: Option<QueueSong>,
    liked: BTreeSet<i64>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        self.current_playlist.as_ref()
    }

    pub fn queue(&self) -> &[QueueSong] {
        &self.queue
    }

    pub fn now_playing(&self) -> Option<&QueueSong> {
        self.now_playing.as_ref()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Make `playlist` current and rebuild the queue from it
    pub fn open_playlist<R: Rng + ?Sized>(&mut self, playlist: Playlist, rng: &mut R) {
        self.current_playlist = Some(playlist);
        self.rebuild_queue(rng);
    }

    /// Flip shuffle mode, returns the new state.
    ///
    /// The playing song is left alone; only the upcoming order changes.
    pub fn toggle_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.shuffled = !self.shuffled;
        self.rebuild_queue(rng);
        self.shuffled
    }

    fn rebuild_queue<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue = self
            .current_playlist
            .as_ref()
            .map(|p| p.songs.clone())
            .unwrap_or_default();
        if self.shuffled {
            self.queue.shuffle(rng);
        }
    }

    /// Start playing `song`
    pub fn play(&mut self, song: QueueSong) -> &QueueSong {
        let song = self.with_playlist_image(song);
        self.now_playing.insert(song)
    }

    fn with_playlist_image(&self, mut song: QueueSong) -> QueueSong {
        if song.image.is_none() {
            song.image = self.current_playlist.as_ref().and_then(|p| p.image.clone());
        }
        song
    }

    fn navigator(&self) -> Option<QueueNavigator> {
        let playing = self.now_playing.as_ref()?;
        if self.queue.is_empty() {
            return None;
        }
        let idx = self.queue.iter().position(|s| s.id == playing.id);
        Some(QueueNavigator::new(self.queue.len(), idx))
    }

    /// Advance to the following song, wrapping at the end of the queue
    pub fn next(&mut self) -> Option<&QueueSong> {
        let idx = self.navigator()?.next_index()?;
        let song = self.queue[idx].clone();
        Some(self.play(song))
    }

    /// Step back to the previous song, wrapping at the start of the queue
    pub fn prev(&mut self) -> Option<&QueueSong> {
        let idx = self.navigator()?.prev_index()?;
        let song = self.queue[idx].clone();
        Some(self.play(song))
    }

    /// Called when the audio element reports the end of a track
    pub fn on_track_ended(&mut self) -> Option<&QueueSong> {
        self.next()
    }

    // ============ Likes ============

    /// Flip the local like flag, returns whether the song is now liked
    pub fn toggle_like(&mut self, song_id: i64) -> bool {
        if self.liked.remove(&song_id) {
            false
        } else {
            self.liked.insert(song_id);
            true
        }
    }

    pub fn is_liked(&self, song_id: i64) -> bool {
        self.liked.contains(&song_id)
    }

    /// Replace the liked set, e.g. with ids fetched after login
    pub fn set_liked(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.liked = ids.into_iter().collect();
    }

    /// Stream URL for `song`: the upload when there is one, the demo track otherwise
    pub fn audio_source(song: &QueueSong, client: &ApiClient) -> Result<Url, ClientError> {
        match song.filename.as_deref().filter(|f| !f.is_empty()) {
            Some(filename) => client.upload_url(filename),
            None => Url::parse(DEMO_AUDIO_URL)
                .map_err(|e| ClientError::InvalidUrl(format!("{DEMO_AUDIO_URL}: {e}"))),
        }
    }
}

/// Format a playback position as `m:ss`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
