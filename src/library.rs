//! Catalog views derived from the fetched song list

use serde::{Deserialize, Serialize};

use crate::database::Song;

/// Title of the playlist built from a user's likes
pub const LIKED_SONGS_TITLE: &str = "Liked Songs";

/// A song as the player sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSong {
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Uploaded audio file; `None` for demo entries
    pub filename: Option<String>,
    /// Cover art (upload filename or URL)
    pub image: Option<String>,
}

impl From<Song> for QueueSong {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            title: song.title,
            artist: song.artist,
            filename: Some(song.filename),
            image: song.image_filename,
        }
    }
}

impl From<&Song> for QueueSong {
    fn from(song: &Song) -> Self {
        song.clone().into()
    }
}

/// An ordered list of songs shown as one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub title: String,
    /// Subtitle line, usually the artists
    pub artist: String,
    pub image: Option<String>,
    pub songs: Vec<QueueSong>,
}

impl Playlist {
    /// Build a playlist; subtitle and cover are taken from the songs
    pub fn from_songs(title: impl Into<String>, songs: Vec<QueueSong>) -> Self {
        let mut artists: Vec<&str> = Vec::new();
        for song in &songs {
            if !artists.contains(&song.artist.as_str()) {
                artists.push(&song.artist);
            }
        }
        let artist = artists.join(", ");
        let image = songs.iter().find_map(|s| s.image.clone());

        Self {
            title: title.into(),
            artist,
            image,
            songs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// One playlist per category, in first-seen order.
///
/// Songs keep their input order within each playlist.
pub fn playlists_by_category(songs: &[Song]) -> Vec<Playlist> {
    let mut groups: Vec<(String, Vec<QueueSong>)> = Vec::new();

    for song in songs {
        match groups.iter_mut().find(|(c, _)| *c == song.category) {
            Some((_, list)) => list.push(song.into()),
            None => groups.push((song.category.clone(), vec![song.into()])),
        }
    }

    groups
        .into_iter()
        .map(|(category, list)| Playlist::from_songs(category, list))
        .collect()
}

/// The "Liked Songs" playlist
pub fn liked_playlist(songs: &[Song]) -> Playlist {
    Playlist::from_songs(LIKED_SONGS_TITLE, songs.iter().map(QueueSong::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64, category: &str, artist: &str, image: Option<&str>) -> Song {
        Song {
            id,
            title: format!("Song {id}"),
            artist: artist.to_string(),
            category: category.to_string(),
            filename: format!("{id}.mp3"),
            image_filename: image.map(str::to_string),
            created_at: 0,
        }
    }

    #[test]
    fn groups_by_category_in_first_seen_order() {
        let songs = vec![
            song(5, "Classical", "Pt. Jasraj", None),
            song(4, "Ghazal", "Jagjit Singh", Some("4.jpg")),
            song(3, "Classical", "Kishori Amonkar", Some("3.jpg")),
            song(2, "Classical", "Pt. Jasraj", None),
        ];

        let playlists = playlists_by_category(&songs);
        assert_eq!(playlists.len(), 2);

        let classical = &playlists[0];
        assert_eq!(classical.title, "Classical");
        assert_eq!(
            classical.songs.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![5, 3, 2]
        );
        assert_eq!(classical.artist, "Pt. Jasraj, Kishori Amonkar");
        assert_eq!(classical.image.as_deref(), Some("3.jpg"));

        assert_eq!(playlists[1].title, "Ghazal");
        assert_eq!(playlists[1].image.as_deref(), Some("4.jpg"));
    }

    #[test]
    fn liked_playlist_keeps_order() {
        let liked = liked_playlist(&[
            song(9, "Thumri", "Rashid Khan", None),
            song(1, "Thumri", "Rashid Khan", None),
        ]);
        assert_eq!(liked.title, LIKED_SONGS_TITLE);
        assert_eq!(liked.songs[0].id, 9);
        assert_eq!(liked.songs[0].filename.as_deref(), Some("9.mp3"));
        assert!(liked.image.is_none());

        assert!(liked_playlist(&[]).is_empty());
    }
}
