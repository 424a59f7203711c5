use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LOCAL_SONG_THUMBNAIL: &str = "images/mp3-thumbnail.svg";
pub const LOCAL_SONG_DURATION: &str = "MP3";

fn default_true() -> bool {
    true
}

/// Where a song's audio lives.
///
/// Serialized untagged and flattened into [`Song`], so a remote song carries a
/// `videoId` and a local one carries `localId`, `isLocal` and `filePath`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum SongSource {
    #[serde(rename_all = "camelCase")]
    Local {
        local_id: String,
        #[serde(default = "default_true")]
        is_local: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_path: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Remote { video_id: String },
}

impl SongSource {
    pub fn id(&self) -> &str {
        match self {
            SongSource::Local { local_id, .. } => local_id,
            SongSource::Remote { video_id } => video_id,
        }
    }

    /// Two sources collide when they are the same kind and share the id.
    pub fn same_as(&self, other: &SongSource) -> bool {
        match (self, other) {
            (SongSource::Local { local_id: a, .. }, SongSource::Local { local_id: b, .. }) => {
                a == b
            }
            (SongSource::Remote { video_id: a }, SongSource::Remote { video_id: b }) => a == b,
            _ => false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(flatten)]
    pub source: SongSource,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: i64,
    pub added_at: DateTime<Utc>,
}

impl Song {
    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn is_local(&self) -> bool {
        matches!(self.source, SongSource::Local { .. })
    }

    /// Public path of the uploaded file backing a local song.
    pub fn local_file_path(&self) -> Option<&str> {
        match &self.source {
            SongSource::Local {
                file_path: Some(path),
                ..
            } => Some(path),
            _ => None,
        }
    }

    pub fn matches_id(&self, song_id: &str) -> bool {
        self.id() == song_id
    }
}

/// A song as submitted by a client. Rating and timestamp are assigned by the
/// server, whatever the client sent.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl NewSong {
    pub fn remote<S: Into<String>>(video_id: S, title: S) -> Self {
        NewSong {
            video_id: Some(video_id.into()),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builds the source, preferring `localId` when both ids are present.
    /// Returns None if neither id is set.
    pub fn source(&self) -> Option<SongSource> {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        if let Some(local_id) = non_empty(&self.local_id) {
            return Some(SongSource::Local {
                local_id,
                is_local: true,
                file_path: self.file_path.clone(),
            });
        }
        non_empty(&self.video_id).map(|video_id| SongSource::Remote { video_id })
    }
}

/// Display order of a playlist's songs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SongOrder {
    /// As added.
    #[default]
    Added,
    /// By title, ignoring case.
    Name,
    /// Highest rating first.
    Rating,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Song>,
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    pub fn find_song(&self, song_id: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.matches_id(song_id))
    }

    pub fn contains_video(&self, video_id: &str) -> bool {
        self.songs.iter().any(|s| {
            matches!(&s.source, SongSource::Remote { video_id: id } if id == video_id)
        })
    }

    /// Songs whose title contains `filter` (ignoring case), in `order`.
    /// A blank filter keeps every song. Ties keep the order of addition.
    pub fn songs_view(&self, filter: &str, order: SongOrder) -> Vec<&Song> {
        let filter = filter.trim().to_lowercase();
        let mut songs: Vec<&Song> = self
            .songs
            .iter()
            .filter(|s| filter.is_empty() || s.title.to_lowercase().contains(&filter))
            .collect();
        match order {
            SongOrder::Added => {}
            SongOrder::Name => songs.sort_by_cached_key(|s| s.title.to_lowercase()),
            SongOrder::Rating => songs.sort_by(|a, b| b.rating.cmp(&a.rating)),
        }
        songs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn playlist_of(songs: &[(&str, &str, i64)]) -> Playlist {
        Playlist {
            id: "playlist_1".to_string(),
            name: "Mix".to_string(),
            songs: songs
                .iter()
                .map(|(id, title, rating)| Song {
                    source: SongSource::Remote {
                        video_id: id.to_string(),
                    },
                    title: title.to_string(),
                    thumbnail: None,
                    duration: None,
                    rating: *rating,
                    added_at: Utc::now(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    fn ids(songs: Vec<&Song>) -> Vec<&str> {
        songs.into_iter().map(|s| s.id()).collect()
    }

    #[test]
    fn songs_view_filters_titles_ignoring_case() {
        let playlist = playlist_of(&[
            ("a", "Blue Monday", 0),
            ("b", "Yellow", 0),
            ("c", "Kind of BLUE", 0),
        ]);
        assert_eq!(
            ids(playlist.songs_view("blue", SongOrder::Added)),
            ["a", "c"]
        );
        assert_eq!(
            ids(playlist.songs_view("  ", SongOrder::Added)),
            ["a", "b", "c"]
        );
        assert!(playlist.songs_view("green", SongOrder::Added).is_empty());
    }

    #[test]
    fn songs_view_sorts_by_name() {
        let playlist = playlist_of(&[
            ("a", "zebra", 0),
            ("b", "Apple", 0),
            ("c", "mango", 0),
            ("d", "apple", 0),
        ]);
        assert_eq!(
            ids(playlist.songs_view("", SongOrder::Name)),
            ["b", "d", "c", "a"]
        );
        // The playlist itself keeps its order
        assert_eq!(playlist.songs[0].id(), "a");
    }

    #[test]
    fn songs_view_sorts_by_rating_descending() {
        let playlist = playlist_of(&[
            ("a", "One", 2),
            ("b", "Two", 5),
            ("c", "Three", 0),
            ("d", "Four", 5),
        ]);
        assert_eq!(
            ids(playlist.songs_view("", SongOrder::Rating)),
            ["b", "d", "a", "c"]
        );
        assert_eq!(ids(playlist.songs_view("t", SongOrder::Rating)), ["b", "c"]);
    }

    #[test]
    fn missing_rating_counts_as_zero() {
        let song: Song = serde_json::from_value(json!({
            "videoId": "abc",
            "title": "Unrated",
            "addedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(song.rating, 0);
    }

    #[test]
    fn remote_song_wire_format() {
        let song: Song = serde_json::from_value(json!({
            "videoId": "abc",
            "title": "A song",
            "thumbnail": "https://img/abc.jpg",
            "duration": "3:30",
            "rating": 4,
            "addedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(
            song.source,
            SongSource::Remote {
                video_id: "abc".to_string()
            }
        );
        assert_eq!(song.rating, 4);

        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value["videoId"], "abc");
        assert!(value.get("localId").is_none());
        assert!(value.get("isLocal").is_none());
    }

    #[test]
    fn local_song_wire_format() {
        let song: Song = serde_json::from_value(json!({
            "localId": "local_1_abcdef12",
            "isLocal": true,
            "filePath": "/uploads/1-x.mp3",
            "title": "Track",
            "thumbnail": LOCAL_SONG_THUMBNAIL,
            "duration": LOCAL_SONG_DURATION,
            "rating": 0,
            "addedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(song.is_local());
        assert_eq!(song.id(), "local_1_abcdef12");
        assert_eq!(song.local_file_path(), Some("/uploads/1-x.mp3"));

        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value["isLocal"], true);
        assert_eq!(value["filePath"], "/uploads/1-x.mp3");
    }

    #[test]
    fn same_id_different_kind_do_not_collide() {
        let remote = SongSource::Remote {
            video_id: "x".to_string(),
        };
        let local = SongSource::Local {
            local_id: "x".to_string(),
            is_local: true,
            file_path: None,
        };
        assert!(!remote.same_as(&local));
        assert!(remote.same_as(&remote.clone()));
    }

    #[test]
    fn new_song_source() {
        assert_eq!(NewSong::default().source(), None);
        let blank = NewSong {
            video_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.source(), None);
        assert_eq!(
            NewSong::remote("vid", "title").source(),
            Some(SongSource::Remote {
                video_id: "vid".to_string()
            })
        );
    }
}
