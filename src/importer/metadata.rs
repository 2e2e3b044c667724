//! Audio tag extraction with lofty

use std::{borrow::Cow, path::Path, time::Duration};

use anyhow::Context;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

/// Descriptive fields of a track, from tags or from an `#EXTINF` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Whole seconds, `None` when unknown or zero
    pub duration: Option<u64>,
}

impl TrackInfo {
    /// Keeps every field of `self` that is set, taking the rest from `fallback`
    pub fn or(self, fallback: TrackInfo) -> TrackInfo {
        TrackInfo {
            title: self.title.or(fallback.title),
            artist: self.artist.or(fallback.artist),
            album: self.album.or(fallback.album),
            duration: self.duration.or(fallback.duration),
        }
    }
}

pub fn read_tags(path: &Path) -> anyhow::Result<TrackInfo> {
    let tagged_file = Probe::open(path)
        .context("Failed to open audio file")?
        .read()
        .context("Failed to read audio file")?;

    let duration = whole_seconds(tagged_file.properties().duration());
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let Some(tag) = tag else {
        return Ok(TrackInfo {
            duration,
            ..Default::default()
        });
    };

    Ok(TrackInfo {
        title: non_empty(tag.title()),
        artist: non_empty(tag.artist()),
        album: non_empty(tag.album()),
        duration,
    })
}

pub fn whole_seconds(duration: Duration) -> Option<u64> {
    let secs = duration.as_secs_f64().round() as u64;
    (secs > 0).then_some(secs)
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn durations_round_to_nearest_second() {
        assert_eq!(whole_seconds(Duration::from_millis(180_499)), Some(180));
        assert_eq!(whole_seconds(Duration::from_millis(180_500)), Some(181));
        assert_eq!(whole_seconds(Duration::from_millis(400)), None);
        assert_eq!(whole_seconds(Duration::ZERO), None);
    }

    #[test]
    fn set_fields_win_over_fallback() {
        let tags = TrackInfo {
            title: Some("Xtal".to_string()),
            duration: Some(294),
            ..Default::default()
        };
        let extinf = TrackInfo {
            title: Some("xtal (remaster)".to_string()),
            artist: Some("Aphex Twin".to_string()),
            duration: Some(293),
            ..Default::default()
        };

        assert_eq!(
            tags.clone().or(extinf.clone()),
            TrackInfo {
                title: Some("Xtal".to_string()),
                artist: Some("Aphex Twin".to_string()),
                album: None,
                duration: Some(294),
            }
        );
        assert_eq!(extinf.clone().or(tags).title, extinf.title);
    }
}
