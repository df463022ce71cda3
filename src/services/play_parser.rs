//! Decoder for the Apple-CMS play field encoding
//!
//! `vod_play_from` lists source names, `vod_play_url` lists one episode group
//! per source, both joined by `$$$` (or the legacy `$$`):
//!
//! ```text
//! vod_play_from: jsyun$$$jsm3u8
//! vod_play_url:  EP1$https://a/1.mp4#EP2$https://a/2.mp4$$$EP1$https://b/1.m3u8
//! ```
//!
//! Separator detection is a substring check done per string, so a literal
//! `$$$` inside a URL switches the whole string to the long separator.

use crate::models::{ParsedPlayData, PlayEpisode, PlaySource};
use crate::services::metrics::PLAY_PARSE_TOTAL;

const LONG_SEPARATOR: &str = "$$$";
const SHORT_SEPARATOR: &str = "$$";
const EPISODE_SEPARATOR: char = '#';
const NAME_URL_SEPARATOR: char = '$';

/// Pick the segment separator used by one raw string
fn detect_separator(raw: &str) -> &'static str {
    if raw.contains(LONG_SEPARATOR) {
        LONG_SEPARATOR
    } else {
        SHORT_SEPARATOR
    }
}

/// Parse a `name$url` token; tokens without a usable URL are dropped
fn parse_episode(token: &str) -> Option<PlayEpisode> {
    let (name, url) = token.split_once(NAME_URL_SEPARATOR)?;
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    Some(PlayEpisode {
        name: name.trim().to_string(),
        url: url.to_string(),
    })
}

/// Parse one source's `#`-joined episode group
fn parse_episode_group(group: &str) -> Vec<PlayEpisode> {
    group
        .split(EPISODE_SEPARATOR)
        .filter_map(parse_episode)
        .collect()
}

/// Decode raw play fields into sources and episodes
///
/// Never fails: absent input yields no sources, malformed episodes are
/// skipped and sources left without episodes are dropped. The i-th source
/// name pairs with the i-th episode group.
pub fn parse_play_url(source_names: Option<&str>, episode_groups: Option<&str>) -> ParsedPlayData {
    let (source_names, episode_groups) = match (source_names, episode_groups) {
        (Some(names), Some(groups)) if !names.is_empty() && !groups.is_empty() => (names, groups),
        _ => return ParsedPlayData::default(),
    };

    PLAY_PARSE_TOTAL.inc();

    let groups: Vec<&str> = episode_groups
        .split(detect_separator(episode_groups))
        .collect();

    let sources: Vec<PlaySource> = source_names
        .split(detect_separator(source_names))
        .enumerate()
        .filter_map(|(index, name)| {
            let episodes = groups
                .get(index)
                .map(|group| parse_episode_group(group))
                .unwrap_or_default();

            if episodes.is_empty() {
                tracing::debug!(source = name.trim(), index, "dropping play source without episodes");
                return None;
            }

            Some(PlaySource {
                name: name.trim().to_string(),
                episodes,
            })
        })
        .collect();

    tracing::debug!(
        sources = sources.len(),
        episodes = sources.iter().map(|s| s.episodes.len()).sum::<usize>(),
        "play data parsed"
    );

    ParsedPlayData { sources }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(name: &str, url: &str) -> PlayEpisode {
        PlayEpisode {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_absent_input_yields_no_sources() {
        assert!(parse_play_url(None, Some("EP1$u1")).is_empty());
        assert!(parse_play_url(Some("jsyun"), None).is_empty());
        assert!(parse_play_url(Some(""), Some("EP1$u1")).is_empty());
        assert!(parse_play_url(Some("jsyun"), Some("")).is_empty());
    }

    #[test]
    fn test_single_source() {
        let data = parse_play_url(
            Some("jsyun"),
            Some("第1集$https://example.com/1.mp4#第2集$https://example.com/2.mp4"),
        );

        assert_eq!(data.sources.len(), 1);
        assert_eq!(data.sources[0].name, "jsyun");
        assert_eq!(
            data.sources[0].episodes,
            vec![
                episode("第1集", "https://example.com/1.mp4"),
                episode("第2集", "https://example.com/2.mp4"),
            ]
        );
    }

    #[test]
    fn test_short_separator() {
        let data = parse_play_url(
            Some("jsyun$$jsm3u8"),
            Some("第1集$https://example.com/1.mp4#第2集$https://example.com/2.mp4$$第1集$https://example.com/m3u8/1.m3u8"),
        );

        assert_eq!(data.sources.len(), 2);
        assert_eq!(data.sources[0].name, "jsyun");
        assert_eq!(data.sources[0].episodes.len(), 2);
        assert_eq!(data.sources[1].name, "jsm3u8");
        assert_eq!(
            data.sources[1].episodes,
            vec![episode("第1集", "https://example.com/m3u8/1.m3u8")]
        );
    }

    #[test]
    fn test_long_separator_wins_over_short() {
        let data = parse_play_url(
            Some("jsyun$$$jsm3u8"),
            Some("EP1$https://a/1.mp4#EP2$https://a/2.mp4$$$EP1$https://b/1.m3u8#EP2$https://b/2.m3u8"),
        );

        assert_eq!(data.sources.len(), 2);
        assert_eq!(data.sources[1].name, "jsm3u8");
        assert_eq!(data.sources[1].episodes[0].url, "https://b/1.m3u8");
        // No stray `$` left over from splitting `$$$` as `$$`
        assert!(data
            .sources
            .iter()
            .all(|s| !s.name.contains('$') && s.episodes.iter().all(|e| !e.url.starts_with('$'))));
    }

    #[test]
    fn test_separator_detected_per_string() {
        let data = parse_play_url(Some("a$$$b"), Some("EP1$u1$$EP1$u2"));

        assert_eq!(data.sources.len(), 2);
        assert_eq!(data.sources[0].episodes, vec![episode("EP1", "u1")]);
        assert_eq!(data.sources[1].episodes, vec![episode("EP1", "u2")]);
    }

    #[test]
    fn test_missing_episode_group_drops_source() {
        let data = parse_play_url(Some("a$$b"), Some("1$u1#2$u2"));

        assert_eq!(data.sources.len(), 1);
        assert_eq!(data.sources[0].name, "a");
        assert_eq!(data.sources[0].episodes, vec![episode("1", "u1"), episode("2", "u2")]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let data = parse_play_url(Some(" a $$ b "), Some(" n1 $ u1 "));

        assert_eq!(data.sources.len(), 1);
        assert_eq!(data.sources[0].name, "a");
        assert_eq!(data.sources[0].episodes, vec![episode("n1", "u1")]);
    }

    #[test]
    fn test_malformed_episodes_are_dropped() {
        // Second group ("broken#EP$") has no usable URL, so source `b` goes away
        let data = parse_play_url(Some("a$$b"), Some("no-url#EP2$u2#EP3$   $$broken#EP$"));

        assert_eq!(data.sources.len(), 1);
        assert_eq!(data.sources[0].name, "a");
        assert_eq!(data.sources[0].episodes, vec![episode("EP2", "u2")]);
    }

    #[test]
    fn test_url_split_on_first_dollar_only() {
        let data = parse_play_url(Some("a"), Some("EP1$https://x/?k=$v"));

        assert_eq!(data.sources[0].episodes, vec![episode("EP1", "https://x/?k=$v")]);
    }

    #[test]
    fn test_empty_episode_name_is_kept() {
        let data = parse_play_url(Some("a"), Some("$https://x/1.mp4"));

        assert_eq!(data.sources[0].episodes, vec![episode("", "https://x/1.mp4")]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let from = Some("jsyun$$$jsm3u8");
        let url = Some("EP1$u1#EP2$u2$$$EP1$v1");

        assert_eq!(parse_play_url(from, url), parse_play_url(from, url));
    }
}
