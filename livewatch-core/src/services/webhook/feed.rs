// File: livewatch-core/src/services/webhook/feed.rs

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::Error;

/// The two fields a hub notification is good for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub video_id: String,
    pub channel_id: String,
}

#[derive(Clone, Copy)]
enum Field {
    VideoId,
    ChannelId,
}

/// Extracts the first `<entry>` of an Atom push notification.
///
/// `Ok(None)` for a well-formed feed without an entry (deletion notices look
/// like that). Malformed XML, or an entry missing either id, is
/// `Error::InvalidPayload`. Elements are matched by local name so the `yt:`
/// prefix is not hard-wired.
pub fn parse_notification(body: &str) -> Result<Option<FeedEntry>, Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut in_entry = false;
    let mut entry_seen = false;
    let mut field: Option<Field> = None;
    let mut video_id: Option<String> = None;
    let mut channel_id: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::InvalidPayload(format!("malformed XML at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => {
                depth += 1;
                saw_root = true;
                let local = start.local_name();
                if !entry_seen && local.as_ref() == b"entry" {
                    in_entry = true;
                    entry_seen = true;
                } else if in_entry {
                    field = match local.as_ref() {
                        b"videoId" => Some(Field::VideoId),
                        b"channelId" => Some(Field::ChannelId),
                        _ => None,
                    };
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                if in_entry && end.local_name().as_ref() == b"entry" {
                    in_entry = false;
                }
                field = None;
            }
            Event::Empty(_) => {
                saw_root = true;
            }
            Event::Text(text) => {
                if depth == 0 {
                    if text.iter().all(|b| b.is_ascii_whitespace()) {
                        continue;
                    }
                    return Err(Error::InvalidPayload("text outside of the root element".into()));
                }
                if let Some(f) = field {
                    let value = text
                        .unescape()
                        .map_err(|e| Error::InvalidPayload(format!("bad text in entry: {}", e)))?
                        .trim()
                        .to_string();
                    let slot = match f {
                        Field::VideoId => &mut video_id,
                        Field::ChannelId => &mut channel_id,
                    };
                    if slot.is_none() && !value.is_empty() {
                        *slot = Some(value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(Error::InvalidPayload("no root element".into()));
    }
    if depth != 0 {
        return Err(Error::InvalidPayload("document ends inside an element".into()));
    }
    if !entry_seen {
        return Ok(None);
    }

    match (video_id, channel_id) {
        (Some(video_id), Some(channel_id)) => Ok(Some(FeedEntry { video_id, channel_id })),
        (None, _) => Err(Error::InvalidPayload("entry has no videoId".into())),
        (_, None) => Err(Error::InvalidPayload("entry has no channelId".into())),
    }
}
