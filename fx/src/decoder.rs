//! Reference-rate feed decoding.
//!
//! The feed nests three levels of `Cube` elements inside an envelope:
//!
//! ```xml
//! <gesmes:Envelope>
//!   <gesmes:subject>Reference rates</gesmes:subject>
//!   <gesmes:Sender><gesmes:name>European Central Bank</gesmes:name></gesmes:Sender>
//!   <Cube>
//!     <Cube time="2024-01-15">
//!       <Cube currency="USD" rate="1.0945"/>
//!     </Cube>
//!   </Cube>
//! </gesmes:Envelope>
//! ```
//!
//! Elements are matched on their local name, so namespace prefixes are ignored.

use std::str::FromStr;

use eurofx_common::{Currency, ExchangeRate, RateDate};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rust_decimal::Decimal;

use crate::error::{FeedError, FeedResult};

/// Decoded feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub subject: String,
    pub sender: String,
    pub cubes: Vec<Cube>,
}

/// All rates published for one date, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    pub date: RateDate,
    pub exchanges: Vec<ExchangeRate>,
}

/// Element currently open in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Envelope,
    Subject,
    Sender,
    SenderName,
    DateCube,
    Other,
}

/// Decode a raw feed document.
///
/// Nothing is returned unless the whole document is well formed, so a
/// truncated download never yields a partial envelope.
pub fn decode(raw: &[u8]) -> FeedResult<Envelope> {
    let text = std::str::from_utf8(raw).map_err(decode_error)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut envelope = Envelope::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(e) => {
                let frame = open_element(&e, &stack, &mut envelope, &mut seen_root)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                open_element(&e, &stack, &mut envelope, &mut seen_root)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) => {
                let value = t.unescape().map_err(decode_error)?;
                match stack.last() {
                    Some(Frame::Subject) => envelope.subject.push_str(&value),
                    Some(Frame::SenderName) => envelope.sender.push_str(&value),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(FeedError::Decode("missing Envelope root element".to_string()));
    }
    if !stack.is_empty() {
        return Err(FeedError::Decode(format!(
            "unexpected end of document with {} unclosed element(s)",
            stack.len()
        )));
    }

    Ok(envelope)
}

/// Handle an opening (or self-closing) tag and return the frame it opens.
fn open_element(
    e: &BytesStart<'_>,
    stack: &[Frame],
    envelope: &mut Envelope,
    seen_root: &mut bool,
) -> FeedResult<Frame> {
    let parent = stack.last().copied();

    if parent.is_none() {
        if e.local_name().as_ref() != b"Envelope" || *seen_root {
            return Err(FeedError::Decode(format!(
                "unexpected root element <{}>",
                String::from_utf8_lossy(e.name().as_ref())
            )));
        }
        *seen_root = true;
        return Ok(Frame::Envelope);
    }

    let frame = match (parent, e.local_name().as_ref()) {
        (Some(Frame::Envelope), b"subject") => Frame::Subject,
        (Some(Frame::Envelope), b"Sender") => Frame::Sender,
        (Some(Frame::Sender), b"name") => Frame::SenderName,
        (_, b"Cube") => {
            if let Some(date) = attribute(e, "time")? {
                let date = RateDate::parse(&date).map_err(decode_error)?;
                envelope.cubes.push(Cube {
                    date,
                    exchanges: Vec::new(),
                });
                Frame::DateCube
            } else if let Some(code) = attribute(e, "currency")? {
                if parent != Some(Frame::DateCube) {
                    return Err(FeedError::Decode(format!(
                        "rate for {code} outside a dated Cube"
                    )));
                }
                let rate = attribute(e, "rate")?
                    .ok_or_else(|| FeedError::Decode(format!("missing rate for {code}")))?;
                let exchange = ExchangeRate::new(
                    Currency::parse(&code).map_err(decode_error)?,
                    Decimal::from_str(rate.trim()).map_err(|err| {
                        FeedError::Decode(format!("invalid rate {rate:?} for {code}: {err}"))
                    })?,
                );
                if let Some(cube) = envelope.cubes.last_mut() {
                    cube.exchanges.push(exchange);
                }
                Frame::Other
            } else {
                Frame::Other
            }
        }
        _ => Frame::Other,
    };

    Ok(frame)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> FeedResult<Option<String>> {
    match e.try_get_attribute(name).map_err(decode_error)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(decode_error)?.into_owned())),
        None => Ok(None),
    }
}

fn decode_error(err: impl std::fmt::Display) -> FeedError {
    FeedError::Decode(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<gesmes:Sender>
		<gesmes:name>European Central Bank</gesmes:name>
	</gesmes:Sender>
	<Cube>
		<Cube time="2024-01-15">
			<Cube currency="USD" rate="1.0945"/>
			<Cube currency="JPY" rate="160.13"/>
		</Cube>
		<Cube time="2024-01-12">
			<Cube currency="USD" rate="1.0942"/>
			<Cube currency="XXX" rate="2.5"/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

    #[test]
    fn test_decode_feed() {
        let envelope = decode(FEED.as_bytes()).unwrap();

        assert_eq!(envelope.subject, "Reference rates");
        assert_eq!(envelope.sender, "European Central Bank");
        assert_eq!(envelope.cubes.len(), 2);

        let first = &envelope.cubes[0];
        assert_eq!(first.date.as_str(), "2024-01-15");
        assert_eq!(
            first.exchanges,
            vec![
                ExchangeRate::new(Currency::usd(), dec!(1.0945)),
                ExchangeRate::new(Currency::jpy(), dec!(160.13)),
            ]
        );

        assert_eq!(envelope.cubes[1].exchanges.len(), 2);
    }

    #[test]
    fn test_decode_empty_date_cube() {
        let feed = r#"<Envelope><Cube><Cube time="2024-01-15"/></Cube></Envelope>"#;

        let envelope = decode(feed.as_bytes()).unwrap();

        assert_eq!(envelope.cubes.len(), 1);
        assert!(envelope.cubes[0].exchanges.is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        let truncated = &FEED[..FEED.len() / 2];

        let result = decode(truncated.as_bytes());

        assert!(matches!(result, Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_mismatched_tags() {
        let feed = "<Envelope><Cube></Envelope></Cube>";
        assert!(matches!(decode(feed.as_bytes()), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_root() {
        let feed = "<html><body>Service unavailable</body></html>";
        assert!(matches!(decode(feed.as_bytes()), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(decode(b""), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_invalid_rate() {
        let feed = r#"<Envelope><Cube><Cube time="2024-01-15"><Cube currency="USD" rate="n/a"/></Cube></Cube></Envelope>"#;
        assert!(matches!(decode(feed.as_bytes()), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_invalid_date() {
        let feed = r#"<Envelope><Cube><Cube time="15/01/2024"/></Cube></Envelope>"#;
        assert!(matches!(decode(feed.as_bytes()), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_rate_outside_date_cube() {
        let feed = r#"<Envelope><Cube><Cube currency="USD" rate="1.1"/></Cube></Envelope>"#;
        assert!(matches!(decode(feed.as_bytes()), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(matches!(decode(&[0x3c, 0xff, 0xfe]), Err(FeedError::Decode(_))));
    }
}
