//! SOAP 1.1 envelope codec (C1, §4.1, §6).
//!
//! Encoding wraps a typed request in the fixed envelope shell below;
//! decoding walks the reply with a streaming reader just far enough to
//! isolate the `<soap:Body>` element's inner content as raw bytes,
//! then binds that content to the caller's response type. The two
//! steps fail independently (§4.1, §7): an unparsable envelope is
//! [`EnvelopeError::Malformed`], a well-formed envelope whose body
//! doesn't match the caller's schema is [`EnvelopeError::SchemaBind`].
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Body>…kind-specific element…</soap:Body>
//! </soap:Envelope>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EnvelopeError;

const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Encode `body` into a full SOAP 1.1 request: the POST payload bytes,
/// content type `text/xml; charset=utf-8`, and the non-empty
/// `SOAPAction` header value the caller must also send (§6).
pub fn encode_envelope<T: Serialize>(body: &T) -> Result<Vec<u8>, EnvelopeError> {
    let inner = quick_xml::se::to_string(body)?;
    let envelope = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<soap:Envelope xmlns:soap=\"{SOAP_NS}\"><soap:Body>{inner}</soap:Body></soap:Envelope>"
    );
    Ok(envelope.into_bytes())
}

/// Decode a SOAP reply, extracting the `<soap:Body>` contents and
/// binding them to `T`.
pub fn decode_envelope<T: DeserializeOwned>(xml: &[u8]) -> Result<T, EnvelopeError> {
    let inner = extract_body(xml)?;
    quick_xml::de::from_str(&inner).map_err(|e| EnvelopeError::SchemaBind(e.to_string()))
}

/// Walk the envelope with a streaming reader and return the raw bytes
/// between the open and close tags of the body element, regardless of
/// which namespace prefix the remote used for `soap:Body` (some
/// providers use `soapenv:`, `s:`, or no prefix with a default xmlns).
fn extract_body(xml: &[u8]) -> Result<String, EnvelopeError> {
    let text = std::str::from_utf8(xml).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text = true;

    let mut depth_in_body: Option<i32> = None;
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) if depth_in_body.is_none() && local_name_is(e.name().as_ref(), "Body") => {
                depth_in_body = Some(0);
            }
            Event::End(ref e) if depth_in_body == Some(0) && local_name_is(e.name().as_ref(), "Body") => {
                return if captured.is_empty() {
                    Err(EnvelopeError::Malformed("soap:Body was empty".into()))
                } else {
                    Ok(captured)
                };
            }
            _ if depth_in_body.is_some() => {
                append_raw(&mut captured, &event);
                if matches!(event, Event::Start(_)) {
                    depth_in_body = depth_in_body.map(|d| d + 1);
                } else if matches!(event, Event::End(_)) {
                    depth_in_body = depth_in_body.map(|d| d - 1);
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Err(EnvelopeError::Malformed("no soap:Body element found".into()))
}

fn local_name_is(qualified: &[u8], local: &str) -> bool {
    let qualified = std::str::from_utf8(qualified).unwrap_or_default();
    qualified == local || qualified.ends_with(&format!(":{local}"))
}

fn append_raw(out: &mut String, event: &Event) {
    match event {
        Event::Start(e) | Event::Empty(e) => {
            out.push('<');
            out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
            for attr in e.attributes().flatten() {
                out.push(' ');
                out.push_str(&String::from_utf8_lossy(attr.key.as_ref()));
                out.push_str("=\"");
                out.push_str(&String::from_utf8_lossy(&attr.value));
                out.push('"');
            }
            out.push('>');
        }
        Event::End(e) => {
            out.push_str("</");
            out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
            out.push('>');
        }
        Event::Text(t) => out.push_str(&t.unescape().unwrap_or_default()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename = "SubmitRequest")]
    struct SampleRequest {
        #[serde(rename = "EmployerId")]
        employer_id: String,
        #[serde(rename = "Amount")]
        amount: String,
    }

    /// Testable property #2 (§8): decoding what we just encoded yields
    /// the same value back.
    #[test]
    fn envelope_round_trip() {
        let request = SampleRequest {
            employer_id: "12345678".into(),
            amount: "100.00".into(),
        };
        let encoded = encode_envelope(&request).unwrap();
        assert!(std::str::from_utf8(&encoded).unwrap().contains("soap:Envelope"));
        let decoded: SampleRequest = decode_envelope(&encoded).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn missing_body_is_malformed_not_schema_error() {
        let xml = b"<?xml version=\"1.0\"?><soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"></soap:Envelope>";
        let err = decode_envelope::<SampleRequest>(xml).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed(_)));
    }

    #[test]
    fn body_present_but_wrong_schema_is_schema_bind_error() {
        let xml = b"<?xml version=\"1.0\"?><soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body><Unrelated>x</Unrelated></soap:Body></soap:Envelope>";
        let err = decode_envelope::<SampleRequest>(xml).unwrap_err();
        assert!(matches!(err, EnvelopeError::SchemaBind(_)));
    }

    #[test]
    fn tolerates_alternate_body_prefix() {
        let xml = br#"<?xml version="1.0"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><SubmitRequest><EmployerId>1</EmployerId><Amount>1.00</Amount></SubmitRequest></soapenv:Body></soapenv:Envelope>"#;
        let decoded: SampleRequest = decode_envelope(xml).unwrap();
        assert_eq!(decoded.employer_id, "1");
    }
}
