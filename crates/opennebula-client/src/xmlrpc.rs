//! Minimal XML-RPC codec.
//!
//! Covers what the OpenNebula API needs: scalar values, arrays and structs
//! in both directions, plus `<fault>` responses. Untyped `<value>text</value>`
//! decodes as a string.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::error::{ClientError, ClientResult};

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `<int>`, `<i4>` or `<i8>`.
    Int(i64),
    /// `<boolean>`.
    Boolean(bool),
    /// `<string>` or untyped text.
    String(String),
    /// `<double>`.
    Double(f64),
    /// `<array>`.
    Array(Vec<Value>),
    /// `<struct>`.
    Struct(BTreeMap<String, Value>),
    /// `<nil/>`.
    Nil,
}

impl Value {
    /// Borrow the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Array payload.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Self::Int(i) => {
                let _ = write!(out, "<i8>{i}</i8>");
            },
            Self::Boolean(b) => {
                let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
            },
            Self::String(s) => {
                let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
            },
            Self::Double(d) => {
                let _ = write!(out, "<double>{d}</double>");
            },
            Self::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            },
            Self::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            },
            Self::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Encode a `<methodCall>` document.
#[must_use]
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Decode a `<methodResponse>` document into its single return value.
///
/// # Errors
///
/// Returns [`ClientError::Fault`] when the response carries a `<fault>`, and
/// [`ClientError::MalformedResponse`] when the document is not XML-RPC.
pub fn decode_response(body: &str) -> ClientResult<Value> {
    let mut reader = Reader::from_str(body);

    let mut in_fault = false;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => match e.name().as_ref() {
                b"fault" => in_fault = true,
                b"value" => {
                    let value = read_value(&mut reader)?;
                    return if in_fault { Err(fault_from(&value)) } else { Ok(value) };
                },
                _ => {},
            },
            Event::Eof => {
                return Err(ClientError::MalformedResponse(
                    "response contains no <value>".to_owned(),
                ));
            },
            _ => {},
        }
    }
}

fn fault_from(value: &Value) -> ClientError {
    let Value::Struct(members) = value else {
        return ClientError::MalformedResponse("<fault> does not hold a struct".to_owned());
    };
    ClientError::Fault {
        code: members.get("faultCode").and_then(Value::as_i64).unwrap_or_default(),
        message: members
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
    }
}

fn malformed(e: impl std::fmt::Display) -> ClientError {
    ClientError::MalformedResponse(e.to_string())
}

/// Read the content of a `<value>` whose start tag was just consumed,
/// including its end tag.
fn read_value(reader: &mut Reader<&[u8]>) -> ClientResult<Value> {
    // Untyped content is a string, kept verbatim. Before a typed child it
    // may only be layout whitespace.
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(malformed)?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(e) if e.name().as_ref() == b"value" => return Ok(Value::String(text)),
            Event::Start(e) => {
                ensure_layout(&text)?;
                let tag = e.name().as_ref().to_vec();
                let value = match tag.as_slice() {
                    b"array" => read_array(reader)?,
                    b"struct" => read_struct(reader)?,
                    scalar => {
                        let text = read_text(reader, scalar)?;
                        parse_scalar(scalar, &text)?
                    },
                };
                expect_end(reader, b"value")?;
                return Ok(value);
            },
            Event::Empty(e) => {
                ensure_layout(&text)?;
                let value = match e.name().as_ref() {
                    b"nil" => Value::Nil,
                    b"array" => Value::Array(Vec::new()),
                    b"struct" => Value::Struct(BTreeMap::new()),
                    scalar => parse_scalar(scalar, "")?,
                };
                expect_end(reader, b"value")?;
                return Ok(value);
            },
            Event::Eof => return Err(malformed("unexpected end of document inside <value>")),
            _ => {},
        }
    }
}

fn ensure_layout(text: &str) -> ClientResult<()> {
    if text.trim().is_empty() {
        Ok(())
    } else {
        Err(malformed(format!("text '{}' next to a typed value", text.trim())))
    }
}

fn read_array(reader: &mut Reader<&[u8]>) -> ClientResult<Value> {
    let mut items = Vec::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) if e.name().as_ref() == b"value" => items.push(read_value(reader)?),
            Event::Start(e) if e.name().as_ref() == b"data" => {},
            Event::Empty(e) if e.name().as_ref() == b"data" => {},
            Event::End(e) if e.name().as_ref() == b"data" => {},
            Event::End(e) if e.name().as_ref() == b"array" => return Ok(Value::Array(items)),
            Event::Eof => return Err(malformed("unexpected end of document inside <array>")),
            _ => {},
        }
    }
}

fn read_struct(reader: &mut Reader<&[u8]>) -> ClientResult<Value> {
    let mut members = BTreeMap::new();
    let mut name: Option<String> = None;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) if e.name().as_ref() == b"name" => {
                name = Some(read_text(reader, b"name")?);
            },
            Event::Start(e) if e.name().as_ref() == b"value" => {
                let value = read_value(reader)?;
                let key = name
                    .take()
                    .ok_or_else(|| malformed("struct member without <name>"))?;
                members.insert(key, value);
            },
            Event::End(e) if e.name().as_ref() == b"struct" => return Ok(Value::Struct(members)),
            Event::Eof => return Err(malformed("unexpected end of document inside <struct>")),
            _ => {},
        }
    }
}

/// Collect text and CDATA up to the closing `tag`.
fn read_text(reader: &mut Reader<&[u8]>, tag: &[u8]) -> ClientResult<String> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(malformed)?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(e) if e.name().as_ref() == tag => return Ok(text),
            Event::Eof => return Err(malformed("unexpected end of document inside scalar")),
            other => {
                return Err(malformed(format!(
                    "unexpected {other:?} inside <{}>",
                    String::from_utf8_lossy(tag)
                )));
            },
        }
    }
}

fn expect_end(reader: &mut Reader<&[u8]>, tag: &[u8]) -> ClientResult<()> {
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::End(e) if e.name().as_ref() == tag => return Ok(()),
            Event::Comment(_) => {},
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {},
            other => {
                return Err(malformed(format!(
                    "expected </{}>, found {other:?}",
                    String::from_utf8_lossy(tag)
                )));
            },
        }
    }
}

fn parse_scalar(tag: &[u8], text: &str) -> ClientResult<Value> {
    let value = match tag {
        b"int" | b"i4" | b"i8" => Value::Int(
            text.trim()
                .parse()
                .map_err(|_| malformed(format!("'{text}' is not an integer")))?,
        ),
        b"boolean" => match text.trim() {
            "1" => Value::Boolean(true),
            "0" => Value::Boolean(false),
            other => return Err(malformed(format!("'{other}' is not an XML-RPC boolean"))),
        },
        b"double" => Value::Double(
            text.trim()
                .parse()
                .map_err(|_| malformed(format!("'{text}' is not a double")))?,
        ),
        b"string" | b"dateTime.iso8601" | b"base64" => Value::String(text.to_owned()),
        b"nil" => Value::Nil,
        other => {
            return Err(malformed(format!(
                "unsupported value type <{}>",
                String::from_utf8_lossy(other)
            )));
        },
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_call_escapes_params() {
        let xml = encode_call(
            "one.system.version",
            &[Value::from("oneadmin:p<&>w"), Value::from(-1_i64), Value::from(true)],
        );
        assert!(xml.contains("<methodName>one.system.version</methodName>"));
        assert!(xml.contains("<string>oneadmin:p&lt;&amp;&gt;w</string>"));
        assert!(xml.contains("<i8>-1</i8>"));
        assert!(xml.contains("<boolean>1</boolean>"));
    }

    #[test]
    fn test_decode_opennebula_success_array() {
        let body = r#"<?xml version="1.0"?>
            <methodResponse>
              <params><param><value><array><data>
                <value><boolean>1</boolean></value>
                <value><string>6.8.0</string></value>
                <value><i4>0</i4></value>
              </data></array></value></param></params>
            </methodResponse>"#;

        let value = decode_response(body).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_bool(), Some(true));
        assert_eq!(items[1].as_str(), Some("6.8.0"));
        assert_eq!(items[2].as_i64(), Some(0));
    }

    #[test]
    fn test_decode_untyped_and_escaped_text() {
        let body = "<methodResponse><params><param><value>&lt;VM&gt;</value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), Value::String("<VM>".to_owned()));

        let body = "<methodResponse><params><param><value><string><![CDATA[<VM/>]]></string></value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), Value::String("<VM/>".to_owned()));
    }

    #[test]
    fn test_decode_keeps_string_whitespace() {
        let body = "<methodResponse><params><param>\n  <value>\n    <string>  padded \n</string>\n  </value>\n</param></params></methodResponse>";
        assert_eq!(
            decode_response(body).unwrap(),
            Value::String("  padded \n".to_owned())
        );

        let body = "<methodResponse><params><param><value> untyped </value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), Value::String(" untyped ".to_owned()));

        let body = "<methodResponse><params><param><value>junk<int>1</int></value></param></params></methodResponse>";
        assert!(matches!(decode_response(body), Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_struct() {
        let body = r"<methodResponse><params><param><value><struct>
              <member><name>id</name><value><int>7</int></value></member>
              <member><name>ratio</name><value><double>0.5</double></value></member>
            </struct></value></param></params></methodResponse>";

        let Value::Struct(members) = decode_response(body).unwrap() else {
            panic!("expected struct");
        };
        assert_eq!(members["id"], Value::Int(7));
        assert_eq!(members["ratio"], Value::Double(0.5));
    }

    #[test]
    fn test_decode_fault() {
        let body = r"<methodResponse><fault><value><struct>
              <member><name>faultCode</name><value><int>4</int></value></member>
              <member><name>faultString</name><value><string>Too many parameters.</string></value></member>
            </struct></value></fault></methodResponse>";

        match decode_response(body) {
            Err(ClientError::Fault { code, message }) => {
                assert_eq!(code, 4);
                assert_eq!(message, "Too many parameters.");
            },
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_non_xmlrpc() {
        assert!(matches!(
            decode_response("<html><body>Bad Gateway</body></html>"),
            Err(ClientError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse><params><param><value><boolean>yes</boolean></value></param></params></methodResponse>"),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
