//! Minimal XML-RPC codec
//!
//! Covers the value types NZBGet actually sends and accepts. Requests are
//! written with `quick-xml`'s writer; responses are read into a small element
//! tree with its reader and then interpreted.

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io;
use thiserror::Error;

/// An XML-RPC value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `<int>`, `<i4>` or `<i8>`
    Int(i64),
    /// `<boolean>`
    Bool(bool),
    /// `<string>` or an untyped value
    String(String),
    /// `<double>`
    Double(f64),
    /// `<base64>`, kept in its encoded form
    Base64(String),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>`, members in document order
    Struct(Vec<(String, Value)>),
    /// `<nil/>`
    Nil,
}

impl Value {
    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// String payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a struct member by name
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// Decoded `methodResponse`
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Successful call with its return value
    Value(Value),
    /// The server raised a fault
    Fault {
        /// `faultCode` member
        code: i64,
        /// `faultString` member
        message: String,
    },
}

/// Errors raised while decoding an XML-RPC document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document is not well-formed XML
    #[error("invalid XML: {0}")]
    Xml(String),

    /// The XML does not have the expected XML-RPC structure
    #[error("unexpected XML-RPC structure: {0}")]
    Structure(String),

    /// A scalar could not be parsed as its declared type
    #[error("invalid <{kind}> value '{text}'")]
    Scalar {
        /// Declared element type
        kind: String,
        /// Offending text
        text: String,
    },
}

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer
        .create_element("methodCall")
        .write_inner_content(|w| {
            w.create_element("methodName")
                .write_text_content(BytesText::new(method))?;
            w.create_element("params").write_inner_content(|w| {
                for param in params {
                    w.create_element("param")
                        .write_inner_content(|w| write_value(w, param))?;
                }
                Ok(())
            })?;
            Ok(())
        })?;

    String::from_utf8(writer.into_inner()).map_err(io::Error::other)
}

fn write_value<W: io::Write>(w: &mut Writer<W>, value: &Value) -> io::Result<()> {
    w.create_element("value").write_inner_content(|w| {
        match value {
            Value::Int(i) => {
                let tag = if i32::try_from(*i).is_ok() { "int" } else { "i8" };
                w.create_element(tag)
                    .write_text_content(BytesText::new(&i.to_string()))?;
            }
            Value::Bool(b) => {
                w.create_element("boolean")
                    .write_text_content(BytesText::new(if *b { "1" } else { "0" }))?;
            }
            Value::String(s) => {
                w.create_element("string")
                    .write_text_content(BytesText::new(s))?;
            }
            Value::Double(d) => {
                w.create_element("double")
                    .write_text_content(BytesText::new(&d.to_string()))?;
            }
            Value::Base64(s) => {
                w.create_element("base64")
                    .write_text_content(BytesText::new(s))?;
            }
            Value::Array(items) => {
                w.create_element("array").write_inner_content(|w| {
                    w.create_element("data").write_inner_content(|w| {
                        for item in items {
                            write_value(w, item)?;
                        }
                        Ok(())
                    })?;
                    Ok(())
                })?;
            }
            Value::Struct(members) => {
                w.create_element("struct").write_inner_content(|w| {
                    for (name, member) in members {
                        w.create_element("member").write_inner_content(|w| {
                            w.create_element("name")
                                .write_text_content(BytesText::new(name))?;
                            write_value(w, member)
                        })?;
                    }
                    Ok(())
                })?;
            }
            Value::Nil => {
                w.create_element("nil").write_empty()?;
            }
        }
        Ok(())
    })?;
    Ok(())
}

/// Decode a `methodResponse` document
pub fn decode_response(xml: &str) -> Result<Reply, DecodeError> {
    let root = parse_tree(xml)?;
    expect_name(&root, "methodResponse")?;

    if let Some(fault) = root.child("fault") {
        let value = decode_value(required_child(fault, "value")?)?;
        let code = value
            .member("faultCode")
            .and_then(Value::as_i64)
            .unwrap_or_default();
        let message = value
            .member("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(Reply::Fault { code, message });
    }

    let params = required_child(&root, "params")?;
    let param = required_child(params, "param")?;
    let value = decode_value(required_child(param, "value")?)?;
    Ok(Reply::Value(value))
}

/// Decode a `methodCall` document into its method name and parameters
pub fn decode_call(xml: &str) -> Result<(String, Vec<Value>), DecodeError> {
    let root = parse_tree(xml)?;
    expect_name(&root, "methodCall")?;

    let method = required_child(&root, "methodName")?.text.trim().to_string();
    let params = match root.child("params") {
        Some(params) => params
            .children
            .iter()
            .filter(|node| node.name == "param")
            .map(|param| decode_value(required_child(param, "value")?))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok((method, params))
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|node| node.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Node, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Node::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Node::new(e.name().as_ref())),
            Ok(Event::Empty(e)) => {
                let node = Node::new(e.name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(DecodeError::Xml("unbalanced closing tag".to_string()));
                }
                if let Some(node) = stack.pop()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.children.push(node);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| DecodeError::Xml(e.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                let raw = c.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DecodeError::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    if stack.len() != 1 {
        return Err(DecodeError::Xml("unclosed element".to_string()));
    }
    stack
        .pop()
        .and_then(|root| root.children.into_iter().next())
        .ok_or_else(|| DecodeError::Structure("empty document".to_string()))
}

fn expect_name(node: &Node, name: &str) -> Result<(), DecodeError> {
    if node.name == name {
        Ok(())
    } else {
        Err(DecodeError::Structure(format!(
            "expected <{}>, found <{}>",
            name, node.name
        )))
    }
}

fn required_child<'a>(node: &'a Node, name: &str) -> Result<&'a Node, DecodeError> {
    node.child(name).ok_or_else(|| {
        DecodeError::Structure(format!("<{}> has no <{}> child", node.name, name))
    })
}

fn decode_value(node: &Node) -> Result<Value, DecodeError> {
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };

    let text = typed.text.trim();
    let scalar_error = || DecodeError::Scalar {
        kind: typed.name.clone(),
        text: text.to_string(),
    };

    match typed.name.as_str() {
        "i4" | "int" | "i8" => text.parse().map(Value::Int).map_err(|_| scalar_error()),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            _ => Err(scalar_error()),
        },
        "string" => Ok(Value::String(typed.text.clone())),
        "double" => text.parse().map(Value::Double).map_err(|_| scalar_error()),
        "base64" => Ok(Value::Base64(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "dateTime.iso8601" => Ok(Value::String(text.to_string())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = required_child(typed, "data")?;
            data.children
                .iter()
                .filter(|node| node.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => typed
            .children
            .iter()
            .filter(|node| node.name == "member")
            .map(|member| -> Result<(String, Value), DecodeError> {
                let name = required_child(member, "name")?.text.trim().to_string();
                let value = decode_value(required_child(member, "value")?)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Struct),
        other => Err(DecodeError::Structure(format!(
            "unknown value type <{}>",
            other
        ))),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn response(value_xml: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><methodResponse><params><param><value>{}</value></param></params></methodResponse>",
            value_xml
        )
    }

    #[test]
    fn encodes_scalars_and_escapes_text() {
        let xml = encode_call(
            "append",
            &[
                Value::from("Show & Tell <1>.nzb"),
                Value::from(100),
                Value::from(true),
                Value::Int(i64::from(i32::MAX) + 1),
            ],
        )
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<methodName>append</methodName>"));
        assert!(xml.contains("<string>Show &amp; Tell &lt;1&gt;.nzb</string>"));
        assert!(xml.contains("<int>100</int>"));
        assert!(xml.contains("<boolean>1</boolean>"));
        assert!(xml.contains("<i8>2147483648</i8>"));
        assert!(xml.ends_with("</params></methodCall>"));
    }

    #[test]
    fn encodes_empty_params_and_nil() {
        let xml = encode_call("version", &[]).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><methodCall><methodName>version</methodName><params></params></methodCall>"
        );

        let xml = encode_call("echo", &[Value::Nil]).unwrap();
        assert!(xml.contains("<param><value><nil/></value></param>"));
    }

    #[test]
    fn call_survives_decode() {
        let params = vec![
            Value::from("name.nzb"),
            Value::from("tv"),
            Value::from(0),
            Value::from(false),
            Value::Array(vec![Value::from(1), Value::Nil]),
            Value::Struct(vec![("key".to_string(), Value::from("v"))]),
        ];
        let (method, decoded) = decode_call(&encode_call("appendurl", &params).unwrap()).unwrap();

        assert_eq!(method, "appendurl");
        assert_eq!(decoded, params);
    }

    #[test]
    fn decodes_typed_and_untyped_values() {
        assert_eq!(
            decode_response(&response("<boolean>1</boolean>")).unwrap(),
            Reply::Value(Value::Bool(true))
        );
        assert_eq!(
            decode_response(&response("<i4>42</i4>")).unwrap(),
            Reply::Value(Value::Int(42))
        );
        assert_eq!(
            decode_response(&response("21.1")).unwrap(),
            Reply::Value(Value::String("21.1".to_string()))
        );
        assert_eq!(
            decode_response(&response("<string>a &amp; b</string>")).unwrap(),
            Reply::Value(Value::String("a & b".to_string()))
        );
    }

    #[test]
    fn decodes_pretty_printed_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>
        <struct>
          <member><name>Version</name><value><string>21.1</string></value></member>
          <member><name>NZBID</name><value><i4>7</i4></value></member>
        </struct>
      </value>
    </param>
  </params>
</methodResponse>"#;

        let Reply::Value(value) = decode_response(xml).unwrap() else {
            panic!("expected a value");
        };
        assert_eq!(value.member("Version").and_then(Value::as_str), Some("21.1"));
        assert_eq!(value.member("NZBID").and_then(Value::as_i64), Some(7));
    }

    #[test]
    fn decodes_fault() {
        let xml = r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
  <member><name>faultCode</name><value><int>1</int></value></member>
  <member><name>faultString</name><value><string>Unauthorized</string></value></member>
</struct></value></fault></methodResponse>"#;

        assert_eq!(
            decode_response(xml).unwrap(),
            Reply::Fault {
                code: 1,
                message: "Unauthorized".to_string()
            }
        );
    }

    #[test]
    fn rejects_bad_scalar() {
        let err = decode_response(&response("<int>twelve</int>")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Scalar {
                kind: "int".to_string(),
                text: "twelve".to_string()
            }
        );
    }

    #[test]
    fn rejects_wrong_root_and_broken_xml() {
        assert!(matches!(
            decode_response("<html><body>502</body></html>"),
            Err(DecodeError::Structure(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse><params>"),
            Err(DecodeError::Xml(_))
        ));
        assert!(decode_response("").is_err());
    }
}
