//! NZBGet call shapes by server version
//!
//! NZBGet changed the signature of `append` several times. The shape is picked
//! from the leading integer of the `version` reply:
//!
//! | version | method               | returns | notes                                  |
//! |---------|----------------------|---------|----------------------------------------|
//! | 0       | `append`             | bool    | no priority, no dedupe, inline only    |
//! | 1..=11  | `append`/`appendurl` | bool    | priority + dedupe after the content    |
//! | 12      | `append`/`appendurl` | bool    | adds the AddPaused slot before dedupe  |
//! | 13+     | `append`             | NZBID   | content or URL share one slot          |

use super::job::{DUPE_MODE, JobPlan};
use super::xmlrpc::Value;
use crate::error::DispatchError;
use serde::Serialize;

/// Parse the leading integer of a version string (`"12.1"` → 12)
///
/// Anything that is not a non-negative integer before the first `.` parses
/// as 0, which selects the legacy shape.
pub fn parse_version(version: &str) -> u32 {
    let major = match version.find('.') {
        Some(dot) => &version[..dot],
        None => version,
    };
    major.trim().parse().unwrap_or(0)
}

/// Signature of the `append` call to send
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// Version 0: `append(name, category, add_to_top, content)`
    Legacy,
    /// Versions 1 to 11: `append(name, category, priority, add_to_top, content, dupe_key, dupe_score, dupe_mode)`
    Classic,
    /// Version 12: `append(name, category, priority, add_to_top, content, add_paused, dupe_key, dupe_score, dupe_mode)`
    Modern,
    /// Version 13+: `append(name, content_or_url, category, priority, add_to_top, add_paused, dupe_key, dupe_score, dupe_mode)`
    Combined,
}

/// Payload in the form the remote will receive it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// Base64-encoded NZB document
    Data(String),
    /// URL for the remote to fetch
    Url(String),
}

/// Successful submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Accepted {
    /// Call shape that was used
    pub shape: CallShape,
    /// Queue id assigned by NZBGet 13+
    pub nzb_id: Option<i64>,
}

impl CallShape {
    /// Select the call shape for a parsed server version
    pub fn for_version(version: u32) -> Self {
        match version {
            0 => CallShape::Legacy,
            1..=11 => CallShape::Classic,
            12 => CallShape::Modern,
            13.. => CallShape::Combined,
        }
    }

    /// The server can fetch a URL itself
    pub fn supports_url(&self) -> bool {
        !matches!(self, CallShape::Legacy)
    }

    /// The server returns a queue id instead of a boolean
    pub fn returns_id(&self) -> bool {
        matches!(self, CallShape::Combined)
    }

    /// Remote method name for this shape and payload
    pub fn method(&self, content: &Content) -> &'static str {
        match (self, content) {
            (CallShape::Classic | CallShape::Modern, Content::Url(_)) => "appendurl",
            _ => "append",
        }
    }

    /// Positional parameters for this shape
    ///
    /// `Legacy` expects [`Content::Data`]; callers fetch URLs before reaching
    /// this point.
    pub fn params(&self, plan: &JobPlan, content: &Content) -> Vec<Value> {
        let payload = match content {
            Content::Data(data) => Value::from(data.as_str()),
            Content::Url(url) => Value::from(url.as_str()),
        };
        let name = Value::from(plan.name.as_str());
        let category = Value::from(plan.category.as_str());
        let dupe = [
            Value::from(plan.dupe_key.as_str()),
            Value::from(plan.dupe_score),
            Value::from(DUPE_MODE),
        ];

        match self {
            CallShape::Legacy => vec![name, category, Value::from(plan.add_to_top), payload],
            CallShape::Classic => {
                let mut params = vec![
                    name,
                    category,
                    Value::from(plan.priority),
                    Value::from(plan.add_to_top),
                    payload,
                ];
                params.extend(dupe);
                params
            }
            CallShape::Modern => {
                let mut params = vec![
                    name,
                    category,
                    Value::from(plan.priority),
                    Value::from(plan.add_to_top),
                    payload,
                    Value::from(false),
                ];
                params.extend(dupe);
                params
            }
            CallShape::Combined => {
                let mut params = vec![
                    name,
                    payload,
                    category,
                    Value::from(plan.priority),
                    Value::from(plan.add_to_top),
                    Value::from(false),
                ];
                params.extend(dupe);
                params
            }
        }
    }

    /// Turn the remote's return value into an outcome
    pub fn interpret(&self, reply: &Value, name: &str) -> Result<Accepted, DispatchError> {
        if self.returns_id() {
            let id = reply.as_i64().ok_or_else(|| {
                DispatchError::UnexpectedReply(format!("expected an NZBID, got {:?}", reply))
            })?;
            if id > 0 {
                Ok(Accepted {
                    shape: *self,
                    nzb_id: Some(id),
                })
            } else {
                Err(DispatchError::Rejected {
                    name: name.to_string(),
                })
            }
        } else {
            let queued = reply.as_bool().ok_or_else(|| {
                DispatchError::UnexpectedReply(format!("expected a boolean, got {:?}", reply))
            })?;
            if queued {
                Ok(Accepted {
                    shape: *self,
                    nzb_id: None,
                })
            } else {
                Err(DispatchError::Rejected {
                    name: name.to_string(),
                })
            }
        }
    }
}
