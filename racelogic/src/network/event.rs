use serde::{Deserialize, Serialize};
use std::fmt;

/// EventValue is a single argument of an event. Player names travel as `Str`, flags as `Bool`,
/// physical quantities as `Float`, and counters (laps, milliseconds) as `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

impl EventValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventValue::Bool(x) => Some(*x),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i32> {
        match self {
            EventValue::Int(x) => Some(*x),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            EventValue::Float(x) => Some(*x),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::Str(x) => Some(x),
            _ => None,
        }
    }
    /// type_name is used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            EventValue::Bool(_) => "bool",
            EventValue::Int(_) => "int",
            EventValue::Float(_) => "float",
            EventValue::Str(_) => "string",
        }
    }
}

impl From<bool> for EventValue {
    fn from(x: bool) -> Self {
        EventValue::Bool(x)
    }
}

impl From<i32> for EventValue {
    fn from(x: i32) -> Self {
        EventValue::Int(x)
    }
}

impl From<f64> for EventValue {
    fn from(x: f64) -> Self {
        EventValue::Float(x)
    }
}

impl From<&str> for EventValue {
    fn from(x: &str) -> Self {
        EventValue::Str(x.to_owned())
    }
}

impl From<String> for EventValue {
    fn from(x: String) -> Self {
        EventValue::Str(x)
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventValue::Bool(x) => write!(f, "{}", x),
            EventValue::Int(x) => write!(f, "{}", x),
            EventValue::Float(x) => write!(f, "{:.4}", x),
            EventValue::Str(x) => write!(f, "\"{}\"", x),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode event {name}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode event")]
    Decode(#[source] serde_json::Error),
    #[error("event name {0:?} is not scoped (expected \"<scope>:<kind>\")")]
    UnscopedName(String),
}

/// Event is the unit of communication between participants: a colon-scoped name such as
/// `race:car_state_change` plus an ordered argument list whose layout is fixed per event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    #[serde(default)]
    args: Vec<EventValue>,
}

impl Event {
    pub fn new(name: &str) -> Event {
        Event {
            name: name.to_owned(),
            args: vec![],
        }
    }

    pub fn with_args(name: &str, args: Vec<EventValue>) -> Event {
        Event {
            name: name.to_owned(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method returns the scope of the event name, i.e. the part in front of the first colon
    /// (`general` or `race` for all known events).
    pub fn scope(&self) -> &str {
        self.name.split(':').next().unwrap_or("")
    }

    pub fn args(&self) -> &[EventValue] {
        &self.args
    }

    pub fn arg(&self, idx: usize) -> Option<&EventValue> {
        self.args.get(idx)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn add_arg<T: Into<EventValue>>(&mut self, value: T) -> &mut Event {
        self.args.push(value.into());
        self
    }

    /// The method encodes the event as a JSON string. Floats are written in their shortest
    /// round-trip representation, i.e. decoding yields bit-identical values.
    pub fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|source| CodecError::Encode {
            name: self.name.to_owned(),
            source,
        })
    }

    pub fn decode(data: &str) -> Result<Event, CodecError> {
        let event: Event = serde_json::from_str(data).map_err(CodecError::Decode)?;

        if !event.name.contains(':') {
            return Err(CodecError::UnscopedName(event.name));
        }

        Ok(event)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;

        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }

        write!(f, ")")
    }
}
