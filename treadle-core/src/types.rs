use crate::error::{TreadleError, TreadleResult};

/// Argument and return values crossing the chain boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    Number(i64),
    Float(f64),
    Boolean(bool),
    Empty,
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Text(_) => "text",
            ArgValue::Number(_) => "number",
            ArgValue::Float(_) => "float",
            ArgValue::Boolean(_) => "boolean",
            ArgValue::Empty => "empty",
        }
    }

    pub fn stringify(&self) -> String {
        match self {
            ArgValue::Text(v) => v.to_string(),
            ArgValue::Number(v) => v.to_string(),
            ArgValue::Float(v) => v.to_string(),
            ArgValue::Boolean(v) => v.to_string(),
            ArgValue::Empty => "".to_string(),
        }
    }
}

impl TryInto<String> for ArgValue {
    type Error = TreadleError;
    fn try_into(self) -> TreadleResult<String> {
        match self {
            ArgValue::Text(v) => Ok(v),
            other => Err(TreadleError::argument("text", other.type_name())),
        }
    }
}

impl TryInto<i64> for ArgValue {
    type Error = TreadleError;
    fn try_into(self) -> TreadleResult<i64> {
        match self {
            ArgValue::Number(v) => Ok(v),
            other => Err(TreadleError::argument("number", other.type_name())),
        }
    }
}

impl TryInto<f64> for ArgValue {
    type Error = TreadleError;
    fn try_into(self) -> TreadleResult<f64> {
        match self {
            ArgValue::Float(v) => Ok(v),
            other => Err(TreadleError::argument("float", other.type_name())),
        }
    }
}

impl TryInto<bool> for ArgValue {
    type Error = TreadleError;
    fn try_into(self) -> TreadleResult<bool> {
        match self {
            ArgValue::Boolean(v) => Ok(v),
            other => Err(TreadleError::argument("boolean", other.type_name())),
        }
    }
}
