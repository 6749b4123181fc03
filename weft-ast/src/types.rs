//! Token type tags and typed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::reference::parse_reference;

/// The type tag of a design token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Color,
    Dimension,
    Duration,
    Number,
    FontFamily,
    FontWeight,
    CubicBezier,
    StrokeStyle,
    Border,
    Transition,
    Shadow,
    Gradient,
    Typography,
}

impl TokenType {
    /// The camelCase tag as it appears in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Dimension => "dimension",
            Self::Duration => "duration",
            Self::Number => "number",
            Self::FontFamily => "fontFamily",
            Self::FontWeight => "fontWeight",
            Self::CubicBezier => "cubicBezier",
            Self::StrokeStyle => "strokeStyle",
            Self::Border => "border",
            Self::Transition => "transition",
            Self::Shadow => "shadow",
            Self::Gradient => "gradient",
            Self::Typography => "typography",
        }
    }

    /// Parse a document tag. Returns `None` for anything unrecognized.
    pub fn parse(tag: &str) -> Option<Self> {
        let ty = match tag {
            "color" => Self::Color,
            "dimension" => Self::Dimension,
            "duration" => Self::Duration,
            "number" => Self::Number,
            "fontFamily" => Self::FontFamily,
            "fontWeight" => Self::FontWeight,
            "cubicBezier" => Self::CubicBezier,
            "strokeStyle" => Self::StrokeStyle,
            "border" => Self::Border,
            "transition" => Self::Transition,
            "shadow" => Self::Shadow,
            "gradient" => Self::Gradient,
            "typography" => Self::Typography,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a `$type` tag is not one of the known token types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown token type '{0}'")]
pub struct UnknownTokenType(pub String);

impl FromStr for TokenType {
    type Err = UnknownTokenType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::parse(tag).ok_or_else(|| UnknownTokenType(tag.to_owned()))
    }
}

/// The payload of a typed value: either a concrete value or a whole-value
/// reference placeholder that has not been substituted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Reference(String),
    Value(Value),
}

impl Payload {
    /// Classify a raw `$value`: a string that is, in its entirety, a
    /// reference literal becomes a placeholder; everything else is concrete.
    pub fn from_raw(raw: Value) -> Self {
        if let Value::String(s) = &raw
            && parse_reference(s).is_some()
        {
            return Self::Reference(s.clone());
        }
        Self::Value(raw)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Reference(_) => None,
        }
    }

    /// The raw document form: the concrete value, or the reference literal
    /// as a JSON string.
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Reference(literal) => Value::String(literal.clone()),
        }
    }
}

/// A typed token value: one variant per [`TokenType`], each carrying either
/// a concrete payload or a reference placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum TokenValue {
    Color(Payload),
    Dimension(Payload),
    Duration(Payload),
    Number(Payload),
    FontFamily(Payload),
    FontWeight(Payload),
    CubicBezier(Payload),
    StrokeStyle(Payload),
    Border(Payload),
    Transition(Payload),
    Shadow(Payload),
    Gradient(Payload),
    Typography(Payload),
}

impl TokenValue {
    pub fn new(token_type: TokenType, payload: Payload) -> Self {
        match token_type {
            TokenType::Color => Self::Color(payload),
            TokenType::Dimension => Self::Dimension(payload),
            TokenType::Duration => Self::Duration(payload),
            TokenType::Number => Self::Number(payload),
            TokenType::FontFamily => Self::FontFamily(payload),
            TokenType::FontWeight => Self::FontWeight(payload),
            TokenType::CubicBezier => Self::CubicBezier(payload),
            TokenType::StrokeStyle => Self::StrokeStyle(payload),
            TokenType::Border => Self::Border(payload),
            TokenType::Transition => Self::Transition(payload),
            TokenType::Shadow => Self::Shadow(payload),
            TokenType::Gradient => Self::Gradient(payload),
            TokenType::Typography => Self::Typography(payload),
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Self::Color(_) => TokenType::Color,
            Self::Dimension(_) => TokenType::Dimension,
            Self::Duration(_) => TokenType::Duration,
            Self::Number(_) => TokenType::Number,
            Self::FontFamily(_) => TokenType::FontFamily,
            Self::FontWeight(_) => TokenType::FontWeight,
            Self::CubicBezier(_) => TokenType::CubicBezier,
            Self::StrokeStyle(_) => TokenType::StrokeStyle,
            Self::Border(_) => TokenType::Border,
            Self::Transition(_) => TokenType::Transition,
            Self::Shadow(_) => TokenType::Shadow,
            Self::Gradient(_) => TokenType::Gradient,
            Self::Typography(_) => TokenType::Typography,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            Self::Color(p)
            | Self::Dimension(p)
            | Self::Duration(p)
            | Self::Number(p)
            | Self::FontFamily(p)
            | Self::FontWeight(p)
            | Self::CubicBezier(p)
            | Self::StrokeStyle(p)
            | Self::Border(p)
            | Self::Transition(p)
            | Self::Shadow(p)
            | Self::Gradient(p)
            | Self::Typography(p) => p,
        }
    }
}
