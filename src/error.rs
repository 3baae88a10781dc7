use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArcadeError {
    #[error("speech recognition is not supported in this browser")]
    SpeechUnsupported,
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("{0} has not been initialised")]
    NotInitialized(&'static str),
    #[error("unknown {kind} {label:?}")]
    UnknownLabel { kind: &'static str, label: String },
    #[error("{context}: {message}")]
    Dom {
        context: &'static str,
        message: String,
    },
    #[error("{context} failed: {message}")]
    Js {
        context: &'static str,
        message: String,
    },
    #[error("could not encode {0} as JSON")]
    Encode(&'static str),
}

impl ArcadeError {
    pub(crate) fn dom(context: &'static str, message: impl Into<String>) -> Self {
        Self::Dom {
            context,
            message: message.into(),
        }
    }

    /// Wraps a thrown JS value; strings and `Error` objects keep their text.
    pub(crate) fn js(context: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js { context, message }
    }

    pub(crate) fn unknown(kind: &'static str, label: &str) -> Self {
        Self::UnknownLabel {
            kind,
            label: label.to_owned(),
        }
    }
}

impl From<ArcadeError> for JsValue {
    fn from(err: ArcadeError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ArcadeError::SpeechUnsupported.to_string(),
            "speech recognition is not supported in this browser"
        );
        assert_eq!(
            ArcadeError::dom("canvas", "missing 2d context").to_string(),
            "canvas: missing 2d context"
        );
        assert_eq!(
            ArcadeError::unknown("difficulty", "expert").to_string(),
            "unknown difficulty \"expert\""
        );
        assert_eq!(
            ArcadeError::NotInitialized("sentence drill").to_string(),
            "sentence drill has not been initialised"
        );
    }
}
