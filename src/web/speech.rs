use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{SpeechRecognition, SpeechRecognitionEvent, SpeechSynthesis, SpeechSynthesisUtterance};

use crate::error::ArcadeError;
use crate::speech::{SPEECH_LOCALE, SpeechEvent, SpeechSink, SpeechSource};

/// Routes recognizer output to whichever engine owns the source.
pub(crate) type SpeechDispatch = fn(SpeechEvent);

const RECOGNITION_CONSTRUCTORS: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];

/// Browser speech recognizer, prefixed or not.
pub(crate) struct WebRecognition {
    recognition: SpeechRecognition,
    _onresult: Closure<dyn FnMut(SpeechRecognitionEvent)>,
    _onend: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut(JsValue)>,
}

impl WebRecognition {
    pub(crate) fn new(
        dispatch: SpeechDispatch,
        continuous: bool,
        interim_results: bool,
    ) -> Result<Self, ArcadeError> {
        let win = web_sys::window().ok_or_else(|| ArcadeError::dom("window", "no global window"))?;
        let ctor = RECOGNITION_CONSTRUCTORS
            .iter()
            .filter_map(|name| js_sys::Reflect::get(&win, &JsValue::from_str(name)).ok())
            .find_map(|value| value.dyn_into::<js_sys::Function>().ok())
            .ok_or(ArcadeError::SpeechUnsupported)?;
        let recognition: SpeechRecognition = js_sys::Reflect::construct(&ctor, &js_sys::Array::new())
            .map_err(|e| ArcadeError::js("new SpeechRecognition", e))?
            .unchecked_into();

        recognition.set_lang(SPEECH_LOCALE);
        recognition
            .set_continuous(continuous)
            .map_err(|e| ArcadeError::js("recognition.continuous", e))?;
        recognition.set_interim_results(interim_results);

        let onresult = Closure::wrap(Box::new(move |event: SpeechRecognitionEvent| {
            let Some(results) = event.results() else {
                return;
            };
            let mut interim = String::new();
            for i in event.result_index()..results.length() {
                let Some(result) = results.get(i) else {
                    continue;
                };
                let Some(text) = result.get(0).map(|alt| alt.transcript()) else {
                    continue;
                };
                if result.is_final() {
                    dispatch(SpeechEvent::Transcript { text, is_final: true });
                } else {
                    interim.push_str(&text);
                }
            }
            if !interim.is_empty() {
                dispatch(SpeechEvent::Transcript {
                    text: interim,
                    is_final: false,
                });
            }
        }) as Box<dyn FnMut(SpeechRecognitionEvent)>);

        let onend = Closure::wrap(Box::new(move || dispatch(SpeechEvent::SessionEnded)) as Box<dyn FnMut()>);

        let onerror = Closure::wrap(Box::new(move |event: JsValue| {
            let reason = js_sys::Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown".to_owned());
            dispatch(SpeechEvent::Error(reason));
        }) as Box<dyn FnMut(JsValue)>);

        recognition.set_onresult(Some(onresult.as_ref().unchecked_ref()));
        recognition.set_onend(Some(onend.as_ref().unchecked_ref()));
        recognition.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(Self {
            recognition,
            _onresult: onresult,
            _onend: onend,
            _onerror: onerror,
        })
    }
}

impl SpeechSource for WebRecognition {
    fn start(&mut self) -> Result<(), ArcadeError> {
        self.recognition
            .start()
            .map_err(|e| ArcadeError::js("recognition.start", e))
    }

    fn stop(&mut self) {
        self.recognition.stop();
    }

    fn abort(&mut self) {
        self.recognition.abort();
    }
}

impl Drop for WebRecognition {
    fn drop(&mut self) {
        self.recognition.set_onresult(None);
        self.recognition.set_onend(None);
        self.recognition.set_onerror(None);
        self.recognition.abort();
    }
}

/// `speechSynthesis` in the recognizer's locale. Silently does nothing when
/// the browser has no synthesizer.
pub(crate) struct WebSynthesis {
    synth: Option<SpeechSynthesis>,
}

impl WebSynthesis {
    pub(crate) fn new() -> Self {
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("speech synthesis unavailable");
        }
        Self { synth }
    }
}

impl SpeechSink for WebSynthesis {
    fn speak(&mut self, text: &str) {
        let Some(synth) = &self.synth else {
            return;
        };
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => {
                utterance.set_lang(SPEECH_LOCALE);
                synth.speak(&utterance);
            }
            Err(e) => log::warn!("{}", ArcadeError::js("SpeechSynthesisUtterance", e)),
        }
    }

    fn cancel(&mut self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
