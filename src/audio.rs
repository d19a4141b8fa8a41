//! Turn text into audio and audio into text.

use derive_builder::Builder;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::client::Client;
use crate::ApiResult;

/// Fixed part filename for uploaded audio; the server only uses the
/// extension to sniff the container format.
const UPLOAD_FILE_NAME: &str = "audio.webm";

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
}

/// Request to synthesize audio from input text.
#[derive(Serialize, Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "SpeechRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct SpeechRequest {
    /// One of the available TTS models, e.g. `tts-1` or `tts-1-hd`.
    pub model: String,
    /// The text to synthesize. At most 4096 tokens.
    pub input: String,
    pub voice: Voice,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub response_format: Option<SpeechFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub speed: Option<f32>,
}

impl SpeechRequest {
    pub fn builder(
        model: impl Into<String>,
        input: impl Into<String>,
        voice: Voice,
    ) -> SpeechRequestBuilder {
        SpeechRequestBuilder::create_empty()
            .model(model)
            .input(input)
            .voice(voice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Json,
    Text,
    Srt,
    VerboseJson,
    Vtt,
}

impl TranscriptFormat {
    fn as_str(&self) -> &'static str {
        match self {
            TranscriptFormat::Json => "json",
            TranscriptFormat::Text => "text",
            TranscriptFormat::Srt => "srt",
            TranscriptFormat::VerboseJson => "verbose_json",
            TranscriptFormat::Vtt => "vtt",
        }
    }
}

/// Request to transcribe an in-memory audio file into its own language.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "TranscriptionRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct TranscriptionRequest {
    pub file: Vec<u8>,
    /// Only `whisper-1` is currently available.
    #[builder(default = "\"whisper-1\".to_string()")]
    pub model: String,

    /// ISO-639-1 language of the input audio; improves accuracy and latency.
    #[builder(default)]
    pub language: Option<String>,

    /// Optional text to guide the model's style or continue a previous
    /// audio segment.
    #[builder(default)]
    pub prompt: Option<String>,

    #[builder(default = "TranscriptFormat::Json")]
    pub response_format: TranscriptFormat,

    #[builder(default)]
    pub temperature: Option<f32>,
}

impl TranscriptionRequest {
    pub fn builder(file: Vec<u8>) -> TranscriptionRequestBuilder {
        TranscriptionRequestBuilder::create_empty().file(file)
    }
}

/// Request to translate an in-memory audio file into English.
#[derive(Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "TranslationRequestBuilder")]
#[builder(setter(strip_option, into))]
pub struct TranslationRequest {
    pub file: Vec<u8>,
    #[builder(default = "\"whisper-1\".to_string()")]
    pub model: String,

    #[builder(default)]
    pub prompt: Option<String>,

    #[builder(default = "TranscriptFormat::Json")]
    pub response_format: TranscriptFormat,

    #[builder(default)]
    pub temperature: Option<f32>,
}

impl TranslationRequest {
    pub fn builder(file: Vec<u8>) -> TranslationRequestBuilder {
        TranslationRequestBuilder::create_empty().file(file)
    }
}

impl Client {
    /// Synthesizes audio from text, returning the raw audio bytes in the
    /// requested format.
    pub async fn create_speech(&self, request: &SpeechRequest) -> ApiResult<Vec<u8>> {
        self.post_bytes("audio/speech", request).await
    }

    /// Transcribes audio into its input language. The response body is
    /// returned verbatim; its shape follows `response_format`.
    pub async fn create_transcription(&self, request: &TranscriptionRequest) -> ApiResult<String> {
        let mut form = Form::new()
            .part(
                "file",
                Part::bytes(request.file.clone()).file_name(UPLOAD_FILE_NAME),
            )
            .text("model", request.model.clone())
            .text("response_format", request.response_format.as_str());
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(temperature) = request.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        self.post_multipart_text("audio/transcriptions", form).await
    }

    /// Translates audio into English.
    pub async fn create_translation(&self, request: &TranslationRequest) -> ApiResult<String> {
        let mut form = Form::new()
            .part(
                "file",
                Part::bytes(request.file.clone()).file_name(UPLOAD_FILE_NAME),
            )
            .text("model", request.model.clone())
            .text("response_format", request.response_format.as_str());
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(temperature) = request.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        self.post_multipart_text("audio/translations", form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_request_serializes_voice_lowercase() {
        let request = SpeechRequest::builder("tts-1", "Hello there", Voice::Echo)
            .build()
            .unwrap();
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["voice"], "echo");
        assert!(encoded.get("speed").is_none());
    }

    #[test]
    fn transcription_defaults() {
        let request = TranscriptionRequest::builder(vec![1, 2, 3]).build().unwrap();
        assert_eq!(request.model, "whisper-1");
        assert_eq!(request.response_format, TranscriptFormat::Json);
        assert!(request.language.is_none());
    }
}
