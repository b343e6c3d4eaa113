//! Caching synthesis layer.
//!
//! Audio is keyed by md5(text + mood tag): the same line spoken in the
//! same mood is synthesized once, written to the audio directory and
//! served by reference afterwards. The backend is only invoked on a
//! cache miss.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use niyati_core::{Mood, SpeechSynthesizer};

use crate::elevenlabs::TtsBackend;
use crate::voice::settings_for;
use crate::TtsError;

/// Cache key for a (text, mood) pair.
pub fn cache_key(text: &str, mood: Mood) -> String {
    format!("{:x}", md5::compute(format!("{}{}", text, mood.as_str())))
}

/// Mood-aware synthesizer with a blob cache in front of the backend.
pub struct VoiceSynth {
    backend: Arc<dyn TtsBackend>,
    /// key -> serveable reference, for blobs written this process.
    cache: DashMap<String, String>,
    audio_dir: PathBuf,
}

impl VoiceSynth {
    /// Create the synthesizer and its audio directory.
    pub fn new(backend: Arc<dyn TtsBackend>, audio_dir: impl Into<PathBuf>) -> Result<Self, TtsError> {
        let audio_dir = audio_dir.into();
        std::fs::create_dir_all(&audio_dir)?;
        Ok(Self {
            backend,
            cache: DashMap::new(),
            audio_dir,
        })
    }

    pub fn audio_dir(&self) -> &PathBuf {
        &self.audio_dir
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Synthesize or reuse the blob for this (text, mood) pair and
    /// return its "/audio/{key}.mp3" reference.
    pub async fn synthesize_cached(&self, text: &str, mood: Mood) -> Result<String, TtsError> {
        let key = cache_key(text, mood);
        if let Some(url) = self.cache.get(&key) {
            tracing::debug!(%key, "voice cache hit");
            return Ok(url.clone());
        }

        let file_name = format!("{}.mp3", key);
        let path = self.audio_dir.join(&file_name);
        let url = format!("/audio/{}", file_name);

        // A blob from a previous run may already be on disk.
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let settings = settings_for(mood);
            let bytes = self.backend.synthesize(text, &settings).await?;
            tokio::fs::write(&path, &bytes).await?;
            tracing::debug!(%key, bytes = bytes.len(), mood = %mood, "synthesized voice blob");
        }

        self.cache.insert(key, url.clone());
        Ok(url)
    }
}

#[async_trait]
impl SpeechSynthesizer for VoiceSynth {
    async fn synthesize(&self, text: &str, mood: Mood) -> niyati_core::Result<String> {
        self.synthesize_cached(text, mood)
            .await
            .map_err(niyati_core::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TtsBackend for CountingBackend {
        async fn synthesize(
            &self,
            _text: &str,
            _settings: &VoiceSettings,
        ) -> Result<Vec<u8>, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; 16])
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl TtsBackend for FailingBackend {
        async fn synthesize(
            &self,
            _text: &str,
            _settings: &VoiceSettings,
        ) -> Result<Vec<u8>, TtsError> {
            Err(TtsError::Api("HTTP 500: boom".to_string()))
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("niyati-tts-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_cache_key_depends_on_text_and_mood() {
        let a = cache_key("hello", Mood::Happy);
        let b = cache_key("hello", Mood::Sad);
        let c = cache_key("hello!", Mood::Happy);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, cache_key("hello", Mood::Happy));
        // md5 hex digest.
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn test_second_synthesis_skips_backend() {
        let backend = Arc::new(CountingBackend::new());
        let synth = VoiceSynth::new(backend.clone(), temp_dir()).unwrap();

        let first = synth.synthesize_cached("chai time", Mood::Happy).await.unwrap();
        let second = synth.synthesize_cached("chai time", Mood::Happy).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_mood_is_a_different_blob() {
        let backend = Arc::new(CountingBackend::new());
        let synth = VoiceSynth::new(backend.clone(), temp_dir()).unwrap();

        let happy = synth.synthesize_cached("chai time", Mood::Happy).await.unwrap();
        let sad = synth.synthesize_cached("chai time", Mood::Sad).await.unwrap();

        assert_ne!(happy, sad);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reference_shape_and_blob_on_disk() {
        let dir = temp_dir();
        let backend = Arc::new(CountingBackend::new());
        let synth = VoiceSynth::new(backend, dir.clone()).unwrap();

        let url = synth.synthesize_cached("namaste", Mood::Neutral).await.unwrap();
        assert!(url.starts_with("/audio/"));
        assert!(url.ends_with(".mp3"));

        let file_name = url.trim_start_matches("/audio/");
        assert!(dir.join(file_name).exists());
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces() {
        let synth = VoiceSynth::new(Arc::new(FailingBackend), temp_dir()).unwrap();
        let result = synth.synthesize_cached("hello", Mood::Happy).await;
        assert!(matches!(result, Err(TtsError::Api(_))));
        assert_eq!(synth.cached_count(), 0);
    }
}
