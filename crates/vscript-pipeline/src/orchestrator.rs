//! Generation orchestrator.
//!
//! Sequences one request: validate → resolve caller account → check quota →
//! extract transcripts → analyze → load intelligence → generate → persist →
//! respond. Per-video extraction failures degrade into warnings; everything
//! from analysis onward is request-fatal on error.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};
use validator::Validate;

use vscript_llm::{analyze_patterns, generate_scripts, LanguageModel};
use vscript_models::script::filter_complete;
use vscript_models::{
    quota_reset_date, CallerAccount, GenerateRequest, GenerateResponse, GenerationRecord,
    PatternAnalysis, PlatformTag, ScriptVariant, Transcription, UsageInfo, VideoReference,
};
use vscript_store::GenerationStore;
use vscript_transcript::{placeholder_transcript, Transcript, TranscriptExtractor};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::intelligence::load_intelligence;

/// Identity resolved for a request. Anonymous callers bypass quota and
/// persistence entirely.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    Session { id: String, email: String },
}

/// Per-video extraction outcome, before warnings are attached.
enum VideoOutcome {
    Transcribed {
        platform: PlatformTag,
        transcript: Transcript,
    },
    UnrecognizedPlatform,
}

/// The generation pipeline, wired to its collaborators once at startup.
pub struct GenerationPipeline {
    config: PipelineConfig,
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn GenerationStore>,
    extractor: TranscriptExtractor,
}

impl GenerationPipeline {
    pub fn new(
        config: PipelineConfig,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn GenerationStore>,
        extractor: TranscriptExtractor,
    ) -> Self {
        Self {
            config,
            model,
            store,
            extractor,
        }
    }

    /// Handle one generation request end to end.
    pub async fn handle(
        &self,
        caller: Caller,
        request: GenerateRequest,
    ) -> PipelineResult<GenerateResponse> {
        // Validation is local and immediate: no collaborator is touched for
        // a malformed request.
        request
            .validate()
            .map_err(|e| PipelineError::validation(e.to_string()))?;

        let account = self.resolve_account(&caller).await?;

        if let Some(account) = &account {
            self.check_quota(account)?;
        }

        let mut warnings: Vec<String> = Vec::new();
        let references: Vec<VideoReference> = request
            .usable_references()
            .into_iter()
            .cloned()
            .collect();

        // No-reference mode is a first-class path: with no usable URLs both
        // extraction and analysis are skipped and `analysis` stays None.
        let mut analysis: Option<PatternAnalysis> = None;
        if !references.is_empty() {
            let transcriptions = self.extract_transcripts(&references, &mut warnings).await;
            let usable: Vec<Transcription> = transcriptions
                .into_iter()
                .filter(Transcription::is_usable)
                .collect();

            if usable.is_empty() {
                warnings.push(
                    "No reference video could be processed; scripts were generated from the \
                     theme and history only."
                        .to_string(),
                );
            } else {
                analysis = Some(analyze_patterns(self.model.as_ref(), &usable).await?);
            }
        } else {
            info!("No reference videos supplied, generating without analysis");
        }

        let intelligence = match &account {
            Some(account) => load_intelligence(self.store.as_ref(), &account.id).await,
            None => None,
        };

        let variants = generate_scripts(
            self.model.as_ref(),
            analysis.as_ref(),
            &request.theme,
            &request.settings,
            request.production_constraints.as_deref(),
            intelligence.as_ref(),
        )
        .await?;
        // Second validity pass at the orchestrator boundary; idempotent.
        let variants = filter_complete(variants);

        let (request_id, usage) = self.persist(&account, &request, &variants, &analysis).await?;

        info!(
            request_id = %request_id,
            variants = variants.len(),
            warnings = warnings.len(),
            no_reference = analysis.is_none(),
            "Generation complete"
        );

        Ok(GenerateResponse {
            request_id,
            timestamp: Utc::now(),
            analysis,
            variants,
            warnings: if warnings.is_empty() {
                None
            } else {
                Some(warnings)
            },
            usage,
        })
    }

    /// Map the resolved session onto a stored caller account.
    async fn resolve_account(&self, caller: &Caller) -> PipelineResult<Option<CallerAccount>> {
        match caller {
            Caller::Session { email, .. } => {
                let account = self
                    .store
                    .find_caller_by_email(email)
                    .await
                    .map_err(|e| PipelineError::unexpected(format!("account lookup: {e}")))?
                    .ok_or_else(|| {
                        PipelineError::Unauthenticated("no account for this session".to_string())
                    })?;
                Ok(Some(account))
            }
            Caller::Anonymous if self.config.require_caller => Err(PipelineError::Unauthenticated(
                "sign in to generate scripts".to_string(),
            )),
            Caller::Anonymous => Ok(None),
        }
    }

    /// Advisory quota pre-check. No slot is reserved while the generation is
    /// in flight, so a concurrent burst from one caller can transiently
    /// overshoot the ceiling.
    fn check_quota(&self, account: &CallerAccount) -> PipelineResult<()> {
        let limit = self.config.monthly_generation_limit;
        if account.generations_used >= limit {
            return Err(PipelineError::QuotaExceeded {
                used: account.generations_used,
                limit,
                reset_at: quota_reset_date(account.period_start),
            });
        }
        Ok(())
    }

    /// Extract all reference videos concurrently with isolated failure: one
    /// video's panic or classification failure never aborts the batch.
    async fn extract_transcripts(
        &self,
        references: &[VideoReference],
        warnings: &mut Vec<String>,
    ) -> Vec<Transcription> {
        let handles: Vec<_> = references
            .iter()
            .map(|reference| {
                let extractor = self.extractor.clone();
                let reference = reference.clone();
                tokio::spawn(async move { extract_one(extractor, reference).await })
            })
            .collect();

        let mut transcriptions = Vec::with_capacity(references.len());
        for (reference, joined) in references.iter().zip(join_all(handles).await) {
            let url = reference.url.trim();
            match joined {
                Ok(VideoOutcome::Transcribed {
                    platform,
                    transcript,
                }) => {
                    if transcript.fallback {
                        if transcript.is_usable() {
                            warnings.push(format!(
                                "Video \"{url}\" has no captions; analysis was based on the \
                                 video title and may be less precise."
                            ));
                        } else {
                            warnings.push(format!(
                                "Video \"{url}\" has no captions and no retrievable metadata; \
                                 it was skipped."
                            ));
                        }
                    }
                    transcriptions.push(Transcription::new(platform, transcript.text));
                }
                Ok(VideoOutcome::UnrecognizedPlatform) => {
                    warn!(url, "Reference video is not from a supported platform");
                    warnings.push(format!(
                        "Video \"{url}\" is not from a supported platform; it was skipped."
                    ));
                }
                Err(e) => {
                    error!(url, error = %e, "Transcript extraction task failed");
                    warnings.push(format!(
                        "Video \"{url}\" could not be processed; it was skipped."
                    ));
                }
            }
        }
        transcriptions
    }

    /// Persist the record and bump the quota counter for known callers; both
    /// writes complete before the response is assembled. Anonymous
    /// generations are never saved and never counted.
    async fn persist(
        &self,
        account: &Option<CallerAccount>,
        request: &GenerateRequest,
        variants: &[ScriptVariant],
        analysis: &Option<PatternAnalysis>,
    ) -> PipelineResult<(String, UsageInfo)> {
        let limit = self.config.monthly_generation_limit;
        match account {
            Some(account) => {
                let record = GenerationRecord::new(
                    &account.id,
                    request.theme.clone(),
                    request.settings.clone(),
                    variants.to_vec(),
                    analysis.clone(),
                );
                self.store
                    .create_generation_record(&record)
                    .await
                    .map_err(|e| PipelineError::unexpected(format!("persist record: {e}")))?;
                self.store
                    .increment_quota(&account.id)
                    .await
                    .map_err(|e| PipelineError::unexpected(format!("increment quota: {e}")))?;

                let used = account.generations_used + 1;
                Ok((
                    record.id,
                    UsageInfo {
                        used,
                        limit,
                        remaining: limit.saturating_sub(used),
                    },
                ))
            }
            None => Ok((
                uuid::Uuid::new_v4().to_string(),
                UsageInfo {
                    used: 0,
                    limit,
                    remaining: limit,
                },
            )),
        }
    }
}

/// Classify and extract one reference video. Runs inside its own task.
async fn extract_one(extractor: TranscriptExtractor, reference: VideoReference) -> VideoOutcome {
    let platform = match reference.platform {
        Some(platform) => platform,
        None => match PlatformTag::identify(&reference.url) {
            Ok(platform) => platform,
            Err(_) => return VideoOutcome::UnrecognizedPlatform,
        },
    };

    let transcript = match platform {
        PlatformTag::Youtube => extractor.extract(&reference.url).await,
        other => placeholder_transcript(other),
    };

    VideoOutcome::Transcribed {
        platform,
        transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use vscript_llm::{LlmError, LlmResult};
    use vscript_models::{
        GenerationSettings, PrimaryPlatform, ThemeInput, ThemeKind, VideoDuration,
    };
    use vscript_store::MemoryStore;
    use vscript_transcript::{CaptionFragment, CaptionSource, TranscriptError, VideoMetadata};
    use vscript_transcript::TranscriptResult;

    /// Model that replays scripted responses and counts calls.
    struct ScriptedModel {
        responses: Mutex<VecDeque<LlmResult<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<LlmResult<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> LlmResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::provider("no scripted response left")))
        }
    }

    /// Caption source with fixed behavior for every video id.
    struct FixedSource {
        captions: Option<Vec<CaptionFragment>>,
        metadata: Option<VideoMetadata>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn with_captions(text: &str) -> Self {
            Self {
                captions: Some(vec![CaptionFragment {
                    start_ms: 0,
                    text: text.to_string(),
                }]),
                metadata: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn unavailable() -> Self {
            Self {
                captions: None,
                metadata: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CaptionSource for FixedSource {
        async fn fetch_captions(&self, video_id: &str) -> TranscriptResult<Vec<CaptionFragment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.captions
                .clone()
                .ok_or_else(|| TranscriptError::CaptionsUnavailable(video_id.to_string()))
        }

        async fn fetch_metadata(&self, video_id: &str) -> TranscriptResult<VideoMetadata> {
            self.metadata
                .clone()
                .ok_or_else(|| TranscriptError::MetadataUnavailable(video_id.to_string()))
        }
    }

    const ANALYSIS_JSON: &str =
        r#"{"videos_analyzed": 1, "hook_patterns": [{"type": "question"}]}"#;
    const SCRIPTS_JSON: &str = r#"[
        {"id": "s1", "adherence_score": 9.0,
         "hook": {"text": "h"}, "body": {"text": "b"}, "cta": {"text": "c"}},
        {"id": "s2", "adherence_score": 8.2,
         "hook": {"text": "h"}, "body": {"text": "b"}, "cta": {"text": "c"}}
    ]"#;

    fn request(videos: Vec<&str>) -> GenerateRequest {
        GenerateRequest {
            video_references: videos
                .into_iter()
                .map(|url| VideoReference {
                    url: url.to_string(),
                    platform: None,
                })
                .collect(),
            theme: ThemeInput {
                kind: ThemeKind::Description,
                content: "launch campaign for a fitness app".to_string(),
                target_audience: None,
                objective: None,
            },
            settings: GenerationSettings {
                variant_count: 5,
                video_duration: VideoDuration::Standard,
                primary_platform: PrimaryPlatform::All,
            },
            production_constraints: None,
        }
    }

    fn pipeline(
        config: PipelineConfig,
        model: Arc<ScriptedModel>,
        store: Arc<MemoryStore>,
        source: Arc<FixedSource>,
    ) -> GenerationPipeline {
        GenerationPipeline::new(config, model, store, TranscriptExtractor::new(source))
    }

    async fn seeded_store(used: u32) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let mut account = CallerAccount::new("u1", "user@example.com");
        account.generations_used = used;
        store.upsert_account(account).await;
        Arc::new(store)
    }

    fn session() -> Caller {
        Caller::Session {
            id: "sess-1".to_string(),
            email: "user@example.com".to_string(),
        }
    }

    const YT_URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_successful_generation_persists_and_increments() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ANALYSIS_JSON.to_string()),
            Ok(SCRIPTS_JSON.to_string()),
        ]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::with_captions("caption text"));
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store.clone(), source);

        let response = pipeline.handle(session(), request(vec![YT_URL])).await.unwrap();

        assert_eq!(model.call_count(), 2);
        assert!(response.analysis.is_some());
        assert_eq!(response.variants.len(), 2);
        assert!(response.warnings.is_none());
        assert_eq!(response.usage.used, 1);
        assert_eq!(response.usage.remaining, response.usage.limit - 1);
        assert_eq!(store.record_count("u1").await, 1);
        assert_eq!(store.generations_used("u1").await, Some(1));
    }

    #[tokio::test]
    async fn test_quota_exceeded_makes_no_model_calls() {
        let limit = 4;
        let model = Arc::new(ScriptedModel::new(vec![]));
        let store = seeded_store(limit).await;
        let source = Arc::new(FixedSource::with_captions("text"));
        let config = PipelineConfig {
            monthly_generation_limit: limit,
            ..Default::default()
        };
        let pipeline = pipeline(config, model.clone(), store.clone(), source.clone());

        let err = pipeline.handle(session(), request(vec![YT_URL])).await.unwrap_err();

        match err {
            PipelineError::QuotaExceeded { used, limit, reset_at } => {
                assert_eq!(used, 4);
                assert_eq!(limit, 4);
                assert!(reset_at > Utc::now());
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        assert_eq!(model.call_count(), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.record_count("u1").await, 0);
        assert_eq!(store.generations_used("u1").await, Some(limit));
    }

    #[tokio::test]
    async fn test_short_theme_is_rejected_before_any_call() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::with_captions("text"));
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source.clone());

        let mut req = request(vec![YT_URL]);
        req.theme.content = "nineteen chars long".to_string();
        assert_eq!(req.theme.content.chars().count(), 19);

        let err = pipeline.handle(session(), req).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(model.call_count(), 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_reference_mode_reaches_success() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(SCRIPTS_JSON.to_string())]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source);

        let response = pipeline.handle(session(), request(vec![])).await.unwrap();

        // Only the generation call happened; analysis was skipped entirely.
        assert_eq!(model.call_count(), 1);
        assert!(response.analysis.is_none());
        assert_eq!(response.variants.len(), 2);
        assert!(response.warnings.is_none());
    }

    #[tokio::test]
    async fn test_all_extractions_empty_degrades_to_no_reference() {
        // Captions disabled and no metadata: the video contributes nothing,
        // analysis is skipped, generation still proceeds.
        let model = Arc::new(ScriptedModel::new(vec![Ok(SCRIPTS_JSON.to_string())]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source);

        let response = pipeline.handle(session(), request(vec![YT_URL])).await.unwrap();

        assert_eq!(model.call_count(), 1);
        assert!(response.analysis.is_none());
        let warnings = response.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains(YT_URL)));
        assert!(warnings.iter().any(|w| w.contains("No reference video")));
    }

    #[tokio::test]
    async fn test_unrecognized_platform_is_a_per_video_skip() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ANALYSIS_JSON.to_string()),
            Ok(SCRIPTS_JSON.to_string()),
        ]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::with_captions("caption text"));
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source);

        let response = pipeline
            .handle(session(), request(vec!["https://vimeo.com/123", YT_URL]))
            .await
            .unwrap();

        assert!(response.analysis.is_some());
        let warnings = response.warnings.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("vimeo.com/123"));
    }

    #[tokio::test]
    async fn test_non_youtube_platforms_use_placeholder_text() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ANALYSIS_JSON.to_string()),
            Ok(SCRIPTS_JSON.to_string()),
        ]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source.clone());

        let response = pipeline
            .handle(
                session(),
                request(vec!["https://www.tiktok.com/@user/video/123"]),
            )
            .await
            .unwrap();

        // Placeholder text is usable, so analysis ran without touching the
        // caption service.
        assert!(response.analysis.is_some());
        assert!(response.warnings.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_anonymous_generation_is_never_persisted() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(SCRIPTS_JSON.to_string())]));
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model, store.clone(), source);

        let response = pipeline
            .handle(Caller::Anonymous, request(vec![]))
            .await
            .unwrap();

        assert_eq!(response.usage.used, 0);
        assert_eq!(store.record_count("u1").await, 0);
        assert!(!response.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_require_caller_rejects_anonymous() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(FixedSource::unavailable());
        let config = PipelineConfig {
            require_caller: true,
            ..Default::default()
        };
        let pipeline = pipeline(config, model.clone(), store, source);

        let err = pipeline
            .handle(Caller::Anonymous, request(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Unauthenticated(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_session_without_account_is_unauthenticated() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model, store, source);

        let err = pipeline.handle(session(), request(vec![])).await.unwrap_err();
        assert!(matches!(err, PipelineError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_billing_failure_maps_to_its_own_variant() {
        let model = Arc::new(ScriptedModel::new(vec![Err(LlmError::provider(
            "400: Your credit balance is too low to access the API",
        ))]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model, store.clone(), source);

        let err = pipeline.handle(session(), request(vec![])).await.unwrap_err();
        assert!(matches!(err, PipelineError::ProviderBilling(_)));
        // Nothing was persisted and no quota was spent on the failure.
        assert_eq!(store.record_count("u1").await, 0);
        assert_eq!(store.generations_used("u1").await, Some(0));
    }

    #[tokio::test]
    async fn test_malformed_analysis_is_request_fatal() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("not json at all".to_string())]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::with_captions("caption text"));
        let pipeline = pipeline(PipelineConfig::default(), model.clone(), store, source);

        let err = pipeline.handle(session(), request(vec![YT_URL])).await.unwrap_err();
        assert!(matches!(err, PipelineError::ModelOutputMalformed(_)));
        // The generation call never happened.
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_variant_list_is_a_valid_success() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("[]".to_string())]));
        let store = seeded_store(0).await;
        let source = Arc::new(FixedSource::unavailable());
        let pipeline = pipeline(PipelineConfig::default(), model, store.clone(), source);

        let response = pipeline.handle(session(), request(vec![])).await.unwrap();
        assert!(response.variants.is_empty());
        // The empty result is still persisted and counted.
        assert_eq!(store.record_count("u1").await, 1);
        assert_eq!(store.generations_used("u1").await, Some(1));
    }
}
