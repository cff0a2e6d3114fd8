use std::path::Path;

use image::DynamicImage;
use tokio_util::sync::CancellationToken;

use crate::api::EffectsApi;
use crate::download::{DownloadManager, DownloadOutcome};
use crate::error::PipelineError;
use crate::job::{GenerationRecord, Job, JobStatus, PollConfig, poll_until_done};
use crate::resolve::resolve;
use crate::storage::StorageClient;
use crate::ui::UiSink;

/// The single, process-wide pipeline state.
///
/// Owned exclusively by the orchestrator and mutated only through its entry
/// points; presentation helpers never touch it. Invariants: an active job
/// implies an uploaded URL; a result URL implies the job that produced it
/// completed.
#[derive(Default)]
struct PipelineState {
    uploaded_url: Option<String>,
    active_job: Option<Job>,
    result_url: Option<String>,
    /// Best-effort decoded copy of the presented result. Enables the
    /// re-encode download fallback when the raw fetch is blocked.
    rendered: Option<DynamicImage>,
}

/// Sequences upload, submission, polling, resolution and download per user
/// action, maps failures to user-visible messages, and drives UI state
/// transitions through a [`UiSink`].
pub struct PipelineOrchestrator<A> {
    api: A,
    storage: StorageClient,
    downloads: DownloadManager,
    poll_config: PollConfig,
    effect_id: String,
    state: PipelineState,
    /// Single-slot in-flight token: concurrent invocations are rejected,
    /// not queued. Data-level, independent of any UI affordances.
    in_flight: bool,
    cancel: CancellationToken,
}

impl<A: EffectsApi> PipelineOrchestrator<A> {
    pub fn new(api: A, storage: StorageClient, poll_config: PollConfig, effect_id: String) -> Self {
        Self {
            api,
            storage,
            downloads: DownloadManager::new(),
            poll_config,
            effect_id,
            state: PipelineState::default(),
            in_flight: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn uploaded_url(&self) -> Option<&str> {
        self.state.uploaded_url.as_deref()
    }

    pub fn result_url(&self) -> Option<&str> {
        self.state.result_url.as_deref()
    }

    /// Entry point: a new input file was chosen.
    ///
    /// Clears any prior result, uploads the file, and stores its read URL.
    /// A new selection supersedes the previous pipeline intent: any
    /// in-flight wait observes the cancelled token.
    pub async fn on_file_selected(
        &mut self,
        path: &Path,
        sink: &dyn UiSink,
    ) -> Result<String, PipelineError> {
        self.acquire()?;
        let result = self.upload_flow(path, sink).await;
        self.in_flight = false;

        if let Err(err) = &result {
            sink.error(&format!("Upload failed: {err}"));
            sink.idle();
        }
        result
    }

    async fn upload_flow(
        &mut self,
        path: &Path,
        sink: &dyn UiSink,
    ) -> Result<String, PipelineError> {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.state.result_url = None;
        self.state.rendered = None;
        self.state.active_job = None;

        sink.loading("UPLOADING IMAGE...");
        let url = self.storage.upload(path).await?;
        self.state.uploaded_url = Some(url.clone());
        sink.preview(&url);
        sink.ready();
        Ok(url)
    }

    /// Entry point: the user asked to generate.
    ///
    /// Requires a previously uploaded URL; submission strictly precedes
    /// polling, which strictly precedes resolution and presentation. Any
    /// stage failure surfaces as one unified message and returns the UI to
    /// a non-busy state.
    pub async fn on_generate(
        &mut self,
        sink: &dyn UiSink,
    ) -> Result<GenerationRecord, PipelineError> {
        let Some(image_url) = self.state.uploaded_url.clone() else {
            sink.guidance("Please upload an image first.");
            return Err(PipelineError::NothingUploaded);
        };
        self.acquire()?;

        let cancel = self.cancel.clone();
        let result = self.generate_flow(&image_url, &cancel, sink).await;
        self.in_flight = false;

        if let Err(err) = &result {
            if let Some(job) = self.state.active_job.as_mut() {
                job.status = JobStatus::Failed;
            }
            sink.error(&format!("Generation failed: {err}"));
            sink.idle();
        }
        result
    }

    async fn generate_flow(
        &mut self,
        image_url: &str,
        cancel: &CancellationToken,
        sink: &dyn UiSink,
    ) -> Result<GenerationRecord, PipelineError> {
        sink.loading("INITIALIZING JOB...");
        let handle = self.api.submit(image_url).await?;

        let mut job = Job::new(handle.job_id.clone());
        job.status = JobStatus::Processing;
        self.state.active_job = Some(job.clone());

        sink.status("PROCESSING ARTWORK...");
        let outcome =
            poll_until_done(&self.api, &handle.job_id, &self.poll_config, cancel, sink).await?;

        let result_url = resolve(outcome.response.result.as_ref())?.to_string();

        job.status = JobStatus::from(outcome.response.status);
        let record = GenerationRecord::new(&job, &self.effect_id, outcome.polls, &result_url);
        self.state.active_job = Some(job);
        self.state.result_url = Some(result_url.clone());

        // The presentation fetch; its failure is not a pipeline failure.
        self.state.rendered = self.downloads.fetch_rendered(&result_url).await;

        sink.result(&result_url);
        Ok(record)
    }

    /// Entry point: download the current result.
    ///
    /// The busy indication around the attempt is restored on every exit
    /// path, whatever the outcome.
    pub async fn on_download(
        &mut self,
        dest_dir: &Path,
        sink: &dyn UiSink,
    ) -> Result<DownloadOutcome, PipelineError> {
        let Some(url) = self.state.result_url.clone() else {
            return Err(PipelineError::NoResult);
        };
        self.acquire()?;

        sink.loading("DOWNLOADING...");
        let outcome = self
            .downloads
            .download(&url, self.state.rendered.as_ref(), dest_dir, sink)
            .await;
        sink.idle();
        self.in_flight = false;

        if let DownloadOutcome::Saved(path) = &outcome {
            sink.status(&format!("Saved to {}", path.display()));
        }
        Ok(outcome)
    }

    /// Entry point: return everything to the initial state.
    pub fn reset(&mut self, sink: &dyn UiSink) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.state = PipelineState::default();
        sink.idle();
    }

    fn acquire(&mut self) -> Result<(), PipelineError> {
        if self.in_flight {
            return Err(PipelineError::Busy);
        }
        self.in_flight = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, JobHandle, RemoteStatus, ResultItem, ResultPayload, StatusResponse};
    use crate::ui::{RecordingSink, UiEvent};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Scripted API double: one submit response, then a status sequence.
    struct MockApi {
        submit_response: Mutex<Option<Result<JobHandle, ApiError>>>,
        statuses: Mutex<VecDeque<StatusResponse>>,
    }

    impl MockApi {
        fn new(submit: Result<JobHandle, ApiError>, statuses: Vec<StatusResponse>) -> Self {
            Self {
                submit_response: Mutex::new(Some(submit)),
                statuses: Mutex::new(statuses.into()),
            }
        }

        fn completing_with(result_url: &str) -> Self {
            Self::new(
                Ok(JobHandle {
                    job_id: "job_1".into(),
                }),
                vec![
                    StatusResponse {
                        status: RemoteStatus::Pending,
                        result: None,
                        error: None,
                    },
                    StatusResponse {
                        status: RemoteStatus::Completed,
                        result: Some(ResultPayload::One(ResultItem {
                            media_url: Some(result_url.to_string()),
                            ..Default::default()
                        })),
                        error: None,
                    },
                ],
            )
        }
    }

    impl EffectsApi for MockApi {
        async fn submit(&self, _image_url: &str) -> Result<JobHandle, ApiError> {
            self.submit_response
                .lock()
                .unwrap()
                .take()
                .expect("submit scripted exactly once")
        }

        async fn job_status(&self, _job_id: &str) -> Result<StatusResponse, ApiError> {
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .expect("queried past the scripted statuses"))
        }
    }

    async fn mock_storage(server: &MockServer) -> StorageClient {
        let write_url = format!("{}/write-target", server.uri());
        Mock::given(method("GET"))
            .and(path("/media/get-upload-url"))
            .respond_with(ResponseTemplate::new(200).set_body_string(write_url))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/write-target"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        StorageClient::new("dressr".into(), server.uri(), "https://assets.test".into())
    }

    fn orchestrator(api: MockApi, storage: StorageClient) -> PipelineOrchestrator<MockApi> {
        PipelineOrchestrator::new(
            api,
            storage,
            PollConfig {
                interval_ms: 1,
                max_polls: 60,
            },
            "photoToVectorArt".into(),
        )
    }

    fn temp_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let file = dir.path().join("portrait.jpg");
        std::fs::write(&file, b"pixels").unwrap();
        file
    }

    #[tokio::test]
    async fn upload_then_generate_happy_path() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        // Result URL resolves against the mock server too; 404 there just
        // means no rendered copy gets cached.
        let result_url = format!("{}/result.png", server.uri());
        let mut orch = orchestrator(MockApi::completing_with(&result_url), storage);

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();

        let uploaded = orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();
        assert!(uploaded.starts_with("https://assets.test/media/"));
        assert_eq!(orch.uploaded_url(), Some(uploaded.as_str()));
        assert!(orch.result_url().is_none());

        let record = orch.on_generate(&sink).await.unwrap();
        assert_eq!(record.job_id, "job_1");
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.polls, 2);
        assert_eq!(record.result_url, result_url);
        assert_eq!(orch.result_url(), Some(result_url.as_str()));

        let events = sink.events();
        assert!(events.contains(&UiEvent::Loading("UPLOADING IMAGE...".into())));
        assert!(events.contains(&UiEvent::Ready));
        assert!(events.contains(&UiEvent::Status("PROCESSING ARTWORK...".into())));
        assert_eq!(sink.last(), Some(UiEvent::Result(result_url)));
    }

    #[tokio::test]
    async fn generate_without_upload_gives_guidance_without_network() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let api = MockApi::new(
            Err(ApiError::Api {
                status: 500,
                message: "must not be called".into(),
            }),
            vec![],
        );
        let mut orch = orchestrator(api, storage);
        let sink = RecordingSink::default();

        let err = orch.on_generate(&sink).await.unwrap_err();
        assert!(matches!(err, PipelineError::NothingUploaded));
        assert_eq!(
            sink.last(),
            Some(UiEvent::Guidance("Please upload an image first.".into()))
        );
        // The scripted submit response is still unconsumed.
        assert!(orch.api.submit_response.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_job_surfaces_unified_message() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let api = MockApi::new(
            Ok(JobHandle {
                job_id: "job_1".into(),
            }),
            vec![StatusResponse {
                status: RemoteStatus::Failed,
                result: None,
                error: Some("bad input".into()),
            }],
        );
        let mut orch = orchestrator(api, storage);

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();
        orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();

        let err = orch.on_generate(&sink).await.unwrap_err();
        assert!(err.to_string().contains("bad input"));

        let events = sink.events();
        let error_event = events.iter().find_map(|e| match e {
            UiEvent::Error(message) => Some(message.clone()),
            _ => None,
        });
        let message = error_event.expect("an error must be surfaced");
        assert!(message.starts_with("Generation failed:"));
        assert!(message.contains("bad input"));
        // The UI is returned to a non-busy state.
        assert_eq!(sink.last(), Some(UiEvent::Idle));
        assert!(orch.result_url().is_none());
    }

    #[tokio::test]
    async fn missing_output_url_fails_the_generate_action() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let api = MockApi::new(
            Ok(JobHandle {
                job_id: "job_1".into(),
            }),
            vec![StatusResponse {
                status: RemoteStatus::Completed,
                result: Some(ResultPayload::One(ResultItem::default())),
                error: None,
            }],
        );
        let mut orch = orchestrator(api, storage);

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();
        orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();

        let err = orch.on_generate(&sink).await.unwrap_err();
        assert!(matches!(err, PipelineError::Resolve(_)));
        assert!(orch.result_url().is_none());
    }

    #[tokio::test]
    async fn new_selection_resets_result_state() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let result_url = format!("{}/result.png", server.uri());
        let mut orch = orchestrator(MockApi::completing_with(&result_url), storage);

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();
        orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();
        orch.on_generate(&sink).await.unwrap();
        assert!(orch.result_url().is_some());

        orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();
        assert!(orch.result_url().is_none());
        assert!(orch.state.active_job.is_none());
        assert!(orch.state.rendered.is_none());
        // Downloading now is rejected: there is no result anymore.
        let err = orch
            .on_download(dir.path(), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoResult));
    }

    #[tokio::test]
    async fn busy_slot_rejects_concurrent_entry() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let result_url = format!("{}/result.png", server.uri());
        let mut orch = orchestrator(MockApi::completing_with(&result_url), storage);
        orch.state.uploaded_url = Some("https://assets.test/media/x.jpg".into());
        orch.in_flight = true;

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();

        let err = orch
            .on_file_selected(&temp_image(&dir), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Busy));

        let err = orch.on_generate(&sink).await.unwrap_err();
        assert!(matches!(err, PipelineError::Busy));
    }

    #[tokio::test]
    async fn download_restores_busy_state_in_every_outcome() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let mut orch = orchestrator(MockApi::completing_with("unused"), storage);

        // Saved outcome.
        Mock::given(method("GET"))
            .and(path("/ok.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;
        orch.state.result_url = Some(format!("{}/ok.png", server.uri()));

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();
        let outcome = orch.on_download(dir.path(), &sink).await.unwrap();
        assert!(matches!(outcome, DownloadOutcome::Saved(_)));
        let events = sink.events();
        let loading_at = events
            .iter()
            .position(|e| matches!(e, UiEvent::Loading(_)))
            .unwrap();
        assert!(events[loading_at..].contains(&UiEvent::Idle));
        assert!(!orch.in_flight);

        // Manual-fallback outcome.
        orch.state.result_url = Some(format!("{}/missing.png", server.uri()));
        let sink = RecordingSink::default();
        let outcome = orch.on_download(dir.path(), &sink).await.unwrap();
        assert_eq!(outcome, DownloadOutcome::ManualFallback);
        assert_eq!(sink.last(), Some(UiEvent::Idle));
        assert!(!orch.in_flight);
    }

    #[tokio::test]
    async fn reset_clears_all_state() {
        let server = MockServer::start().await;
        let storage = mock_storage(&server).await;
        let result_url = format!("{}/result.png", server.uri());
        let mut orch = orchestrator(MockApi::completing_with(&result_url), storage);

        let dir = tempfile::tempdir().unwrap();
        let sink = RecordingSink::default();
        orch.on_file_selected(&temp_image(&dir), &sink).await.unwrap();
        orch.on_generate(&sink).await.unwrap();

        orch.reset(&sink);
        assert!(orch.uploaded_url().is_none());
        assert!(orch.result_url().is_none());
        assert!(orch.state.active_job.is_none());
        assert_eq!(sink.last(), Some(UiEvent::Idle));
    }
}
