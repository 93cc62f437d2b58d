// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The typed operation façade.
//!
//! Every operation follows the same pipeline:
//!
//! 1. validate the request (`FILE_NOT_FOUND`, `UNSUPPORTED_FORMAT`, ...)
//! 2. build a [`Command`] and estimate its [`ResourceCost`]
//! 3. ask the [`AdmissionController`] against a fresh telemetry sample
//! 4. on admission, execute the command through the [`ProcessBridge`]
//! 5. parse the response strictly into a typed result
//!
//! A rejection at step 3 returns its error without touching the bridge.
//! Every failure is recorded with the [`EscalationMonitor`].
//!
//! Telemetry sampling can block for its whole budget, so admission runs on
//! the blocking pool. The only wait on the async side is for the worker.

use crate::estimate::{estimate, estimate_batch};
use crate::media::{self, MediaKind};
use crate::models::{self, ModelSpec};
use crate::parse::Fields;
use crate::task::{OperationTask, TaskStatus};
use crate::types::{
    BatchItem, BatchReport, ChatAnswer, ChatRequest, DownloadedModel, ExtractRequest,
    ExtractedAudio, ModelInfo, TranscribeRequest, Transcription,
};
use crate::ToolConfig;
use admission::{AdmissionController, AdmissionReason, ResourceCost, ResourceReport};
use error_taxonomy::{catalog, DomainError, ErrorFactory, EscalationMonitor};
use process_bridge::{
    BridgeError, ChatbotQueryParams, Command, DownloadModelParams, ExtractAudioParams,
    ListModelsParams, ProcessBridge, Progress, Response, TranscribeParams,
};
use resource_monitor::{ResourceSnapshot, TelemetryProvider};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A validated transcription ready for admission.
struct Prepared {
    command: Command,
    output: PathBuf,
    model: String,
    input_size: u64,
}

/// Entry point for all domain operations.
pub struct Operations {
    config: ToolConfig,
    admission: AdmissionController,
    bridge: ProcessBridge,
    escalation: EscalationMonitor,
    /// Set by [`cancel`](Self::cancel); stops a running batch.
    cancel_requested: AtomicBool,
}

impl Operations {
    /// Builds the façade with a bridge configured from `config.worker`.
    pub fn new(config: ToolConfig, telemetry: Arc<dyn TelemetryProvider>) -> Self {
        let bridge = ProcessBridge::new(config.worker.clone());
        Self::with_bridge(config, telemetry, bridge)
    }

    pub fn with_bridge(
        config: ToolConfig,
        telemetry: Arc<dyn TelemetryProvider>,
        bridge: ProcessBridge,
    ) -> Self {
        let admission = AdmissionController::new(config.admission.clone(), telemetry);
        Self {
            config,
            admission,
            bridge,
            escalation: EscalationMonitor::default(),
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn bridge(&self) -> &ProcessBridge {
        &self.bridge
    }

    /// Transcribes one file.
    pub async fn transcribe_file(
        &self,
        request: TranscribeRequest,
    ) -> Result<Transcription, DomainError> {
        let result = self.run_transcription(&request, None).await;
        self.observe("transcribe", result)
    }

    /// Transcribes one file, reporting progress and the terminal status
    /// into `task`.
    ///
    /// A pending task is started; a task that already reached a terminal
    /// state is not dispatched and yields `CANCELLED`.
    pub async fn transcribe_tracked(
        &self,
        request: TranscribeRequest,
        task: &mut OperationTask,
    ) -> Result<Transcription, DomainError> {
        if task.status() == TaskStatus::Pending {
            task.start();
        }
        if task.status() != TaskStatus::Processing {
            return Err(ErrorFactory::from_code(
                catalog::CANCELLED,
                format!("task {} is no longer runnable", task.id()),
            ));
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
        let work = self.run_transcription(&request, Some(tx));
        let pump = async {
            while let Some(progress) = rx.recv().await {
                task.set_progress(progress.fraction);
            }
        };
        let (result, ()) = tokio::join!(work, pump);

        match &result {
            Ok(transcription) => {
                task.complete(transcription.output_path.clone());
            }
            Err(err) => {
                task.fail(err.clone());
            }
        }
        self.observe("transcribe", result)
    }

    /// Extracts the audio track of a video file to WAV.
    pub async fn extract_audio(
        &self,
        request: ExtractRequest,
    ) -> Result<ExtractedAudio, DomainError> {
        let result = self.run_extract(&request).await;
        self.observe("extract_audio", result)
    }

    /// Lists the models known to the worker and whether they are installed.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, DomainError> {
        let result = self.run_list_models().await;
        self.observe("list_models", result)
    }

    /// Downloads `name` into the configured models directory.
    pub async fn download_model(&self, name: &str) -> Result<DownloadedModel, DomainError> {
        let result = self.run_download(name).await;
        self.observe("download_model", result)
    }

    /// Answers a question against stored transcriptions.
    pub async fn chatbot_query(&self, request: ChatRequest) -> Result<ChatAnswer, DomainError> {
        let result = self.run_chat(&request).await;
        self.observe("chatbot_query", result)
    }

    /// Transcribes `requests` one after another.
    ///
    /// The batch as a whole is admitted first using the batch disk
    /// multiplier; a rejection fails every item without dispatching. After
    /// that each item is admitted and run on its own, and one item's failure
    /// does not stop the rest. [`cancel`](Self::cancel) stops the batch and
    /// marks every item not yet finished cancelled.
    pub async fn process_batch(&self, requests: Vec<TranscribeRequest>) -> BatchReport {
        self.cancel_requested.store(false, Ordering::SeqCst);
        let mut items: Vec<BatchItem> = requests
            .iter()
            .map(|r| BatchItem {
                task: OperationTask::new(r.input.clone()),
                result: None,
            })
            .collect();
        tracing::info!(files = items.len(), "starting batch");

        let costs: Vec<ResourceCost> = requests
            .iter()
            .filter_map(|r| self.prepare_transcription(r).ok())
            .map(|p| estimate(&p.command, p.input_size))
            .collect();
        if let Err(err) = self.admit(estimate_batch(&costs)).await {
            tracing::warn!(code = err.code(), "batch rejected by admission control");
            self.escalation.record(&err);
            for item in &mut items {
                item.task.fail(err.clone());
            }
            return BatchReport { items };
        }

        for (index, request) in requests.into_iter().enumerate() {
            if self.take_cancel() {
                cancel_all(&mut items[index..]);
                break;
            }
            match self.transcribe_tracked(request, &mut items[index].task).await {
                Ok(transcription) => items[index].result = Some(transcription),
                Err(_) if self.take_cancel() => {
                    tracing::info!(index, "batch cancelled");
                    cancel_all(&mut items[index..]);
                    break;
                }
                Err(_) => {}
            }
        }

        let report = BatchReport { items };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled = report.cancelled(),
            "batch finished"
        );
        report
    }

    /// Kills the in-flight worker, if any, and stops a running batch
    /// before its next item.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        self.bridge.cancel();
    }

    fn take_cancel(&self) -> bool {
        self.cancel_requested.swap(false, Ordering::SeqCst)
    }

    /// Whether repeated critical resource errors suggest restarting.
    pub fn should_suggest_restart(&self) -> bool {
        self.escalation.should_suggest_restart()
    }

    /// Current resource status from a fresh telemetry sample.
    pub async fn status(&self) -> ResourceReport {
        let admission = self.admission.clone();
        match tokio::task::spawn_blocking(move || admission.status()).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("telemetry sample did not complete: {e}");
                ResourceReport::classify(ResourceSnapshot::unavailable(), self.admission.config())
            }
        }
    }

    // ── Pipelines ─────────────────────────────────────────────────────

    async fn run_transcription(
        &self,
        request: &TranscribeRequest,
        progress: Option<mpsc::UnboundedSender<Progress>>,
    ) -> Result<Transcription, DomainError> {
        let prepared = self.prepare_transcription(request)?;
        let cost = estimate(&prepared.command, prepared.input_size);
        let (response, warnings) = self
            .dispatch(&prepared.command, &cost, Some(prepared.output.as_path()), progress)
            .await?;

        let fields = Fields::new(prepared.command.operation(), response.data.as_ref());
        Ok(Transcription {
            text: fields.required("text")?,
            output_path: Some(fields.optional("output_path")?.unwrap_or(prepared.output)),
            language: fields.optional("language")?,
            duration_seconds: fields.optional("duration")?,
            model: fields.optional("model")?.unwrap_or(prepared.model),
            metrics: fields.optional("performance")?.unwrap_or_default(),
            warnings,
        })
    }

    fn prepare_transcription(&self, request: &TranscribeRequest) -> Result<Prepared, DomainError> {
        let (_, input_size) = validate_input(&request.input)?;
        let model = self.resolve_model(request.model.as_deref())?;
        let language = validate_language(request.language.as_deref())?;

        if request.srt_max_chars == Some(0) {
            return Err(ErrorFactory::from_code(
                catalog::INVALID_PARAMETER,
                "srt_max_chars must be positive",
            ));
        }
        if let Some(d) = request.srt_max_duration {
            if !(d.is_finite() && d > 0.0) {
                return Err(ErrorFactory::from_code(
                    catalog::INVALID_PARAMETER,
                    format!("srt_max_duration must be positive, got {d}"),
                ));
            }
        }

        let output = request.output_path.clone().unwrap_or_else(|| {
            let extension = request.output_format.extension();
            default_output(&self.config.output.dir, &request.input, extension)
        });
        let command = Command::Transcribe(TranscribeParams {
            input_path: request.input.clone(),
            model: model.name.to_string(),
            output_format: request.output_format,
            language,
            output_path: Some(output.clone()),
            srt_max_chars: request.srt_max_chars,
            srt_max_duration: request.srt_max_duration,
        });
        Ok(Prepared {
            command,
            output,
            model: model.name.to_string(),
            input_size,
        })
    }

    async fn run_extract(&self, request: &ExtractRequest) -> Result<ExtractedAudio, DomainError> {
        let (kind, input_size) = validate_input(&request.input)?;
        if kind != MediaKind::Video {
            return Err(ErrorFactory::from_code(
                catalog::UNSUPPORTED_FORMAT,
                format!("{} is not a video file", request.input.display()),
            ));
        }

        let output = request
            .output_path
            .clone()
            .unwrap_or_else(|| default_output(&self.config.output.dir, &request.input, "wav"));
        let command = Command::ExtractAudio(ExtractAudioParams {
            input_path: request.input.clone(),
            output_path: Some(output.clone()),
        });
        let cost = estimate(&command, input_size);
        let (response, warnings) = self
            .dispatch(&command, &cost, Some(output.as_path()), None)
            .await?;

        let fields = Fields::new(command.operation(), response.data.as_ref());
        Ok(ExtractedAudio {
            output_path: fields.required("output_path")?,
            duration_seconds: fields.optional("duration")?,
            warnings,
        })
    }

    async fn run_list_models(&self) -> Result<Vec<ModelInfo>, DomainError> {
        let command = Command::ListModels(ListModelsParams {
            models_dir: Some(self.config.models.dir.clone()),
        });
        let cost = estimate(&command, 0);
        let (response, _) = self.dispatch(&command, &cost, None, None).await?;
        Fields::new(command.operation(), response.data.as_ref()).required("models")
    }

    async fn run_download(&self, name: &str) -> Result<DownloadedModel, DomainError> {
        let model = self.resolve_model(Some(name))?;
        let destination = self.config.models.dir.join(model.file_name());
        let command = Command::DownloadModel(DownloadModelParams {
            model: model.name.to_string(),
            models_dir: Some(self.config.models.dir.clone()),
        });
        let cost = estimate(&command, 0);
        let (response, _) = self
            .dispatch(&command, &cost, Some(destination.as_path()), None)
            .await?;

        let fields = Fields::new(command.operation(), response.data.as_ref());
        Ok(DownloadedModel {
            name: model.name.to_string(),
            path: fields.required("path")?,
            size_bytes: fields.optional("size_bytes")?,
        })
    }

    async fn run_chat(&self, request: &ChatRequest) -> Result<ChatAnswer, DomainError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(ErrorFactory::from_code(catalog::INVALID_INPUT, "question is empty"));
        }
        if request.max_results == Some(0) {
            return Err(ErrorFactory::from_code(
                catalog::INVALID_PARAMETER,
                "max_results must be positive",
            ));
        }
        if let Some(path) = &request.transcription_path {
            if !path.exists() {
                return Err(ErrorFactory::from_code(
                    catalog::FILE_NOT_FOUND,
                    path.display().to_string(),
                ));
            }
        }

        let command = Command::ChatbotQuery(ChatbotQueryParams {
            question: question.to_string(),
            transcription_path: request.transcription_path.clone(),
            max_results: request.max_results,
            options: request.options.clone(),
        });
        let cost = estimate(&command, 0);
        let (response, _) = self.dispatch(&command, &cost, None, None).await?;

        let fields = Fields::new(command.operation(), response.data.as_ref());
        Ok(ChatAnswer {
            answer: fields.required("answer")?,
            sources: fields.optional("sources")?.unwrap_or_default(),
        })
    }

    /// Admits and executes `command`. A partially written `output` that did
    /// not exist beforehand is removed when the command is cancelled or
    /// times out.
    async fn dispatch(
        &self,
        command: &Command,
        cost: &ResourceCost,
        output: Option<&Path>,
        progress: Option<mpsc::UnboundedSender<Progress>>,
    ) -> Result<(Response, Vec<AdmissionReason>), DomainError> {
        let operation = command.operation();
        let warnings = self.admit(*cost).await?;
        for warning in &warnings {
            tracing::warn!(operation, %warning, "admitted with warning");
        }

        let existed = match output {
            Some(path) => {
                ensure_parent(path)?;
                path.exists()
            }
            None => false,
        };

        tracing::debug!(operation, "dispatching to worker");
        match self.bridge.execute_with_progress(command, progress).await {
            Ok(response) => Ok((response, warnings)),
            Err(e) => {
                let interrupted = matches!(e, BridgeError::Cancelled | BridgeError::Timeout { .. });
                if let Some(path) = output.filter(|_| interrupted && !existed) {
                    discard_partial(path);
                }
                Err(e.into())
            }
        }
    }

    /// Runs the admission check on the blocking pool.
    async fn admit(&self, cost: ResourceCost) -> Result<Vec<AdmissionReason>, DomainError> {
        let admission = self.admission.clone();
        tokio::task::spawn_blocking(move || admission.admit(&cost))
            .await
            .map_err(|e| {
                ErrorFactory::from_code(catalog::UNKNOWN_ERROR, format!("admission check: {e}"))
            })?
    }

    fn resolve_model(&self, name: Option<&str>) -> Result<&'static ModelSpec, DomainError> {
        let name = name.unwrap_or(&self.config.models.default_model);
        models::lookup(name).ok_or_else(|| {
            ErrorFactory::from_code(catalog::MODEL_NOT_FOUND, format!("unknown model '{name}'"))
        })
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        result: Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        match &result {
            Ok(_) => tracing::info!(operation, "operation completed"),
            Err(err) => {
                tracing::warn!(
                    operation,
                    code = err.code(),
                    severity = ?err.severity(),
                    "operation failed"
                );
                self.escalation.record(err);
            }
        }
        result
    }
}

/// Checks that `path` is an existing file of a supported format; returns
/// its kind and size.
fn validate_input(path: &Path) -> Result<(MediaKind, u64), DomainError> {
    let meta = std::fs::metadata(path).map_err(|e| {
        let code = match e.kind() {
            std::io::ErrorKind::NotFound => catalog::FILE_NOT_FOUND,
            std::io::ErrorKind::PermissionDenied => catalog::PERMISSION_DENIED,
            _ => catalog::FILE_READ_ERROR,
        };
        ErrorFactory::from_code(code, format!("{}: {e}", path.display()))
    })?;
    if !meta.is_file() {
        return Err(ErrorFactory::from_code(
            catalog::INVALID_INPUT,
            format!("{} is not a file", path.display()),
        ));
    }
    let kind = media::classify(path).ok_or_else(|| {
        ErrorFactory::from_code(catalog::UNSUPPORTED_FORMAT, path.display().to_string())
    })?;
    Ok((kind, meta.len()))
}

/// Accepts `"auto"` or a two- or three-letter language code.
fn validate_language(language: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(lang) = language.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    let lang = lang.to_ascii_lowercase();
    let is_code = (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_lowercase());
    if lang != "auto" && !is_code {
        return Err(ErrorFactory::from_code(catalog::UNSUPPORTED_LANGUAGE, lang));
    }
    Ok(Some(lang))
}

fn default_output(dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy().into_owned());
    dir.join(format!("{stem}.{extension}"))
}

fn ensure_parent(path: &Path) -> Result<(), DomainError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(|e| {
            ErrorFactory::from_code(catalog::FILE_WRITE_ERROR, format!("{}: {e}", dir.display()))
        }),
        _ => Ok(()),
    }
}

fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial output")
        }
    }
}

/// Marks every unfinished item cancelled; finished items keep their status.
fn cancel_all(items: &mut [BatchItem]) {
    for item in items {
        item.task.cancel();
    }
}
