use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{AnalysisClient, Endpoint};
use crate::dispatch::{self, CategoryContentBundle, Prediction};
use crate::envelope::{ClassificationResponse, Record, ResponseEnvelope};
use crate::error::Result;
use crate::lifecycle::{RequestLifecycle, RequestState, RequestToken};
use crate::projection::{self, ProjectedTable};
use crate::upload::{AcceptRule, FileHandle, PreviewStore, UploadSession};

/// One kind of submission: where it goes, what it accepts and how the
/// successful body becomes something to show.
pub trait Analysis {
    type Payload;
    type Output;

    const ENDPOINT: Endpoint;
    const ACCEPT: AcceptRule;

    fn decode(body: Value) -> Result<Self::Payload>;
    fn interpret(payload: &Self::Payload) -> Result<Self::Output>;
}

/// Bill-of-materials upload, shown as a table.
pub struct BomAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomReport {
    pub table: ProjectedTable,
    pub summary: Record,
}

impl Analysis for BomAnalysis {
    type Payload = ResponseEnvelope;
    type Output = BomReport;

    const ENDPOINT: Endpoint = Endpoint::SupplyProcess;
    const ACCEPT: AcceptRule = AcceptRule::Csv;

    fn decode(body: Value) -> Result<ResponseEnvelope> {
        ResponseEnvelope::from_value(body)
    }

    fn interpret(envelope: &ResponseEnvelope) -> Result<BomReport> {
        Ok(BomReport {
            table: projection::project(envelope)?,
            summary: envelope.summary(),
        })
    }
}

/// Waste image classification, shown as a bin plus guidance.
pub struct WasteClassification;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub prediction: Prediction,
    pub guidance: &'static CategoryContentBundle,
}

impl Analysis for WasteClassification {
    type Payload = ClassificationResponse;
    type Output = Diagnosis;

    const ENDPOINT: Endpoint = Endpoint::Predict;
    const ACCEPT: AcceptRule = AcceptRule::Image;

    fn decode(body: Value) -> Result<ClassificationResponse> {
        ClassificationResponse::from_value(body)
    }

    fn interpret(response: &ClassificationResponse) -> Result<Diagnosis> {
        let prediction = Prediction::from(response);
        let guidance = dispatch::resolve(&prediction);
        Ok(Diagnosis {
            prediction,
            guidance,
        })
    }
}

/// What a page should draw right now.
#[derive(Debug, PartialEq)]
pub enum AnalysisView<'a, O> {
    /// Nothing submitted yet.
    Empty,
    Loading,
    Ready(&'a O),
    Failed(&'a str),
}

/// A request that has been started but not yet settled.
#[derive(Debug)]
pub struct PendingRequest {
    token: RequestToken,
    file: FileHandle,
}

impl PendingRequest {
    pub fn file(&self) -> &FileHandle {
        &self.file
    }
}

pub struct UploadController<A: Analysis> {
    client: AnalysisClient,
    previews: PreviewStore,
    session: Option<UploadSession>,
    lifecycle: RequestLifecycle<A::Payload>,
    output: Option<A::Output>,
    _analysis: PhantomData<A>,
}

impl<A: Analysis> UploadController<A> {
    pub fn new(client: AnalysisClient, previews: PreviewStore) -> Self {
        Self {
            client,
            previews,
            session: None,
            lifecycle: RequestLifecycle::new(),
            output: None,
            _analysis: PhantomData,
        }
    }

    /// Validate, replace the session and enter `Loading`. A rejected file
    /// leaves everything as it was.
    pub fn begin(&mut self, file: FileHandle) -> Result<PendingRequest> {
        A::ACCEPT.check(&file)?;

        // Replacing the session drops the old preview handle
        self.session = Some(UploadSession::open(file.clone(), &self.previews));
        self.output = None;
        let token = self.lifecycle.start();
        info!("Submitting {} to {}", file.name, A::ENDPOINT.path());
        Ok(PendingRequest { token, file })
    }

    pub async fn dispatch(&self, pending: &PendingRequest) -> Result<Value> {
        self.client.upload(A::ENDPOINT, &pending.file).await
    }

    /// Apply a response. Returns `false` if it belonged to a superseded request.
    pub fn complete(&mut self, pending: PendingRequest, body: Result<Value>) -> bool {
        let decoded = body.and_then(A::decode);
        if !self.lifecycle.settle(pending.token, decoded) {
            return false;
        }
        let interpreted = self.lifecycle.state().payload().map(A::interpret);
        match interpreted {
            Some(Ok(output)) => self.output = Some(output),
            Some(Err(e)) => {
                warn!("Could not interpret response for {}: {}", pending.file.name, e);
                self.lifecycle.fail(e.to_string());
            }
            None => {}
        }
        if let Some(message) = self.lifecycle.state().error() {
            warn!("{}", message);
        }
        true
    }

    /// Validate and run one request to completion. Only a validation
    /// failure is returned as `Err`; request failures land in `view()`.
    pub async fn submit(&mut self, file: FileHandle) -> Result<()> {
        let pending = self.begin(file)?;
        let body = self.dispatch(&pending).await;
        self.complete(pending, body);
        Ok(())
    }

    pub fn state(&self) -> &RequestState<A::Payload> {
        self.lifecycle.state()
    }

    pub fn output(&self) -> Option<&A::Output> {
        self.output.as_ref()
    }

    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    pub fn view(&self) -> AnalysisView<'_, A::Output> {
        match self.lifecycle.state() {
            RequestState::Idle => AnalysisView::Empty,
            RequestState::Loading => AnalysisView::Loading,
            RequestState::Error { message } => AnalysisView::Failed(message.as_str()),
            RequestState::Success { .. } => match &self.output {
                Some(output) => AnalysisView::Ready(output),
                None => AnalysisView::Empty,
            },
        }
    }
}
