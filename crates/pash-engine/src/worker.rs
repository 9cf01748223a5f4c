//! Background derivation worker.
//!
//! Key derivation costs thousands of HMAC rounds per block, so callers hand
//! requests to a single worker thread instead of deriving inline. Each
//! submission carries its own reply channel and yields a [`Ticket`]; there
//! is no shared table of pending callbacks.
//!
//! Requests own copies of the secrets they need and zeroize them on drop.
//! Nothing secret is ever logged: trace events carry the request id, kind,
//! password format and timing only.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use pash_core::{breadcrumbs, LengthTier, Pash, PashKey, PashKeyKind, PasswordFormat};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::EngineConfig;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Generate a service password.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PasswordRequest {
    pub master_password: String,
    pub user: String,
    pub service: String,
    pub color: String,
    #[zeroize(skip)]
    pub format: PasswordFormat,
    #[zeroize(skip)]
    pub tier: LengthTier,
}

impl PasswordRequest {
    #[must_use]
    pub fn new(
        master_password: &str,
        user: &str,
        service: &str,
        color: &str,
        format: PasswordFormat,
        tier: LengthTier,
    ) -> Self {
        Self {
            master_password: master_password.to_owned(),
            user: user.to_owned(),
            service: service.to_owned(),
            color: color.to_owned(),
            format,
            tier,
        }
    }
}

/// Derive one of the internal pash keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyRequest {
    pub master_password: String,
    pub user: String,
    #[zeroize(skip)]
    pub kind: PashKeyKind,
}

impl KeyRequest {
    #[must_use]
    pub fn new(master_password: &str, user: &str, kind: PashKeyKind) -> Self {
        Self {
            master_password: master_password.to_owned(),
            user: user.to_owned(),
            kind,
        }
    }
}

/// Encrypt (`Encrypt`) or decrypt (`Decrypt`) `text` under the identity's
/// encryption key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherRequest {
    pub master_password: String,
    pub user: String,
    pub text: String,
}

impl CipherRequest {
    #[must_use]
    pub fn new(master_password: &str, user: &str, text: &str) -> Self {
        Self {
            master_password: master_password.to_owned(),
            user: user.to_owned(),
            text: text.to_owned(),
        }
    }
}

/// Breadcrumbs for a partially typed master password.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BreadcrumbRequest {
    pub typed: String,
}

impl BreadcrumbRequest {
    #[must_use]
    pub fn new(typed: &str) -> Self {
        Self {
            typed: typed.to_owned(),
        }
    }
}

/// One unit of work for the worker.
pub enum Request {
    Password(PasswordRequest),
    PashKey(KeyRequest),
    Encrypt(CipherRequest),
    Decrypt(CipherRequest),
    Breadcrumbs(BreadcrumbRequest),
}

impl Request {
    /// Short name used in trace events and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::PashKey(_) => "pash_key",
            Self::Encrypt(_) => "encrypt",
            Self::Decrypt(_) => "decrypt",
            Self::Breadcrumbs(_) => "breadcrumbs",
        }
    }

    /// Password format, for password requests.
    #[must_use]
    pub const fn format(&self) -> Option<PasswordFormat> {
        match self {
            Self::Password(r) => Some(r.format),
            _ => None,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request({}, ***)", self.kind())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of a completed request. Secret payloads zeroize on drop.
pub enum Response {
    Password(Zeroizing<String>),
    PashKey(PashKey),
    Ciphertext(String),
    /// `None` when the ciphertext failed authentication.
    Plaintext(Option<Zeroizing<String>>),
    Breadcrumbs(Vec<u8>),
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(***)"),
            Self::PashKey(key) => write!(f, "PashKey({key:?})"),
            Self::Ciphertext(hex) => write!(f, "Ciphertext({hex})"),
            Self::Plaintext(Some(_)) => f.write_str("Plaintext(Some(***))"),
            Self::Plaintext(None) => f.write_str("Plaintext(None)"),
            Self::Breadcrumbs(crumbs) => write!(f, "Breadcrumbs({crumbs:?})"),
        }
    }
}

type Reply = Result<Response, EngineError>;

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

struct Job {
    id: u64,
    request: Request,
    cancelled: Arc<AtomicBool>,
    reply: Sender<Reply>,
}

/// Handle to a submitted request.
///
/// Dropping a ticket without waiting is allowed; the worker still runs the
/// request and discards its result.
pub struct Ticket {
    id: u64,
    cancelled: Arc<AtomicBool>,
    reply: Receiver<Reply>,
}

impl Ticket {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Ask the worker to skip this request. Has no effect once the worker
    /// has started it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Block until the worker answers.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Cancelled` if the request was skipped,
    /// `EngineError::WorkerUnavailable` if the worker stopped first, and
    /// any error the request itself produced.
    pub fn wait(self) -> Result<Response, EngineError> {
        self.reply
            .recv()
            .map_err(|_| EngineError::WorkerUnavailable)?
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// A single background thread serving derivation requests in FIFO order.
pub struct DerivationWorker {
    queue: Option<SyncSender<Job>>,
    handle: Option<JoinHandle<()>>,
    next_id: AtomicU64,
    config: EngineConfig,
}

impl DerivationWorker {
    /// Start the worker thread.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` for an invalid `config` and
    /// `EngineError::Io` if the thread cannot be spawned.
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let (queue, jobs) = mpsc::sync_channel(config.queue_capacity);
        let worker_config = config.clone();
        let handle = thread::Builder::new()
            .name("pash-derivation".into())
            .spawn(move || serve(&jobs, &worker_config))?;
        Ok(Self {
            queue: Some(queue),
            handle: Some(handle),
            next_id: AtomicU64::new(1),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Queue `request`. Blocks while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::WorkerUnavailable` if the worker has stopped.
    pub fn submit(&self, request: Request) -> Result<Ticket, EngineError> {
        let queue = self.queue.as_ref().ok_or(EngineError::WorkerUnavailable)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let (reply, answer) = mpsc::channel();
        queue
            .send(Job {
                id,
                request,
                cancelled: Arc::clone(&cancelled),
                reply,
            })
            .map_err(|_| EngineError::WorkerUnavailable)?;
        Ok(Ticket {
            id,
            cancelled,
            reply: answer,
        })
    }

    /// Submit `request` and wait for its response.
    ///
    /// # Errors
    ///
    /// See [`DerivationWorker::submit`] and [`Ticket::wait`].
    pub fn run(&self, request: Request) -> Result<Response, EngineError> {
        self.submit(request)?.wait()
    }

    /// # Errors
    ///
    /// See [`DerivationWorker::run`].
    pub fn password(&self, request: PasswordRequest) -> Result<Zeroizing<String>, EngineError> {
        match self.run(Request::Password(request))? {
            Response::Password(password) => Ok(password),
            _ => Err(EngineError::UnexpectedResponse("password")),
        }
    }

    /// # Errors
    ///
    /// See [`DerivationWorker::run`].
    pub fn pash_key(&self, request: KeyRequest) -> Result<PashKey, EngineError> {
        match self.run(Request::PashKey(request))? {
            Response::PashKey(key) => Ok(key),
            _ => Err(EngineError::UnexpectedResponse("pash_key")),
        }
    }

    /// # Errors
    ///
    /// See [`DerivationWorker::run`].
    pub fn encrypt(&self, request: CipherRequest) -> Result<String, EngineError> {
        match self.run(Request::Encrypt(request))? {
            Response::Ciphertext(hex) => Ok(hex),
            _ => Err(EngineError::UnexpectedResponse("encrypt")),
        }
    }

    /// `Ok(None)` when the ciphertext does not authenticate.
    ///
    /// # Errors
    ///
    /// See [`DerivationWorker::run`].
    pub fn decrypt(
        &self,
        request: CipherRequest,
    ) -> Result<Option<Zeroizing<String>>, EngineError> {
        match self.run(Request::Decrypt(request))? {
            Response::Plaintext(plaintext) => Ok(plaintext),
            _ => Err(EngineError::UnexpectedResponse("decrypt")),
        }
    }

    /// # Errors
    ///
    /// See [`DerivationWorker::run`].
    pub fn breadcrumbs(&self, typed: &str) -> Result<Vec<u8>, EngineError> {
        match self.run(Request::Breadcrumbs(BreadcrumbRequest::new(typed)))? {
            Response::Breadcrumbs(crumbs) => Ok(crumbs),
            _ => Err(EngineError::UnexpectedResponse("breadcrumbs")),
        }
    }
}

impl Drop for DerivationWorker {
    fn drop(&mut self) {
        // Closing the queue ends the worker loop once pending jobs drain.
        drop(self.queue.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Derivation worker panicked");
            }
        }
    }
}

impl fmt::Debug for DerivationWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationWorker")
            .field("running", &self.queue.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn serve(jobs: &Receiver<Job>, config: &EngineConfig) {
    tracing::info!(
        strategy = ?config.strategy,
        iterations = config.iterations,
        queue_capacity = config.queue_capacity,
        "Derivation worker started"
    );
    for job in jobs {
        handle(job, config);
    }
    tracing::info!("Derivation worker stopped");
}

fn handle(job: Job, config: &EngineConfig) {
    let kind = job.request.kind();
    if job.cancelled.load(Ordering::Relaxed) {
        tracing::warn!(id = job.id, kind, "Skipping cancelled request");
        let _ = job.reply.send(Err(EngineError::Cancelled(job.id)));
        return;
    }

    let start = Instant::now();
    let reply = execute(&job.request, config);
    tracing::debug!(
        id = job.id,
        kind,
        format = ?job.request.format(),
        ok = reply.is_ok(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Request completed"
    );

    if job.reply.send(reply).is_err() {
        tracing::warn!(id = job.id, kind, "Requester gone, dropping orphaned response");
    }
}

fn execute(request: &Request, config: &EngineConfig) -> Reply {
    let options = config.options();
    match request {
        Request::Password(r) => {
            let pash = Pash::with_options(&r.master_password, &r.user, options)?;
            let password = pash.generate_password(&r.service, &r.color, r.format, r.tier)?;
            Ok(Response::Password(Zeroizing::new(password)))
        }
        Request::PashKey(r) => {
            let pash = Pash::with_options(&r.master_password, &r.user, options)?;
            Ok(Response::PashKey(pash.pash_key(r.kind)?))
        }
        Request::Encrypt(r) => {
            let pash = Pash::with_options(&r.master_password, &r.user, options)?;
            Ok(Response::Ciphertext(pash.encrypt(&r.text)?))
        }
        Request::Decrypt(r) => {
            let pash = Pash::with_options(&r.master_password, &r.user, options)?;
            Ok(Response::Plaintext(pash.decrypt(&r.text).map(Zeroizing::new)))
        }
        Request::Breadcrumbs(r) => {
            let crumbs =
                breadcrumbs::generate(&r.typed, config.breadcrumb_step, config.breadcrumb_depth)?;
            Ok(Response::Breadcrumbs(crumbs))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
