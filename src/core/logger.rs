//! Logger tree: nodes, handler dispatch and lifecycle

use super::{
    attribute::{args_to_attrs, Value},
    caller::{self, Caller, CallerResolver},
    error::{join, LoggerError, Result},
    handler::Handler,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record::{LifecycleEvent, LifecycleKind, LoggerIdentity, Record},
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Lifecycle state of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Open,
    Closed,
}

struct Node {
    id: Uuid,
    parent: Weak<Node>,
    children: RwLock<Vec<Arc<Node>>>,
    state: Mutex<LoggerState>,

    // Tree-wide configuration. Only the root's copy is ever read or written.
    handlers: RwLock<Vec<Box<dyn Handler>>>,
    panic_on_error: AtomicBool,
    resolver: RwLock<CallerResolver>,
    metrics: LoggerMetrics,
}

impl Node {
    fn new(parent: Weak<Node>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            children: RwLock::new(Vec::new()),
            state: Mutex::new(LoggerState::Open),
            handlers: RwLock::new(Vec::new()),
            panic_on_error: AtomicBool::new(false),
            resolver: RwLock::new(caller::resolve),
            metrics: LoggerMetrics::new(),
        }
    }

    fn root(self: &Arc<Self>) -> Arc<Node> {
        let mut node = Arc::clone(self);
        while let Some(parent) = node.parent.upgrade() {
            node = parent;
        }
        node
    }

    fn identity(self: &Arc<Self>) -> LoggerIdentity {
        LoggerIdentity {
            id: self.id,
            parent: self.parent.upgrade().map(|parent| parent.id),
            root: self.root().id,
            children: self.children.read().iter().map(|child| child.id).collect(),
        }
    }

    /// Close children first, then notify handlers about this node
    ///
    /// The state lock is held for the whole operation so concurrent closes
    /// of the same node notify handlers once.
    fn close(self: &Arc<Self>) -> Result<()> {
        let mut state = self.state.lock();
        if *state == LoggerState::Closed {
            return Ok(());
        }

        let mut errors = Vec::new();

        let children: Vec<Arc<Node>> = self.children.read().clone();
        for child in &children {
            if let Err(e) = child.close() {
                errors.push(e);
            }
        }

        let root = self.root();
        let caller = event_caller(&root)?;

        let event = LifecycleEvent::new(LifecycleKind::Closed, self.identity(), caller);
        if let Err(e) = dispatch(&root, Delivery::Closed, |handler| handler.on_closed(&event)) {
            errors.push(e);
        }

        *state = LoggerState::Closed;
        root.metrics.record_closed();
        tracing::trace!(logger = %self.id, "logger closed");

        join(errors)
    }
}

/// Caller for a record or event; a missing caller is not an error
///
/// Must be called directly from the logging operation, never from a
/// closure, or the closure's caller is reported instead.
fn event_caller(root: &Node) -> Result<Option<Caller>> {
    let resolve = *root.resolver.read();
    match resolve() {
        Ok(caller) => Ok(Some(caller)),
        Err(LoggerError::NoCaller) => Ok(None),
        Err(e) => Err(e),
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = panic_info.downcast_ref::<LoggerError>() {
        e.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Handler callback being dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Record,
    Closed,
    Flush,
}

/// Invoke `call` on every handler of `root`, in registration order
///
/// Every handler is called even if earlier ones fail. A panicking handler is
/// isolated and reported as [`LoggerError::HandlerPanicked`].
fn dispatch<F>(root: &Node, delivery: Delivery, mut call: F) -> Result<()>
where
    F: FnMut(&mut Box<dyn Handler>) -> Result<()>,
{
    let mut errors = Vec::new();
    let mut handlers = root.handlers.write();

    for handler in handlers.iter_mut() {
        if delivery == Delivery::Record {
            root.metrics.record_delivery();
        }
        let outcome = catch_unwind(AssertUnwindSafe(|| call(handler)));

        let error = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(panic_info) => LoggerError::HandlerPanicked {
                handler: handler.name().to_string(),
                message: panic_message(panic_info.as_ref()),
            },
        };

        tracing::debug!(handler = handler.name(), ?delivery, error = %error, "handler failed");
        root.metrics.record_handler_failure();
        if delivery == Delivery::Record {
            root.metrics.record_delivery_failure();
        }
        errors.push(error);
    }

    join(errors)
}

/// Creation notifications are best-effort: panics are reported, not returned
fn dispatch_created(root: &Node, event: &LifecycleEvent) {
    let mut handlers = root.handlers.write();

    for handler in handlers.iter_mut() {
        let outcome = catch_unwind(AssertUnwindSafe(|| handler.on_created(event)));
        if let Err(panic_info) = outcome {
            tracing::warn!(
                handler = handler.name(),
                "handler panicked on logger creation: {}",
                panic_message(panic_info.as_ref())
            );
        }
    }
}

/// A node in a logger tree
///
/// `Logger` is a cheap handle: clones refer to the same node. Each node owns
/// its children and holds a weak link to its parent. Handlers, the
/// panic-on-error flag and metrics belong to the tree and are always
/// resolved through the root, whichever node is used.
///
/// Handlers must not log to their own tree from inside a callback: the
/// root's handler list is locked for the duration of a dispatch.
#[derive(Clone)]
pub struct Logger {
    node: Arc<Node>,
}

impl Logger {
    /// Create a new root logger
    ///
    /// Roots do not emit a creation event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Arc::new(Node::new(Weak::new())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.node.id
    }

    pub fn state(&self) -> LoggerState {
        *self.node.state.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == LoggerState::Closed
    }

    pub fn parent(&self) -> Option<Logger> {
        self.node.parent.upgrade().map(|node| Logger { node })
    }

    pub fn root(&self) -> Logger {
        Logger {
            node: self.node.root(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.upgrade().is_none()
    }

    /// Direct children in creation order
    pub fn children(&self) -> Vec<Logger> {
        self.node
            .children
            .read()
            .iter()
            .map(|node| Logger {
                node: Arc::clone(node),
            })
            .collect()
    }

    /// Number of parent links between this logger and its root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = Arc::clone(&self.node);
        while let Some(parent) = node.parent.upgrade() {
            node = parent;
            depth += 1;
        }
        depth
    }

    /// Snapshot of this logger's position in the tree
    pub fn identity(&self) -> LoggerIdentity {
        self.node.identity()
    }

    /// Create a child logger and notify every handler of the tree
    ///
    /// If the caller cannot be resolved the event is sent without one.
    pub fn child(&self) -> Logger {
        let child = Arc::new(Node::new(Arc::downgrade(&self.node)));
        self.node.children.write().push(Arc::clone(&child));

        let root = child.root();
        let caller = match event_caller(&root) {
            Ok(caller) => caller,
            Err(e) => {
                tracing::warn!(error = %e, "creating logger without caller information");
                None
            }
        };

        root.metrics.record_created();

        let event = LifecycleEvent::new(LifecycleKind::Created, child.identity(), caller);
        dispatch_created(&root, &event);

        Logger { node: child }
    }

    /// Close this logger and, first, every descendant
    ///
    /// Closing is exhaustive: failures from children and handlers are
    /// collected and returned together once the whole subtree is closed.
    /// Closing a closed logger succeeds without side effects.
    pub fn close(&self) -> Result<()> {
        self.node.close()
    }

    /// Register a handler on the root of this logger's tree
    pub fn add_handler(&self, handler: Box<dyn Handler>) {
        self.node.root().handlers.write().push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.node.root().handlers.read().len()
    }

    /// Names of the registered handlers, in registration order
    pub fn handler_names(&self) -> Vec<String> {
        self.node
            .root()
            .handlers
            .read()
            .iter()
            .map(|handler| handler.name().to_string())
            .collect()
    }

    pub fn panic_on_error(&self) -> bool {
        self.node.root().panic_on_error.load(Ordering::Relaxed)
    }

    /// Escalate failed dispatches of leveled calls to panics, tree-wide
    pub fn set_panic_on_error(&self, value: bool) {
        self.node
            .root()
            .panic_on_error
            .store(value, Ordering::Relaxed);
    }

    /// Replace how the tree finds the caller of records and events
    ///
    /// See [`caller::resolve`] and [`caller::disabled`].
    pub fn set_caller_resolver(&self, resolver: CallerResolver) {
        *self.node.root().resolver.write() = resolver;
    }

    /// Snapshot of the tree's metrics
    pub fn metrics(&self) -> LoggerMetrics {
        self.node.root().metrics.clone()
    }

    /// Flush every handler, collecting failures
    pub fn flush(&self) -> Result<()> {
        dispatch(&self.node.root(), Delivery::Flush, |handler| handler.flush())
    }

    /// Build a record and dispatch it to every handler
    ///
    /// Unlike the leveled methods, never escalates a failure to a panic.
    pub fn log<M, I>(&self, level: LogLevel, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        let root = self.node.root();
        let caller = event_caller(&root)?;

        let record = Record::new(level, message)
            .with_caller(caller)
            .with_attributes(args_to_attrs(args));

        let identity = self.node.identity();
        root.metrics.record_dispatched();
        dispatch(&root, Delivery::Record, |handler| {
            handler.handle_record(&identity, &record)
        })
    }

    /// Log and apply the panic-on-error policy
    fn log_checked<M, I>(&self, level: LogLevel, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        match self.log(level, message, args) {
            Err(e) if self.panic_on_error() => std::panic::panic_any(e),
            result => result,
        }
    }

    #[inline]
    pub fn debug<M, I>(&self, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        self.log_checked(LogLevel::Debug, message, args)
    }

    #[inline]
    pub fn info<M, I>(&self, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        self.log_checked(LogLevel::Info, message, args)
    }

    #[inline]
    pub fn warn<M, I>(&self, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        self.log_checked(LogLevel::Warn, message, args)
    }

    #[inline]
    pub fn error<M, I>(&self, message: M, args: I) -> Result<()>
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        self.log_checked(LogLevel::Error, message, args)
    }

    /// Log at fatal level, flush handlers and exit the process with status 1
    pub fn fatal<M, I>(&self, message: M, args: I) -> !
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        if let Err(e) = self.log_checked(LogLevel::Fatal, message, args) {
            tracing::error!(error = %e, "fatal record was not fully dispatched");
        }
        if let Err(e) = self.flush() {
            tracing::error!(error = %e, "failed to flush handlers before exit");
        }
        std::process::exit(1)
    }

    /// Log at panic level, then panic unconditionally
    pub fn panic<M, I>(&self, message: M, args: I) -> !
    where
        M: Into<String>,
        I: IntoIterator<Item = Value>,
    {
        if let Err(e) = self.log_checked(LogLevel::Panic, message, args) {
            tracing::error!(error = %e, "panic record was not fully dispatched");
        }
        panic!("an unrecoverable error has occurred")
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Logger {}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("id", &self.node.id)
            .field("state", &self.state())
            .field("children", &self.node.children.read().len())
            .finish()
    }
}

/// Builder for constructing a root Logger with a fluent API
///
/// # Example
/// ```
/// use rust_logger_tree::prelude::*;
///
/// let logger = Logger::builder()
///     .handler(PrettyHandler::stderr(LogLevel::Info))
///     .panic_on_error(false)
///     .build();
///
/// assert_eq!(logger.handler_count(), 1);
/// ```
pub struct LoggerBuilder {
    handlers: Vec<Box<dyn Handler>>,
    panic_on_error: bool,
    resolver: CallerResolver,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            panic_on_error: false,
            resolver: caller::resolve,
        }
    }

    /// Add a handler
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Escalate failed dispatches to panics
    #[must_use = "builder methods return a new value"]
    pub fn panic_on_error(mut self, value: bool) -> Self {
        self.panic_on_error = value;
        self
    }

    /// Find callers with `resolver` instead of walking the stack
    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver(mut self, resolver: CallerResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(self) -> Logger {
        let logger = Logger::new();
        logger.set_panic_on_error(self.panic_on_error);
        logger.set_caller_resolver(self.resolver);
        for handler in self.handlers {
            logger.add_handler(handler);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: String,
        journal: Journal,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &str, journal: &Journal) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                journal: Arc::clone(journal),
                fail: false,
            })
        }

        fn failing(name: &str, journal: &Journal) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                journal: Arc::clone(journal),
                fail: true,
            })
        }

        fn outcome(&self, what: &str) -> Result<()> {
            if self.fail {
                Err(LoggerError::handler(&self.name, what))
            } else {
                Ok(())
            }
        }
    }

    impl Handler for Recorder {
        fn on_created(&mut self, event: &LifecycleEvent) {
            self.journal
                .lock()
                .push(format!("{}:created:{}", self.name, event.logger.id));
        }

        fn on_closed(&mut self, event: &LifecycleEvent) -> Result<()> {
            self.journal
                .lock()
                .push(format!("{}:closed:{}", self.name, event.logger.id));
            self.outcome("close")
        }

        fn handle_record(&mut self, _logger: &LoggerIdentity, record: &Record) -> Result<()> {
            self.journal
                .lock()
                .push(format!("{}:record:{}", self.name, record.message));
            self.outcome("record")
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct Panicking;

    impl Handler for Panicking {
        fn on_created(&mut self, _event: &LifecycleEvent) {
            panic!("created");
        }

        fn on_closed(&mut self, _event: &LifecycleEvent) -> Result<()> {
            panic!("closed");
        }

        fn handle_record(&mut self, _logger: &LoggerIdentity, _record: &Record) -> Result<()> {
            panic!("record");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct Capture(Arc<Mutex<Option<Record>>>);

    impl Handler for Capture {
        fn on_created(&mut self, _event: &LifecycleEvent) {}

        fn on_closed(&mut self, _event: &LifecycleEvent) -> Result<()> {
            Ok(())
        }

        fn handle_record(&mut self, _logger: &LoggerIdentity, record: &Record) -> Result<()> {
            *self.0.lock() = Some(record.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn malformed() -> Result<Caller> {
        Err(LoggerError::malformed_module("<app::Pool::spawn"))
    }

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_root_has_no_creation_event() {
        let events = journal();
        let logger = Logger::builder().build();
        logger.add_handler(Recorder::new("h", &events));

        assert!(logger.is_root());
        assert_eq!(logger.depth(), 0);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_child_links_and_notifies() {
        let events = journal();
        let root = Logger::new();
        root.add_handler(Recorder::new("h", &events));

        let child = root.child();

        assert_eq!(child.parent(), Some(root.clone()));
        assert_eq!(root.children(), vec![child.clone()]);
        assert_eq!(child.root(), root);
        assert_eq!(*events.lock(), vec![format!("h:created:{}", child.id())]);

        let identity = child.identity();
        assert_eq!(identity.parent, Some(root.id()));
        assert_eq!(identity.root, root.id());
        assert!(identity.children.is_empty());
    }

    #[test]
    fn test_child_creation_touches_only_parent() {
        let root = Logger::new();
        let a = root.child();
        let b = root.child();
        let a1 = a.child();

        assert_eq!(root.children(), vec![a.clone(), b.clone()]);
        assert_eq!(a.children(), vec![a1.clone()]);
        assert!(b.children().is_empty());
        assert_eq!(a1.depth(), 2);
    }

    #[test]
    fn test_handler_registered_on_child_is_tree_wide() {
        let events = journal();
        let root = Logger::new();
        let a = root.child();
        let b = root.child();

        a.add_handler(Recorder::new("h", &events));

        assert_eq!(root.handler_count(), 1);
        assert_eq!(b.handler_names(), vec!["h".to_string()]);

        b.info("from sibling", []).unwrap();
        root.info("from root", []).unwrap();

        assert_eq!(
            *events.lock(),
            vec!["h:record:from sibling", "h:record:from root"]
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let events = journal();
        let root = Logger::new();
        root.add_handler(Recorder::new("h", &events));

        root.close().unwrap();
        assert!(root.is_closed());
        root.close().unwrap();

        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn test_close_cascades_children_before_parent() {
        let events = journal();
        let root = Logger::new();
        let a = root.child();
        let a1 = a.child();
        let b = root.child();
        root.add_handler(Recorder::new("h", &events));

        root.close().unwrap();

        let expected: Vec<String> = [&a1, &a, &b, &root]
            .iter()
            .map(|l| format!("h:closed:{}", l.id()))
            .collect();
        assert_eq!(*events.lock(), expected);
        assert!([&root, &a, &a1, &b].iter().all(|l| l.is_closed()));
    }

    #[test]
    fn test_close_skips_already_closed_subtree() {
        let events = journal();
        let root = Logger::new();
        let a = root.child();
        root.add_handler(Recorder::new("h", &events));

        a.close().unwrap();
        root.close().unwrap();

        assert_eq!(
            *events.lock(),
            vec![format!("h:closed:{}", a.id()), format!("h:closed:{}", root.id())]
        );
    }

    #[test]
    fn test_close_collects_every_failure() {
        let events = journal();
        let root = Logger::new();
        let a = root.child();
        let b = root.child();
        root.add_handler(Recorder::failing("bad", &events));
        root.add_handler(Recorder::new("good", &events));

        let err = root.close().unwrap_err();

        // one failure for each of a, b and root
        assert_eq!(err.leaves().len(), 3);
        assert!(a.is_closed() && b.is_closed() && root.is_closed());
        assert_eq!(
            events
                .lock()
                .iter()
                .filter(|e| e.starts_with("good:closed"))
                .count(),
            3
        );
    }

    #[test]
    fn test_dispatch_calls_all_handlers_and_aggregates_in_order() {
        let events = journal();
        let logger = Logger::new();
        logger.add_handler(Recorder::failing("first", &events));
        logger.add_handler(Recorder::new("second", &events));
        logger.add_handler(Recorder::failing("third", &events));

        let err = logger.warn("disk almost full", []).unwrap_err();

        assert_eq!(events.lock().len(), 3);
        let failing: Vec<String> = err
            .errors()
            .iter()
            .map(|e| match e {
                LoggerError::HandlerFailed { handler, .. } => handler.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(failing, vec!["first", "third"]);
    }

    #[test]
    fn test_no_handlers_is_success() {
        let logger = Logger::new();
        assert!(logger.debug("nothing listens", []).is_ok());
        assert!(logger.close().is_ok());
    }

    #[test]
    fn test_error_returned_without_panic_on_error() {
        let events = journal();
        let logger = Logger::new();
        logger.add_handler(Recorder::failing("bad", &events));

        assert!(logger.error("boom", []).is_err());
    }

    #[test]
    fn test_panic_on_error_escalates() {
        let events = journal();
        let root = Logger::new();
        let child = root.child();
        root.add_handler(Recorder::failing("bad", &events));
        child.set_panic_on_error(true);

        assert!(root.panic_on_error());

        let outcome = catch_unwind(AssertUnwindSafe(|| child.info("boom", [])));
        let payload = outcome.unwrap_err();
        let err = payload.downcast_ref::<LoggerError>().expect("LoggerError payload");
        assert!(matches!(err, LoggerError::Aggregate(_)));
    }

    #[test]
    fn test_panic_on_error_ignores_raw_log() {
        let events = journal();
        let logger = Logger::builder().panic_on_error(true).build();
        logger.add_handler(Recorder::failing("bad", &events));

        assert!(logger.log(LogLevel::Info, "raw", []).is_err());
    }

    #[test]
    fn test_panic_level_always_panics() {
        let events = journal();
        let logger = Logger::new();
        logger.add_handler(Recorder::new("h", &events));

        let outcome = catch_unwind(AssertUnwindSafe(|| logger.panic("fatal state", [])));
        let payload = outcome.unwrap_err();

        assert_eq!(
            payload.downcast_ref::<&str>().copied(),
            Some("an unrecoverable error has occurred")
        );
        assert_eq!(*events.lock(), vec!["h:record:fatal state"]);
    }

    #[test]
    fn test_handler_panic_is_isolated() {
        let events = journal();
        let logger = Logger::new();
        logger.add_handler(Box::new(Panicking));
        logger.add_handler(Recorder::new("after", &events));

        let child = logger.child();
        let err = child.info("still delivered", []).unwrap_err();

        assert!(matches!(
            err.errors()[0],
            LoggerError::HandlerPanicked { ref message, .. } if message == "record"
        ));
        assert_eq!(
            *events.lock(),
            vec![
                format!("after:created:{}", child.id()),
                "after:record:still delivered".to_string()
            ]
        );
    }

    #[test]
    fn test_attributes_reach_handlers() {
        let slot = Arc::new(Mutex::new(None));
        let logger = Logger::builder().handler(Capture(Arc::clone(&slot))).build();

        logger
            .info("login", [Value::from("user"), Value::from("ada"), Value::from(7)])
            .unwrap();

        let record = slot.lock().take().expect("record captured");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.attribute("user"), Some(&Value::from("ada")));
        assert!(record.attributes[1].is_bad_key());
    }

    #[test]
    fn test_metrics_are_tree_wide() {
        let events = journal();
        let root = Logger::new();
        root.add_handler(Recorder::failing("bad", &events));

        let child = root.child();
        let _ = child.info("x", []);
        let _ = root.close();

        let metrics = child.metrics();
        assert_eq!(metrics.loggers_created(), 1);
        assert_eq!(metrics.records_dispatched(), 1);
        assert_eq!(metrics.deliveries(), 1);
        assert_eq!(metrics.delivery_failures(), 1);
        assert_eq!(metrics.loggers_closed(), 2);
        assert_eq!(metrics.handler_failures(), 3);
        assert_eq!(metrics.failure_rate(), 100.0);
    }

    #[test]
    fn test_failure_rate_counts_record_deliveries_only() {
        let events = journal();
        let root = Logger::new();
        root.add_handler(Recorder::failing("bad", &events));
        root.add_handler(Recorder::new("good", &events));

        let child = root.child();
        let _ = child.info("x", []);
        let _ = root.close();
        let _ = root.flush();

        let metrics = root.metrics();
        assert_eq!(metrics.records_dispatched(), 1);
        assert_eq!(metrics.deliveries(), 2);
        assert_eq!(metrics.delivery_failures(), 1);
        // one record failure plus one close failure for each logger
        assert_eq!(metrics.handler_failures(), 3);
        assert_eq!(metrics.failure_rate(), 50.0);
    }

    #[test]
    fn test_close_aborts_on_malformed_caller() {
        let events = journal();
        let root = Logger::new();
        root.add_handler(Recorder::new("h", &events));
        let child = root.child();
        events.lock().clear();

        root.set_caller_resolver(malformed);
        let err = child.close().unwrap_err();

        assert!(matches!(err, LoggerError::MalformedModulePath { .. }));
        assert!(events.lock().is_empty());
        assert_eq!(child.state(), LoggerState::Open);
        assert_eq!(root.metrics().loggers_closed(), 0);

        // the node can still be closed once callers resolve again
        root.set_caller_resolver(caller::resolve);
        child.close().unwrap();
        assert_eq!(*events.lock(), vec![format!("h:closed:{}", child.id())]);
    }

    #[test]
    fn test_close_abort_keeps_parent_open() {
        let events = journal();
        let root = Logger::builder()
            .handler(*Recorder::new("h", &events))
            .caller_resolver(malformed)
            .build();
        let child = root.child();

        let err = root.close().unwrap_err();

        assert!(matches!(err, LoggerError::MalformedModulePath { .. }));
        assert!(!root.is_closed());
        assert!(!child.is_closed());
        // creation still notified, without a caller
        assert_eq!(*events.lock(), vec![format!("h:created:{}", child.id())]);
    }

    #[test]
    fn test_log_aborts_on_malformed_caller() {
        let events = journal();
        let logger = Logger::builder()
            .handler(*Recorder::new("h", &events))
            .caller_resolver(malformed)
            .build();

        let err = logger.log(LogLevel::Info, "lost", []).unwrap_err();

        assert!(matches!(err, LoggerError::MalformedModulePath { .. }));
        assert!(events.lock().is_empty());
        assert_eq!(logger.metrics().records_dispatched(), 0);
        assert_eq!(logger.metrics().deliveries(), 0);
    }

    #[test]
    fn test_disabled_resolver_omits_caller() {
        let slot = Arc::new(Mutex::new(None));
        let root = Logger::builder()
            .handler(Capture(Arc::clone(&slot)))
            .caller_resolver(caller::disabled)
            .build();

        root.child().info("anonymous", []).unwrap();

        let record = slot.lock().take().expect("record captured");
        assert_eq!(record.caller, None);
    }

    #[test]
    fn test_concurrent_child_creation() {
        let root = Logger::new();
        let created = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let root = root.clone();
                let created = Arc::clone(&created);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        root.child();
                        created.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(root.children().len(), created.load(Ordering::Relaxed));
        assert_eq!(root.children().len(), 200);
    }

    #[test]
    fn test_dropped_ancestor_makes_node_its_own_root() {
        let child = {
            let root = Logger::new();
            root.child()
        };

        assert!(child.is_root());
        assert_eq!(child.root(), child);
        assert_eq!(child.identity().root, child.id());
    }
}
