//! Caller resolution
//!
//! Walks the current call stack and returns the first frame that lies outside
//! this crate, so records point at the user code that emitted them rather than
//! at logging internals.

use super::error::{LoggerError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Upper bound on stack frames inspected per resolution
const MAX_FRAMES: usize = 64;

/// A resolved stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    /// Demangled symbol name, without hash suffix
    pub function: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
}

impl Caller {
    pub fn new(function: impl Into<String>, file: Option<PathBuf>, line: Option<u32>) -> Self {
        Self {
            function: function.into(),
            file,
            line,
        }
    }

    /// `file:line`, if debug info was available
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file.display(), line)),
            (Some(file), None) => Some(file.display().to_string()),
            _ => None,
        }
    }

    /// File path relative to `root`, falling back to the path as recorded
    pub fn relative_file(&self, root: &Path) -> Option<PathBuf> {
        self.file
            .as_ref()
            .map(|file| file.strip_prefix(root).unwrap_or(file).to_path_buf())
    }
}

/// Root module of the logging code, i.e. this crate
pub fn logging_module() -> &'static str {
    let path = module_path!();
    path.split("::").next().unwrap_or(path)
}

/// Derive the owning module path of a demangled symbol
///
/// Strips the function segment along with any closure, shim and type
/// segments above it. Handles free functions (`a::b::f`), inherent methods
/// (`a::b::Type::f`, `<a::b::Type<T>>::f`) and trait impls
/// (`<a::b::Type as c::Trait>::f`).
pub fn module_path_of(symbol: &str) -> Result<String> {
    let symbol = strip_hash(symbol.trim());

    let segments = if symbol.starts_with('<') {
        let self_path = qualified_self_path(symbol)
            .ok_or_else(|| LoggerError::malformed_module(symbol))?;
        segments_of(&self_path)
    } else {
        let mut segments = segments_of(symbol);
        if segments.len() < 2 {
            return Err(LoggerError::malformed_module(symbol));
        }
        while segments.last().is_some_and(|s| is_closure(s)) {
            segments.pop();
        }
        segments.pop();
        segments
    };

    let mut segments = segments;
    while segments.last().is_some_and(|s| is_closure(s) || is_type(s)) {
        segments.pop();
    }

    if segments.is_empty() {
        return Err(LoggerError::malformed_module(symbol));
    }

    Ok(segments.join("::"))
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::") {
        Some((head, tail))
            if tail.len() == 17
                && tail.starts_with('h')
                && tail[1..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => symbol,
    }
}

/// Path of the self type in `<Self as Trait>::f` or `<Self>::f`
///
/// Falls back to the trait path when the self type is not a path
/// (references to primitives, slices, tuples).
fn qualified_self_path(symbol: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in symbol.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let inner = &symbol[1..close?];

    let (self_ty, trait_path) = match find_top_level(inner, " as ") {
        Some(pos) => (&inner[..pos], Some(&inner[pos + 4..])),
        None => (inner, None),
    };

    let self_ty = self_ty
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ")
        .trim_start_matches("*const ")
        .trim_start_matches("*mut ");

    let self_ty = strip_generics(self_ty);
    if self_ty.contains("::") {
        return Some(self_ty);
    }

    trait_path
        .map(strip_generics)
        .filter(|path| path.contains("::"))
}

fn find_top_level(haystack: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in haystack.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            _ if depth == 0 && haystack[i..].starts_with(needle) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Remove every `<...>` group
fn strip_generics(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn segments_of(path: &str) -> Vec<String> {
    strip_generics(path)
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn is_closure(segment: &str) -> bool {
    segment.starts_with('{')
}

fn is_type(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

fn is_within(module: &str, logging_module: &str) -> bool {
    module == logging_module
        || module
            .strip_prefix(logging_module)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Incremental search over frames, innermost first
///
/// Frames are ignored until the first one inside the logging module. After
/// that, the first frame outside it is the caller.
struct CallerSearch<'a> {
    logging_module: &'a str,
    entered: bool,
}

impl<'a> CallerSearch<'a> {
    fn new(logging_module: &'a str) -> Self {
        Self {
            logging_module,
            entered: false,
        }
    }

    fn offer(&mut self, frame: Caller) -> Result<Option<Caller>> {
        if !self.entered {
            if let Ok(module) = module_path_of(&frame.function) {
                self.entered = is_within(&module, self.logging_module);
            }
            return Ok(None);
        }

        // Unqualified symbols (`#[no_mangle]` exports, C frames) cannot
        // belong to the logging module.
        if !frame.function.contains("::") {
            return Ok(Some(frame));
        }

        let module = module_path_of(&frame.function)?;
        if is_within(&module, self.logging_module) {
            Ok(None)
        } else {
            Ok(Some(frame))
        }
    }
}

/// Find the caller among already captured frames, innermost first
pub fn find_caller<I>(frames: I, logging_module: &str) -> Result<Caller>
where
    I: IntoIterator<Item = Caller>,
{
    let mut search = CallerSearch::new(logging_module);
    for frame in frames {
        if let Some(caller) = search.offer(frame)? {
            return Ok(caller);
        }
    }
    Err(LoggerError::NoCaller)
}

/// Function a logger tree uses to find the caller of each operation
///
/// Defaults to [`resolve`]. [`disabled`] skips the stack walk entirely.
pub type CallerResolver = fn() -> Result<Caller>;

/// Resolver that never finds a caller
pub fn disabled() -> Result<Caller> {
    Err(LoggerError::NoCaller)
}

/// Resolve the caller of the current logging operation
///
/// Returns [`LoggerError::NoCaller`] when the stack never leaves this crate
/// or carries no symbols.
pub fn resolve() -> Result<Caller> {
    let mut search = CallerSearch::new(logging_module());
    let mut outcome: Option<Result<Caller>> = None;
    let mut inspected = 0usize;

    backtrace::trace(|frame| {
        inspected += 1;
        backtrace::resolve_frame(frame, |symbol| {
            if outcome.is_some() {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            let candidate = Caller {
                function: format!("{:#}", name),
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
            };
            match search.offer(candidate) {
                Ok(Some(caller)) => outcome = Some(Ok(caller)),
                Ok(None) => {}
                Err(e) => outcome = Some(Err(e)),
            }
        });
        outcome.is_none() && inspected < MAX_FRAMES
    });

    outcome.unwrap_or(Err(LoggerError::NoCaller))
}
