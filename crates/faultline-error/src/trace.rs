//! Call-origin capture.
//!
//! A [`TraceProvider`] turns the [`Origin`] of an error (the location recorded
//! by `#[track_caller]`, optionally with the enclosing function name supplied
//! by [`crate::function_name!`]) into the bounded "ops" list and the rendered
//! stack stored on a [`crate::CError`]. The provider is injected through
//! [`crate::RequestContext`], so hosts can trade detail for cost without
//! touching the construction sites.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

/// Maximum number of ops recorded when nothing else is configured.
pub const DEFAULT_OPS_DEPTH: usize = 6;

// Frames belonging to the runtime or to this crate's own construction paths,
// by symbol. Only used when the backtrace has no line tables.
const SKIPPED_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "faultline_error::trace::",
    "faultline_error::cerror::CError::",
    "faultline_error::validation::ValidationError::",
    "faultline_error::multi::MultiError::",
];

// Trait impls render as `<T as path::Trait>::method`.
const SKIPPED_IMPLS: &[&str] = &[
    " as core::ops::function::",
    " as faultline_error::result_ext::",
];

/// Where an error was first observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    function: Option<&'static str>,
    location: &'static Location<'static>,
}

impl Origin {
    /// Origin at the caller of the enclosing `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        Self {
            function: None,
            location: Location::caller(),
        }
    }

    /// Same as [`Origin::caller`], with the enclosing function's path.
    #[track_caller]
    pub fn named(function: &'static str) -> Self {
        Self {
            function: Some(function),
            location: Location::caller(),
        }
    }

    pub fn function(&self) -> Option<&'static str> {
        self.function
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    fn op_for(&self, function: &str) -> String {
        format!("{function}:{}", self.location.line())
    }

    /// `function:line` when the function is known, `file:line` otherwise.
    pub fn op(&self) -> String {
        match self.function {
            Some(function) => self.op_for(function),
            None => format!("{}:{}", self.location.file(), self.location.line()),
        }
    }
}

/// Turn the type name of a marker fn defined inside a function into the
/// function's path. Used by [`crate::function_name!`].
#[doc(hidden)]
pub fn function_path(marker: &'static str) -> &'static str {
    let mut path = marker.rsplit_once("::").map_or(marker, |(path, _)| path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path
}

/// Ops (most recent first) and the rendered stack captured for one error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub ops: Vec<String>,
    pub stack: String,
}

/// Source of ops/stack data for newly constructed errors.
pub trait TraceProvider: fmt::Debug + Send + Sync {
    fn capture(&self, origin: Origin) -> Trace;
}

/// Walks the real call stack with [`std::backtrace::Backtrace`].
///
/// The first op always describes the origin. When the origin carries no
/// function name, it is taken from the frame sitting at the origin's
/// location, so the frames of this crate's constructors never lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktraceProvider {
    depth: usize,
}

impl BacktraceProvider {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for BacktraceProvider {
    fn default() -> Self {
        Self::new(DEFAULT_OPS_DEPTH)
    }
}

impl TraceProvider for BacktraceProvider {
    fn capture(&self, origin: Origin) -> Trace {
        let stack = Backtrace::force_capture().to_string();
        let ops = ops_from_frames(&parse_frames(&stack), origin, self.depth);
        Trace { ops, stack }
    }
}

/// The origin frame is the first one located exactly at the `#[track_caller]`
/// location; everything above it is construction machinery. Symbol names are
/// only consulted when no frame carries that location (no line tables).
fn ops_from_frames(frames: &[Frame], origin: Origin, depth: usize) -> Vec<String> {
    let mut ops = Vec::with_capacity(depth);
    let callers: &[Frame] = match frames.iter().position(|f| f.is_at(origin.location)) {
        Some(pos) => {
            ops.push(origin.op_for(origin.function.unwrap_or(frames[pos].name.as_str())));
            &frames[pos + 1..]
        }
        None => {
            let found = frames.iter().position(|f| match origin.function {
                Some(function) => belongs_to(&f.name, function),
                None => !is_skipped(&f.name),
            });
            match (origin.function, found) {
                (Some(function), Some(pos)) => {
                    ops.push(origin.op_for(function));
                    &frames[pos..]
                }
                (Some(function), None) => {
                    ops.push(origin.op_for(function));
                    frames
                        .iter()
                        .position(|f| !is_skipped(&f.name))
                        .map_or(&[][..], |pos| &frames[pos..])
                }
                (None, Some(pos)) => {
                    ops.push(origin.op_for(&frames[pos].name));
                    &frames[pos + 1..]
                }
                (None, None) => {
                    ops.push(origin.op());
                    &[]
                }
            }
        }
    };

    // Closures of the origin function are part of the same op.
    let run = origin.function.map_or(0, |function| {
        callers
            .iter()
            .take_while(|f| belongs_to(&f.name, function))
            .count()
    });
    ops.extend(
        callers[run..]
            .iter()
            .filter(|f| !f.is_runtime())
            .map(Frame::render),
    );
    ops.truncate(depth);
    ops
}

/// `name` is `function` itself or something nested in it, never a sibling
/// that merely shares the prefix.
fn belongs_to(name: &str, function: &str) -> bool {
    name.strip_prefix(function)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Records only the origin. No stack walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationProvider;

impl TraceProvider for LocationProvider {
    fn capture(&self, origin: Origin) -> Trace {
        Trace {
            ops: vec![origin.op()],
            stack: String::new(),
        }
    }
}

/// Records nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTrace;

impl TraceProvider for NoTrace {
    fn capture(&self, _origin: Origin) -> Trace {
        Trace::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    name: String,
    file: Option<String>,
    line: Option<u32>,
}

impl Frame {
    fn render(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.name),
            None => self.name.clone(),
        }
    }

    fn is_at(&self, location: &Location<'_>) -> bool {
        self.line == Some(location.line())
            && self
                .file
                .as_deref()
                .is_some_and(|file| same_file(file, location.file()))
    }

    /// Standard library, compiler shims and unresolved addresses.
    fn is_runtime(&self) -> bool {
        match self.file.as_deref() {
            Some(file) => {
                RUNTIME_SOURCES.iter().any(|dir| file.contains(dir))
                    || SKIPPED_IMPLS.iter().any(|infix| self.name.contains(infix))
            }
            None => is_skipped(&self.name),
        }
    }
}

// Source paths of the toolchain's own crates.
const RUNTIME_SOURCES: &[&str] = &["/rustc/", "/library/std/", "/library/core/", "/library/alloc/"];

/// Backtraces print paths relative to the workspace (`./src/a.rs`) or
/// absolute, while `Location::file` has no `./` prefix.
fn same_file(frame: &str, location: &str) -> bool {
    let frame = frame.trim_start_matches("./");
    let location = location.trim_start_matches("./");
    frame.ends_with(location) || location.ends_with(frame)
}

/// Parse the `Display` rendering of a [`Backtrace`]:
///
/// ```text
///    3: my_service::handlers::create_user
///              at ./src/handlers.rs:42:17
/// ```
///
/// Inlined symbols are printed without an index and become frames of their own.
fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in rendered.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.line.is_none() {
                    let (file, line) = parse_location(location);
                    frame.file = Some(file.to_string());
                    frame.line = line;
                }
            }
            continue;
        }
        let name = match line.split_once(": ") {
            Some((index, name)) if index.chars().all(|c| c.is_ascii_digit()) => name,
            _ => line,
        };
        frames.push(Frame {
            name: name.to_string(),
            file: None,
            line: None,
        });
    }
    frames
}

/// `path:line:column` or `path:line`.
fn parse_location(location: &str) -> (&str, Option<u32>) {
    let mut path = location;
    let mut numbers = Vec::with_capacity(2);
    while numbers.len() < 2 {
        match path.rsplit_once(':') {
            Some((rest, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                numbers.push(n);
                path = rest;
            }
            _ => break,
        }
    }
    // The line is the first number after the path.
    let line = numbers.last().and_then(|n| n.parse().ok());
    (path, line)
}
