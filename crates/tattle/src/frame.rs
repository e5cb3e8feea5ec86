// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt;

/// A call-site frame: the function that created an error and where it did so.
///
/// Frames are usually recorded with the [`frame!`](crate::frame) macro, which knows the
/// enclosing function's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    function: Cow<'static, str>,
    file: Cow<'static, str>,
    line: u32,
}

impl Frame {
    /// Creates a frame from a function path, a source file and a line number.
    pub fn new(function: impl Into<Cow<'static, str>>, file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Creates a frame from the type name of a marker function nested in the calling function.
    ///
    /// Used by [`frame!`](crate::frame); not meant to be called directly.
    #[doc(hidden)]
    #[must_use]
    pub fn from_marker(marker: &'static str, file: &'static str, line: u32) -> Self {
        let mut function = marker.rsplit_once("::").map_or(marker, |(enclosing, _)| enclosing);
        while let Some(stripped) = function.strip_suffix("::{{closure}}") {
            function = stripped;
        }

        Self::new(function, file, line)
    }

    /// The full path of the function, e.g. `my_crate::config::load`.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The function name without its module path, e.g. `load`.
    ///
    /// Methods keep the name of their type, e.g. `Loader::load`, when the segment before the
    /// name looks like a plain type name. Trait impls and generic types reduce to the method name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        let path = self.function.as_ref();
        let Some((parent, name)) = path.rsplit_once("::") else {
            return path;
        };

        let owner = parent.rsplit_once("::").map_or(parent, |(_, owner)| owner);
        if is_type_name(owner) {
            &path[path.len() - name.len() - owner.len() - 2..]
        } else {
            name
        }
    }

    /// The source file as recorded.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The line number within [`file`](Self::file).
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Renders `<file name>:<line>`, with any directories stripped from the file.
    #[must_use]
    pub fn file_line(&self) -> String {
        let name = self.file.rsplit_once(['/', '\\']).map_or(self.file.as_ref(), |(_, name)| name);
        format!("{name}:{}", self.line)
    }
}

fn is_type_name(segment: &str) -> bool {
    segment.starts_with(|c: char| c.is_ascii_uppercase()) && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {}:{})", self.function, self.file, self.line)
    }
}

/// An ordered list of frames, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<Frame>,
}

impl StackTrace {
    /// Creates an empty stack trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the innermost frame.
    #[must_use]
    pub fn top(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Returns all frames, innermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns `true` if there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Appends an outer frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }
}

impl From<Frame> for StackTrace {
    fn from(frame: Frame) -> Self {
        Self { frames: vec![frame] }
    }
}

impl From<Vec<Frame>> for StackTrace {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for StackTrace {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Records the [`Frame`] of the calling function.
///
/// ```rust
/// fn load() -> tattle::Frame {
///     tattle::frame!()
/// }
///
/// let frame = load();
/// assert_eq!(frame.function_name(), "load");
/// assert!(frame.line() > 0);
/// ```
#[macro_export]
macro_rules! frame {
    () => {{
        fn __tattle_marker() {}
        $crate::Frame::from_marker(::std::any::type_name_of_val(&__tattle_marker), ::std::file!(), ::std::line!())
    }};
}
