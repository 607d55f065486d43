//! File operation tools: read_file, list_files, edit_file

use super::handler::ToolHandler;
use super::path::PathResolver;
use quill_domain::{ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResultEnvelope};
use serde_json::json;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const LIST_FILES: &str = "list_files";
pub const EDIT_FILE: &str = "edit_file";

/// Maximum file size to read (10 MB)
/// Get the tool definition for read_file
pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read the full contents of a UTF-8 text file. Use this to inspect a file before editing it.",
    )
    .with_parameter(
        ToolParameter::new("filename", "Path of the file to read", true).with_type("string"),
    )
}

/// Get the tool definition for list_files
pub fn list_files_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_FILES,
        "List the entries of a directory. Each entry has a filename and a type (file or dir).",
    )
    .with_parameter(
        ToolParameter::new("path", "Directory to list", false)
            .with_type("string")
            .with_default("."),
    )
}

/// Get the tool definition for edit_file
pub fn edit_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        EDIT_FILE,
        "Replace the first occurrence of old_str with new_str in a file. \
         With an empty old_str the file is created, or overwritten, with new_str as its content.",
    )
    .with_parameter(ToolParameter::new("path", "Path of the file to edit", true).with_type("string"))
    .with_parameter(
        ToolParameter::new("old_str", "Exact text to replace (empty to create the file)", false)
            .with_type("string")
            .with_default(""),
    )
    .with_parameter(
        ToolParameter::new("new_str", "Replacement text, or the content of a new file", false)
            .with_type("string")
            .with_default(""),
    )
}

/// `read_file(filename)`: the whole file as text.
pub struct ReadFile {
    resolver: PathResolver,
}

impl ReadFile {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

impl ToolHandler for ReadFile {
    fn call(&self, call: &ToolCall) -> Result<ToolResultEnvelope, ToolError> {
        let raw = call
            .require_string("filename")
            .map_err(ToolError::invalid_argument)?;
        let path = self.resolver.resolve(raw);
        let display = path.display().to_string();

        if !path.exists() {
            return Err(ToolError::new("NOT_FOUND", "file not found"));
        }
        if !path.is_file() {
            return Err(ToolError::invalid_argument("path is not a file"));
        }

        let bytes = fs::read(&path).map_err(|e| io_error(e, &display))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            ToolError::execution_failed(format!("could not decode file as UTF-8: {}", e))
        })?;

        Ok(ToolResultEnvelope::ok(READ_FILE, display).with_detail("content", content))
    }

    fn target(&self, call: &ToolCall) -> String {
        target_of(&self.resolver, call, "filename")
    }
}

/// `list_files(path=".")`: directory entries sorted by name.
pub struct ListFiles {
    resolver: PathResolver,
}

impl ListFiles {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

impl ToolHandler for ListFiles {
    fn call(&self, call: &ToolCall) -> Result<ToolResultEnvelope, ToolError> {
        let path = self.resolver.resolve(call.get_string("path").unwrap_or("."));
        let display = path.display().to_string();

        if path.exists() && !path.is_dir() {
            return Err(ToolError::invalid_argument("path is not a directory"));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&path).map_err(|e| io_error(e, &display))? {
            let entry = entry.map_err(|e| io_error(e, &display))?;
            // Follows symlinks, so a link to a directory lists as "dir".
            let kind = if entry.path().is_dir() { "dir" } else { "file" };
            entries.push((entry.file_name().to_string_lossy().into_owned(), kind));
        }
        entries.sort();

        let files: Vec<_> = entries
            .into_iter()
            .map(|(filename, kind)| json!({ "filename": filename, "type": kind }))
            .collect();

        Ok(ToolResultEnvelope::ok(LIST_FILES, display).with_detail("files", files))
    }

    fn target(&self, call: &ToolCall) -> String {
        target_of(&self.resolver, call, "path")
    }
}

/// `edit_file(path, old_str="", new_str="")`: create or single replacement.
pub struct EditFile {
    resolver: PathResolver,
}

impl EditFile {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

impl ToolHandler for EditFile {
    fn call(&self, call: &ToolCall) -> Result<ToolResultEnvelope, ToolError> {
        let raw = call
            .require_string("path")
            .map_err(ToolError::invalid_argument)?;
        let old_str = call.get_string("old_str").unwrap_or("");
        let new_str = call.get_string("new_str").unwrap_or("");
        let path = self.resolver.resolve(raw);
        let display = path.display().to_string();

        if path.is_dir() {
            return Err(ToolError::invalid_argument("path is a directory"));
        }

        if old_str.is_empty() {
            atomic_write(&path, new_str).map_err(|e| io_error(e, &display))?;
            return Ok(ToolResultEnvelope::created(EDIT_FILE, display));
        }

        if !path.exists() {
            return Err(ToolError::new("NOT_FOUND", "file not found"));
        }
        let current = fs::read_to_string(&path).map_err(|e| io_error(e, &display))?;

        if !current.contains(old_str) {
            return Ok(ToolResultEnvelope::not_found(EDIT_FILE, display)
                .with_detail("message", "old_str not found in file"));
        }

        let updated = current.replacen(old_str, new_str, 1);
        atomic_write(&path, &updated).map_err(|e| io_error(e, &display))?;
        Ok(ToolResultEnvelope::edited(EDIT_FILE, display))
    }

    fn target(&self, call: &ToolCall) -> String {
        target_of(&self.resolver, call, "path")
    }
}

fn target_of(resolver: &PathResolver, call: &ToolCall, key: &str) -> String {
    match call.get_string(key) {
        Some(raw) => resolver.resolve(raw).display().to_string(),
        None => call.tool_name.clone(),
    }
}

fn io_error(e: std::io::Error, path: &str) -> ToolError {
    match e.kind() {
        ErrorKind::NotFound => ToolError::not_found(path),
        ErrorKind::PermissionDenied => ToolError::permission_denied(path),
        _ => ToolError::execution_failed(format!("I/O error on {}: {}", path, e)),
    }
}

/// Write through a sibling temp file and rename it over the target, so a
/// failed write never leaves a half-written file behind.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    // Write through symlinks: replace the file the link points at, not the link.
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = target.as_path();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(existing) => fs::set_permissions(tmp.path(), existing.permissions())?,
        #[cfg(unix)]
        Err(_) => {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))?;
        }
        #[cfg(not(unix))]
        Err(_) => {}
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
