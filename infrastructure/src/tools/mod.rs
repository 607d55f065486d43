//! Tool implementations for the agent
//!
//! Concrete filesystem tools plus the registry and executor that serve them,
//! either in-process ([`LocalToolExecutor`]) or to an MCP client through the
//! server in [`crate::mcp`].

pub mod file;
pub mod handler;
pub mod path;

mod executor;
mod registry;
mod schema;

pub use executor::LocalToolExecutor;
pub use handler::ToolHandler;
pub use path::PathResolver;
pub use registry::ToolRegistry;
pub use schema::JsonSchemaToolConverter;

/// Registry with the three filesystem tools, paths resolved against
/// `resolver`'s base directory.
pub fn default_registry(resolver: PathResolver) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    // Distinct constant names, so none of these registrations can collide.
    let _ = registry.register(
        file::read_file_definition(),
        file::ReadFile::new(resolver.clone()),
    );
    let _ = registry.register(
        file::list_files_definition(),
        file::ListFiles::new(resolver.clone()),
    );
    let _ = registry.register(file::edit_file_definition(), file::EditFile::new(resolver));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_catalog() {
        let registry = default_registry(PathResolver::new("/tmp"));
        let names: Vec<_> = registry.describe_all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![file::READ_FILE, file::LIST_FILES, file::EDIT_FILE]);
    }
}
