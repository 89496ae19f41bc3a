//! Pagination argument types for CLI commands

use clap::Args;

/// Shared pagination arguments for list commands.
///
/// Flatten this into any command that supports pagination:
/// ```ignore
/// List {
///     #[command(flatten)]
///     pagination: PaginationArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct PaginationArgs {
    /// Page number (1-indexed)
    #[arg(long, short = 'p')]
    pub page: Option<usize>,

    /// Items per page (defaults to preferences.page_size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Maximum results to print
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl PaginationArgs {
    /// Resolved `(page, page_size)`, falling back to the configured page size.
    pub fn resolve(&self, default_page_size: usize) -> (usize, usize) {
        (
            self.page.unwrap_or(1).max(1),
            self.page_size.unwrap_or(default_page_size),
        )
    }
}
