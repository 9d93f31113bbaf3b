//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use foldertree_entity::folder::{FolderNode, FolderTree};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a serializable value as JSON
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a folder forest, either as an ASCII tree or as JSON
pub fn print_tree(tree: &FolderTree, max_depth: Option<usize>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(tree),
        OutputFormat::Table => {
            println!("/");
            for line in render_tree(tree, max_depth) {
                println!("{}", line);
            }
        }
    }
}

/// Render tree lines with box-drawing connectors.
fn render_tree(tree: &FolderTree, max_depth: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    let count = tree.roots.len();
    for (i, node) in tree.roots.iter().enumerate() {
        render_node(node, "", i + 1 == count, max_depth, &mut lines);
    }
    lines
}

fn render_node(
    node: &FolderNode,
    prefix: &str,
    last: bool,
    max_depth: Option<usize>,
    lines: &mut Vec<String>,
) {
    let connector = if last { "└── " } else { "├── " };
    let videos = match node.video_count {
        0 => String::new(),
        1 => " (1 video)".to_string(),
        n => format!(" ({} videos)", n),
    };
    lines.push(format!("{}{}{}/{}", prefix, connector, node.name, videos));

    if max_depth.is_some_and(|max| node.depth >= max) {
        return;
    }

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        render_node(child, &child_prefix, i + 1 == count, max_depth, lines);
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}
