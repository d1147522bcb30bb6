//! enumcover LSP Server - live exhaustiveness diagnostics for Rust.
//!
//! Provides IDE integration with:
//! - Diagnostics on file open/save, checked against a fresh module graph of
//!   the file's crate
//! - Full-document sync: unsaved buffer contents are what gets checked
//! - Diagnostics cleared on close

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use enumcover_core::{
    find_crate_root, gather_rs_files, load_config, read_package_info, CheckSession,
    CollectingSink, DiagnosticKind, ModuleGraph, PackageInfo,
};

/// Source name attached to every published diagnostic.
const SOURCE: &str = "enumcover";

/// enumcover Language Server state.
struct EnumcoverLsp {
    client: Client,
    /// Latest full text of every open document.
    documents: Arc<RwLock<HashMap<Url, String>>>,
}

impl EnumcoverLsp {
    fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check one document and publish its diagnostics.
    async fn run_check(&self, uri: Url) {
        // Convert URI to file path
        let file_path = match uri.to_file_path() {
            Ok(p) => p.canonicalize().unwrap_or(p),
            Err(_) => {
                self.log_error("Invalid file URI").await;
                return;
            }
        };

        // Find crate root
        let crate_root = match find_crate_root(&file_path) {
            Some(r) => r,
            None => {
                self.log_info("No Cargo.toml found, skipping check").await;
                return;
            }
        };

        let text = match self.documents.read().await.get(&uri).cloned() {
            Some(t) => t,
            None => match fs::read_to_string(&file_path) {
                Ok(t) => t,
                Err(e) => {
                    self.log_error(&format!("Cannot read {}: {}", file_path.display(), e))
                        .await;
                    return;
                }
            },
        };

        // Graph building and checking are CPU bound.
        let task = tokio::task::spawn_blocking(move || {
            compute_diagnostics(&crate_root, &file_path, &text)
        });

        match task.await {
            Ok(Ok(diagnostics)) => {
                self.log_info(&format!("Check complete: {} diagnostic(s)", diagnostics.len()))
                    .await;
                self.client.publish_diagnostics(uri, diagnostics, None).await;
            }
            Ok(Err(e)) => self.log_error(&format!("Check failed: {:#}", e)).await,
            Err(e) => self.log_error(&format!("Check task failed: {}", e)).await,
        }
    }

    async fn log_info(&self, message: &str) {
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn log_error(&self, message: &str) {
        self.client.log_message(MessageType::ERROR, message).await;
    }
}

/// Build the crate's module graph from disk and check `text` as the content
/// of `file`.
fn compute_diagnostics(crate_root: &Path, file: &Path, text: &str) -> Result<Vec<Diagnostic>> {
    let config = load_config(crate_root)?.unwrap_or_default();
    let files = gather_rs_files(crate_root, &config.excluded_dirs())
        .with_context(|| format!("Failed to gather files under {}", crate_root.display()))?;
    let package = read_package_info(crate_root).unwrap_or_else(|_| PackageInfo::from_dir(crate_root));

    let graph = ModuleGraph::build(crate_root, &files, package.lib_name.as_deref());
    let session = CheckSession::new(&graph);
    let sink = CollectingSink::new();
    session.check_source(file, text, &sink)?;

    Ok(sink
        .into_sorted()
        .iter()
        .map(|d| to_lsp_diagnostic(d, text))
        .collect())
}

/// LSP positions count UTF-16 code units; span columns count chars.
fn utf16_column(text: &str, line: usize, column: usize) -> u32 {
    text.lines()
        .nth(line.saturating_sub(1))
        .map(|l| l.chars().take(column).map(char::len_utf16).sum::<usize>())
        .unwrap_or(column) as u32
}

fn to_lsp_diagnostic(diag: &enumcover_core::Diagnostic, text: &str) -> Diagnostic {
    let span = diag.span;
    let severity = match diag.kind {
        DiagnosticKind::MalformedDirective => DiagnosticSeverity::ERROR,
        _ => DiagnosticSeverity::WARNING,
    };
    Diagnostic {
        range: Range {
            start: Position {
                line: span.line.saturating_sub(1) as u32,
                character: utf16_column(text, span.line, span.column),
            },
            end: Position {
                line: span.end_line.saturating_sub(1) as u32,
                character: utf16_column(text, span.end_line, span.end_column),
            },
        },
        severity: Some(severity),
        code: Some(NumberOrString::String(diag.kind.as_str().to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: Some(serde_json::json!({ "kind": diag.kind })),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for EnumcoverLsp {
    async fn initialize(&self, _params: InitializeParams) -> LspResult<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "enumcover-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "enumcover LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        if !uri.path().ends_with(".rs") {
            return;
        }
        self.documents
            .write()
            .await
            .insert(uri.clone(), params.text_document.text);
        self.run_check(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document. Checked on save.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents
                .write()
                .await
                .insert(params.text_document.uri, change.text);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if !uri.path().ends_with(".rs") {
            return;
        }
        if let Some(text) = params.text {
            self.documents.write().await.insert(uri.clone(), text);
        }
        self.run_check(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.remove(&uri);
        // Clear diagnostics for closed file
        self.client.publish_diagnostics(uri, vec![], None).await;
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook for graceful error handling
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] enumcover-lsp internal error: {}", info);
    }));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(EnumcoverLsp::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
