use std::fs;
use std::path::{Path, PathBuf};

use careletter_core::{Diagnostic, log_diagnostics, parse, select};
use careletter_renderer::{
    Bundle, LetterRenderer, Preview, render_advice_summary, write_docx,
};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::request::Request;

/// Everything produced for one request, held in memory until written.
pub struct GeneratedDocuments {
    pub bundle_name: String,
    pub bundle: Vec<u8>,
    pub preview_name: String,
    pub preview: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full pipeline for `request` against `precedent`.
pub fn generate(
    config: &AppConfig,
    request: &Request,
    precedent: &str,
) -> Result<GeneratedDocuments, AppError> {
    request.validate()?;
    let stem = request.file_stem();
    let letter_date = request.letter_date()?;
    let placeholders = request.placeholders(&config.firm, letter_date)?;
    let context = request.context()?;

    let parsed = parse(precedent);
    log_diagnostics(&parsed.diagnostics);
    let elements = select(&parsed.document, &context);

    let fee_lines = request.fee_lines(&config.fees.default_lines);
    let letter = LetterRenderer::new(&config.render, &placeholders)
        .with_fee_lines(&fee_lines)
        .render(&elements);
    tracing::info!(
        client = %stem,
        paragraphs = letter.document.paragraphs().count(),
        "rendered client care letter"
    );

    let summary = render_advice_summary(&request.advice_summary(letter_date)?, &config.render);

    let letter_name = format!("Client_Care_Letter_{}.docx", stem);
    let summary_name = format!("Initial_Advice_Summary_{}.docx", stem);
    let mut bundle = Bundle::new();
    bundle.add(&letter_name, &write_docx(&letter.document)?)?;
    bundle.add(&summary_name, &write_docx(&summary)?)?;
    let bundle = bundle.finish()?;

    let preview = Preview::new().embed_html(&letter.document, &letter_name);

    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(letter.diagnostics);

    Ok(GeneratedDocuments {
        bundle_name: format!("Client_Care_Documents_{}.zip", stem),
        bundle,
        preview_name: format!("Client_Care_Letter_{}.html", stem),
        preview,
        diagnostics,
    })
}

/// Writes the bundle, and the preview when asked, into `dir`.
///
/// Returns the written paths, bundle first.
pub fn write_outputs(
    documents: &GeneratedDocuments,
    dir: &Path,
    with_preview: bool,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir).map_err(|source| AppError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    let bundle_path = dir.join(&documents.bundle_name);
    write_file(&bundle_path, &documents.bundle)?;
    written.push(bundle_path);

    if with_preview {
        let preview_path = dir.join(&documents.preview_name);
        write_file(&preview_path, documents.preview.as_bytes())?;
        written.push(preview_path);
    }
    tracing::info!(files = written.len(), "documents written");
    Ok(written)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    fs::write(path, bytes).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}
